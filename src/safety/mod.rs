//! Query safety validation module.
//!
//! A lexical, pattern-based gate over candidate SQL: only statements that
//! look like a single read-only SELECT are allowed through. This is a
//! deny-list filter, not a parser; it trades completeness for simplicity
//! and auditability, and clever encodings may slip past it. The executor
//! treats it as one layer of defense in front of a read-only role.

use crate::error::{GateError, Result};
use regex::Regex;
use std::fmt;

/// Statement keywords that are never allowed, anywhere in the text.
const DENIED_KEYWORDS: [&str; 11] = [
    "DROP", "DELETE", "TRUNCATE", "ALTER", "CREATE", "INSERT", "UPDATE", "GRANT", "REVOKE",
    "EXEC", "EXECUTE",
];

/// The outcome of validating a candidate SQL string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// Whether the statement may be executed.
    pub allowed: bool,
    /// Reason for the denial, when denied.
    pub reason: Option<String>,
}

impl Verdict {
    /// Creates an allowing verdict.
    pub fn allow() -> Self {
        Self {
            allowed: true,
            reason: None,
        }
    }

    /// Creates a denying verdict with the given reason.
    pub fn deny(reason: impl Into<String>) -> Self {
        Self {
            allowed: false,
            reason: Some(reason.into()),
        }
    }

    /// Returns the denial reason, if denied.
    pub fn denial(&self) -> Option<&str> {
        if self.allowed {
            None
        } else {
            self.reason.as_deref()
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.denial() {
            Some(reason) => write!(f, "DENY ({reason})"),
            None => write!(f, "ALLOW"),
        }
    }
}

/// Validates SQL statements before execution.
///
/// Stateless; the same input always yields the same verdict, and a single
/// instance may be shared freely across tasks.
#[derive(Debug)]
pub struct SqlValidator {
    denied_keyword: Regex,
    leading_select: Regex,
    chained_write: Regex,
    union_select: Regex,
}

impl SqlValidator {
    /// Creates a validator with its patterns compiled once.
    pub fn new() -> Result<Self> {
        let keyword_alternation = DENIED_KEYWORDS.join("|");

        Ok(Self {
            denied_keyword: compile(&format!(r"(?i)\b({keyword_alternation})\b"))?,
            leading_select: compile(r"(?i)^\s*SELECT\b")?,
            chained_write: compile(r"(?i);\s*(DROP|DELETE|INSERT|UPDATE|ALTER|CREATE)")?,
            union_select: compile(r"(?i)UNION\s+SELECT")?,
        })
    }

    /// Validates a candidate SQL string.
    ///
    /// The text is normalized (comments stripped, whitespace collapsed) for
    /// matching only; the caller executes the original text.
    pub fn validate(&self, sql: &str) -> Verdict {
        if sql.trim().is_empty() {
            return Verdict::deny("empty query");
        }

        let normalized = normalize(sql);

        if let Some(m) = self.denied_keyword.captures(&normalized) {
            let keyword = m
                .get(1)
                .map(|k| k.as_str().to_uppercase())
                .unwrap_or_default();
            return Verdict::deny(format!("forbidden keyword {keyword}"));
        }

        if !self.leading_select.is_match(&normalized) {
            return Verdict::deny("must be a SELECT");
        }

        let open = normalized.matches('(').count();
        let close = normalized.matches(')').count();
        if open != close {
            return Verdict::deny("unbalanced parentheses");
        }

        // Secondary-statement and injection signatures. Comment tokens that
        // survive normalization indicate a malformed comment.
        if self.chained_write.is_match(&normalized)
            || normalized.contains("--")
            || normalized.contains("/*")
            || self.union_select.is_match(&normalized)
        {
            return Verdict::deny("suspicious pattern");
        }

        Verdict::allow()
    }
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| GateError::internal(format!("invalid pattern: {e}")))
}

/// Normalizes SQL for matching: strips `--` line comments and terminated
/// `/* ... */` block comments, then collapses whitespace runs to single
/// spaces. An unterminated `/*` is deliberately left in place so the
/// suspicious-pattern check can reject it.
fn normalize(sql: &str) -> String {
    let mut without_line_comments = String::with_capacity(sql.len());
    for (i, line) in sql.lines().enumerate() {
        if i > 0 {
            without_line_comments.push('\n');
        }
        match line.find("--") {
            Some(idx) => without_line_comments.push_str(&line[..idx]),
            None => without_line_comments.push_str(line),
        }
    }

    let mut stripped = String::with_capacity(without_line_comments.len());
    let mut rest = without_line_comments.as_str();
    loop {
        match rest.find("/*") {
            Some(start) => match rest[start..].find("*/") {
                Some(end) => {
                    stripped.push_str(&rest[..start]);
                    rest = &rest[start + end + 2..];
                }
                None => {
                    stripped.push_str(rest);
                    break;
                }
            },
            None => {
                stripped.push_str(rest);
                break;
            }
        }
    }

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn validator() -> SqlValidator {
        SqlValidator::new().unwrap()
    }

    fn reason(verdict: &Verdict) -> String {
        verdict.denial().unwrap_or_default().to_string()
    }

    #[test]
    fn test_allows_plain_select() {
        let v = validator();
        assert!(v.validate("SELECT * FROM users").allowed);
        assert!(v.validate("  select id, name from users where id = 1  ").allowed);
        assert!(v.validate("SELECT COUNT(*) as count FROM employees").allowed);
    }

    #[test]
    fn test_denies_empty_query() {
        let v = validator();
        assert_eq!(reason(&v.validate("")), "empty query");
        assert_eq!(reason(&v.validate("   \n\t ")), "empty query");
    }

    #[test]
    fn test_denies_forbidden_keywords() {
        let v = validator();
        for keyword in DENIED_KEYWORDS {
            let sql = format!("SELECT * FROM t; {keyword} something");
            let verdict = v.validate(&sql);
            assert!(!verdict.allowed, "{keyword} should be denied");
            assert_eq!(reason(&verdict), format!("forbidden keyword {keyword}"));
        }
    }

    #[test]
    fn test_denies_keywords_case_insensitively() {
        let v = validator();
        assert_eq!(
            reason(&v.validate("SELECT 1; DrOp TABLE users")),
            "forbidden keyword DROP"
        );
        assert_eq!(
            reason(&v.validate("delete from users")),
            "forbidden keyword DELETE"
        );
    }

    #[test]
    fn test_keyword_requires_word_boundary() {
        let v = validator();
        // "created_at" and "updated_at" contain deny-listed substrings but
        // are ordinary column names
        assert!(v.validate("SELECT created_at, updated_at FROM events").allowed);
        assert!(v.validate("SELECT dropped_frames FROM stats").allowed);
    }

    #[test]
    fn test_denies_non_select() {
        let v = validator();
        assert_eq!(reason(&v.validate("SHOW TABLES")), "must be a SELECT");
        assert_eq!(reason(&v.validate("EXPLAIN SELECT 1")), "must be a SELECT");
        assert_eq!(
            reason(&v.validate("WITH x AS (SELECT 1) SELECT * FROM x")),
            "must be a SELECT"
        );
    }

    #[test]
    fn test_denies_unbalanced_parentheses() {
        let v = validator();
        assert_eq!(
            reason(&v.validate("SELECT COUNT( FROM users")),
            "unbalanced parentheses"
        );
        assert_eq!(
            reason(&v.validate("SELECT * FROM (SELECT 1) x)")),
            "unbalanced parentheses"
        );
    }

    #[test]
    fn test_denies_classic_injection() {
        let v = validator();
        let verdict = v.validate("SELECT * FROM users; DROP TABLE users;");
        assert!(!verdict.allowed);
        assert_eq!(reason(&verdict), "forbidden keyword DROP");
    }

    #[test]
    fn test_denies_union_select() {
        let v = validator();
        assert_eq!(
            reason(&v.validate("SELECT id FROM users UNION SELECT password FROM secrets")),
            "suspicious pattern"
        );
    }

    #[test]
    fn test_denies_unterminated_block_comment() {
        let v = validator();
        assert_eq!(
            reason(&v.validate("SELECT * FROM users /* sneaky")),
            "suspicious pattern"
        );
    }

    #[test]
    fn test_comment_stripping_is_for_matching_only() {
        let v = validator();
        // Terminated comments are stripped before matching; the statement
        // underneath is a valid SELECT
        assert!(v.validate("SELECT * FROM users -- trailing note").allowed);
        assert!(v.validate("SELECT /* inline */ id FROM users").allowed);
    }

    #[test]
    fn test_keyword_hidden_in_comment_is_ignored() {
        let v = validator();
        assert!(v.validate("SELECT id FROM users /* drop nothing */").allowed);
        assert!(v.validate("SELECT id FROM users -- delete me later").allowed);
    }

    #[test]
    fn test_keyword_split_by_comment_still_denied() {
        let v = validator();
        // Removing the comment splices "DR" and "OP" back into "DROP",
        // which the keyword scan then catches
        let verdict = v.validate("SELECT 1; DR/* */OP TABLE users");
        assert!(!verdict.allowed);
        assert_eq!(reason(&verdict), "forbidden keyword DROP");
    }

    #[test]
    fn test_validation_is_idempotent() {
        let v = validator();
        for sql in [
            "SELECT * FROM users",
            "DROP TABLE users",
            "",
            "SELECT COUNT( FROM x",
        ] {
            assert_eq!(v.validate(sql), v.validate(sql));
        }
    }

    #[test]
    fn test_normalize_collapses_whitespace() {
        assert_eq!(
            normalize("SELECT   *\n\tFROM\n  users"),
            "SELECT * FROM users"
        );
    }

    #[test]
    fn test_normalize_strips_line_comments() {
        assert_eq!(
            normalize("SELECT * -- all columns\nFROM users"),
            "SELECT * FROM users"
        );
    }

    #[test]
    fn test_normalize_strips_block_comments() {
        assert_eq!(
            normalize("SELECT /* every\ncolumn */ * FROM users"),
            "SELECT * FROM users"
        );
    }

    #[test]
    fn test_normalize_keeps_unterminated_block_comment() {
        assert_eq!(normalize("SELECT 1 /* oops"), "SELECT 1 /* oops");
    }

    #[test]
    fn test_verdict_display() {
        assert_eq!(Verdict::allow().to_string(), "ALLOW");
        assert_eq!(
            Verdict::deny("empty query").to_string(),
            "DENY (empty query)"
        );
    }
}
