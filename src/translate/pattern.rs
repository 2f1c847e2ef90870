//! Deterministic pattern-based translation.
//!
//! Classifies a question into one of four intents (count, top-n, list,
//! all) by substring heuristics, extracts a table name where one is
//! mentioned, and emits a templated SELECT. No external dependency and no
//! hidden state, so translation is reproducible.

use async_trait::async_trait;
use regex::Regex;

use crate::error::{GateError, Result};
use crate::translate::{QueryContext, Translator};

/// Pattern-based natural-language translator.
#[derive(Debug)]
pub struct PatternTranslator {
    default_table: String,
    table_from_in: Regex,
    table_from_in_of: Regex,
    limit_bound: Regex,
    table_after_all: Regex,
    table_before_filter: Regex,
}

impl PatternTranslator {
    /// Creates a translator that falls back to `default_table` when no
    /// table name can be extracted.
    pub fn new(default_table: impl Into<String>) -> Result<Self> {
        Ok(Self {
            default_table: default_table.into(),
            table_from_in: compile(r"\b(?:from|in)\s+(\w+)")?,
            table_from_in_of: compile(r"\b(?:from|in|of)\s+(\w+)")?,
            limit_bound: compile(r"(?:top|first|limit)\s+(\d+)")?,
            table_after_all: compile(r"\b(?:all|every)\s+(\w+)")?,
            table_before_filter: compile(r"\b(\w+)\s+(?:where|with)")?,
        })
    }

    fn classify(&self, question: &str) -> String {
        let q = question.to_lowercase();

        if q.contains("count") || q.contains("how many") {
            let table = self.capture(&self.table_from_in, &q);
            return format!("SELECT COUNT(*) as count FROM {table}");
        }

        if q.contains("top") || q.contains("first") || q.contains("limit") {
            let limit = capture_group(&self.limit_bound, &q).unwrap_or_else(|| "10".to_string());
            let table = self.capture(&self.table_from_in, &q);
            return format!("SELECT * FROM {table} LIMIT {limit}");
        }

        if q.contains("show") || q.contains("list") || q.contains("get") {
            let table = self.capture(&self.table_from_in_of, &q);
            return format!("SELECT * FROM {table} LIMIT 100");
        }

        if q.contains("all") || q.contains("every") {
            let table = capture_group(&self.table_after_all, &q)
                .or_else(|| capture_group(&self.table_before_filter, &q))
                .unwrap_or_else(|| self.default_table.clone());
            return format!("SELECT * FROM {table}");
        }

        // Unmatched input falls back to a small sample of the default table
        format!("SELECT * FROM {} LIMIT 10", self.default_table)
    }

    fn capture(&self, pattern: &Regex, question: &str) -> String {
        capture_group(pattern, question).unwrap_or_else(|| self.default_table.clone())
    }
}

fn capture_group(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| GateError::internal(format!("invalid pattern: {e}")))
}

#[async_trait]
impl Translator for PatternTranslator {
    async fn translate(&self, question: &str, _context: Option<&QueryContext>) -> Result<String> {
        Ok(self.classify(question))
    }
}
