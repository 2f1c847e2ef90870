//! Response cleanup for generator output.
//!
//! Generators are asked for plain SQL but routinely wrap it in markdown
//! code fences anyway. This module recovers the SQL text; whether that
//! text is safe is the validator's job.

/// Strips markdown code-fence wrapping from a generator response.
///
/// Prefers a ```sql block, then a bare ``` block; if neither parses as a
/// fenced block, any stray fence tokens are removed and the remainder is
/// trimmed.
pub fn strip_sql_fences(response: &str) -> String {
    if let Some(sql) = extract_fenced_block(response, "sql") {
        return sql.trim().to_string();
    }

    if let Some(sql) = extract_fenced_block(response, "") {
        return sql.trim().to_string();
    }

    response
        .replace("```sql", "")
        .replace("```", "")
        .trim()
        .to_string()
}

/// Extracts the first fenced block with the given language specifier.
///
/// Pass an empty `lang` to match blocks without a specifier.
fn extract_fenced_block(text: &str, lang: &str) -> Option<String> {
    let fence = format!("```{lang}");
    let start = text.find(&fence)?;
    let after_fence = start + fence.len();

    let newline = text[after_fence..].find('\n')?;
    let content_start = after_fence + newline + 1;

    // A bare fence must not actually carry a language specifier
    if lang.is_empty() && !text[after_fence..content_start - 1].trim().is_empty() {
        return None;
    }

    let end = text[content_start..].find("```")?;
    Some(text[content_start..content_start + end].to_string())
}
