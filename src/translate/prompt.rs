//! Prompt construction for the generative translation strategy.
//!
//! Builds a single prompt from the fixed system instruction, the schema
//! descriptor, optional request context, and the user question.

use crate::translate::QueryContext;

/// System instruction for the SQL generator.
const SYSTEM_PROMPT: &str = r#"You are a PostgreSQL expert and a strict SQL code generator.

YOUR JOB:
1. Receive a natural language question and a database schema.
2. Output ONLY valid, executable PostgreSQL.
3. Do NOT output markdown code blocks, explanations, or notes.
4. If the question cannot be answered with the schema, return: SELECT 'ERROR: Irrelevant question' as error_msg;

RULES:
- Generate a single read-only SELECT statement.
- Use ILIKE for text matching to be case-insensitive.
- Use standard aggregations (SUM, AVG, COUNT) where appropriate.
- Return plain text SQL only. No formatting."#;

/// Builds the complete prompt for a generation request.
pub fn build_prompt(question: &str, schema: &str, context: Option<&QueryContext>) -> String {
    let mut prompt = String::with_capacity(
        SYSTEM_PROMPT.len() + schema.len() + question.len() + 64,
    );

    prompt.push_str(SYSTEM_PROMPT);
    prompt.push_str("\n\n### SCHEMA:\n");
    prompt.push_str(schema);

    if let Some(context) = context.filter(|c| !c.is_empty()) {
        prompt.push_str("\n\n### CONTEXT:\n");
        let mut entries: Vec<_> = context.iter().collect();
        entries.sort();
        for (key, value) in entries {
            prompt.push_str(key);
            prompt.push_str(": ");
            prompt.push_str(value);
            prompt.push('\n');
        }
    }

    prompt.push_str("\n\n### QUESTION:\n");
    prompt.push_str(question);
    prompt.push_str("\n\n### SQL:\n");

    prompt
}
