//! Mock text generator for testing.
//!
//! Provides deterministic responses based on input patterns, without making
//! real API calls.

use async_trait::async_trait;

use crate::error::Result;
use crate::llm::TextGenerator;

/// Mock generator that returns canned responses based on input patterns.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    /// Custom response mappings (pattern -> response).
    custom_responses: Vec<(String, String)>,
}

impl MockGenerator {
    /// Creates a new mock generator with default responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a custom response mapping.
    ///
    /// When the prompt contains `pattern`, the mock will return `response`.
    pub fn with_response(
        mut self,
        pattern: impl Into<String>,
        response: impl Into<String>,
    ) -> Self {
        self.custom_responses
            .push((pattern.into(), response.into()));
        self
    }

    /// Generates a mock response based on the prompt.
    fn mock_response(&self, prompt: &str) -> String {
        let prompt_lower = prompt.to_lowercase();

        // Check custom responses first
        for (pattern, response) in &self.custom_responses {
            if prompt_lower.contains(&pattern.to_lowercase()) {
                return response.clone();
            }
        }

        // Default pattern matching
        if prompt_lower.contains("all users") || prompt_lower.contains("show users") {
            return "```sql\nSELECT * FROM users;\n```".to_string();
        }

        if prompt_lower.contains("count") && prompt_lower.contains("employees") {
            return "```sql\nSELECT COUNT(*) as count FROM employees;\n```".to_string();
        }

        if prompt_lower.contains("count") && prompt_lower.contains("users") {
            return "```sql\nSELECT COUNT(*) FROM users;\n```".to_string();
        }

        "I don't understand that question. Could you please rephrase it?".to_string()
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        Ok(self.mock_response(prompt))
    }
}
