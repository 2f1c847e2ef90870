//! Generative translation strategy.
//!
//! Delegates natural-language to SQL translation to an external
//! text-generation service through the `TextGenerator` trait. The service
//! output is untrusted: it is cleaned up here and re-validated by the
//! safety gate before execution.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use crate::error::{GateError, Result};
use crate::llm::TextGenerator;
use crate::translate::{parser, prompt, QueryContext, Translator};

/// Translator that delegates to a text-generation service.
pub struct GenerativeTranslator {
    generator: Arc<dyn TextGenerator>,
    schema: Arc<str>,
}

impl GenerativeTranslator {
    /// Creates a translator over the given generator and schema descriptor.
    ///
    /// The schema text is fixed for the lifetime of the translator; it is
    /// owned by configuration and never mutated here.
    pub fn new(generator: Arc<dyn TextGenerator>, schema: impl Into<Arc<str>>) -> Self {
        Self {
            generator,
            schema: schema.into(),
        }
    }
}

#[async_trait]
impl Translator for GenerativeTranslator {
    async fn translate(&self, question: &str, context: Option<&QueryContext>) -> Result<String> {
        let prompt = prompt::build_prompt(question, &self.schema, context);

        let raw = self.generator.generate(&prompt).await?;
        let sql = parser::strip_sql_fences(&raw);

        if sql.is_empty() {
            return Err(GateError::translation("generator returned an empty response"));
        }

        debug!(%sql, "generated candidate SQL");
        Ok(sql)
    }
}
