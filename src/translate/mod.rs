//! Natural-language to SQL translation for sqlgate.
//!
//! Two interchangeable strategies behind the `Translator` trait: a
//! deterministic pattern matcher and a delegating generative strategy.
//! Neither executes SQL; whatever they produce goes back through the
//! safety validator before it reaches a connection.

pub mod generative;
pub mod parser;
pub mod pattern;
pub mod prompt;

pub use generative::GenerativeTranslator;
pub use pattern::PatternTranslator;

use crate::config::Config;
use crate::error::{GateError, Result};
use crate::llm::OllamaGenerator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

/// Free-form request context forwarded to the translator.
pub type QueryContext = HashMap<String, String>;

/// Trait for natural-language to SQL translators.
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translates a natural-language question into candidate SQL text.
    ///
    /// The returned text is untrusted and must be validated before
    /// execution.
    async fn translate(&self, question: &str, context: Option<&QueryContext>) -> Result<String>;
}

/// Translation strategy selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TranslatorStrategy {
    /// Deterministic substring/regex heuristics, no external dependency.
    #[default]
    Pattern,
    /// Delegation to an external text-generation service.
    Generative,
}

impl TranslatorStrategy {
    /// Returns the strategy as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Generative => "generative",
        }
    }
}

impl FromStr for TranslatorStrategy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pattern" => Ok(Self::Pattern),
            "generative" => Ok(Self::Generative),
            _ => Err(format!("Unknown translation strategy: {s}")),
        }
    }
}

impl std::fmt::Display for TranslatorStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builds the configured translator.
///
/// This is the central factory for translation strategies; the generative
/// strategy pulls the schema descriptor and generator settings from the
/// same config.
pub fn from_config(config: &Config) -> Result<Arc<dyn Translator>> {
    let strategy = config
        .translator
        .strategy
        .parse::<TranslatorStrategy>()
        .map_err(GateError::config)?;

    match strategy {
        TranslatorStrategy::Pattern => Ok(Arc::new(PatternTranslator::new(
            &config.translator.default_table,
        )?)),
        TranslatorStrategy::Generative => {
            let schema = config.schema_text()?;
            let generator = Arc::new(OllamaGenerator::new(config.generator.clone())?);
            Ok(Arc::new(GenerativeTranslator::new(generator, schema)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_from_str() {
        assert_eq!(
            "pattern".parse::<TranslatorStrategy>().unwrap(),
            TranslatorStrategy::Pattern
        );
        assert_eq!(
            "Generative".parse::<TranslatorStrategy>().unwrap(),
            TranslatorStrategy::Generative
        );
        assert!("oracle".parse::<TranslatorStrategy>().is_err());
    }

    #[test]
    fn test_strategy_display() {
        assert_eq!(TranslatorStrategy::Pattern.to_string(), "pattern");
        assert_eq!(TranslatorStrategy::Generative.to_string(), "generative");
    }

    #[test]
    fn test_from_config_pattern() {
        let config = Config::default();
        let translator = from_config(&config);
        assert!(translator.is_ok());
    }

    #[test]
    fn test_from_config_unknown_strategy() {
        let mut config = Config::default();
        config.translator.strategy = "oracle".to_string();

        let result = from_config(&config);
        assert!(result.is_err());
        let err = match result {
            Err(e) => e,
            Ok(_) => panic!("expected error"),
        };
        assert!(matches!(err, GateError::Config(_)));
    }
}
