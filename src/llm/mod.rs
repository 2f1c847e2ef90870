//! Text-generation boundary for sqlgate.
//!
//! The generative translation strategy delegates to an external service
//! through the `TextGenerator` trait: a prompt goes in, untrusted text
//! comes out. Nothing produced here is executed without re-validation.

pub mod mock;
pub mod ollama;

pub use mock::MockGenerator;
pub use ollama::OllamaGenerator;

use crate::error::Result;
use async_trait::async_trait;

/// Trait for text-generation services.
///
/// Implementations must be thread-safe (Send + Sync) and should be
/// configured for deterministic output (temperature 0) so that the same
/// question yields the same candidate SQL.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generates a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_implements_trait() {
        let generator: Box<dyn TextGenerator> = Box::new(MockGenerator::new());
        let response = generator.generate("show me all users").await.unwrap();
        assert!(response.contains("SELECT"));
    }
}
