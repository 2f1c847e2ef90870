//! Ollama text-generation client.
//!
//! Implements the TextGenerator trait against an Ollama-compatible
//! `/api/generate` endpoint. Runs locally without API costs, which also
//! makes it the integration-test backend of choice.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeneratorSettings;
use crate::error::{GateError, Result};
use crate::llm::TextGenerator;

/// Ollama text-generation client.
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    settings: GeneratorSettings,
    client: Client,
}

impl OllamaGenerator {
    /// Creates a new generator with the given settings.
    pub fn new(settings: GeneratorSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| GateError::translation(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { settings, client })
    }

    /// Creates a generator from environment variables.
    ///
    /// Reads `OLLAMA_URL` for the base URL (defaults to http://localhost:11434).
    /// Reads `OLLAMA_MODEL` for the model (defaults to "llama3.2:3b").
    pub fn from_env() -> Result<Self> {
        let mut settings = GeneratorSettings::default();
        if let Ok(base_url) = std::env::var("OLLAMA_URL") {
            settings.base_url = base_url;
        }
        if let Ok(model) = std::env::var("OLLAMA_MODEL") {
            settings.model = model;
        }
        Self::new(settings)
    }

    /// Checks if the service is available at the configured URL.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.settings.base_url);
        self.client.get(&url).send().await.is_ok()
    }

    /// Returns the generate API endpoint URL.
    fn generate_url(&self) -> String {
        format!("{}/api/generate", self.settings.base_url)
    }
}

#[async_trait]
impl TextGenerator for OllamaGenerator {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateRequest {
            model: self.settings.model.clone(),
            prompt: prompt.to_string(),
            stream: false,
            // Deterministic output: the same question must produce the
            // same candidate SQL
            options: GenerateOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(self.generate_url())
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    GateError::translation("Request timed out. Try again.")
                } else if e.is_connect() {
                    GateError::translation(
                        "Failed to connect to Ollama. Is it running? Try: ollama serve",
                    )
                } else {
                    GateError::translation(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GateError::translation(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(GateError::translation(format!(
                "Ollama API error ({status}): {body}"
            )));
        }

        let response: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| GateError::translation(format!("Failed to parse response: {e}")))?;

        Ok(response.response)
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct GenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Debug, Serialize)]
struct GenerateOptions {
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: String,
}
