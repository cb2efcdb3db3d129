//! Ollama local LLM provider implementation.
//!
//! Ollama runs models locally without API keys. Install from:
//! https://ollama.ai

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use super::provider::{AiConfig, ChatMessage, ChatProvider};
use crate::error::{LabForgeError, Result};

/// Default Ollama API endpoint.
const DEFAULT_API_URL: &str = "http://localhost:11434/api/chat";

/// Ollama local LLM provider.
pub struct OllamaProvider {
    client: Client,
    api_url: String,
    config: AiConfig,
}

impl OllamaProvider {
    /// Create from configuration. The endpoint resolves from the config's
    /// `base_url`, then `OLLAMA_HOST`, then localhost.
    pub fn new(config: AiConfig) -> Result<Self> {
        let client = Client::builder()
            // Local models can be slower than hosted APIs.
            .timeout(Duration::from_secs(config.timeout_secs.max(120)))
            .build()
            .map_err(|e| LabForgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let api_url = config
            .base_url
            .clone()
            .or_else(|| std::env::var("OLLAMA_HOST").ok())
            .map(|host| format!("{}/api/chat", host.trim_end_matches('/')))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            client,
            api_url,
            config,
        })
    }
}

impl ChatProvider for OllamaProvider {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = json!({
            "model": self.config.model(),
            "stream": false,
            "options": {
                "temperature": self.config.temperature,
                "num_predict": self.config.max_tokens,
            },
            "messages": messages,
        });

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let response = self
            .client
            .post(&self.api_url)
            .headers(headers)
            .json(&body)
            .send()
            .map_err(|e| {
                if e.is_connect() {
                    LabForgeError::Config(
                        "Failed to connect to Ollama. Is it running? Start with: ollama serve"
                            .to_string(),
                    )
                } else {
                    LabForgeError::Config(format!("Ollama request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();

            if error_text.contains("not found") {
                return Err(LabForgeError::Config(format!(
                    "Model '{}' not found. Pull it with: ollama pull {}",
                    self.config.model(),
                    self.config.model()
                )));
            }

            return Err(LabForgeError::Config(format!(
                "Ollama error ({}): {}",
                status, error_text
            )));
        }

        let api_response: OllamaResponse = response
            .json()
            .map_err(|e| LabForgeError::Config(format!("Failed to parse Ollama response: {}", e)))?;

        Ok(api_response.message.content)
    }

    fn name(&self) -> &str {
        "ollama"
    }
}

/// Ollama API response structure.
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    message: OllamaMessage,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    content: String,
}
