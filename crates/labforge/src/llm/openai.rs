//! OpenAI chat-completions provider implementation.

use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::json;

use super::provider::{AiConfig, ChatMessage, ChatProvider};
use crate::error::{LabForgeError, Result};

/// Default API endpoint.
const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

/// OpenAI (and API-compatible) provider.
pub struct OpenAiProvider {
    client: Client,
    api_url: String,
    api_key: String,
    config: AiConfig,
}

impl OpenAiProvider {
    /// Create from configuration, resolving the credential from config or
    /// the `OPENAI_API_KEY` environment variable.
    pub fn new(config: AiConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            LabForgeError::Config(
                "No OpenAI API key: set it in the config or OPENAI_API_KEY".to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| LabForgeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let api_url = config
            .base_url
            .clone()
            .map(|base| format!("{}/chat/completions", base.trim_end_matches('/')))
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        Ok(Self {
            client,
            api_url,
            api_key,
            config,
        })
    }

    fn build_headers(&self) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", self.api_key))
                .map_err(|e| LabForgeError::Config(format!("Invalid API key: {}", e)))?,
        );
        Ok(headers)
    }
}

impl ChatProvider for OpenAiProvider {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        let body = json!({
            "model": self.config.model(),
            "messages": messages,
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
        });

        let response = self
            .client
            .post(&self.api_url)
            .headers(self.build_headers()?)
            .json(&body)
            .send()
            .map_err(|e| LabForgeError::Config(format!("API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().unwrap_or_default();
            return Err(LabForgeError::Config(format!(
                "API error ({}): {}",
                status, error_text
            )));
        }

        let api_response: ApiResponse = response
            .json()
            .map_err(|e| LabForgeError::Config(format!("Failed to parse API response: {}", e)))?;

        api_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| LabForgeError::Config("No choices in API response".to_string()))
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: String,
}
