//! Chat provider trait and configuration.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A single chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Trait for chat-capable LLM providers.
///
/// Implementations must be thread-safe (Send + Sync) so batch workers can
/// share an analyzer.
pub trait ChatProvider: Send + Sync {
    /// Send a conversation and return the assistant's text reply.
    fn chat(&self, messages: &[ChatMessage]) -> Result<String>;

    /// Provider name for logging/debugging.
    fn name(&self) -> &str;
}

/// Supported provider vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    OpenAi,
    Anthropic,
    Ollama,
    Mock,
}

impl ProviderKind {
    /// Default model per vendor.
    pub fn default_model(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "gpt-4o-mini",
            ProviderKind::Anthropic => "claude-sonnet-4-20250514",
            ProviderKind::Ollama => "llama3.2",
            ProviderKind::Mock => "mock",
        }
    }

    /// Environment variable holding the vendor credential, if any.
    pub fn credential_env(&self) -> Option<&'static str> {
        match self {
            ProviderKind::OpenAi => Some("OPENAI_API_KEY"),
            ProviderKind::Anthropic => Some("ANTHROPIC_API_KEY"),
            ProviderKind::Ollama | ProviderKind::Mock => None,
        }
    }
}

impl std::str::FromStr for ProviderKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "openai" | "gpt" => Ok(ProviderKind::OpenAi),
            "anthropic" | "claude" => Ok(ProviderKind::Anthropic),
            "ollama" | "local" => Ok(ProviderKind::Ollama),
            "mock" | "test" => Ok(ProviderKind::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use: openai, anthropic, ollama, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::OpenAi => write!(f, "openai"),
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::Ollama => write!(f, "ollama"),
            ProviderKind::Mock => write!(f, "mock"),
        }
    }
}

/// Configuration for an analysis provider.
#[derive(Debug, Clone)]
pub struct AiConfig {
    pub provider: ProviderKind,
    /// Model name; vendor default when empty.
    pub model: String,
    /// Explicit credential; falls back to the vendor's environment variable.
    pub api_key: Option<String>,
    /// Endpoint override (mainly for Ollama hosts and API-compatible proxies).
    pub base_url: Option<String>,
    /// Sampling temperature (0.0-1.0).
    pub temperature: f64,
    /// Maximum tokens in a response.
    pub max_tokens: usize,
    /// Network timeout. A timeout classifies the provider as unavailable.
    pub timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            model: String::new(),
            api_key: None,
            base_url: None,
            temperature: 0.7,
            max_tokens: 2000,
            timeout_secs: 60,
        }
    }
}

impl AiConfig {
    pub fn for_provider(provider: ProviderKind) -> Self {
        Self {
            provider,
            ..Self::default()
        }
    }

    /// Model to use, resolving the vendor default.
    pub fn model(&self) -> String {
        if self.model.is_empty() {
            self.provider.default_model().to_string()
        } else {
            self.model.clone()
        }
    }

    /// Credential from explicit config, else the provider's env var.
    pub fn resolve_api_key(&self) -> Option<String> {
        if let Some(ref key) = self.api_key {
            if !key.is_empty() {
                return Some(key.clone());
            }
        }
        self.provider
            .credential_env()
            .and_then(|var| std::env::var(var).ok())
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("claude".parse::<ProviderKind>().unwrap(), ProviderKind::Anthropic);
        assert_eq!("local".parse::<ProviderKind>().unwrap(), ProviderKind::Ollama);
        assert!("palm".parse::<ProviderKind>().is_err());
    }

    #[test]
    fn test_model_default_resolution() {
        let config = AiConfig::for_provider(ProviderKind::Ollama);
        assert_eq!(config.model(), "llama3.2");

        let config = AiConfig {
            model: "mistral".to_string(),
            ..AiConfig::for_provider(ProviderKind::Ollama)
        };
        assert_eq!(config.model(), "mistral");
    }

    #[test]
    fn test_explicit_key_wins() {
        let config = AiConfig {
            api_key: Some("sk-test".to_string()),
            ..AiConfig::for_provider(ProviderKind::OpenAi)
        };
        assert_eq!(config.resolve_api_key(), Some("sk-test".to_string()));
    }
}
