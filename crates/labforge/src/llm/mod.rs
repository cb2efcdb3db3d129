//! LLM provider integration for narrative report sections.
//!
//! Providers sit behind one [`ChatProvider`] trait; a factory resolves the
//! configured vendor to a concrete instance at construction time. The
//! integration is optional: when no provider is reachable, analysis resolves
//! through a deterministic rule-based fallback, so report generation works
//! fully offline.
//!
//! # Supported Providers
//!
//! - **OpenAI** - GPT models via API (requires `OPENAI_API_KEY`)
//! - **Anthropic** - Claude models via API (requires `ANTHROPIC_API_KEY`)
//! - **Ollama** - Local models, no API key needed (requires Ollama installed)
//! - **Mock** - canned responses for tests

mod analyzer;
mod anthropic;
mod mock;
mod ollama;
mod openai;
mod prompts;
mod provider;

pub use analyzer::{create_provider, fallback_analysis, AnalysisResult, LabAnalyzer};
pub use anthropic::AnthropicProvider;
pub use mock::MockProvider;
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use provider::{AiConfig, ChatMessage, ChatProvider, ProviderKind};
