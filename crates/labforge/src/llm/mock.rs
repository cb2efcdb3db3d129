//! Mock provider for tests and offline development.

use std::sync::Mutex;

use super::provider::{ChatMessage, ChatProvider};
use crate::error::{LabForgeError, Result};

/// A canned-response provider. Records every conversation it receives.
pub struct MockProvider {
    response: String,
    fail: bool,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl MockProvider {
    /// A provider that answers every chat with a well-formed analysis.
    pub fn new() -> Self {
        Self::with_response(
            "Phenomenon: The measured values rise steadily across the series.\n\
             Conclusion: The data matches the expected linear relationship.\n\
             Trend: Linear increase.\n\
             Anomaly: None.\n\
             Suggestion: Repeat each measurement three times.\n\
             Confidence: 0.9",
        )
    }

    /// A provider that always answers with `response`.
    pub fn with_response(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
            fail: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// A provider whose every call fails, for exercising fallback paths.
    pub fn unavailable() -> Self {
        Self {
            response: String::new(),
            fail: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Number of chat calls received so far.
    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatProvider for MockProvider {
    fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(messages.to_vec());
        }
        if self.fail {
            return Err(LabForgeError::Config("Mock provider unavailable".to_string()));
        }
        Ok(self.response.clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_records_calls() {
        let provider = MockProvider::new();
        let _ = provider.chat(&[ChatMessage::user("Hello")]);
        let _ = provider.chat(&[ChatMessage::user("Again")]);
        assert_eq!(provider.call_count(), 2);
    }

    #[test]
    fn test_unavailable_mock_fails() {
        let provider = MockProvider::unavailable();
        assert!(provider.chat(&[ChatMessage::user("Hello")]).is_err());
    }
}
