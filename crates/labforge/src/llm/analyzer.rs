//! Experiment analysis with a deterministic offline fallback.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::mock::MockProvider;
use super::prompts;
use super::provider::{AiConfig, ChatMessage, ChatProvider, ProviderKind};
use crate::error::Result;
use crate::input::Dataset;
use crate::llm::{anthropic::AnthropicProvider, ollama::OllamaProvider, openai::OpenAiProvider};
use crate::stats::{mean, sample_std};

/// Structured analysis of an experiment dataset.
///
/// A default value (empty strings, confidence 0.0) means "no analysis yet",
/// not an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub phenomenon: String,
    pub conclusion: String,
    pub trend: String,
    pub anomaly: String,
    pub suggestion: String,
    pub confidence: f64,
    pub raw_response: String,
}

impl AnalysisResult {
    /// Map analysis fields onto report section names for content resolution.
    pub fn section_content(&self) -> IndexMap<String, String> {
        let mut content = IndexMap::new();
        if !self.conclusion.is_empty() {
            content.insert("conclusion".to_string(), self.conclusion.clone());
        }
        if !self.phenomenon.is_empty() {
            content.insert("analysis".to_string(), self.phenomenon.clone());
            content.insert("discussion".to_string(), self.phenomenon.clone());
        }
        content
    }
}

/// Resolve a configuration to a concrete provider instance.
pub fn create_provider(config: &AiConfig) -> Result<Box<dyn ChatProvider>> {
    Ok(match config.provider {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(config.clone())?),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(config.clone())?),
        ProviderKind::Ollama => Box::new(OllamaProvider::new(config.clone())?),
        ProviderKind::Mock => Box::new(MockProvider::new()),
    })
}

/// Analyzes experiment datasets through a chat provider, with a deterministic
/// rule-based fallback when no provider is reachable.
pub struct LabAnalyzer {
    provider: Option<Box<dyn ChatProvider>>,
    available: bool,
}

impl LabAnalyzer {
    /// Create an analyzer and probe the provider once.
    ///
    /// A failed provider construction (e.g. missing credential) is not an
    /// error here: the analyzer starts unavailable and serves fallback
    /// analyses.
    pub fn new(config: AiConfig) -> Self {
        match create_provider(&config) {
            Ok(provider) => Self::with_provider(provider),
            Err(_) => Self {
                provider: None,
                available: false,
            },
        }
    }

    /// Create an analyzer over an existing provider, probing it once.
    pub fn with_provider(provider: Box<dyn ChatProvider>) -> Self {
        let available = probe(provider.as_ref());
        Self {
            provider: Some(provider),
            available,
        }
    }

    /// Whether the connectivity probe succeeded. Cached for the analyzer's
    /// lifetime.
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Analyze a dataset. Never fails: provider errors and unavailability
    /// both resolve through the deterministic fallback.
    pub fn analyze_phenomenon(&self, dataset: &Dataset, title: &str) -> AnalysisResult {
        let provider = match (&self.provider, self.available) {
            (Some(p), true) => p,
            _ => return fallback_analysis(dataset),
        };

        let messages = [
            ChatMessage::system(prompts::system_prompt()),
            ChatMessage::user(prompts::analysis_prompt(dataset, title)),
        ];

        match provider.chat(&messages) {
            Ok(response) => {
                let mut result = parse_response(&response);
                result.raw_response = response;
                result
            }
            Err(_) => fallback_analysis(dataset),
        }
    }
}

/// Low-cost connectivity probe: a trivial greeting exchange. Never panics or
/// propagates; any failure classifies the provider as unavailable.
fn probe(provider: &dyn ChatProvider) -> bool {
    provider.chat(&[ChatMessage::user("Hello")]).is_ok()
}

/// Parse the labeled-line response format. Missing labels leave fields
/// empty; an unparseable confidence defaults to 0.5.
fn parse_response(response: &str) -> AnalysisResult {
    let mut result = AnalysisResult::default();

    for line in response.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("Phenomenon:") {
            result.phenomenon = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Conclusion:") {
            result.conclusion = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Trend:") {
            result.trend = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Anomaly:") {
            result.anomaly = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Suggestion:") {
            result.suggestion = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix("Confidence:") {
            result.confidence = rest.trim().parse::<f64>().unwrap_or(0.5);
        }
    }

    result
}

/// Rule-based analysis over the first two numeric columns.
///
/// Deterministic given identical input data: trend from the mean sign of
/// successive differences, outliers beyond two standard deviations.
pub fn fallback_analysis(dataset: &Dataset) -> AnalysisResult {
    let mut result = AnalysisResult {
        raw_response: "(offline analysis)".to_string(),
        ..AnalysisResult::default()
    };

    let numeric = dataset.numeric_columns();
    if numeric.len() < 2 {
        return result;
    }
    let (x_name, y_name) = (numeric[0].to_string(), numeric[1].to_string());

    let x = match dataset.numeric_values(&x_name) {
        Ok(v) if !v.is_empty() => v,
        _ => return result,
    };
    let y = match dataset.numeric_values(&y_name) {
        Ok(v) if !v.is_empty() => v,
        _ => return result,
    };

    let x_diff = mean_diff(&x);
    let y_diff = mean_diff(&y);
    result.trend = if x_diff > 0.0 && y_diff > 0.0 {
        "positive correlation".to_string()
    } else if x_diff > 0.0 && y_diff < 0.0 {
        "negative correlation".to_string()
    } else {
        "no clear trend".to_string()
    };

    let y_mean = mean(&y);
    let y_std = sample_std(&y, y_mean);
    let outliers = y
        .iter()
        .filter(|&&v| (v - y_mean).abs() > 2.0 * y_std && y_std > 0.0)
        .count();

    let x_min = x.iter().cloned().fold(f64::INFINITY, f64::min);
    let x_max = x.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    result.phenomenon = format!(
        "The data covers {} from {:.2} to {:.2}",
        x_name, x_min, x_max
    );
    result.anomaly = if outliers > 0 {
        format!("{} potential outlier(s) detected", outliers)
    } else {
        "No obvious outliers detected".to_string()
    };
    result.conclusion = format!(
        "The results are consistent with the expected relationship between {} and {}",
        x_name, y_name
    );
    result.suggestion = "Collect additional data points to improve the fit".to_string();
    result.confidence = 0.7;

    result
}

/// Mean of successive differences; 0.0 for fewer than two values.
fn mean_diff(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let diffs: Vec<f64> = values.windows(2).map(|w| w[1] - w[0]).collect();
    mean(&diffs)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["voltage".into(), "current".into()],
            vec![
                vec!["1".into(), "0.5".into()],
                vec!["2".into(), "1.0".into()],
                vec!["3".into(), "1.5".into()],
                vec!["4".into(), "2.0".into()],
                vec!["5".into(), "2.5".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_parse_full_response() {
        let response = "Phenomenon: Current rises with voltage.\n\
                        Conclusion: Ohm's law holds.\n\
                        Trend: Linear increase.\n\
                        Anomaly: None.\n\
                        Suggestion: Average repeated readings.\n\
                        Confidence: 0.85";
        let result = parse_response(response);
        assert_eq!(result.conclusion, "Ohm's law holds.");
        assert_eq!(result.trend, "Linear increase.");
        assert!((result.confidence - 0.85).abs() < 1e-12);
    }

    #[test]
    fn test_parse_tolerates_missing_labels() {
        let result = parse_response("Conclusion: Fine.\nConfidence: not-a-number");
        assert_eq!(result.conclusion, "Fine.");
        assert!(result.phenomenon.is_empty());
        assert!((result.confidence - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_unavailable_provider_uses_fallback() {
        let analyzer = LabAnalyzer::with_provider(Box::new(MockProvider::unavailable()));
        assert!(!analyzer.is_available());

        let result = analyzer.analyze_phenomenon(&dataset(), "Ohm's Law");
        assert_eq!(result.raw_response, "(offline analysis)");
        assert_eq!(result.trend, "positive correlation");
    }

    #[test]
    fn test_fallback_is_deterministic() {
        let ds = dataset();
        let a = fallback_analysis(&ds);
        let b = fallback_analysis(&ds);
        assert_eq!(a.trend, b.trend);
        assert_eq!(a.anomaly, b.anomaly);
        assert_eq!(a.conclusion, b.conclusion);
    }

    #[test]
    fn test_fallback_negative_trend() {
        let ds = Dataset::new(
            vec!["x".into(), "y".into()],
            vec![
                vec!["1".into(), "9".into()],
                vec!["2".into(), "7".into()],
                vec!["3".into(), "5".into()],
                vec!["4".into(), "3".into()],
            ],
        )
        .unwrap();
        assert_eq!(fallback_analysis(&ds).trend, "negative correlation");
    }

    #[test]
    fn test_fallback_needs_two_numeric_columns() {
        let ds = Dataset::new(
            vec!["x".into(), "label".into()],
            vec![vec!["1".into(), "a".into()], vec!["2".into(), "b".into()]],
        )
        .unwrap();
        let result = fallback_analysis(&ds);
        assert!(result.trend.is_empty());
        assert_eq!(result.confidence, 0.0);
    }

    #[test]
    fn test_available_provider_parses_response() {
        let analyzer = LabAnalyzer::with_provider(Box::new(MockProvider::new()));
        assert!(analyzer.is_available());

        let result = analyzer.analyze_phenomenon(&dataset(), "Ohm's Law");
        assert_eq!(result.conclusion, "The data matches the expected linear relationship.");
        assert!((result.confidence - 0.9).abs() < 1e-12);
        assert!(!result.raw_response.is_empty());
    }

    #[test]
    fn test_section_content_mapping() {
        let result = AnalysisResult {
            conclusion: "c".to_string(),
            phenomenon: "p".to_string(),
            ..AnalysisResult::default()
        };
        let content = result.section_content();
        assert_eq!(content["conclusion"], "c");
        assert_eq!(content["analysis"], "p");
        assert_eq!(content["discussion"], "p");
    }
}
