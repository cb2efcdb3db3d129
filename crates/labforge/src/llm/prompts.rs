//! Prompt templates for analysis requests.

use crate::input::Dataset;
use crate::stats::{summarize, ColumnSummary};

/// Rows of raw data included in the prompt.
const PREVIEW_ROWS: usize = 10;

/// System prompt for all analysis interactions.
pub fn system_prompt() -> &'static str {
    r#"You are an experienced university lab instructor reviewing student experiment data.

Guidelines:
- Be concise and specific
- Reference actual data values when describing trends
- When uncertain, say so rather than overstating confidence
- Always answer in the exact labeled-line format requested"#
}

/// Build the phenomenon-analysis prompt for a dataset.
pub fn analysis_prompt(dataset: &Dataset, title: &str) -> String {
    format!(
        r#"Analyze the following experiment data.

## Experiment
{title}

{data}

## Task
1. Describe the observed phenomenon: what pattern does the data show?
2. State a conclusion supported by the data.
3. Characterize the trend (linear/non-linear, increasing/decreasing).
4. Flag anomalous data points, or "None".
5. Suggest one improvement to the experiment.

Reply with exactly these labeled lines:
Phenomenon: <description>
Conclusion: <conclusion>
Trend: <trend>
Anomaly: <anomaly or "None">
Suggestion: <suggestion>
Confidence: <number between 0 and 1>"#,
        title = title,
        data = format_dataset(dataset),
    )
}

/// Format a dataset for inclusion in a prompt: shape, per-column statistics,
/// and a bounded raw preview.
pub fn format_dataset(dataset: &Dataset) -> String {
    if dataset.is_empty() {
        return "No data".to_string();
    }

    let summary = summarize(dataset);
    let mut stats_lines = Vec::new();
    for column in &summary.columns {
        if let ColumnSummary::Numeric { name, stats } = column {
            stats_lines.push(format!(
                "- {}: mean={:.4}, std={:.4}, range=[{}, {}]",
                name, stats.mean, stats.std, stats.min, stats.max
            ));
        }
    }

    let mut preview = String::new();
    preview.push_str(&dataset.headers.join(", "));
    preview.push('\n');
    for row in dataset.rows.iter().take(PREVIEW_ROWS) {
        preview.push_str(&row.join(", "));
        preview.push('\n');
    }

    format!(
        "## Data\nShape: {} rows × {} columns\nColumns: {}\nStatistics:\n{}\n\n## Raw data (first {} rows)\n{}",
        summary.shape.rows,
        summary.shape.columns,
        dataset.headers.join(", "),
        stats_lines.join("\n"),
        PREVIEW_ROWS.min(dataset.row_count()),
        preview,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_stats_and_title() {
        let ds = Dataset::new(
            vec!["voltage".into(), "current".into()],
            vec![
                vec!["1".into(), "0.5".into()],
                vec!["2".into(), "1.0".into()],
            ],
        )
        .unwrap();

        let prompt = analysis_prompt(&ds, "Ohm's Law");
        assert!(prompt.contains("Ohm's Law"));
        assert!(prompt.contains("voltage"));
        assert!(prompt.contains("Confidence:"));
    }
}
