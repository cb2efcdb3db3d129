//! Pre-flight data quality checks that gate or inform report generation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::input::Dataset;
use crate::stats::{mean, percentile, sample_std};

/// Outcome of validating a dataset.
///
/// `valid` is false iff `errors` is non-empty. Warnings never block on their
/// own; callers opt into strict handling.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    fn finish(mut self) -> Self {
        self.valid = self.errors.is_empty();
        self
    }
}

/// Validate a dataset before report generation.
///
/// Checks accumulate independently; only an empty dataset stops early, since
/// every later check is meaningless without rows.
pub fn validate(dataset: &Dataset) -> ValidationReport {
    let mut report = ValidationReport::default();

    if dataset.is_empty() {
        report.errors.push("Dataset is empty".to_string());
        return report.finish();
    }

    // Missing values
    let null_count: usize = (0..dataset.column_count())
        .map(|i| {
            dataset
                .column_values(i)
                .filter(|v| Dataset::is_null_value(v))
                .count()
        })
        .sum();
    if null_count > 0 {
        report
            .warnings
            .push(format!("Found {} missing value(s)", null_count));
    }

    // Duplicate rows
    let mut seen: HashSet<&[String]> = HashSet::new();
    let duplicates = dataset
        .rows
        .iter()
        .filter(|row| !seen.insert(row.as_slice()))
        .count();
    if duplicates > 0 {
        report
            .warnings
            .push(format!("Found {} duplicate row(s)", duplicates));
    }

    // Numeric column presence
    let numeric_columns = dataset.numeric_columns();
    if numeric_columns.is_empty() {
        report
            .warnings
            .push("No numeric columns found; chart generation may be affected".to_string());
    }

    // IQR outliers per numeric column
    for name in &numeric_columns {
        if let Ok(values) = dataset.numeric_values(name) {
            let outliers = iqr_outlier_count(&values);
            if outliers > 0 {
                report.warnings.push(format!(
                    "Column '{}': {} potential outlier(s)",
                    name, outliers
                ));
            }
        }
    }

    // Row count bounds
    let rows = dataset.row_count();
    if rows < 5 {
        report.warnings.push(format!(
            "Only {} row(s); insufficient for statistics",
            rows
        ));
    }
    if rows > 1000 {
        report
            .info
            .push(format!("{} rows; generation may be slow", rows));
    }

    // Zero variance
    for name in &numeric_columns {
        if let Ok(values) = dataset.numeric_values(name) {
            if values.len() >= 2 && sample_std(&values, mean(&values)) == 0.0 {
                report.errors.push(format!(
                    "Column '{}' has no variance (all values identical)",
                    name
                ));
            }
        }
    }

    report.finish()
}

/// Count values outside `[Q1 - 1.5*IQR, Q3 + 1.5*IQR]`.
fn iqr_outlier_count(values: &[f64]) -> usize {
    if values.len() < 4 {
        return 0;
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let q1 = percentile(&sorted, 25.0);
    let q3 = percentile(&sorted, 75.0);
    let iqr = q3 - q1;
    let lower = q1 - 1.5 * iqr;
    let upper = q3 + 1.5 * iqr;

    values.iter().filter(|&&v| v < lower || v > upper).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numeric_dataset(values: &[&str]) -> Dataset {
        Dataset::new(
            vec!["x".into()],
            values.iter().map(|v| vec![v.to_string()]).collect(),
        )
        .unwrap()
    }

    #[test]
    fn test_clean_data_is_valid() {
        let ds = numeric_dataset(&["1", "2", "3", "4", "5"]);
        let report = validate(&ds);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_zero_variance_is_error() {
        let ds = numeric_dataset(&["7", "7", "7", "7", "7"]);
        let report = validate(&ds);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| e.contains("no variance")));
    }

    #[test]
    fn test_missing_values_warn() {
        let ds = numeric_dataset(&["1", "NA", "3", "4", "5"]);
        let report = validate(&ds);
        assert!(report.valid);
        assert!(report.warnings.iter().any(|w| w.contains("missing")));
    }

    #[test]
    fn test_duplicate_rows_warn() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![
                vec!["1".into(), "x".into()],
                vec!["1".into(), "x".into()],
                vec!["2".into(), "y".into()],
                vec!["3".into(), "z".into()],
                vec!["4".into(), "w".into()],
            ],
        )
        .unwrap();
        let report = validate(&ds);
        assert!(report.warnings.iter().any(|w| w.contains("duplicate")));
    }

    #[test]
    fn test_small_dataset_warns() {
        let ds = numeric_dataset(&["1", "2"]);
        let report = validate(&ds);
        assert!(report
            .warnings
            .iter()
            .any(|w| w.contains("insufficient for statistics")));
    }

    #[test]
    fn test_outlier_detection() {
        let ds = numeric_dataset(&["1", "2", "3", "2", "1", "3", "2", "100"]);
        let report = validate(&ds);
        assert!(report.warnings.iter().any(|w| w.contains("outlier")));
    }

    #[test]
    fn test_iqr_outlier_count() {
        assert_eq!(iqr_outlier_count(&[1.0, 2.0, 3.0, 2.0, 1.0, 3.0, 2.0, 100.0]), 1);
        assert_eq!(iqr_outlier_count(&[1.0, 2.0, 3.0, 4.0]), 0);
    }
}
