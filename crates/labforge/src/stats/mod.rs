//! Descriptive statistics over a loaded dataset.
//!
//! `summarize` is a pure function of the dataset: no I/O, and calling it
//! twice on the same in-memory data yields identical results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::input::{ColumnType, Dataset};

/// Row/column shape of a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    pub rows: usize,
    pub columns: usize,
}

/// Statistics for a numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    pub mean: f64,
    /// Sample standard deviation (n-1 denominator); 0.0 for fewer than two values.
    pub std: f64,
    /// Coefficient of variation, std/mean*100. Absent when the mean is exactly zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cv: Option<f64>,
    pub min: f64,
    pub max: f64,
    pub null_count: usize,
}

/// Statistics for a categorical column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalSummary {
    pub unique_count: usize,
    pub null_count: usize,
    /// Top-5 most frequent values with counts, ties broken by first appearance.
    pub top_values: Vec<(String, usize)>,
}

/// Per-column summary, tagged by the inferred type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ColumnSummary {
    Numeric {
        name: String,
        #[serde(flatten)]
        stats: NumericSummary,
    },
    Categorical {
        name: String,
        #[serde(flatten)]
        stats: CategoricalSummary,
    },
}

impl ColumnSummary {
    pub fn name(&self) -> &str {
        match self {
            ColumnSummary::Numeric { name, .. } => name,
            ColumnSummary::Categorical { name, .. } => name,
        }
    }
}

/// Full summary of a dataset, consumed by every downstream renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSummary {
    pub shape: Shape,
    /// One entry per column, in header order.
    pub columns: Vec<ColumnSummary>,
    /// Numeric statistics keyed by column name, in header order.
    pub statistics: IndexMap<String, NumericSummary>,
}

/// Compute descriptive statistics for every column of a dataset.
pub fn summarize(dataset: &Dataset) -> DataSummary {
    let mut columns = Vec::with_capacity(dataset.column_count());
    let mut statistics = IndexMap::new();

    for (index, name) in dataset.headers.iter().enumerate() {
        let null_count = dataset
            .column_values(index)
            .filter(|v| Dataset::is_null_value(v))
            .count();

        match dataset.column_types[index] {
            ColumnType::Numeric => {
                let values: Vec<f64> = dataset
                    .column_values(index)
                    .filter(|v| !Dataset::is_null_value(v))
                    .filter_map(|v| v.trim().parse::<f64>().ok())
                    .collect();

                let stats = numeric_summary(&values, null_count);
                statistics.insert(name.clone(), stats.clone());
                columns.push(ColumnSummary::Numeric {
                    name: name.clone(),
                    stats,
                });
            }
            ColumnType::Categorical => {
                let mut counts: IndexMap<&str, usize> = IndexMap::new();
                for v in dataset.column_values(index) {
                    if !Dataset::is_null_value(v) {
                        *counts.entry(v).or_insert(0) += 1;
                    }
                }

                let unique_count = counts.len();
                // Stable sort keeps first-encountered order among equal counts.
                let mut entries: Vec<(&str, usize)> = counts.into_iter().collect();
                entries.sort_by(|a, b| b.1.cmp(&a.1));
                let top_values = entries
                    .into_iter()
                    .take(5)
                    .map(|(v, c)| (v.to_string(), c))
                    .collect();

                columns.push(ColumnSummary::Categorical {
                    name: name.clone(),
                    stats: CategoricalSummary {
                        unique_count,
                        null_count,
                        top_values,
                    },
                });
            }
        }
    }

    DataSummary {
        shape: Shape {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
        },
        columns,
        statistics,
    }
}

fn numeric_summary(values: &[f64], null_count: usize) -> NumericSummary {
    if values.is_empty() {
        return NumericSummary {
            mean: 0.0,
            std: 0.0,
            cv: None,
            min: 0.0,
            max: 0.0,
            null_count,
        };
    }

    let mean = mean(values);
    let std = sample_std(values, mean);
    let cv = if mean == 0.0 {
        None
    } else {
        Some(std / mean * 100.0)
    };

    let min = values.iter().cloned().fold(f64::INFINITY, f64::min);
    let max = values.iter().cloned().fold(f64::NEG_INFINITY, f64::max);

    NumericSummary {
        mean,
        std,
        cv,
        min,
        max,
        null_count,
    }
}

/// Arithmetic mean.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n-1 denominator).
pub fn sample_std(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (sum_sq / (values.len() - 1) as f64).sqrt()
}

/// Percentile via linear interpolation over sorted values.
pub fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 0 {
        return 0.0;
    }
    if n == 1 {
        return sorted[0];
    }

    let index = (p / 100.0) * (n - 1) as f64;
    let lower = index.floor() as usize;
    let upper = index.ceil() as usize;

    if lower == upper {
        sorted[lower]
    } else {
        let frac = index.fract();
        sorted[lower] + (sorted[upper] - sorted[lower]) * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Dataset;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["voltage".into(), "phase".into()],
            vec![
                vec!["1".into(), "a".into()],
                vec!["2".into(), "b".into()],
                vec!["3".into(), "a".into()],
                vec!["4".into(), "c".into()],
                vec!["5".into(), "a".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_cv_matches_definition() {
        let summary = summarize(&dataset());
        let stats = &summary.statistics["voltage"];
        assert!((stats.mean - 3.0).abs() < 1e-12);
        let expected_cv = stats.std / stats.mean * 100.0;
        assert!((stats.cv.unwrap() - expected_cv).abs() < 1e-12);
    }

    #[test]
    fn test_cv_absent_for_zero_mean() {
        let ds = Dataset::new(
            vec!["x".into()],
            vec![vec!["-1".into()], vec!["0".into()], vec!["1".into()]],
        )
        .unwrap();
        let summary = summarize(&ds);
        assert!(summary.statistics["x"].cv.is_none());
    }

    #[test]
    fn test_summarize_idempotent() {
        let ds = dataset();
        assert_eq!(summarize(&ds), summarize(&ds));
    }

    #[test]
    fn test_categorical_top_values_tie_order() {
        let summary = summarize(&dataset());
        match &summary.columns[1] {
            ColumnSummary::Categorical { stats, .. } => {
                assert_eq!(stats.unique_count, 3);
                assert_eq!(stats.top_values[0], ("a".to_string(), 3));
                // b and c both appear once; b was seen first.
                assert_eq!(stats.top_values[1], ("b".to_string(), 1));
                assert_eq!(stats.top_values[2], ("c".to_string(), 1));
            }
            other => panic!("expected categorical summary, got {:?}", other),
        }
    }

    #[test]
    fn test_sample_std() {
        // 1..5: sample variance 2.5, std ~1.5811
        let values = [1.0, 2.0, 3.0, 4.0, 5.0];
        let std = sample_std(&values, mean(&values));
        assert!((std - 2.5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_percentile_interpolation() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&sorted, 25.0) - 2.0).abs() < 1e-12);
        assert!((percentile(&sorted, 50.0) - 3.0).abs() < 1e-12);
        assert!((percentile(&sorted, 75.0) - 4.0).abs() < 1e-12);
    }
}
