//! In-memory tabular representation of loaded experiment data.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LabForgeError, Result};

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnType {
    /// Every non-null value parses as a number.
    Numeric,
    /// Anything else.
    Categorical,
}

impl ColumnType {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Numeric)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ColumnType::Numeric => "numeric",
            ColumnType::Categorical => "categorical",
        }
    }
}

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// Detected format (csv, xlsx, json).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was loaded.
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    pub fn new(path: PathBuf, format: impl Into<String>, row_count: usize, column_count: usize) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            format: format.into(),
            row_count,
            column_count,
            loaded_at: Utc::now(),
        }
    }
}

/// Parsed tabular data with per-column type metadata.
///
/// Invariants: every row has exactly `headers.len()` cells, and header names
/// are unique. Raw cell values are never mutated after construction; derived
/// summaries live alongside the dataset, not inside it.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column headers, in file order.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// Inferred type per column, parallel to `headers`.
    pub column_types: Vec<ColumnType>,
}

impl Dataset {
    /// Build a dataset from headers and rows, inferring column types.
    ///
    /// Rows shorter than the header are padded with empty cells; longer rows
    /// are truncated. Duplicate header names are rejected.
    pub fn new(headers: Vec<String>, mut rows: Vec<Vec<String>>) -> Result<Self> {
        if headers.is_empty() {
            return Err(LabForgeError::EmptyData("No columns found".to_string()));
        }

        for (i, name) in headers.iter().enumerate() {
            if headers[..i].iter().any(|h| h == name) {
                return Err(LabForgeError::Config(format!(
                    "Duplicate column name: '{}'",
                    name
                )));
            }
        }

        let expected = headers.len();
        for row in &mut rows {
            while row.len() < expected {
                row.push(String::new());
            }
            row.truncate(expected);
        }

        let column_types = (0..expected)
            .map(|i| infer_column_type(rows.iter().map(|r| r[i].as_str())))
            .collect();

        Ok(Self {
            headers,
            rows,
            column_types,
        })
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Inferred type of a column by name.
    pub fn column_type(&self, name: &str) -> Option<ColumnType> {
        self.column_index(name).map(|i| self.column_types[i])
    }

    /// All values of a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Names of all numeric columns, in header order.
    pub fn numeric_columns(&self) -> Vec<&str> {
        self.headers
            .iter()
            .zip(&self.column_types)
            .filter(|(_, t)| t.is_numeric())
            .map(|(h, _)| h.as_str())
            .collect()
    }

    /// Parsed non-null values of a numeric column.
    ///
    /// Fails when the column does not exist. Null-like cells are skipped;
    /// cells that fail to parse in a column inferred as numeric cannot occur
    /// by construction.
    pub fn numeric_values(&self, name: &str) -> Result<Vec<f64>> {
        let index = self
            .column_index(name)
            .ok_or_else(|| LabForgeError::ColumnNotFound(name.to_string()))?;

        Ok(self
            .column_values(index)
            .filter(|v| !Self::is_null_value(v))
            .filter_map(|v| v.trim().parse::<f64>().ok())
            .collect())
    }

    /// Check if a value represents a missing/null cell.
    pub fn is_null_value(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}

/// Infer a column type from its cell values.
///
/// Numeric when at least one non-null value exists and every non-null value
/// parses as f64. Deterministic and stable across re-loads of identical data.
fn infer_column_type<'a>(values: impl Iterator<Item = &'a str>) -> ColumnType {
    let mut saw_value = false;
    for v in values {
        if Dataset::is_null_value(v) {
            continue;
        }
        saw_value = true;
        if v.trim().parse::<f64>().is_err() {
            return ColumnType::Categorical;
        }
    }
    if saw_value {
        ColumnType::Numeric
    } else {
        ColumnType::Categorical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["voltage".into(), "label".into()],
            vec![
                vec!["1.0".into(), "a".into()],
                vec!["2.0".into(), "b".into()],
                vec!["3.0".into(), "a".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_type_inference() {
        let ds = dataset();
        assert_eq!(ds.column_type("voltage"), Some(ColumnType::Numeric));
        assert_eq!(ds.column_type("label"), Some(ColumnType::Categorical));
    }

    #[test]
    fn test_numeric_values_skips_nulls() {
        let ds = Dataset::new(
            vec!["x".into()],
            vec![vec!["1".into()], vec!["NA".into()], vec!["3".into()]],
        )
        .unwrap();
        assert_eq!(ds.column_type("x"), Some(ColumnType::Numeric));
        assert_eq!(ds.numeric_values("x").unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_duplicate_headers_rejected() {
        let result = Dataset::new(
            vec!["x".into(), "x".into()],
            vec![vec!["1".into(), "2".into()]],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_row_padding() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec!["1".into()], vec!["2".into(), "3".into(), "4".into()]],
        )
        .unwrap();
        assert_eq!(ds.rows[0], vec!["1".to_string(), String::new()]);
        assert_eq!(ds.rows[1], vec!["2".to_string(), "3".to_string()]);
    }

    #[test]
    fn test_is_null_value() {
        assert!(Dataset::is_null_value(""));
        assert!(Dataset::is_null_value("NA"));
        assert!(Dataset::is_null_value("n/a"));
        assert!(Dataset::is_null_value("NULL"));
        assert!(Dataset::is_null_value("."));
        assert!(!Dataset::is_null_value("0"));
        assert!(!Dataset::is_null_value("value"));
    }
}
