//! File loading with per-extension dispatch and CSV delimiter detection.

use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use serde_json::Value;

use super::table::{Dataset, SourceMetadata};
use crate::error::{LabForgeError, Result};

/// Delimiters to try when auto-detecting.
const DELIMITERS: &[u8] = &[b'\t', b',', b';', b'|'];

/// Loader configuration.
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// CSV delimiter to use (None = auto-detect).
    pub delimiter: Option<u8>,
    /// Whether CSV files have a header row.
    pub has_header: bool,
    /// Maximum rows to read (None = all).
    pub max_rows: Option<usize>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            delimiter: None,
            has_header: true,
            max_rows: None,
        }
    }
}

/// Loads tabular data files into a [`Dataset`].
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    /// Create a loader with default configuration.
    pub fn new() -> Self {
        Self {
            config: LoaderConfig::default(),
        }
    }

    /// Create a loader with custom configuration.
    pub fn with_config(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a file, dispatching on its extension (`.csv`, `.xlsx`, `.json`).
    ///
    /// The same logical data loaded from any supported format produces an
    /// equivalent dataset: identical headers, cell values, and column types.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        let (dataset, format) = match ext.as_str() {
            "csv" | "tsv" => (self.load_delimited(path)?, "csv"),
            "xlsx" => (self.load_excel(path)?, "xlsx"),
            "json" => (self.load_json(path)?, "json"),
            other => {
                return Err(LabForgeError::UnsupportedFormat(format!(
                    "'{}' (expected csv, xlsx, or json) for '{}'",
                    other,
                    path.display()
                )));
            }
        };

        let metadata = SourceMetadata::new(
            path.to_path_buf(),
            format,
            dataset.row_count(),
            dataset.column_count(),
        );

        Ok((dataset, metadata))
    }

    /// Load a CSV/TSV file, auto-detecting the delimiter when unset.
    fn load_delimited(&self, path: &Path) -> Result<Dataset> {
        let mut file = File::open(path).map_err(|e| LabForgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents).map_err(|e| LabForgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let delimiter = match self.config.delimiter {
            Some(d) => d,
            None => detect_delimiter(&contents)?,
        };

        self.parse_bytes(&contents, delimiter)
    }

    /// Parse delimited bytes directly.
    pub(crate) fn parse_bytes(&self, bytes: &[u8], delimiter: u8) -> Result<Dataset> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .flexible(true)
            .from_reader(bytes);

        let headers: Vec<String> = if self.config.has_header {
            reader.headers()?.iter().map(|s| s.to_string()).collect()
        } else {
            match reader.records().next() {
                Some(Ok(record)) => (0..record.len())
                    .map(|i| format!("column_{}", i + 1))
                    .collect(),
                Some(Err(e)) => return Err(e.into()),
                None => return Err(LabForgeError::EmptyData("No data rows found".to_string())),
            }
        };

        if headers.is_empty() {
            return Err(LabForgeError::EmptyData("No columns found".to_string()));
        }

        // Re-create the reader; header probing may have consumed records.
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(self.config.has_header)
            .flexible(true)
            .from_reader(bytes);

        let mut rows = Vec::new();
        for (row_idx, result) in reader.records().enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            let record = result?;
            rows.push(record.iter().map(|s| s.to_string()).collect());
        }

        if rows.is_empty() {
            return Err(LabForgeError::EmptyData("No data rows found".to_string()));
        }

        Dataset::new(headers, rows)
    }

    /// Load the first worksheet of an xlsx workbook.
    fn load_excel(&self, path: &Path) -> Result<Dataset> {
        let mut workbook = open_workbook_auto(path).map_err(|e| LabForgeError::Excel {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let range = workbook
            .worksheet_range_at(0)
            .ok_or_else(|| LabForgeError::EmptyData("Workbook has no sheets".to_string()))?
            .map_err(|e| LabForgeError::Excel {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        let mut rows_iter = range.rows();
        let headers: Vec<String> = match rows_iter.next() {
            Some(header_row) => header_row.iter().map(cell_to_string).collect(),
            None => return Err(LabForgeError::EmptyData("No data rows found".to_string())),
        };

        let mut rows = Vec::new();
        for (row_idx, row) in rows_iter.enumerate() {
            if let Some(max) = self.config.max_rows {
                if row_idx >= max {
                    break;
                }
            }
            rows.push(row.iter().map(cell_to_string).collect());
        }

        if rows.is_empty() {
            return Err(LabForgeError::EmptyData("No data rows found".to_string()));
        }

        Dataset::new(headers, rows)
    }

    /// Load a JSON array of record objects.
    ///
    /// Column order follows first appearance across records; missing keys
    /// become null cells.
    fn load_json(&self, path: &Path) -> Result<Dataset> {
        let file = File::open(path).map_err(|e| LabForgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let records: Vec<serde_json::Map<String, Value>> =
            serde_json::from_reader(BufReader::new(file))?;

        if records.is_empty() {
            return Err(LabForgeError::EmptyData("No data rows found".to_string()));
        }

        let mut headers: Vec<String> = Vec::new();
        for record in &records {
            for key in record.keys() {
                if !headers.iter().any(|h| h == key) {
                    headers.push(key.clone());
                }
            }
        }

        let limit = self.config.max_rows.unwrap_or(usize::MAX);
        let rows: Vec<Vec<String>> = records
            .iter()
            .take(limit)
            .map(|record| {
                headers
                    .iter()
                    .map(|h| record.get(h).map(json_to_string).unwrap_or_default())
                    .collect()
            })
            .collect();

        Dataset::new(headers, rows)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Render an Excel cell as the string the CSV path would have produced.
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => format!("{}", f),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => format!("{}", dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{:?}", e),
    }
}

/// Render a JSON value as the string the CSV path would have produced.
fn json_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Detect the delimiter by analyzing the first few lines.
fn detect_delimiter(bytes: &[u8]) -> Result<u8> {
    let reader = BufReader::new(bytes);
    let lines: Vec<String> = reader
        .lines()
        .take(10)
        .filter_map(|l| l.ok())
        .filter(|l| !l.trim().is_empty())
        .collect();

    if lines.is_empty() {
        return Err(LabForgeError::EmptyData("No lines to analyze".to_string()));
    }

    let mut best_delimiter = b',';
    let mut best_score = 0;

    for &delim in DELIMITERS {
        let counts: Vec<usize> = lines
            .iter()
            .map(|line| count_delimiter_in_line(line, delim))
            .collect();

        let first_count = counts[0];
        if first_count == 0 {
            continue;
        }

        let consistent = counts.iter().all(|&c| c == first_count);
        let variance: f64 = if counts.len() > 1 {
            let mean = counts.iter().sum::<usize>() as f64 / counts.len() as f64;
            counts.iter().map(|&c| (c as f64 - mean).powi(2)).sum::<f64>() / counts.len() as f64
        } else {
            0.0
        };

        // Tab gets a slight bonus as it is rare inside actual values.
        let score = if consistent {
            first_count * 1000 + (if delim == b'\t' { 100 } else { 0 })
        } else if variance < 1.0 {
            first_count * 100
        } else {
            first_count
        };

        if score > best_score {
            best_score = score;
            best_delimiter = delim;
        }
    }

    Ok(best_delimiter)
}

/// Count delimiter occurrences in a line, respecting quotes.
fn count_delimiter_in_line(line: &str, delimiter: u8) -> usize {
    let delim_char = delimiter as char;
    let mut count = 0;
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            c if c == delim_char && !in_quotes => count += 1,
            _ => {}
        }
    }

    count
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::input::ColumnType;

    #[test]
    fn test_detect_delimiter_csv() {
        let data = b"a,b,c\n1,2,3\n4,5,6";
        assert_eq!(detect_delimiter(data).unwrap(), b',');
    }

    #[test]
    fn test_detect_delimiter_tsv() {
        let data = b"a\tb\tc\n1\t2\t3\n4\t5\t6";
        assert_eq!(detect_delimiter(data).unwrap(), b'\t');
    }

    #[test]
    fn test_parse_csv() {
        let loader = Loader::new();
        let data = b"name,age\nAlice,30\nBob,25";
        let table = loader.parse_bytes(data, b',').unwrap();

        assert_eq!(table.headers, vec!["name", "age"]);
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_type("age"), Some(ColumnType::Numeric));
        assert_eq!(table.column_type("name"), Some(ColumnType::Categorical));
    }

    #[test]
    fn test_unsupported_extension() {
        let loader = Loader::new();
        let err = loader.load("data.parquet").unwrap_err();
        assert!(matches!(err, LabForgeError::UnsupportedFormat(_)));
    }

    #[test]
    fn test_missing_file() {
        let loader = Loader::new();
        let err = loader.load("does_not_exist.csv").unwrap_err();
        assert!(matches!(err, LabForgeError::Io { .. }));
    }

    #[test]
    fn test_load_json_records() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"voltage": 1.0, "current": 0.5}}, {{"voltage": 2.0, "current": 1.0}}]"#
        )
        .unwrap();

        let loader = Loader::new();
        let (ds, meta) = loader.load(file.path()).unwrap();

        assert_eq!(ds.headers, vec!["voltage", "current"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(meta.format, "json");
        assert_eq!(ds.column_type("voltage"), Some(ColumnType::Numeric));
    }

    #[test]
    fn test_json_missing_keys_become_nulls() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(file, r#"[{{"a": 1}}, {{"a": 2, "b": "x"}}]"#).unwrap();

        let loader = Loader::new();
        let (ds, _) = loader.load(file.path()).unwrap();

        assert_eq!(ds.headers, vec!["a", "b"]);
        assert_eq!(ds.rows[0], vec!["1".to_string(), String::new()]);
    }
}
