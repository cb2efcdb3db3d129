//! Error types for the LabForge library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for LabForge operations.
#[derive(Debug, Error)]
pub enum LabForgeError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading an Excel workbook.
    #[error("Excel error for '{path}': {message}")]
    Excel { path: PathBuf, message: String },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// File format not supported by the loader.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Empty file or no data to work with.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A referenced column does not exist in the dataset.
    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    /// A chart type demanded numeric data from a non-numeric column.
    #[error("Column '{column}' is not numeric (required for {chart_type} charts)")]
    NonNumericColumn { column: String, chart_type: String },

    /// Chart rendering failure.
    #[error("Chart error: {0}")]
    Chart(String),

    /// Document assembly or rendering failure.
    #[error("Render error: {0}")]
    Render(String),

    /// Pre-flight validation blocked generation (strict mode).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for LabForge operations.
pub type Result<T> = std::result::Result<T, LabForgeError>;
