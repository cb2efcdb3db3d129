//! Chart binding: column validation, rendering, and section association.

mod render;

use std::path::{Path, PathBuf};

use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{LabForgeError, Result};
use crate::input::Dataset;
use render::Series;

/// Supported chart types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartType {
    Line,
    Scatter,
    Bar,
    Histogram,
}

impl ChartType {
    pub fn label(&self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Scatter => "scatter",
            ChartType::Bar => "bar",
            ChartType::Histogram => "histogram",
        }
    }
}

impl std::str::FromStr for ChartType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "line" => Ok(ChartType::Line),
            "scatter" => Ok(ChartType::Scatter),
            "bar" => Ok(ChartType::Bar),
            "histogram" | "hist" => Ok(ChartType::Histogram),
            _ => Err(format!(
                "Unknown chart type: {}. Use line, scatter, bar, or histogram.",
                s
            )),
        }
    }
}

impl std::fmt::Display for ChartType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Style parameters supplied by the caller.
#[derive(Debug, Clone)]
pub struct ChartStyle {
    /// Chart title. Defaults to `"{y} vs {x}"` when empty.
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub width: u32,
    pub height: u32,
    pub grid: bool,
    pub legend: bool,
    /// Also write the PNG to this path.
    pub save_path: Option<PathBuf>,
}

impl Default for ChartStyle {
    fn default() -> Self {
        Self {
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            width: 800,
            height: 600,
            grid: true,
            legend: true,
            save_path: None,
        }
    }
}

/// A rendered chart bound to one report section.
#[derive(Debug, Clone)]
pub struct ChartArtifact {
    /// Name of the report section this chart belongs to.
    pub section: String,
    pub x_column: String,
    pub y_columns: Vec<String>,
    pub chart_type: ChartType,
    pub title: String,
    /// Encoded PNG bytes.
    pub png: Vec<u8>,
    /// `data:image/png;base64,...` URI for inline embedding.
    pub data_uri: String,
    /// Where the PNG was also written, if requested.
    pub saved_path: Option<PathBuf>,
}

/// Validates column references and renders chart artifacts from a dataset.
pub struct ChartBinder<'a> {
    dataset: &'a Dataset,
}

impl<'a> ChartBinder<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        Self { dataset }
    }

    /// Bind a chart to a section.
    ///
    /// Line/scatter/bar overlay every y column against x with a legend.
    /// Histograms draw the single y series; x only contributes to the
    /// default title.
    pub fn bind(
        &self,
        section: impl Into<String>,
        x_column: &str,
        y_columns: &[&str],
        chart_type: ChartType,
        style: &ChartStyle,
    ) -> Result<ChartArtifact> {
        if y_columns.is_empty() {
            return Err(LabForgeError::Chart("No y columns given".to_string()));
        }
        if chart_type == ChartType::Histogram && y_columns.len() > 1 {
            return Err(LabForgeError::Chart(
                "Histogram charts accept exactly one y column".to_string(),
            ));
        }

        self.check_column(x_column, chart_type != ChartType::Histogram, chart_type)?;
        for y in y_columns {
            self.check_column(y, true, chart_type)?;
        }

        let series = self.collect_series(x_column, y_columns, chart_type)?;

        let title = if style.title.is_empty() {
            format!("{} vs {}", y_columns[0], x_column)
        } else {
            style.title.clone()
        };
        let x_label = if style.x_label.is_empty() {
            x_column.to_string()
        } else {
            style.x_label.clone()
        };
        let y_label = if style.y_label.is_empty() {
            if chart_type == ChartType::Histogram {
                "Count".to_string()
            } else {
                y_columns.join(", ")
            }
        } else {
            style.y_label.clone()
        };

        let png = render::render_png(chart_type, &series, &title, &x_label, &y_label, style)?;

        let data_uri = format!(
            "data:image/png;base64,{}",
            base64::engine::general_purpose::STANDARD.encode(&png)
        );

        let saved_path = match &style.save_path {
            Some(path) => {
                write_png(path, &png)?;
                Some(path.clone())
            }
            None => None,
        };

        Ok(ChartArtifact {
            section: section.into(),
            x_column: x_column.to_string(),
            y_columns: y_columns.iter().map(|s| s.to_string()).collect(),
            chart_type,
            title,
            png,
            data_uri,
            saved_path,
        })
    }

    /// Existence check, plus a numeric check when the chart type demands it.
    fn check_column(&self, name: &str, must_be_numeric: bool, chart_type: ChartType) -> Result<()> {
        let column_type = self
            .dataset
            .column_type(name)
            .ok_or_else(|| LabForgeError::ColumnNotFound(name.to_string()))?;

        if must_be_numeric && !column_type.is_numeric() {
            return Err(LabForgeError::NonNumericColumn {
                column: name.to_string(),
                chart_type: chart_type.label().to_string(),
            });
        }
        Ok(())
    }

    /// Build one series per y column, pairing row-wise and skipping rows with
    /// null or unparseable cells in either axis.
    fn collect_series(
        &self,
        x_column: &str,
        y_columns: &[&str],
        chart_type: ChartType,
    ) -> Result<Vec<Series>> {
        let x_index = self
            .dataset
            .column_index(x_column)
            .ok_or_else(|| LabForgeError::ColumnNotFound(x_column.to_string()))?;

        let mut series = Vec::with_capacity(y_columns.len());
        for y in y_columns {
            let y_index = self
                .dataset
                .column_index(y)
                .ok_or_else(|| LabForgeError::ColumnNotFound(y.to_string()))?;

            let mut points = Vec::new();
            for (row_idx, row) in self.dataset.rows.iter().enumerate() {
                let y_val = parse_cell(&row[y_index]);
                let x_val = if chart_type == ChartType::Histogram {
                    // Histogram ignores x; use the row index so points stay uniform.
                    Some(row_idx as f64)
                } else {
                    parse_cell(&row[x_index])
                };
                if let (Some(x), Some(y)) = (x_val, y_val) {
                    points.push((x, y));
                }
            }

            series.push(Series {
                name: y.to_string(),
                points,
            });
        }

        Ok(series)
    }
}

fn parse_cell(value: &str) -> Option<f64> {
    if Dataset::is_null_value(value) {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

fn write_png(path: &Path, png: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| LabForgeError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }
    std::fs::write(path, png).map_err(|e| LabForgeError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dataset() -> Dataset {
        Dataset::new(
            vec!["voltage".into(), "current".into(), "phase".into()],
            vec![
                vec!["1".into(), "0.5".into(), "a".into()],
                vec!["2".into(), "1.0".into(), "b".into()],
                vec!["3".into(), "1.5".into(), "a".into()],
                vec!["4".into(), "2.0".into(), "b".into()],
                vec!["5".into(), "2.5".into(), "a".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_bind_scatter_succeeds() {
        let ds = dataset();
        let artifact = ChartBinder::new(&ds)
            .bind(
                "data_processing",
                "voltage",
                &["current"],
                ChartType::Scatter,
                &ChartStyle::default(),
            )
            .unwrap();

        assert!(!artifact.png.is_empty());
        assert!(artifact.data_uri.starts_with("data:image/png;base64,"));
        assert_eq!(artifact.title, "current vs voltage");
        assert_eq!(artifact.section, "data_processing");
    }

    #[test]
    fn test_categorical_y_rejected() {
        let ds = dataset();
        let err = ChartBinder::new(&ds)
            .bind(
                "data_processing",
                "voltage",
                &["phase"],
                ChartType::Scatter,
                &ChartStyle::default(),
            )
            .unwrap_err();
        assert!(matches!(err, LabForgeError::NonNumericColumn { .. }));
    }

    #[test]
    fn test_unknown_column_rejected() {
        let ds = dataset();
        let err = ChartBinder::new(&ds)
            .bind(
                "data_processing",
                "missing",
                &["current"],
                ChartType::Line,
                &ChartStyle::default(),
            )
            .unwrap_err();
        assert!(matches!(err, LabForgeError::ColumnNotFound(_)));
    }

    #[test]
    fn test_histogram_rejects_multiple_series() {
        let ds = dataset();
        let err = ChartBinder::new(&ds)
            .bind(
                "data_processing",
                "voltage",
                &["current", "voltage"],
                ChartType::Histogram,
                &ChartStyle::default(),
            )
            .unwrap_err();
        assert!(matches!(err, LabForgeError::Chart(_)));
    }

    #[test]
    fn test_histogram_allows_categorical_x() {
        let ds = dataset();
        let artifact = ChartBinder::new(&ds)
            .bind(
                "data_processing",
                "phase",
                &["current"],
                ChartType::Histogram,
                &ChartStyle::default(),
            )
            .unwrap();
        assert!(!artifact.png.is_empty());
    }

    #[test]
    fn test_chart_type_from_str() {
        assert_eq!("scatter".parse::<ChartType>().unwrap(), ChartType::Scatter);
        assert_eq!("hist".parse::<ChartType>().unwrap(), ChartType::Histogram);
        assert!("pie".parse::<ChartType>().is_err());
    }
}
