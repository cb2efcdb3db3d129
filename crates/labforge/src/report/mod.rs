//! Multi-format report rendering.
//!
//! Three sibling renderers (HTML, Word, Markdown) consume the same resolved
//! section list and preserve section order and titles; PDF is produced by
//! converting the HTML output when a backend is available.

pub mod html;
pub mod markdown;
pub mod pdf;
mod resolver;
pub mod word;

use chrono::Local;
use serde::{Deserialize, Serialize};

pub use pdf::{PdfEngine, PdfOutcome};
pub use resolver::{resolve, ContentSource, ResolvedSection, SectionBody, StatsTable};

/// Requested output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Docx,
    Markdown,
    Pdf,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Docx => "docx",
            OutputFormat::Markdown => "md",
            OutputFormat::Pdf => "pdf",
        }
    }

    /// The formats selected by "all": the three sibling renderers. PDF is
    /// requested explicitly since it depends on an optional backend.
    pub fn all() -> Vec<OutputFormat> {
        vec![
            OutputFormat::Html,
            OutputFormat::Docx,
            OutputFormat::Markdown,
        ]
    }

    /// Parse a comma-separated format list; empty or "all" selects [`all`].
    ///
    /// [`all`]: OutputFormat::all
    pub fn parse_list(spec: &str) -> std::result::Result<Vec<OutputFormat>, String> {
        let spec = spec.trim();
        if spec.is_empty() || spec.eq_ignore_ascii_case("all") {
            return Ok(Self::all());
        }
        spec.split(',').map(|part| part.trim().parse()).collect()
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(OutputFormat::Html),
            "docx" | "word" => Ok(OutputFormat::Docx),
            "md" | "markdown" => Ok(OutputFormat::Markdown),
            "pdf" => Ok(OutputFormat::Pdf),
            _ => Err(format!(
                "Unknown format: {}. Use html, docx, markdown, or pdf.",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Document metadata shared by every renderer.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub title: String,
    pub author: String,
    pub group: String,
    /// Report date, `YYYY-MM-DD`.
    pub date: String,
    pub template_display_name: String,
    /// Generation timestamp rendered in the footer.
    pub generated_at: String,
}

impl ReportMeta {
    /// Build metadata stamped with the current local time.
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        group: impl Into<String>,
        template_display_name: impl Into<String>,
    ) -> Self {
        let now = Local::now();
        Self {
            title: title.into(),
            author: author.into(),
            group: group.into(),
            date: now.format("%Y-%m-%d").to_string(),
            template_display_name: template_display_name.into(),
            generated_at: now.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("word".parse::<OutputFormat>().unwrap(), OutputFormat::Docx);
        assert_eq!(
            "markdown".parse::<OutputFormat>().unwrap(),
            OutputFormat::Markdown
        );
        assert!("odt".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_extensions() {
        assert_eq!(OutputFormat::Docx.extension(), "docx");
        assert_eq!(OutputFormat::Markdown.extension(), "md");
    }
}
