//! PDF output via an optional backend, with graceful degradation.
//!
//! PDF support is compiled in behind the `pdf` cargo feature (genpdf). When
//! the feature is absent, or the backend cannot set itself up at runtime
//! (e.g. no font directory), generation degrades to emitting the HTML
//! artifact and reports that to the caller instead of failing.

use std::path::{Path, PathBuf};

use crate::error::{LabForgeError, Result};

/// Environment variable overriding the font directory for the PDF backend.
pub const FONT_DIR_ENV: &str = "LABFORGE_FONT_DIR";

/// Which backend the engine resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfBackend {
    #[cfg(feature = "pdf")]
    GenPdf,
    /// No usable backend; degrade to HTML.
    Unavailable,
}

/// Outcome of a PDF request.
#[derive(Debug, Clone)]
pub struct PdfOutcome {
    /// Path actually written (the `.html` sibling when degraded).
    pub path: PathBuf,
    /// True when no PDF backend was usable and HTML was emitted instead.
    pub degraded: bool,
}

/// Converts rendered HTML into PDF when a backend is available.
pub struct PdfEngine {
    backend: PdfBackend,
}

impl PdfEngine {
    /// Probe for a usable backend. Cheap, and never fails: probing failures
    /// classify as unavailable.
    pub fn detect() -> Self {
        Self {
            backend: detect_backend(),
        }
    }

    pub fn available(&self) -> bool {
        self.backend != PdfBackend::Unavailable
    }

    /// Convert HTML to PDF at `output`, or degrade to writing the HTML next
    /// to it. Runtime backend failures also degrade rather than propagate.
    pub fn render(&self, html: &str, title: &str, output: &Path) -> Result<PdfOutcome> {
        #[cfg(feature = "pdf")]
        if self.backend == PdfBackend::GenPdf {
            match genpdf_render(html, title, output) {
                Ok(()) => {
                    return Ok(PdfOutcome {
                        path: output.to_path_buf(),
                        degraded: false,
                    });
                }
                Err(_) => {
                    // Fall through to the HTML degradation path.
                }
            }
        }
        let _ = title;

        let html_path = output.with_extension("html");
        std::fs::write(&html_path, html).map_err(|e| LabForgeError::Io {
            path: html_path.clone(),
            source: e,
        })?;

        Ok(PdfOutcome {
            path: html_path,
            degraded: true,
        })
    }
}

#[cfg(feature = "pdf")]
fn detect_backend() -> PdfBackend {
    if font_dir().is_some() {
        PdfBackend::GenPdf
    } else {
        PdfBackend::Unavailable
    }
}

#[cfg(not(feature = "pdf"))]
fn detect_backend() -> PdfBackend {
    PdfBackend::Unavailable
}

#[cfg(feature = "pdf")]
fn font_dir() -> Option<PathBuf> {
    let dir = std::env::var(FONT_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("./fonts"));
    dir.is_dir().then_some(dir)
}

#[cfg(feature = "pdf")]
fn genpdf_render(html: &str, title: &str, output: &Path) -> Result<()> {
    let dir = font_dir()
        .ok_or_else(|| LabForgeError::Config("No font directory for PDF backend".to_string()))?;

    let family = genpdf::fonts::from_files(&dir, "LiberationSans", None)
        .map_err(|e| LabForgeError::Config(format!("Failed to load PDF fonts: {}", e)))?;

    let mut doc = genpdf::Document::new(family);
    doc.set_title(title);
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(12);
    doc.set_page_decorator(decorator);

    // genpdf has no HTML layout; reuse the markdown derivation as plain text.
    let text = super::markdown::from_html(html);
    for line in text.lines() {
        doc.push(genpdf::elements::Paragraph::new(line));
    }

    doc.render_to_file(output)
        .map_err(|e| LabForgeError::Render(format!("PDF rendering failed: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(not(feature = "pdf"))]
    #[test]
    fn test_degrades_to_html_without_backend() {
        let engine = PdfEngine::detect();
        assert!(!engine.available());

        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("report.pdf");
        let outcome = engine.render("<html><body>x</body></html>", "t", &target).unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.path.extension().unwrap(), "html");
        assert!(outcome.path.exists());
    }
}
