//! Single-report pipeline: load, validate, summarize, chart, resolve, render.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use crate::chart::{ChartArtifact, ChartBinder, ChartStyle, ChartType};
use crate::error::{LabForgeError, Result};
use crate::input::{Dataset, Loader, LoaderConfig};
use crate::llm::{AiConfig, AnalysisResult, LabAnalyzer};
use crate::report::{html, markdown, word, OutputFormat, PdfEngine, ReportMeta};
use crate::stats::summarize;
use crate::template::TemplateRegistry;
use crate::validate::{validate, ValidationReport};

/// One requested chart.
#[derive(Debug, Clone)]
pub struct ChartRequest {
    pub x_column: String,
    pub y_columns: Vec<String>,
    pub chart_type: ChartType,
    pub style: ChartStyle,
    /// Section to bind to; the template's data section when unset.
    pub section: Option<String>,
}

/// Pipeline configuration. The core accepts these; it hardcodes none of them.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Requested template key. Unknown keys fall back to the default
    /// template; the resolved name is reported in [`GenerationReport`].
    pub template: String,
    pub author: String,
    pub group: String,
    pub formats: Vec<OutputFormat>,
    pub output_dir: PathBuf,
    /// Refuse to generate when validation reports errors.
    pub strict: bool,
    /// AI analysis configuration; None disables AI content entirely.
    pub ai: Option<AiConfig>,
    pub charts: Vec<ChartRequest>,
    /// When no chart is requested, bind a scatter of the first two numeric
    /// columns to the data section.
    pub auto_chart: bool,
    pub loader: LoaderConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            template: crate::template::DEFAULT_TEMPLATE.to_string(),
            author: String::new(),
            group: String::new(),
            formats: vec![OutputFormat::Html],
            output_dir: PathBuf::from("output"),
            strict: false,
            ai: None,
            charts: Vec::new(),
            auto_chart: true,
            loader: LoaderConfig::default(),
        }
    }
}

/// A produced output document.
#[derive(Debug, Clone)]
pub struct DocumentArtifact {
    pub format: OutputFormat,
    /// Path actually written; for a degraded PDF this is the HTML sibling.
    pub path: PathBuf,
    /// True when the requested backend was unavailable and a downgrade was
    /// emitted instead.
    pub degraded: bool,
}

/// Everything a generation run produced.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    /// Name of the template actually used. Differs from the requested key
    /// when the registry fell back to the default.
    pub template: String,
    pub validation: ValidationReport,
    pub artifacts: Vec<DocumentArtifact>,
    pub analysis: Option<AnalysisResult>,
}

/// The report generation engine.
pub struct ReportPipeline {
    registry: TemplateRegistry,
    config: PipelineConfig,
    analyzer: Option<LabAnalyzer>,
    loader: Loader,
}

impl ReportPipeline {
    /// Build a pipeline. When AI is configured, the provider's availability
    /// probe runs once here and is cached for the pipeline's lifetime.
    pub fn new(config: PipelineConfig) -> Self {
        let analyzer = config.ai.clone().map(LabAnalyzer::new);
        let loader = Loader::with_config(config.loader.clone());
        Self {
            registry: TemplateRegistry::new(),
            config,
            analyzer,
            loader,
        }
    }

    /// Replace the analyzer (used by tests to inject a mock provider).
    pub fn with_analyzer(mut self, analyzer: LabAnalyzer) -> Self {
        self.analyzer = Some(analyzer);
        self
    }

    pub fn registry(&self) -> &TemplateRegistry {
        &self.registry
    }

    /// Generate all requested artifacts for one data file.
    pub fn generate(
        &self,
        data_path: impl AsRef<Path>,
        title: &str,
        caller_content: &IndexMap<String, String>,
    ) -> Result<GenerationReport> {
        let (dataset, _source) = self.loader.load(data_path)?;

        let validation = validate(&dataset);
        if self.config.strict && !validation.valid {
            return Err(LabForgeError::Validation(validation.errors.join("; ")));
        }

        let summary = summarize(&dataset);
        let template = self.registry.get(&self.config.template);

        let charts = self.bind_charts(&dataset, &template.data_section)?;

        let (analysis, ai_content) = match &self.analyzer {
            Some(analyzer) => {
                let analysis = analyzer.analyze_phenomenon(&dataset, title);
                let content = analysis.section_content();
                (Some(analysis), content)
            }
            None => (None, IndexMap::new()),
        };

        let sections = crate::report::resolve(
            template,
            Some(&summary),
            &charts,
            caller_content,
            &ai_content,
            self.analyzer.is_some(),
        )?;

        let meta = ReportMeta::new(
            title,
            self.config.author.clone(),
            self.config.group.clone(),
            template.display_name.clone(),
        );

        std::fs::create_dir_all(&self.config.output_dir).map_err(|e| LabForgeError::Io {
            path: self.config.output_dir.clone(),
            source: e,
        })?;

        let stem = sanitize_file_stem(title);
        let mut artifacts = Vec::new();
        // HTML is rendered once and shared by the Markdown and PDF paths.
        let html_doc = html::render(&meta, &sections);

        for format in &self.config.formats {
            let path = self
                .config
                .output_dir
                .join(format!("{}.{}", stem, format.extension()));

            let artifact = match format {
                OutputFormat::Html => {
                    write_text(&path, &html_doc)?;
                    DocumentArtifact {
                        format: *format,
                        path,
                        degraded: false,
                    }
                }
                OutputFormat::Markdown => {
                    write_text(&path, &markdown::from_html(&html_doc))?;
                    DocumentArtifact {
                        format: *format,
                        path,
                        degraded: false,
                    }
                }
                OutputFormat::Docx => {
                    word::render_to_file(&meta, &sections, &path)?;
                    DocumentArtifact {
                        format: *format,
                        path,
                        degraded: false,
                    }
                }
                OutputFormat::Pdf => {
                    let outcome = PdfEngine::detect().render(&html_doc, title, &path)?;
                    DocumentArtifact {
                        format: *format,
                        path: outcome.path,
                        degraded: outcome.degraded,
                    }
                }
            };
            artifacts.push(artifact);
        }

        Ok(GenerationReport {
            template: template.name.clone(),
            validation,
            artifacts,
            analysis,
        })
    }

    /// Bind requested charts, or the automatic scatter when none were given.
    fn bind_charts(&self, dataset: &Dataset, data_section: &str) -> Result<Vec<ChartArtifact>> {
        let binder = ChartBinder::new(dataset);
        let mut charts = Vec::new();

        for request in &self.config.charts {
            let section = request.section.as_deref().unwrap_or(data_section);
            let y_refs: Vec<&str> = request.y_columns.iter().map(|s| s.as_str()).collect();
            charts.push(binder.bind(
                section,
                &request.x_column,
                &y_refs,
                request.chart_type,
                &request.style,
            )?);
        }

        if charts.is_empty() && self.config.auto_chart {
            let numeric = dataset.numeric_columns();
            if numeric.len() >= 2 {
                charts.push(binder.bind(
                    data_section,
                    numeric[0],
                    &[numeric[1]],
                    ChartType::Scatter,
                    &ChartStyle::default(),
                )?);
            }
        }

        Ok(charts)
    }
}

fn write_text(path: &Path, content: &str) -> Result<()> {
    std::fs::write(path, content).map_err(|e| LabForgeError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}

/// Make a title safe to use as a file stem.
fn sanitize_file_stem(title: &str) -> String {
    let stem: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c => c,
        })
        .collect();
    let stem = stem.trim();
    if stem.is_empty() {
        "report".to_string()
    } else {
        stem.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_stem() {
        assert_eq!(sanitize_file_stem("Ohm's Law"), "Ohm's Law");
        assert_eq!(sanitize_file_stem("a/b:c"), "a_b_c");
        assert_eq!(sanitize_file_stem("  "), "report");
    }
}
