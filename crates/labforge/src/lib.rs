//! LabForge: template-driven lab report assembly from tabular experiment data.
//!
//! LabForge loads CSV/Excel/JSON experiment data, computes descriptive
//! statistics, binds charts, and renders structurally consistent reports
//! across HTML, Word, and Markdown, with optional LLM-written narrative
//! sections and an optional PDF export.
//!
//! # Core Principles
//!
//! - **Cross-format parity**: every renderer consumes the same resolved
//!   section list, so sections, order, and text match across formats
//! - **Graceful degradation**: missing PDF backends and unreachable AI
//!   providers downgrade, they never fail a report
//! - **No hidden state**: the template catalog is built at startup and
//!   passed by reference; nothing global mutates at runtime
//!
//! # Example
//!
//! ```no_run
//! use labforge::{PipelineConfig, ReportPipeline};
//! use indexmap::IndexMap;
//!
//! let pipeline = ReportPipeline::new(PipelineConfig::default());
//! let report = pipeline
//!     .generate("ohms_law.csv", "Ohm's Law", &IndexMap::new())
//!     .unwrap();
//!
//! println!("Template: {}", report.template);
//! println!("Artifacts: {}", report.artifacts.len());
//! ```

pub mod batch;
pub mod chart;
pub mod error;
pub mod input;
pub mod llm;
pub mod report;
pub mod stats;
pub mod template;
pub mod validate;

mod pipeline;

pub use crate::pipeline::{
    ChartRequest, DocumentArtifact, GenerationReport, PipelineConfig, ReportPipeline,
};
pub use batch::{BatchResult, BatchRunner, BatchSummary, BatchTask};
pub use chart::{ChartArtifact, ChartBinder, ChartStyle, ChartType};
pub use error::{LabForgeError, Result};
pub use input::{ColumnType, Dataset, Loader, LoaderConfig, SourceMetadata};
pub use llm::{AiConfig, AnalysisResult, LabAnalyzer, MockProvider, ProviderKind};
pub use report::{OutputFormat, ReportMeta};
pub use stats::{summarize, DataSummary};
pub use template::{ReportTemplate, Section, TemplateRegistry, DEFAULT_TEMPLATE};
pub use validate::{validate, ValidationReport};
