//! Batch report generation over a task list.
//!
//! Tasks are independent: each owns its dataset, template, and charts, so the
//! worker pool shares nothing mutable. A failing task is recorded and never
//! aborts its siblings.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Instant;

use indexmap::IndexMap;
use rayon::prelude::*;
use serde::Deserialize;

use crate::error::{LabForgeError, Result};
use crate::llm::AiConfig;
use crate::pipeline::{PipelineConfig, ReportPipeline};
use crate::report::OutputFormat;
use crate::template::DEFAULT_TEMPLATE;

/// One batch work item.
#[derive(Debug, Clone)]
pub struct BatchTask {
    pub data_path: PathBuf,
    pub title: String,
    pub author: String,
    pub group: String,
    pub template: String,
    pub output_formats: Vec<OutputFormat>,
    pub ai_enabled: bool,
}

impl BatchTask {
    pub fn new(data_path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            data_path: data_path.into(),
            title: title.into(),
            author: String::new(),
            group: String::new(),
            template: DEFAULT_TEMPLATE.to_string(),
            output_formats: OutputFormat::all(),
            ai_enabled: false,
        }
    }
}

/// Outcome of one task.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub task: BatchTask,
    pub success: bool,
    pub output_files: Vec<PathBuf>,
    pub error: String,
    pub duration_secs: f64,
}

/// A recorded failure.
#[derive(Debug, Clone)]
pub struct BatchFailure {
    pub title: String,
    pub error: String,
}

/// Tally over a whole batch run.
#[derive(Debug, Clone)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub total_secs: f64,
    pub failures: Vec<BatchFailure>,
}

/// Runs batch tasks over a bounded worker pool.
pub struct BatchRunner {
    output_dir: PathBuf,
    workers: usize,
    ai: Option<AiConfig>,
}

impl BatchRunner {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            workers: 4,
            ai: None,
        }
    }

    /// Bound the worker pool size.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Provider configuration for tasks that request AI analysis.
    pub fn with_ai(mut self, ai: AiConfig) -> Self {
        self.ai = Some(ai);
        self
    }

    /// Load tasks from a CSV or JSON descriptor file.
    pub fn load_tasks(path: impl AsRef<Path>) -> Result<Vec<BatchTask>> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Self::load_tasks_from_csv(path),
            "json" => Self::load_tasks_from_json(path),
            other => Err(LabForgeError::UnsupportedFormat(format!(
                "'{}' task file (expected csv or json)",
                other
            ))),
        }
    }

    /// Load tasks from a CSV with `data_path,title,author,group,template,output_format,ai_analysis` columns.
    pub fn load_tasks_from_csv(path: impl AsRef<Path>) -> Result<Vec<BatchTask>> {
        let path = path.as_ref();
        let mut reader = csv::Reader::from_path(path).map_err(LabForgeError::Csv)?;
        let headers = reader.headers()?.clone();
        let index_of = |name: &str| headers.iter().position(|h| h == name);

        let (path_idx, title_idx) = match (index_of("data_path"), index_of("title")) {
            (Some(p), Some(t)) => (p, t),
            _ => {
                return Err(LabForgeError::Config(
                    "Task CSV needs 'data_path' and 'title' columns".to_string(),
                ));
            }
        };
        let author_idx = index_of("author");
        let group_idx = index_of("group");
        let template_idx = index_of("template");
        let format_idx = index_of("output_format");
        let ai_idx = index_of("ai_analysis");

        let field = |record: &csv::StringRecord, idx: Option<usize>| -> String {
            idx.and_then(|i| record.get(i)).unwrap_or("").trim().to_string()
        };

        let mut tasks = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut task = BatchTask::new(
                field(&record, Some(path_idx)),
                field(&record, Some(title_idx)),
            );
            task.author = field(&record, author_idx);
            task.group = field(&record, group_idx);
            let template = field(&record, template_idx);
            if !template.is_empty() {
                task.template = template;
            }
            task.output_formats = parse_formats(&field(&record, format_idx))?;
            task.ai_enabled = matches!(
                field(&record, ai_idx).to_lowercase().as_str(),
                "true" | "yes" | "1"
            );
            tasks.push(task);
        }

        Ok(tasks)
    }

    /// Load tasks from a JSON array of task objects.
    pub fn load_tasks_from_json(path: impl AsRef<Path>) -> Result<Vec<BatchTask>> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| LabForgeError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let raw: Vec<RawJsonTask> = serde_json::from_reader(BufReader::new(file))?;

        raw.into_iter()
            .map(|r| {
                let mut task = BatchTask::new(r.data_path, r.title);
                task.author = r.author;
                task.group = r.group;
                if let Some(template) = r.template {
                    task.template = template;
                }
                task.output_formats = parse_formats(r.output_format.as_deref().unwrap_or(""))?;
                task.ai_enabled = r.ai_analysis;
                Ok(task)
            })
            .collect()
    }

    /// Process every task, fanning out over the worker pool.
    ///
    /// Always returns one result per task, in task order; failures are
    /// recorded per task and never propagate out of the batch call.
    pub fn process(&self, tasks: &[BatchTask]) -> Result<Vec<BatchResult>> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()
            .map_err(|e| LabForgeError::Config(format!("Failed to build worker pool: {}", e)))?;

        Ok(pool.install(|| {
            tasks
                .par_iter()
                .map(|task| self.process_single(task))
                .collect()
        }))
    }

    /// Process one task, converting any failure into a recorded result.
    fn process_single(&self, task: &BatchTask) -> BatchResult {
        let start = Instant::now();

        let config = PipelineConfig {
            template: task.template.clone(),
            author: task.author.clone(),
            group: task.group.clone(),
            formats: task.output_formats.clone(),
            output_dir: self.output_dir.clone(),
            strict: true,
            ai: if task.ai_enabled {
                Some(self.ai.clone().unwrap_or_default())
            } else {
                None
            },
            ..PipelineConfig::default()
        };

        let pipeline = ReportPipeline::new(config);
        let outcome = pipeline.generate(&task.data_path, &task.title, &IndexMap::new());

        let duration_secs = start.elapsed().as_secs_f64();
        match outcome {
            Ok(report) => BatchResult {
                task: task.clone(),
                success: true,
                output_files: report.artifacts.into_iter().map(|a| a.path).collect(),
                error: String::new(),
                duration_secs,
            },
            Err(e) => BatchResult {
                task: task.clone(),
                success: false,
                output_files: Vec::new(),
                error: e.to_string(),
                duration_secs,
            },
        }
    }

    /// Tally results into a summary.
    pub fn summarize(results: &[BatchResult]) -> BatchSummary {
        let succeeded = results.iter().filter(|r| r.success).count();
        BatchSummary {
            total: results.len(),
            succeeded,
            failed: results.len() - succeeded,
            total_secs: results.iter().map(|r| r.duration_secs).sum(),
            failures: results
                .iter()
                .filter(|r| !r.success)
                .map(|r| BatchFailure {
                    title: r.task.title.clone(),
                    error: r.error.clone(),
                })
                .collect(),
        }
    }
}

/// Parse an output-format list; empty or "all" selects every format.
fn parse_formats(spec: &str) -> Result<Vec<OutputFormat>> {
    OutputFormat::parse_list(spec).map_err(LabForgeError::Config)
}

#[derive(Debug, Deserialize)]
struct RawJsonTask {
    data_path: String,
    title: String,
    #[serde(default)]
    author: String,
    #[serde(default)]
    group: String,
    #[serde(default)]
    template: Option<String>,
    #[serde(default)]
    output_format: Option<String>,
    #[serde(default)]
    ai_analysis: bool,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_formats() {
        assert_eq!(parse_formats("all").unwrap(), OutputFormat::all());
        assert_eq!(parse_formats("").unwrap(), OutputFormat::all());
        assert_eq!(
            parse_formats("html, md").unwrap(),
            vec![OutputFormat::Html, OutputFormat::Markdown]
        );
        assert!(parse_formats("odt").is_err());
    }

    #[test]
    fn test_load_tasks_from_json() {
        let mut file = tempfile::Builder::new().suffix(".json").tempfile().unwrap();
        write!(
            file,
            r#"[{{"data_path": "a.csv", "title": "First", "template": "chemistry_basic",
                 "output_format": "html", "ai_analysis": true}},
                {{"data_path": "b.csv", "title": "Second"}}]"#
        )
        .unwrap();

        let tasks = BatchRunner::load_tasks(file.path()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].template, "chemistry_basic");
        assert_eq!(tasks[0].output_formats, vec![OutputFormat::Html]);
        assert!(tasks[0].ai_enabled);
        assert_eq!(tasks[1].template, DEFAULT_TEMPLATE);
        assert!(!tasks[1].ai_enabled);
    }

    #[test]
    fn test_load_tasks_from_csv() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "data_path,title,author,group,template,output_format,ai_analysis").unwrap();
        writeln!(file, "a.csv,First,Ada,G1,physics_basic,\"html,md\",false").unwrap();
        writeln!(file, "b.csv,Second,,,,,").unwrap();

        let tasks = BatchRunner::load_tasks(file.path()).unwrap();
        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].author, "Ada");
        assert_eq!(
            tasks[0].output_formats,
            vec![OutputFormat::Html, OutputFormat::Markdown]
        );
        assert_eq!(tasks[1].output_formats, OutputFormat::all());
    }

    #[test]
    fn test_summary_tally() {
        let ok = BatchResult {
            task: BatchTask::new("a.csv", "ok"),
            success: true,
            output_files: vec![],
            error: String::new(),
            duration_secs: 0.1,
        };
        let bad = BatchResult {
            task: BatchTask::new("b.csv", "bad"),
            success: false,
            output_files: vec![],
            error: "boom".to_string(),
            duration_secs: 0.2,
        };

        let summary = BatchRunner::summarize(&[ok, bad]);
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.failures[0].title, "bad");
        assert_eq!(summary.failures[0].error, "boom");
    }
}
