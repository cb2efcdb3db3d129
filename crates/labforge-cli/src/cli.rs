//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use labforge::{ChartType, ProviderKind};

/// LabForge: lab report generator for tabular experiment data
#[derive(Parser)]
#[command(name = "labforge")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a report from a data file
    Generate {
        /// Path to the data file (CSV/XLSX/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Report title
        #[arg(short, long)]
        title: String,

        /// Author name
        #[arg(short, long, default_value = "")]
        author: String,

        /// Group or class name
        #[arg(short, long, default_value = "")]
        group: String,

        /// Template key (see `labforge templates`)
        #[arg(long, default_value = "physics_basic")]
        template: String,

        /// Output formats, comma-separated (html, docx, md, pdf) or "all"
        #[arg(short, long, default_value = "html")]
        formats: String,

        /// Output directory
        #[arg(short, long, default_value = "output")]
        output_dir: PathBuf,

        /// X-axis column for the chart
        #[arg(short = 'x', long)]
        x_column: Option<String>,

        /// Y-axis columns for the chart, comma-separated
        #[arg(short = 'y', long)]
        y_columns: Option<String>,

        /// Chart type
        #[arg(long, default_value = "scatter")]
        chart_type: ChartType,

        /// Conclusion text to place in the report
        #[arg(long)]
        conclusion: Option<String>,

        /// Error analysis text to place in the report
        #[arg(long)]
        error_analysis: Option<String>,

        /// AI provider for narrative sections (openai, anthropic, ollama, mock)
        #[arg(long)]
        ai: Option<ProviderKind>,

        /// Model to use (provider-specific, e.g. "gpt-4o-mini", "llama3.2")
        #[arg(long)]
        model: Option<String>,

        /// Sampling temperature for AI analysis
        #[arg(long, default_value = "0.7")]
        temperature: f64,

        /// Network timeout for AI calls, in seconds
        #[arg(long, default_value = "60")]
        timeout: u64,

        /// Refuse to generate when validation reports errors
        #[arg(long)]
        strict: bool,
    },

    /// Process a batch of report tasks from a CSV or JSON descriptor
    Batch {
        /// Path to the task file (CSV or JSON)
        #[arg(value_name = "TASKS")]
        tasks: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "output/batch")]
        output_dir: PathBuf,

        /// Worker pool size
        #[arg(short, long, default_value = "4")]
        workers: usize,

        /// AI provider for tasks that request analysis
        #[arg(long)]
        ai: Option<ProviderKind>,
    },

    /// List the registered report templates
    Templates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run data-quality checks on a data file
    Validate {
        /// Path to the data file (CSV/XLSX/JSON)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use labforge::OutputFormat;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_list_parsing() {
        assert_eq!(
            OutputFormat::parse_list("html,pdf").unwrap(),
            vec![OutputFormat::Html, OutputFormat::Pdf]
        );
    }
}
