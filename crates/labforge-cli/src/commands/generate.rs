//! Generate command - produce report artifacts for one data file.

use std::path::PathBuf;

use colored::Colorize;
use indexmap::IndexMap;

use labforge::{
    AiConfig, ChartRequest, ChartStyle, ChartType, OutputFormat, PipelineConfig, ProviderKind,
    ReportPipeline,
};

pub struct Args {
    pub file: PathBuf,
    pub title: String,
    pub author: String,
    pub group: String,
    pub template: String,
    pub formats: String,
    pub output_dir: PathBuf,
    pub x_column: Option<String>,
    pub y_columns: Option<String>,
    pub chart_type: ChartType,
    pub conclusion: Option<String>,
    pub error_analysis: Option<String>,
    pub ai: Option<ProviderKind>,
    pub model: Option<String>,
    pub temperature: f64,
    pub timeout: u64,
    pub strict: bool,
    pub verbose: bool,
}

pub fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    if !args.file.exists() {
        return Err(format!("File not found: {}", args.file.display()).into());
    }

    let formats = OutputFormat::parse_list(&args.formats)?;

    let charts = match (&args.x_column, &args.y_columns) {
        (Some(x), Some(y)) => vec![ChartRequest {
            x_column: x.clone(),
            y_columns: y.split(',').map(|s| s.trim().to_string()).collect(),
            chart_type: args.chart_type,
            style: ChartStyle::default(),
            section: None,
        }],
        (Some(_), None) | (None, Some(_)) => {
            return Err("Chart selection needs both --x-column and --y-columns".into());
        }
        (None, None) => Vec::new(),
    };

    let ai = args.ai.map(|provider| AiConfig {
        provider,
        model: args.model.clone().unwrap_or_default(),
        temperature: args.temperature,
        timeout_secs: args.timeout,
        ..AiConfig::default()
    });

    let mut caller_content = IndexMap::new();
    if let Some(conclusion) = args.conclusion {
        caller_content.insert("conclusion".to_string(), conclusion);
    }
    if let Some(error_analysis) = args.error_analysis {
        caller_content.insert("error_analysis".to_string(), error_analysis);
    }

    println!(
        "{} {}",
        "Generating".cyan().bold(),
        args.file.display().to_string().white()
    );

    let pipeline = ReportPipeline::new(PipelineConfig {
        template: args.template.clone(),
        author: args.author,
        group: args.group,
        formats,
        output_dir: args.output_dir,
        strict: args.strict,
        ai,
        charts,
        ..PipelineConfig::default()
    });

    let report = pipeline.generate(&args.file, &args.title, &caller_content)?;

    if report.template != args.template {
        println!(
            "{} Unknown template '{}', used '{}' instead",
            "Note:".yellow(),
            args.template,
            report.template
        );
    }

    for warning in &report.validation.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
    if args.verbose {
        for info in &report.validation.info {
            println!("  {} {}", "info:".blue(), info);
        }
    }

    if let Some(ref analysis) = report.analysis {
        if args.verbose {
            println!();
            println!("{}", "Analysis:".yellow().bold());
            println!("  Trend: {}", analysis.trend);
            println!("  Anomaly: {}", analysis.anomaly);
            println!("  Confidence: {:.2}", analysis.confidence);
        }
    }

    println!();
    for artifact in &report.artifacts {
        if artifact.degraded {
            println!(
                "{} {} {}",
                "Degraded".yellow().bold(),
                artifact.path.display().to_string().white(),
                format!("(no {} backend available)", artifact.format).dimmed()
            );
        } else {
            println!(
                "{} {}",
                "Saved".green().bold(),
                artifact.path.display().to_string().white()
            );
        }
    }

    Ok(())
}
