//! Validate command - run data-quality checks on a data file.

use std::path::PathBuf;

use colored::Colorize;
use labforge::{validate, Loader};

pub fn run(file: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let loader = Loader::new();
    let (dataset, metadata) = loader.load(&file)?;
    let report = validate(&dataset);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows × {} columns, {})",
        "Validating".cyan().bold(),
        file.display().to_string().white(),
        metadata.row_count,
        metadata.column_count,
        metadata.format
    );

    if verbose {
        println!();
        for (name, column_type) in dataset.headers.iter().zip(&dataset.column_types) {
            println!("  {:20} {}", name, column_type.label());
        }
    }

    println!();
    for error in &report.errors {
        println!("  {} {}", "error:".red().bold(), error);
    }
    for warning in &report.warnings {
        println!("  {} {}", "warning:".yellow(), warning);
    }
    for info in &report.info {
        println!("  {} {}", "info:".blue(), info);
    }

    if report.valid {
        println!("{}", "Data is valid for report generation.".green());
        Ok(())
    } else {
        Err("validation failed".into())
    }
}
