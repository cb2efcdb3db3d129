//! Batch command - process a list of report tasks.

use std::path::PathBuf;

use colored::Colorize;
use labforge::{AiConfig, BatchRunner, ProviderKind};

pub fn run(
    tasks_file: PathBuf,
    output_dir: PathBuf,
    workers: usize,
    ai: Option<ProviderKind>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !tasks_file.exists() {
        return Err(format!("Task file not found: {}", tasks_file.display()).into());
    }

    let tasks = BatchRunner::load_tasks(&tasks_file)?;
    if tasks.is_empty() {
        println!("{} Task file contains no tasks.", "Note:".yellow());
        return Ok(());
    }

    println!(
        "{} {} task(s) with {} worker(s)...",
        "Processing".cyan().bold(),
        tasks.len().to_string().white().bold(),
        workers
    );

    let mut runner = BatchRunner::new(output_dir).with_workers(workers);
    if let Some(provider) = ai {
        runner = runner.with_ai(AiConfig::for_provider(provider));
    }

    let results = runner.process(&tasks)?;

    for result in &results {
        let mark = if result.success {
            "ok".green()
        } else {
            "failed".red()
        };
        println!(
            "  {} {} ({:.2}s)",
            mark,
            result.task.title,
            result.duration_secs
        );
        if !result.success {
            println!("     {}", result.error.red());
        } else if verbose {
            for file in &result.output_files {
                println!("     {}", file.display().to_string().dimmed());
            }
        }
    }

    let summary = BatchRunner::summarize(&results);
    println!();
    println!(
        "{} {} succeeded, {} failed, {:.2}s total",
        "Done:".green().bold(),
        summary.succeeded.to_string().white().bold(),
        summary.failed.to_string().white().bold(),
        summary.total_secs
    );

    if summary.failed > 0 {
        return Err(format!("{} task(s) failed", summary.failed).into());
    }

    Ok(())
}
