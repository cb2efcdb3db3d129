//! LabForge CLI - lab report generation from experiment data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            file,
            title,
            author,
            group,
            template,
            formats,
            output_dir,
            x_column,
            y_columns,
            chart_type,
            conclusion,
            error_analysis,
            ai,
            model,
            temperature,
            timeout,
            strict,
        } => commands::generate::run(commands::generate::Args {
            file,
            title,
            author,
            group,
            template,
            formats,
            output_dir,
            x_column,
            y_columns,
            chart_type,
            conclusion,
            error_analysis,
            ai,
            model,
            temperature,
            timeout,
            strict,
            verbose: cli.verbose,
        }),

        Commands::Batch {
            tasks,
            output_dir,
            workers,
            ai,
        } => commands::batch::run(tasks, output_dir, workers, ai, cli.verbose),

        Commands::Templates { json } => commands::templates::run(json),

        Commands::Validate { file, json } => commands::validate::run(file, json, cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
