//! Templates command - list the registered report templates.

use colored::Colorize;
use labforge::TemplateRegistry;

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let registry = TemplateRegistry::new();
    let summaries = registry.list();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!("{}", "Registered templates:".cyan().bold());
    for summary in summaries {
        println!(
            "  {:20} {} ({} sections)",
            summary.name.white().bold(),
            summary.display_name,
            summary.section_count
        );
        println!("  {:20} {}", "", summary.description.dimmed());
    }

    Ok(())
}
