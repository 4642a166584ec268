//! Templates command - list predefined analysis contexts.

use colored::Colorize;
use inquest::ContextTemplate;

pub fn run(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", "Available templates:".yellow().bold());
    for template in ContextTemplate::ALL {
        println!(
            "  {:16} {} (for {})",
            template.key.cyan(),
            template.subject_area,
            template.audience
        );
        if verbose {
            println!("  {:16} {}", "", template.business_context.dimmed());
            println!("  {:16} objectives: {}", "", template.objectives.join(", "));
        }
    }
    println!();
    println!(
        "Use one with {}",
        "inquest generate <FILES> --template <KEY>".cyan().bold()
    );
    Ok(())
}
