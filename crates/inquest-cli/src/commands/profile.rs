//! Profile command - show how each column was classified.

use std::path::PathBuf;

use colored::Colorize;
use inquest::{Dataset, Orchestrator, Parser, ParserConfig, recommend_question_count};

pub fn run(
    file: PathBuf,
    json: bool,
    max_rows: Option<usize>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let mut config = ParserConfig::default();
    if max_rows.is_some() {
        config.max_rows = max_rows;
    }
    let parser = Parser::with_config(config);
    let (dataset, metadata) = Dataset::from_path(&parser, &file)?;
    let orchestrator = Orchestrator::new();
    let profiles = orchestrator.analyze(&dataset.table)?;
    let recommended = recommend_question_count(dataset.table.column_count());

    if json {
        let out = serde_json::json!({
            "source": metadata,
            "columns": profiles,
            "recommended_questions": recommended,
        });
        println!("{}", serde_json::to_string_pretty(&out)?);
        return Ok(());
    }

    println!(
        "{} {} ({} rows, {} columns)",
        "Profiling".cyan().bold(),
        metadata.file.white(),
        metadata.row_count,
        metadata.column_count
    );
    if verbose {
        println!("  hash: {}", metadata.hash.dimmed());
    }
    println!();

    for profile in &profiles {
        let kind = profile.declared_kind.to_string();
        let kind = if profile.is_usable() {
            kind.green()
        } else {
            kind.dimmed()
        };
        let tag = profile
            .tag
            .map(|t| format!("{:?}", t))
            .unwrap_or_default();
        println!("  {:24} {:16} {:12} {}", profile.name, kind, tag, profile.narrative);
    }

    let unusable = profiles.iter().filter(|p| !p.is_usable()).count();
    println!();
    if unusable > 0 {
        println!(
            "{} {} column(s) have no values and will not be used",
            "Note:".yellow(),
            unusable
        );
    }
    println!(
        "Recommended question count: {}",
        recommended.to_string().white().bold()
    );

    Ok(())
}
