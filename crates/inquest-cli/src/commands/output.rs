//! Human-readable rendering of run results.

use colored::Colorize;
use inquest::scoring::QualityRating;
use inquest::{QuestionSet, RunReport, ScopeReport};

pub fn print_report(report: &RunReport, verbose: bool) {
    for scope in report.datasets.iter().chain(report.comparison.iter()) {
        print_scope(scope, verbose);
        println!();
    }

    println!("{}", "Summary:".yellow().bold());
    println!(
        "  {} question(s), average score {:.2}",
        report.total_questions.to_string().white().bold(),
        report.average_score
    );
    let failures = report.failures().count();
    if failures > 0 {
        println!("  {} scope(s) failed", failures.to_string().red());
    }
    if report.fallback_engaged {
        println!(
            "  {} text-generation service failed; offline templates were used",
            "Note:".yellow()
        );
    }
    if report.requests_used > 0 {
        println!("  {} service request(s)", report.requests_used);
    }
}

fn print_scope(scope: &ScopeReport, verbose: bool) {
    println!("{} {}", "Scope:".cyan().bold(), scope.scope.to_string().white().bold());

    let Some(set) = &scope.question_set else {
        println!(
            "  {} {}",
            "Failed:".red().bold(),
            scope.error.as_deref().unwrap_or("unknown error")
        );
        return;
    };

    print_questions(set, verbose);

    if let Some(quality) = &scope.quality {
        let rating = match quality.rating {
            QualityRating::Excellent | QualityRating::Good => quality.rating.label().green(),
            QualityRating::Acceptable => quality.rating.label().yellow(),
            QualityRating::NeedsImprovement => quality.rating.label().red(),
        };
        println!();
        println!(
            "  Quality: {} (average {:.2}, {} at threshold, diversity {:.2})",
            rating, quality.average_score, quality.high_quality_count, quality.diversity_score
        );
        if verbose {
            for (criterion, coverage) in &quality.smart_coverage {
                println!("    {:16} {:>5.0}%", criterion.label(), coverage * 100.0);
            }
        }
        for recommendation in &quality.recommendations {
            println!("  {} {}", "•".dimmed(), recommendation);
        }
    }
}

fn print_questions(set: &QuestionSet, verbose: bool) {
    let mut current = None;
    for (i, question) in set.iter().enumerate() {
        if current != Some(question.category()) {
            current = Some(question.category());
            println!("  {}", question.category().label().yellow());
        }

        let score = format!("{:.2}", question.aggregate_score);
        let score = if question.degraded {
            format!("{} degraded", score).red()
        } else {
            score.dimmed()
        };
        println!("  {:>3}. {} [{}]", i + 1, question.text(), score);

        if verbose {
            let columns: Vec<String> = question
                .referenced_columns()
                .iter()
                .map(|c| c.to_string())
                .collect();
            println!(
                "       {} {:?} columns: {}",
                "↳".dimmed(),
                question.question.origin,
                columns.join(", ")
            );
        }
    }
}
