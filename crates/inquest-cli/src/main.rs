//! Inquest CLI - SMART question generation for tabular data.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Generate {
            files,
            questions,
            comparison,
            template,
            subject,
            objectives,
            audience,
            llm,
            model,
            output,
            json,
            max_rows,
            config,
        } => {
            let job = commands::generate::GenerateJob {
                files,
                questions,
                comparison,
                template,
                subject,
                objectives,
                audience,
                business_context: None,
                llm,
                model,
                output,
                max_rows,
                config,
            };
            commands::generate::run(job, json, cli.verbose).await
        }

        Commands::Profile {
            file,
            json,
            max_rows,
        } => commands::profile::run(file, json, max_rows, cli.verbose),

        Commands::Run { file, json } => commands::job::run(file, json, cli.verbose).await,

        Commands::Templates => commands::templates::run(cli.verbose),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Log to stderr. `RUST_LOG` wins over the verbosity flag.
fn init_logging(verbose: bool) {
    let default = if verbose { "inquest=debug" } else { "inquest=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
