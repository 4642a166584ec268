//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inquest: SMART analytical questions for tabular datasets
#[derive(Parser)]
#[command(name = "inquest")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate questions for one or more data files
    Generate {
        /// Paths to the data files (CSV/TSV)
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Questions per dataset (default: recommended from column count)
        #[arg(short, long)]
        questions: Option<usize>,

        /// Cross-dataset comparison questions (needs at least two files)
        #[arg(short, long)]
        comparison: Option<usize>,

        /// Predefined context (see `inquest templates`)
        #[arg(short, long)]
        template: Option<String>,

        /// Subject area of the analysis
        #[arg(long)]
        subject: Option<String>,

        /// Analysis objective (repeatable)
        #[arg(long = "objective")]
        objectives: Vec<String>,

        /// Target audience
        #[arg(long)]
        audience: Option<String>,

        /// Text-generation service
        #[arg(long, default_value = "none")]
        llm: LlmProviderChoice,

        /// Model to use (provider-specific, e.g., "gpt-4o", "llama3.2")
        #[arg(long)]
        model: Option<String>,

        /// Write the JSON report to this path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Print the JSON report instead of the summary
        #[arg(long)]
        json: bool,

        /// Read at most this many data rows per file
        #[arg(long)]
        max_rows: Option<usize>,

        /// Library configuration file (JSON)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Show column profiles and the recommended question count
    Profile {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Read at most this many data rows
        #[arg(long)]
        max_rows: Option<usize>,
    },

    /// Run a JSON job file
    Run {
        /// Path to the job file
        #[arg(value_name = "JOB_FILE")]
        file: PathBuf,

        /// Print the JSON report instead of the summary
        #[arg(long)]
        json: bool,
    },

    /// List predefined analysis contexts
    Templates,
}

/// Text-generation service choice
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum LlmProviderChoice {
    /// No service - offline templates only
    #[default]
    None,
    /// Anthropic Claude API (requires ANTHROPIC_API_KEY)
    Anthropic,
    /// OpenAI GPT API (requires OPENAI_API_KEY)
    OpenAI,
    /// Ollama local models (requires Ollama running)
    Ollama,
    /// Mock provider for demos
    Mock,
}

impl std::str::FromStr for LlmProviderChoice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" | "offline" => Ok(LlmProviderChoice::None),
            "anthropic" | "claude" => Ok(LlmProviderChoice::Anthropic),
            "openai" | "gpt" => Ok(LlmProviderChoice::OpenAI),
            "ollama" | "local" => Ok(LlmProviderChoice::Ollama),
            "mock" | "test" => Ok(LlmProviderChoice::Mock),
            _ => Err(format!(
                "Unknown provider: {}. Use: none, anthropic, openai, ollama, or mock.",
                s
            )),
        }
    }
}

impl std::fmt::Display for LlmProviderChoice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LlmProviderChoice::None => write!(f, "none"),
            LlmProviderChoice::Anthropic => write!(f, "anthropic"),
            LlmProviderChoice::OpenAI => write!(f, "openai"),
            LlmProviderChoice::Ollama => write!(f, "ollama"),
            LlmProviderChoice::Mock => write!(f, "mock"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_provider_aliases() {
        assert_eq!("Claude".parse::<LlmProviderChoice>(), Ok(LlmProviderChoice::Anthropic));
        assert_eq!("local".parse::<LlmProviderChoice>(), Ok(LlmProviderChoice::Ollama));
        assert!("bard".parse::<LlmProviderChoice>().is_err());
    }

    #[test]
    fn test_generate_arguments() {
        let cli = Cli::try_parse_from([
            "inquest",
            "generate",
            "a.csv",
            "b.csv",
            "-q",
            "12",
            "--comparison",
            "5",
            "--objective",
            "cut costs",
            "--objective",
            "grow revenue",
            "--llm",
            "mock",
        ])
        .unwrap();

        match cli.command {
            Commands::Generate {
                files,
                questions,
                comparison,
                objectives,
                llm,
                ..
            } => {
                assert_eq!(files.len(), 2);
                assert_eq!(questions, Some(12));
                assert_eq!(comparison, Some(5));
                assert_eq!(objectives, vec!["cut costs", "grow revenue"]);
                assert_eq!(llm, LlmProviderChoice::Mock);
            }
            _ => panic!("expected generate"),
        }
    }
}
