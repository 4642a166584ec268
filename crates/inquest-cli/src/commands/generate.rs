//! Generate command - load files, run the pipeline and report questions.

use std::path::PathBuf;
use std::sync::Arc;

use colored::Colorize;
use tracing::debug;
use inquest::llm::{AnthropicProvider, MockProvider, OllamaProvider, OpenAIProvider};
use inquest::{
    AnalysisContext, ContextTemplate, Dataset, InquestConfig, LlmConfig, Orchestrator, Parser,
    TextGenerator, recommend_question_count,
};

use super::output;
use crate::cli::LlmProviderChoice;

/// Everything needed for one generation run, from flags or a job file.
#[derive(Debug, Default)]
pub struct GenerateJob {
    pub files: Vec<PathBuf>,
    pub questions: Option<usize>,
    pub comparison: Option<usize>,
    pub template: Option<String>,
    pub subject: Option<String>,
    pub objectives: Vec<String>,
    pub audience: Option<String>,
    pub business_context: Option<String>,
    pub llm: LlmProviderChoice,
    pub model: Option<String>,
    pub output: Option<PathBuf>,
    pub max_rows: Option<usize>,
    pub config: Option<PathBuf>,
}

pub async fn run(job: GenerateJob, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = match &job.config {
        Some(path) => InquestConfig::from_file(path)?,
        None => InquestConfig::default(),
    };
    if job.max_rows.is_some() {
        config.parser.max_rows = job.max_rows;
    }
    execute(job, config, json, verbose).await
}

/// Run a job with an already resolved configuration.
pub async fn execute(
    job: GenerateJob,
    config: InquestConfig,
    json: bool,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if job.files.is_empty() {
        return Err("No data files given".into());
    }
    if let Some(n) = job.comparison
        && n > 0
        && job.files.len() < 2
    {
        return Err("--comparison needs at least two data files".into());
    }

    let parser = Parser::with_config(config.parser.clone());
    let mut datasets = Vec::with_capacity(job.files.len());
    for file in &job.files {
        if !file.exists() {
            return Err(format!("File not found: {}", file.display()).into());
        }
        let (dataset, metadata) = Dataset::from_path(&parser, file)?;
        if !json {
            println!(
                "{} {} ({} rows, {} columns)",
                "Loaded".cyan().bold(),
                metadata.file.white(),
                metadata.row_count,
                metadata.column_count
            );
        }
        datasets.push(dataset);
    }

    let context = build_context(&job, &datasets)?;
    let per_dataset = job.questions.unwrap_or_else(|| {
        let widest = datasets
            .iter()
            .map(|ds| ds.table.column_count())
            .max()
            .unwrap_or(0);
        recommend_question_count(widest)
    });

    debug!(files = datasets.len(), per_dataset, provider = %job.llm, subject = %context.subject_area, "generation configured");

    let mut orchestrator = Orchestrator::with_config(config)?;
    if let Some(generator) = build_generator(&job.llm, job.model.as_deref())? {
        orchestrator = orchestrator.with_generator(generator);
    }

    if !json {
        println!(
            "{} {} question(s) per dataset{} using {}",
            "Generating".cyan().bold(),
            per_dataset.to_string().white().bold(),
            job.comparison
                .filter(|n| *n > 0)
                .map(|n| format!(" and {} comparison question(s)", n))
                .unwrap_or_default(),
            job.llm.to_string().white()
        );
        println!();
    }

    let report = orchestrator
        .run(&datasets, &context, per_dataset, job.comparison)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        output::print_report(&report, verbose);
    }

    if let Some(path) = &job.output {
        std::fs::write(path, serde_json::to_string_pretty(&report)?)?;
        if !json {
            println!();
            println!(
                "{} {}",
                "Saved to".green().bold(),
                path.display().to_string().white()
            );
        }
    }

    Ok(())
}

/// Template first, then explicit fields, else a context inferred from names.
fn build_context(
    job: &GenerateJob,
    datasets: &[Dataset],
) -> Result<AnalysisContext, Box<dyn std::error::Error>> {
    let mut context = match (&job.template, &job.subject) {
        (Some(key), _) => ContextTemplate::find(key)
            .map(ContextTemplate::to_context)
            .ok_or_else(|| format!("Unknown template: {}. Run `inquest templates` to list them.", key))?,
        (None, Some(subject)) => AnalysisContext::new(subject),
        (None, None) => {
            let names: Vec<&str> = datasets.iter().map(|ds| ds.name.as_str()).collect();
            AnalysisContext::infer_from_dataset_names(&names)
        }
    };

    if job.template.is_some()
        && let Some(subject) = &job.subject
    {
        context.subject_area = subject.clone();
    }
    if !job.objectives.is_empty() {
        context = context.with_objectives(job.objectives.iter().cloned());
    }
    if let Some(audience) = &job.audience {
        context = context.with_audience(audience);
    }
    if let Some(business) = &job.business_context {
        context = context.with_business_context(business);
    }
    Ok(context)
}

/// Build the text-generation service for a provider choice.
pub fn build_generator(
    choice: &LlmProviderChoice,
    model: Option<&str>,
) -> Result<Option<Arc<dyn TextGenerator>>, Box<dyn std::error::Error>> {
    let generator: Arc<dyn TextGenerator> = match choice {
        LlmProviderChoice::None => return Ok(None),
        LlmProviderChoice::Mock => Arc::new(MockProvider::new()),
        LlmProviderChoice::Anthropic => Arc::new(match model {
            Some(m) => AnthropicProvider::from_env_with_config(LlmConfig::default().with_model(m))?,
            None => AnthropicProvider::from_env()?,
        }),
        LlmProviderChoice::OpenAI => Arc::new(match model {
            Some(m) => OpenAIProvider::from_env_with_config(LlmConfig::default().with_model(m))?,
            None => OpenAIProvider::from_env()?,
        }),
        LlmProviderChoice::Ollama => Arc::new(match model {
            Some(m) => OllamaProvider::with_model(m)?,
            None => OllamaProvider::new()?,
        }),
    };
    Ok(Some(generator))
}
