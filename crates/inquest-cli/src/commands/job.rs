//! Run command - execute a JSON job file.
//!
//! ```json
//! {
//!   "subject_area": "retail",
//!   "objectives": ["grow basket size"],
//!   "datasets": ["sales.csv", "stores.csv"],
//!   "questions_per_dataset": 15,
//!   "comparison_questions": 5,
//!   "output": "questions.json",
//!   "llm": "none",
//!   "config": { "scoring": { "threshold": 0.65 } }
//! }
//! ```
//!
//! Relative paths are resolved against the job file's directory.

use std::path::{Path, PathBuf};

use colored::Colorize;
use inquest::InquestConfig;
use serde::Deserialize;

use super::generate::{self, GenerateJob};
use crate::cli::LlmProviderChoice;

/// A batch job as written on disk.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct JobFile {
    pub template: Option<String>,
    pub subject_area: Option<String>,
    pub objectives: Vec<String>,
    pub audience: Option<String>,
    pub business_context: Option<String>,
    pub datasets: Vec<PathBuf>,
    pub questions_per_dataset: Option<usize>,
    pub comparison_questions: Option<usize>,
    pub output: Option<PathBuf>,
    pub llm: Option<String>,
    pub model: Option<String>,
    pub max_rows: Option<usize>,
    /// Inline library configuration.
    pub config: Option<InquestConfig>,
}

impl JobFile {
    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let job: JobFile = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid job file {}: {}", path.display(), e))?;
        Ok(job)
    }

    /// Split into the generation job and its configuration.
    pub fn into_job(self, base: &Path) -> Result<(GenerateJob, InquestConfig), Box<dyn std::error::Error>> {
        let llm: LlmProviderChoice = match &self.llm {
            Some(name) => name.parse()?,
            None => LlmProviderChoice::None,
        };
        let mut config = self.config.unwrap_or_default();
        config.validate()?;
        if self.max_rows.is_some() {
            config.parser.max_rows = self.max_rows;
        }

        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        let job = GenerateJob {
            files: self.datasets.into_iter().map(resolve).collect(),
            questions: self.questions_per_dataset,
            comparison: self.comparison_questions,
            template: self.template,
            subject: self.subject_area,
            objectives: self.objectives,
            audience: self.audience,
            business_context: self.business_context,
            llm,
            model: self.model,
            output: self.output.map(resolve),
            max_rows: self.max_rows,
            config: None,
        };
        Ok((job, config))
    }
}

pub async fn run(file: PathBuf, json: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("Job file not found: {}", file.display()).into());
    }

    let base = file.parent().map(Path::to_path_buf).unwrap_or_default();
    let (job, config) = JobFile::load(&file)?.into_job(&base)?;
    if job.files.is_empty() {
        return Err(format!("Job file {} lists no datasets", file.display()).into());
    }

    if !json {
        println!(
            "{} {} ({} dataset(s))",
            "Running".cyan().bold(),
            file.display().to_string().white(),
            job.files.len()
        );
    }
    generate::execute(job, config, json, verbose).await
}
