//! Public entry point: profiles datasets and drives scope pipelines.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use super::budget::RequestBudget;
use super::context::RunContext;
use super::question_set::{QuestionSet, Scope};
use super::report::{RunReport, ScopeReport};
use super::scope::ScopePipeline;
use super::state::{ScopeMachine, ScopeState};
use crate::config::InquestConfig;
use crate::error::{InquestError, Result};
use crate::generation::DatasetColumns;
use crate::input::{AnalysisContext, DataTable, Dataset};
use crate::llm::TextGenerator;
use crate::profile::{ColumnAnalyzer, ColumnProfile};
use crate::selection::DiversityAllocator;

/// Suggested question count for a dataset with `column_count` columns.
pub fn recommend_question_count(column_count: usize) -> usize {
    match column_count {
        n if n >= 20 => 25,
        n if n >= 10 => 20,
        n if n >= 5 => 15,
        _ => 10,
    }
}

/// Generates SMART question sets for datasets.
///
/// Without a generator every question comes from offline templates. With
/// one, the first online failure of a run switches that run to offline.
pub struct Orchestrator {
    config: InquestConfig,
    analyzer: ColumnAnalyzer,
    allocator: DiversityAllocator,
    generator: Option<Arc<dyn TextGenerator>>,
    budget: Arc<RequestBudget>,
}

impl Orchestrator {
    /// Create an orchestrator with default configuration and no generator.
    pub fn new() -> Self {
        let config = InquestConfig::default();
        Self {
            analyzer: ColumnAnalyzer::with_config(config.profile.clone()),
            allocator: DiversityAllocator::new(),
            generator: None,
            budget: Arc::new(RequestBudget::new(config.generation.request_budget)),
            config,
        }
    }

    /// Create an orchestrator with custom configuration.
    pub fn with_config(config: InquestConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            analyzer: ColumnAnalyzer::with_config(config.profile.clone()),
            allocator: DiversityAllocator::with_config(config.allocator.clone())?,
            generator: None,
            budget: Arc::new(RequestBudget::new(config.generation.request_budget)),
            config,
        })
    }

    /// Use a text-generation service for online generation.
    pub fn with_generator(mut self, generator: Arc<dyn TextGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn config(&self) -> &InquestConfig {
        &self.config
    }

    /// The request budget shared by every run of this orchestrator.
    pub fn budget(&self) -> &RequestBudget {
        &self.budget
    }

    /// Profile every column of a table.
    pub fn analyze(&self, table: &DataTable) -> Result<Vec<ColumnProfile>> {
        self.analyzer.analyze_table("table", table)
    }

    /// Generate exactly `requested_count` questions for one dataset.
    pub async fn generate_questions(
        &self,
        dataset: &Dataset,
        context: &AnalysisContext,
        requested_count: usize,
    ) -> Result<QuestionSet> {
        check_count(requested_count)?;
        let ctx = self.run_context();
        let (_, set) = self.dataset_scope(&ctx, dataset, context, requested_count).await?;
        Ok(set)
    }

    /// Generate exactly `requested_count` questions that each draw on at
    /// least two of `datasets`.
    pub async fn generate_comparison(
        &self,
        datasets: &[Dataset],
        context: &AnalysisContext,
        requested_count: usize,
    ) -> Result<QuestionSet> {
        check_count(requested_count)?;
        if datasets.len() < 2 {
            return Err(InquestError::InvalidRequest(
                "a comparison needs at least two datasets".to_string(),
            ));
        }

        let profiled = datasets
            .iter()
            .map(|ds| {
                self.analyzer
                    .analyze_table(&ds.name, &ds.table)
                    .map(|profiles| (ds.name.as_str(), profiles))
            })
            .collect::<Result<Vec<_>>>()?;

        let ctx = self.run_context();
        self.comparison_scope(&ctx, &profiled, context, requested_count).await
    }

    /// Run every dataset through its own pipeline, then the cross-dataset
    /// comparison if `comparison` is set.
    ///
    /// Datasets run concurrently up to `max_concurrent_datasets`; results
    /// keep input order. A dataset that cannot be profiled is reported and
    /// left out of the comparison.
    pub async fn run(
        &self,
        datasets: &[Dataset],
        context: &AnalysisContext,
        per_dataset: usize,
        comparison: Option<usize>,
    ) -> Result<RunReport> {
        check_count(per_dataset)?;
        info!(
            datasets = datasets.len(),
            per_dataset,
            comparison = comparison.unwrap_or(0),
            "run started"
        );

        let ctx = self.run_context();
        let threshold = self.config.scoring.threshold;
        let workers = self.config.generation.max_concurrent_datasets.max(1);

        let outcomes: Vec<Result<(Vec<ColumnProfile>, QuestionSet)>> = stream::iter(datasets)
            .map(|ds| self.dataset_scope(&ctx, ds, context, per_dataset))
            .buffered(workers)
            .collect()
            .await;

        let mut reports = Vec::with_capacity(datasets.len());
        let mut profiled: Vec<(&str, Vec<ColumnProfile>)> = Vec::new();
        for (dataset, outcome) in datasets.iter().zip(outcomes) {
            match outcome {
                Ok((profiles, set)) => {
                    reports.push(ScopeReport::completed(set, threshold));
                    profiled.push((dataset.name.as_str(), profiles));
                }
                Err(err) => {
                    warn!(dataset = %dataset.name, error = %err, "dataset skipped");
                    reports.push(ScopeReport::failed(Scope::Dataset(dataset.name.clone()), err));
                }
            }
        }

        let comparison = match comparison {
            Some(count) if count > 0 => Some(if profiled.len() < 2 {
                warn!(usable = profiled.len(), "comparison skipped");
                ScopeReport::failed(
                    Scope::CrossDataset,
                    "a comparison needs at least two usable datasets",
                )
            } else {
                match self.comparison_scope(&ctx, &profiled, context, count).await {
                    Ok(set) => ScopeReport::completed(set, threshold),
                    Err(err) => ScopeReport::failed(Scope::CrossDataset, err),
                }
            }),
            _ => None,
        };

        let report = RunReport::new(
            reports,
            comparison,
            ctx.fallback().is_engaged(),
            self.budget.used(),
        );
        info!(
            questions = report.total_questions,
            average_score = report.average_score,
            fallback = report.fallback_engaged,
            "run finished"
        );
        Ok(report)
    }

    fn run_context(&self) -> RunContext {
        RunContext::new(self.config.clone(), self.generator.clone(), Arc::clone(&self.budget))
    }

    async fn dataset_scope(
        &self,
        ctx: &RunContext,
        dataset: &Dataset,
        context: &AnalysisContext,
        requested: usize,
    ) -> Result<(Vec<ColumnProfile>, QuestionSet)> {
        let mut machine = ScopeMachine::new(&dataset.name);
        machine.advance(ScopeState::Profiling)?;

        let profiles = match self.analyzer.analyze_table(&dataset.name, &dataset.table) {
            Ok(profiles) => profiles,
            Err(err) => {
                machine.advance(ScopeState::Failed)?;
                return Err(err);
            }
        };

        let columns = [DatasetColumns {
            dataset: &dataset.name,
            profiles: &profiles,
        }];
        let set = ScopePipeline::new(
            ctx,
            &self.allocator,
            Scope::Dataset(dataset.name.clone()),
            &columns,
            context,
        )
        .run(requested, machine)
        .await?;
        Ok((profiles, set))
    }

    async fn comparison_scope(
        &self,
        ctx: &RunContext,
        profiled: &[(&str, Vec<ColumnProfile>)],
        context: &AnalysisContext,
        requested: usize,
    ) -> Result<QuestionSet> {
        let mut machine = ScopeMachine::new(Scope::CrossDataset.to_string());
        machine.advance(ScopeState::Profiling)?;

        let columns: Vec<DatasetColumns<'_>> = profiled
            .iter()
            .map(|(name, profiles)| DatasetColumns {
                dataset: *name,
                profiles: profiles.as_slice(),
            })
            .collect();
        ScopePipeline::new(ctx, &self.allocator, Scope::CrossDataset, &columns, context)
            .run(requested, machine)
            .await
    }
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

fn check_count(requested: usize) -> Result<()> {
    if requested == 0 {
        return Err(InquestError::InvalidRequest(
            "requested question count must be at least 1".to_string(),
        ));
    }
    Ok(())
}
