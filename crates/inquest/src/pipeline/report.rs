//! Results of a batch run.

use serde::{Deserialize, Serialize};

use super::question_set::{QuestionSet, Scope};
use crate::scoring::QualityReport;

/// Outcome for one scope of a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScopeReport {
    pub scope: Scope,
    pub question_set: Option<QuestionSet>,
    pub quality: Option<QualityReport>,
    /// Why the scope produced no questions.
    pub error: Option<String>,
}

impl ScopeReport {
    pub fn completed(set: QuestionSet, threshold: f64) -> Self {
        let quality = set.quality_report(threshold);
        Self {
            scope: set.scope.clone(),
            question_set: Some(set),
            quality: Some(quality),
            error: None,
        }
    }

    pub fn failed(scope: Scope, error: impl ToString) -> Self {
        Self {
            scope,
            question_set: None,
            quality: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.question_set.is_some()
    }
}

/// Everything a batch run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Per-dataset outcomes in input order.
    pub datasets: Vec<ScopeReport>,
    pub comparison: Option<ScopeReport>,
    /// Mean aggregate score over every returned question.
    pub average_score: f64,
    pub total_questions: usize,
    pub fallback_engaged: bool,
    /// Online requests granted by the budget so far.
    pub requests_used: usize,
}

impl RunReport {
    pub fn new(
        datasets: Vec<ScopeReport>,
        comparison: Option<ScopeReport>,
        fallback_engaged: bool,
        requests_used: usize,
    ) -> Self {
        let scores: Vec<f64> = datasets
            .iter()
            .chain(comparison.iter())
            .filter_map(|r| r.question_set.as_ref())
            .flat_map(|set| set.iter().map(|q| q.aggregate_score))
            .collect();
        let average_score = if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        };

        Self {
            total_questions: scores.len(),
            datasets,
            comparison,
            average_score,
            fallback_engaged,
            requests_used,
        }
    }

    /// Every successful scope, datasets first.
    pub fn question_sets(&self) -> impl Iterator<Item = &QuestionSet> {
        self.datasets
            .iter()
            .chain(self.comparison.iter())
            .filter_map(|r| r.question_set.as_ref())
    }

    pub fn failures(&self) -> impl Iterator<Item = &ScopeReport> {
        self.datasets
            .iter()
            .chain(self.comparison.iter())
            .filter(|r| !r.is_success())
    }
}
