//! The validated, exact-size output of one scope.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::state::ScopeState;
use crate::generation::{Origin, QuestionCategory};
use crate::scoring::{QualityReport, ScoredQuestion};
use crate::selection::Quota;

/// What a question set covers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Dataset(String),
    CrossDataset,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scope::Dataset(name) => write!(f, "{}", name),
            Scope::CrossDataset => write!(f, "cross-dataset"),
        }
    }
}

/// Ordered questions for one scope, exactly as many as requested.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionSet {
    pub scope: Scope,
    pub requested_count: usize,
    pub questions: Vec<ScoredQuestion>,
    pub quota: Quota,
    /// States the scope went through.
    pub history: Vec<ScopeState>,
    /// Whether the run switched to offline generation.
    pub fallback_engaged: bool,
}

impl QuestionSet {
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ScoredQuestion> {
        self.questions.iter()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.questions.iter().map(|q| q.text()).collect()
    }

    /// Questions selected for `category`.
    pub fn count_in(&self, category: QuestionCategory) -> usize {
        self.questions.iter().filter(|q| q.category() == category).count()
    }

    pub fn degraded_count(&self) -> usize {
        self.questions.iter().filter(|q| q.degraded).count()
    }

    /// Whether every question came from the offline templates.
    pub fn all_offline(&self) -> bool {
        self.questions.iter().all(|q| q.question.origin == Origin::Offline)
    }

    pub fn quality_report(&self, threshold: f64) -> QualityReport {
        QualityReport::from_questions(&self.questions, threshold)
    }
}

impl<'a> IntoIterator for &'a QuestionSet {
    type Item = &'a ScoredQuestion;
    type IntoIter = std::slice::Iter<'a, ScoredQuestion>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}
