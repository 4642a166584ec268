//! The question-generation capability.

use async_trait::async_trait;

use super::candidate::{CandidateQuestion, DatasetColumns, Origin};
use super::category::QuestionCategory;
use crate::error::GenerationError;
use crate::input::AnalysisContext;

/// One request for candidates of a single category.
#[derive(Debug, Clone, Copy)]
pub struct GenerationRequest<'a> {
    pub category: QuestionCategory,
    /// Number of candidates wanted. Offline strategies return exactly this
    /// many; online strategies return at most this many.
    pub count: usize,
    /// Datasets in scope. More than one means a cross-dataset comparison.
    pub scope: &'a [DatasetColumns<'a>],
    pub context: &'a AnalysisContext,
    /// Candidates already drawn from this strategy for this category and
    /// scope. Deterministic strategies continue their sequence from here.
    pub offset: usize,
}

impl GenerationRequest<'_> {
    /// True when the scope spans several datasets.
    pub fn is_comparison(&self) -> bool {
        self.scope.len() > 1
    }
}

/// Produces candidate questions for one category.
///
/// Returned candidates carry provisional ordinals; the pipeline re-stamps
/// them in a deterministic order once all categories have finished.
#[async_trait]
pub trait QuestionStrategy: Send + Sync {
    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<Vec<CandidateQuestion>, GenerationError>;

    /// The origin recorded on every candidate this strategy returns.
    fn origin(&self) -> Origin;
}

/// Number of candidates to request for a target count.
///
/// `max(ceil(count * factor), count + min_extra)`; zero for a zero target.
pub fn overgeneration_target(count: usize, factor: f64, min_extra: usize) -> usize {
    if count == 0 {
        return 0;
    }
    // Tolerate float noise such as 10 * 1.3 = 13.000000000000002.
    let scaled = (count as f64 * factor - 1e-9).ceil().max(0.0) as usize;
    scaled.max(count + min_extra)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overgeneration_target() {
        assert_eq!(overgeneration_target(0, 1.3, 2), 0);
        assert_eq!(overgeneration_target(1, 1.3, 2), 3);
        assert_eq!(overgeneration_target(3, 1.3, 2), 5);
        assert_eq!(overgeneration_target(10, 1.3, 2), 13);
        assert_eq!(overgeneration_target(20, 1.3, 2), 26);
    }
}
