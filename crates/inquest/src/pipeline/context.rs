//! State shared by the pipelines of one run.

use std::sync::Arc;

use crate::config::InquestConfig;
use crate::generation::{
    CandidateQuestion, DatasetColumns, GenerationRequest, OfflineStrategy, OnlineStrategy,
    QuestionCategory, QuestionStrategy,
};
use crate::input::AnalysisContext;
use crate::llm::TextGenerator;

use super::budget::RequestBudget;
use super::fallback::{FallbackController, GenerationMode};

/// Candidates drawn so far from each strategy for one category of a scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DrawCursor {
    pub online: usize,
    pub offline: usize,
}

/// Everything a scope pipeline needs from its run.
///
/// Built fresh for each orchestrator call, so the fallback mode never
/// leaks from one run into the next. The request budget is the
/// orchestrator's and outlives the run.
pub struct RunContext {
    config: InquestConfig,
    fallback: FallbackController,
    budget: Arc<RequestBudget>,
    online: Option<OnlineStrategy>,
    offline: OfflineStrategy,
}

impl RunContext {
    pub fn new(
        config: InquestConfig,
        generator: Option<Arc<dyn TextGenerator>>,
        budget: Arc<RequestBudget>,
    ) -> Self {
        let timeout = config.generation.request_timeout();
        let online = generator.map(|g| OnlineStrategy::new(g, Arc::clone(&budget), timeout));
        Self {
            fallback: FallbackController::new(online.is_some()),
            config,
            budget,
            online,
            offline: OfflineStrategy::new(),
        }
    }

    pub fn config(&self) -> &InquestConfig {
        &self.config
    }

    pub fn fallback(&self) -> &FallbackController {
        &self.fallback
    }

    pub fn budget(&self) -> &RequestBudget {
        &self.budget
    }

    pub fn mode(&self) -> GenerationMode {
        self.fallback.mode()
    }

    /// Draw up to `count` candidates from the current-mode strategy.
    ///
    /// An online failure engages fallback and the same request is served
    /// offline, so this never fails. Offline draws always return `count`
    /// candidates for a scope with usable columns.
    pub async fn draw(
        &self,
        scope_label: &str,
        category: QuestionCategory,
        count: usize,
        scope: &[DatasetColumns<'_>],
        context: &AnalysisContext,
        cursor: &mut DrawCursor,
    ) -> Vec<CandidateQuestion> {
        if count == 0 {
            return Vec::new();
        }

        if let Some(online) = self.online.as_ref()
            && self.mode() == GenerationMode::Online
        {
            let request = GenerationRequest {
                category,
                count,
                scope,
                context,
                offset: cursor.online,
            };
            match online.generate(&request).await {
                Ok(candidates) => {
                    cursor.online += candidates.len();
                    return candidates;
                }
                Err(err) => {
                    self.fallback.record_failure(scope_label, category, &err);
                }
            }
        }

        self.draw_offline(category, count, scope, context, cursor)
    }

    /// Draw `count` candidates from the offline strategy regardless of mode.
    pub fn draw_offline(
        &self,
        category: QuestionCategory,
        count: usize,
        scope: &[DatasetColumns<'_>],
        context: &AnalysisContext,
        cursor: &mut DrawCursor,
    ) -> Vec<CandidateQuestion> {
        let request = GenerationRequest {
            category,
            count,
            scope,
            context,
            offset: cursor.offline,
        };
        let candidates = self.offline.candidates(&request);
        cursor.offline += candidates.len();
        candidates
    }
}
