//! One scope's path from profiles to an exact-size question set.

use std::collections::HashSet;

use futures::future::join_all;
use indexmap::IndexMap;
use tracing::{debug, error, warn};

use super::context::{DrawCursor, RunContext};
use super::fallback::GenerationMode;
use super::question_set::{QuestionSet, Scope};
use super::state::{ScopeMachine, ScopeState};
use crate::error::{InquestError, Result};
use crate::generation::{CandidateQuestion, DatasetColumns, QuestionCategory, overgeneration_target};
use crate::input::AnalysisContext;
use crate::scoring::{ScoredQuestion, SmartValidator};
use crate::selection::{CountEnforcer, DiversityAllocator, Quota};

/// Offline backfill passes before giving up on the count.
const MAX_BACKFILL_ROUNDS: usize = 8;

pub(crate) struct ScopePipeline<'a> {
    ctx: &'a RunContext,
    allocator: &'a DiversityAllocator,
    validator: SmartValidator,
    enforcer: CountEnforcer,
    scope: Scope,
    label: String,
    columns: &'a [DatasetColumns<'a>],
    context: &'a AnalysisContext,
    has_temporal: bool,
}

impl<'a> ScopePipeline<'a> {
    pub(crate) fn new(
        ctx: &'a RunContext,
        allocator: &'a DiversityAllocator,
        scope: Scope,
        columns: &'a [DatasetColumns<'a>],
        context: &'a AnalysisContext,
    ) -> Self {
        let has_temporal = columns
            .iter()
            .flat_map(|ds| ds.profiles.iter())
            .any(|p| p.is_usable() && p.is_temporal());
        Self {
            ctx,
            allocator,
            validator: SmartValidator::new(ctx.config().scoring.clone(), context),
            enforcer: CountEnforcer::new(),
            label: scope.to_string(),
            scope,
            columns,
            context,
            has_temporal,
        }
    }

    /// Generate, validate and select `requested` questions. `machine` must
    /// be in the profiling state.
    pub(crate) async fn run(self, requested: usize, mut machine: ScopeMachine) -> Result<QuestionSet> {
        let quota = self.allocator.allocate(requested);
        debug!(scope = %self.label, quota = ?quota, "quota allocated");

        let mut next_ordinal = 0;
        let (mut pool, mut cursors) = self.initial_pool(&quota, &mut machine, &mut next_ordinal).await?;

        self.retry_and_degrade(&quota, &mut pool, &mut cursors, &mut machine, &mut next_ordinal)
            .await?;

        machine.advance(ScopeState::Enforcing)?;
        let mut selection = self.enforcer.select(pool.clone(), &quota);
        let mut rounds = 0;
        while !selection.is_complete() && rounds < MAX_BACKFILL_ROUNDS {
            rounds += 1;
            debug!(scope = %self.label, missing = selection.missing(), round = rounds, "offline backfill");
            machine.advance(ScopeState::Generating(GenerationMode::Offline))?;
            machine.advance(ScopeState::Validating)?;
            for (category, missing) in &selection.shortfall {
                let cursor = cursors.entry(*category).or_default();
                let drawn = self.ctx.draw_offline(*category, *missing, self.columns, self.context, cursor);
                for candidate in drawn {
                    let mut scored = self.score(candidate, &mut next_ordinal);
                    scored.degraded = !scored.accepted;
                    pool.push(scored);
                }
            }
            machine.advance(ScopeState::Enforcing)?;
            selection = self.enforcer.select(pool.clone(), &quota);
        }

        let questions = selection.questions;
        if questions.len() != requested {
            error!(
                scope = %self.label,
                expected = requested,
                actual = questions.len(),
                "question count invariant violated"
            );
            return Err(InquestError::CountInvariant {
                scope: self.label,
                expected: requested,
                actual: questions.len(),
            });
        }

        machine.advance(ScopeState::Done)?;
        let degraded = questions.iter().filter(|q| q.degraded).count();
        if degraded > 0 {
            warn!(scope = %self.label, degraded, "question set includes degraded questions");
        }
        debug!(
            scope = %self.label,
            questions = questions.len(),
            backfilled = selection.backfilled,
            duplicates = selection.duplicates_removed,
            "scope complete"
        );

        Ok(QuestionSet {
            scope: self.scope,
            requested_count: requested,
            questions,
            quota,
            history: machine.into_history(),
            fallback_engaged: self.ctx.fallback().is_engaged(),
        })
    }

    /// Over-generate every category concurrently, then score the results
    /// with ordinals assigned in category order.
    async fn initial_pool(
        &self,
        quota: &Quota,
        machine: &mut ScopeMachine,
        next_ordinal: &mut usize,
    ) -> Result<(Vec<ScoredQuestion>, IndexMap<QuestionCategory, DrawCursor>)> {
        let generation = &self.ctx.config().generation;
        let (factor, min_extra) = (generation.overgeneration_factor, generation.min_extra);

        let start = self.ctx.mode();
        machine.advance(ScopeState::Generating(start))?;

        let draws = join_all(quota.iter().filter(|(_, n)| *n > 0).map(|(category, wanted)| async move {
            let target = overgeneration_target(wanted, factor, min_extra);
            let mut cursor = DrawCursor::default();
            let drawn = self
                .ctx
                .draw(&self.label, category, target, self.columns, self.context, &mut cursor)
                .await;
            (category, drawn, cursor)
        }))
        .await;

        machine.advance(ScopeState::Generating(self.ctx.mode()))?;
        machine.advance(ScopeState::Validating)?;

        let mut pool = Vec::new();
        let mut cursors = IndexMap::new();
        for (category, drawn, cursor) in draws {
            debug!(scope = %self.label, category = %category, drawn = drawn.len(), "candidates drawn");
            cursors.insert(category, cursor);
            pool.extend(drawn.into_iter().map(|c| self.score(c, next_ordinal)));
        }
        Ok((pool, cursors))
    }

    /// Ask for one more candidate at a time until each category has enough
    /// accepted questions or runs out of retries, then mark the best
    /// rejected ones as degraded.
    async fn retry_and_degrade(
        &self,
        quota: &Quota,
        pool: &mut Vec<ScoredQuestion>,
        cursors: &mut IndexMap<QuestionCategory, DrawCursor>,
        machine: &mut ScopeMachine,
        next_ordinal: &mut usize,
    ) -> Result<()> {
        let max_retries = self.validator.config().max_retries;

        for (category, wanted) in quota.iter().filter(|(_, n)| *n > 0) {
            let mut accepted: HashSet<String> = pool
                .iter()
                .filter(|q| q.category() == category && q.accepted)
                .map(|q| q.question.normalized_text())
                .collect();

            let mut attempts = 0;
            while accepted.len() < wanted && attempts < max_retries {
                attempts += 1;
                machine.advance(ScopeState::Generating(self.ctx.mode()))?;
                let cursor = cursors.entry(category).or_default();
                let drawn = self
                    .ctx
                    .draw(&self.label, category, 1, self.columns, self.context, cursor)
                    .await;
                machine.advance(ScopeState::Generating(self.ctx.mode()))?;
                machine.advance(ScopeState::Validating)?;

                for candidate in drawn {
                    let scored = self.score(candidate, next_ordinal);
                    if scored.accepted {
                        accepted.insert(scored.question.normalized_text());
                    }
                    pool.push(scored);
                }
            }

            let missing = wanted.saturating_sub(accepted.len());
            if missing > 0 {
                let degraded = degrade_best(pool, category, missing);
                warn!(
                    scope = %self.label,
                    category = %category,
                    attempts,
                    degraded,
                    "accepting below-threshold questions after retries"
                );
            }
        }
        Ok(())
    }

    fn score(&self, mut candidate: CandidateQuestion, next_ordinal: &mut usize) -> ScoredQuestion {
        candidate.ordinal = *next_ordinal;
        *next_ordinal += 1;
        self.validator.score(candidate, self.has_temporal)
    }
}

/// Flag the `count` best rejected, not yet degraded candidates of a
/// category. Returns how many were flagged.
fn degrade_best(pool: &mut [ScoredQuestion], category: QuestionCategory, count: usize) -> usize {
    let mut indices: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(_, q)| q.category() == category && !q.accepted && !q.degraded)
        .map(|(i, _)| i)
        .collect();
    indices.sort_by(|&a, &b| {
        pool[b]
            .aggregate_score
            .total_cmp(&pool[a].aggregate_score)
            .then(pool[a].question.ordinal.cmp(&pool[b].question.ordinal))
    });

    let mut seen = HashSet::new();
    let mut flagged = 0;
    for i in indices {
        if flagged == count {
            break;
        }
        if seen.insert(pool[i].question.normalized_text()) {
            pool[i].degraded = true;
            flagged += 1;
        }
    }
    flagged
}
