//! Exact-count selection from a scored candidate pool.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use super::allocator::Quota;
use crate::generation::QuestionCategory;
use crate::scoring::ScoredQuestion;

/// Outcome of one selection pass.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Chosen questions in final order.
    pub questions: Vec<ScoredQuestion>,
    /// Candidates still missing per category: texts lost to another
    /// category, plus deficits cross-category backfill could not cover.
    pub shortfall: IndexMap<QuestionCategory, usize>,
    /// Questions taken from another category's surplus.
    pub backfilled: usize,
    /// Candidates discarded as duplicates.
    pub duplicates_removed: usize,
}

impl Selection {
    pub fn is_complete(&self) -> bool {
        self.shortfall.is_empty()
    }

    pub fn missing(&self) -> usize {
        self.shortfall.values().sum()
    }
}

/// Reconciles scored candidates with a quota.
///
/// 1. Duplicates by normalized text are dropped; the earliest ordinal wins.
/// 2. Each category keeps its best eligible candidates up to its quota.
/// 3. A deficit left only because another category claimed the same text
///    is reported as shortfall so it gets refilled from the same category.
/// 4. Other deficits are filled from other categories' leftovers, best
///    first.
/// 5. Anything still missing is reported as a per-category shortfall.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountEnforcer;

impl CountEnforcer {
    pub fn new() -> Self {
        Self
    }

    pub fn select(&self, pool: Vec<ScoredQuestion>, quota: &Quota) -> Selection {
        let before = pool.len();
        let distinct = distinct_eligible(&pool);
        let unique = dedupe(pool);
        let duplicates_removed = before - unique.len();

        let mut by_category: IndexMap<QuestionCategory, Vec<ScoredQuestion>> =
            QuestionCategory::ALL.iter().map(|c| (*c, Vec::new())).collect();
        for question in unique.into_iter().filter(ScoredQuestion::is_eligible) {
            by_category.entry(question.category()).or_default().push(question);
        }

        let mut selected = Vec::with_capacity(quota.total());
        let mut leftovers = Vec::new();
        let mut deficits: IndexMap<QuestionCategory, usize> = IndexMap::new();
        let mut shortfall: IndexMap<QuestionCategory, usize> = IndexMap::new();

        for (category, wanted) in quota.iter() {
            let mut candidates = by_category.shift_remove(&category).unwrap_or_default();
            candidates.sort_by(by_score);
            let surplus = candidates.split_off(wanted.min(candidates.len()));
            let kept = candidates.len();
            if kept < wanted {
                let reachable = wanted.min(distinct.get(&category).copied().unwrap_or(0));
                let lost_to_duplicates = reachable.saturating_sub(kept);
                if lost_to_duplicates > 0 {
                    shortfall.insert(category, lost_to_duplicates);
                }
                let unfilled = wanted - kept - lost_to_duplicates;
                if unfilled > 0 {
                    deficits.insert(category, unfilled);
                }
            }
            selected.extend(candidates);
            leftovers.extend(surplus);
        }

        leftovers.sort_by(by_score);
        let mut leftovers = leftovers.into_iter();
        let mut backfilled = 0;
        for (category, missing) in deficits {
            let taken: Vec<ScoredQuestion> = leftovers.by_ref().take(missing).collect();
            backfilled += taken.len();
            if taken.len() < missing {
                *shortfall.entry(category).or_default() += missing - taken.len();
            }
            selected.extend(taken);
        }

        selected.sort_by(final_order);

        debug!(
            selected = selected.len(),
            backfilled,
            duplicates_removed,
            missing = shortfall.values().sum::<usize>(),
            "selection pass"
        );

        Selection {
            questions: selected,
            shortfall,
            backfilled,
            duplicates_removed,
        }
    }
}

/// Distinct eligible texts per category, ignoring other categories.
fn distinct_eligible(pool: &[ScoredQuestion]) -> HashMap<QuestionCategory, usize> {
    let mut texts: HashMap<QuestionCategory, HashSet<String>> = HashMap::new();
    for question in pool.iter().filter(|q| q.is_eligible()) {
        texts
            .entry(question.category())
            .or_default()
            .insert(question.question.normalized_text());
    }
    texts.into_iter().map(|(c, t)| (c, t.len())).collect()
}

fn dedupe(mut pool: Vec<ScoredQuestion>) -> Vec<ScoredQuestion> {
    pool.sort_by_key(|q| q.question.ordinal);
    let mut seen = HashSet::new();
    pool.retain(|q| seen.insert(q.question.normalized_text()));
    pool
}

/// Score descending, then earliest ordinal.
fn by_score(a: &ScoredQuestion, b: &ScoredQuestion) -> Ordering {
    b.aggregate_score
        .total_cmp(&a.aggregate_score)
        .then(a.question.ordinal.cmp(&b.question.ordinal))
}

/// Category order, then score descending, then ordinal.
fn final_order(a: &ScoredQuestion, b: &ScoredQuestion) -> Ordering {
    a.category().cmp(&b.category()).then_with(|| by_score(a, b))
}
