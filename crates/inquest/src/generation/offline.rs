//! Deterministic template-based question generation.
//!
//! Candidate `k` of a category is a pure function of `k` and the scope:
//! `k` selects a template, a column (or column pair) and a cycle. The cycle
//! only changes the time-window phrase, so the sequence never repeats and
//! never runs out.

use std::borrow::Cow;
use std::collections::BTreeSet;

use async_trait::async_trait;

use super::candidate::{CandidateQuestion, ColumnRef, Origin};
use super::category::QuestionCategory;
use super::strategy::{GenerationRequest, QuestionStrategy};
use crate::error::GenerationError;
use crate::profile::{ColumnKind, ColumnProfile};

/// Time-window phrases, one per cycle. Later cycles count periods instead.
const WINDOWS: &[&str] = &[
    "over the full reporting period",
    "year over year",
    "in the most recent quarter",
    "month over month",
    "over the last 12 months",
];

/// Placeholder used when no partner column exists.
const FALLBACK_PARTNER: &str = "segment";

/// Placeholder used when the scope has no temporal column.
const FALLBACK_TIME: &str = "reporting periods";

fn single_templates(category: QuestionCategory) -> &'static [&'static str] {
    match category {
        QuestionCategory::Descriptive => &[
            "How is {col} distributed {window}, and which {other} values should be prioritised because they hold the highest share of the total for {objective}?",
            "What are the average, minimum and maximum {col} {window}, and which outliers should be prioritised for {objective}?",
            "Which {other} values show the highest median {col} {window}, and what percentage of records do they represent when assessing {objective}?",
            "How concentrated is {col} {window}, and what share of the total comes from the top 10 {other} values when evaluating {objective}?",
            "Quantify the typical range of {col} {window}: which {other} groups fall below the average and need attention for {objective}?",
        ],
        QuestionCategory::Comparative => &[
            "How does the average {col} compare across {other} groups {window}, and which group should be prioritised for {objective}?",
            "Which {other} has the highest versus lowest {col} {window}, and how large is the percentage gap that matters for {objective}?",
            "How does {col} {window} compare with the prior period for each {other}, and where should {objective} efforts focus?",
            "Rank {other} groups by total {col} {window}: which rank above the overall average and what does that imply for {objective}?",
        ],
        QuestionCategory::Pattern => &[
            "Identify the trend in {col} across {time} {window}: where does the growth rate accelerate or decline in ways that affect {objective}?",
            "How large is the seasonal peak-to-trough change in {col} across {time} {window}, and how should it be forecast for {objective}?",
            "Where do anomalies in {col} occur {window}, measured as deviations of more than two standard deviations from the average, and how do they affect {objective}?",
            "How volatile is {col} {window}, and which {other} groups show the most consistent growth to prioritise for {objective}?",
        ],
        QuestionCategory::BusinessImpact => &[
            "How would a 10% increase in {col} {window} affect total performance, and which {other} groups should be prioritised for {objective}?",
            "Which {other} groups contribute the highest share of {col} {window}, and what decisions would improve {objective}?",
            "Quantify the financial impact of the gap between the highest and lowest {col} {window} per {other}: what does it mean for {objective}?",
            "Where should resources be reallocated to optimise {col} {window}, based on the return ratio by {other} and the goal of {objective}?",
        ],
        QuestionCategory::RelationshipDiscovery => &[
            "Determine how strongly {col} correlates with {other} {window}: does the relationship change in ways that matter for {objective}?",
            "Which factors drive changes in {col} {window}, and what is the correlation between {col} and {other} when assessing {objective}?",
            "Does higher {other} predict higher {col} {window}, and by what ratio does {col} change per unit of {other} for {objective}?",
            "How does the correlation between {col} and {other} differ across {time} {window}, and what does it help identify for {objective}?",
        ],
    }
}

fn comparison_templates(category: QuestionCategory) -> &'static [&'static str] {
    match category {
        QuestionCategory::Descriptive => &[
            "How does the average {a_col} in {a} compare with the average {b_col} in {b} {window}, and what ratio separates them for {objective}?",
            "What share of the combined total do {a_col} in {a} and {b_col} in {b} represent {window}, and which should be prioritised for {objective}?",
        ],
        QuestionCategory::Comparative => &[
            "How does {a_col} in {a} compare with {b_col} in {b} {window}, and which dataset shows the higher growth rate for {objective}?",
            "Rank the gap between {a_col} in {a} and {b_col} in {b} {window}: where is the percentage difference largest for {objective}?",
        ],
        QuestionCategory::Pattern => &[
            "Do trends in {a_col} from {a} and {b_col} from {b} move together {window}, and where do their growth rates diverge in ways that affect {objective}?",
            "Identify which seasonal peaks in {a_col} ({a}) coincide with peaks in {b_col} ({b}) {window}, measured by average change, for {objective}?",
        ],
        QuestionCategory::BusinessImpact => &[
            "How would improving {a_col} in {a} by 10% affect {b_col} in {b} {window}, and which decision best supports {objective}?",
            "Which combination of {a_col} in {a} and {b_col} in {b} {window} indicates the highest financial risk, and how should it be prioritised for {objective}?",
        ],
        QuestionCategory::RelationshipDiscovery => &[
            "How strongly does {a_col} in {a} correlate with {b_col} in {b} {window}, and does the relationship predict future {objective} outcomes?",
            "Which drivers link {a_col} in {a} to {b_col} in {b} {window}: quantify the correlation and rank its strength for {objective}?",
        ],
    }
}

/// Window phrase for a cycle; distinct for every cycle.
fn window_phrase(cycle: usize) -> Cow<'static, str> {
    match WINDOWS.get(cycle) {
        Some(w) => Cow::Borrowed(w),
        None => Cow::Owned(format!("across the latest {} periods", cycle - WINDOWS.len() + 2)),
    }
}

/// Usable columns of a dataset ordered by relevance to the category, then
/// by position.
fn ranked_columns(category: QuestionCategory, profiles: &[ColumnProfile]) -> Vec<&ColumnProfile> {
    let mut ranked: Vec<(usize, &ColumnProfile)> = profiles
        .iter()
        .enumerate()
        .filter(|(_, p)| p.is_usable())
        .collect();
    ranked.sort_by(|(ia, a), (ib, b)| {
        category
            .kind_relevance(b.declared_kind)
            .cmp(&category.kind_relevance(a.declared_kind))
            .then(ia.cmp(ib))
    });
    ranked.into_iter().map(|(_, p)| p).collect()
}

/// The second column a single-dataset template talks about.
fn partner<'a>(
    category: QuestionCategory,
    primary: &ColumnProfile,
    ranked: &[&'a ColumnProfile],
) -> Option<&'a ColumnProfile> {
    let others = || ranked.iter().copied().filter(|p| p.name != primary.name);
    let grouping = |p: &&ColumnProfile| {
        matches!(p.declared_kind, ColumnKind::Categorical | ColumnKind::Geographic)
    };
    let secondary_grouping = |p: &&ColumnProfile| p.declared_kind.is_grouping();

    let preferred = if category == QuestionCategory::RelationshipDiscovery {
        others().find(|p| p.declared_kind.is_quantitative())
    } else {
        others().find(grouping)
    };

    preferred
        .or_else(|| others().find(secondary_grouping))
        .or_else(|| others().find(|p| !p.is_temporal()))
        .or_else(|| others().next())
}

/// Template-based strategy. Never fails and never runs out of candidates.
#[derive(Debug, Clone, Default)]
pub struct OfflineStrategy;

impl OfflineStrategy {
    pub fn new() -> Self {
        Self
    }

    /// Candidates `offset..offset + count` of the request's category.
    pub fn candidates(&self, request: &GenerationRequest<'_>) -> Vec<CandidateQuestion> {
        (request.offset..request.offset + request.count)
            .filter_map(|k| self.candidate(request, k))
            .collect()
    }

    /// Candidate `k`; `None` only when the scope has no usable column.
    pub fn candidate(&self, request: &GenerationRequest<'_>, k: usize) -> Option<CandidateQuestion> {
        if request.is_comparison() {
            self.comparison_candidate(request, k)
        } else {
            self.single_candidate(request, k)
        }
    }

    fn single_candidate(&self, request: &GenerationRequest<'_>, k: usize) -> Option<CandidateQuestion> {
        let ds = request.scope.first()?;
        let ranked = ranked_columns(request.category, ds.profiles);
        if ranked.is_empty() {
            return None;
        }
        let templates = single_templates(request.category);

        let cycle_len = templates.len() * ranked.len();
        let cycle = k / cycle_len;
        let j = k % cycle_len;
        let template = templates[j % templates.len()];
        let primary = ranked[j / templates.len()];

        let other = partner(request.category, primary, &ranked);
        let time = ranked.iter().find(|p| p.is_temporal() && p.name != primary.name);

        let mut refs = BTreeSet::from([ColumnRef::new(ds.dataset, &primary.name)]);
        if template.contains("{other}")
            && let Some(other) = other
        {
            refs.insert(ColumnRef::new(ds.dataset, &other.name));
        }
        if template.contains("{time}")
            && let Some(time) = time
        {
            refs.insert(ColumnRef::new(ds.dataset, &time.name));
        }

        let text = template
            .replace("{col}", &primary.name)
            .replace("{other}", other.map_or(FALLBACK_PARTNER, |p| p.name.as_str()))
            .replace("{time}", time.map_or(FALLBACK_TIME, |p| p.name.as_str()))
            .replace("{window}", &window_phrase(cycle))
            .replace("{objective}", request.context.objective(k));

        Some(CandidateQuestion {
            text,
            category: request.category,
            referenced_columns: refs,
            origin: Origin::Offline,
            ordinal: k,
        })
    }

    fn comparison_candidate(&self, request: &GenerationRequest<'_>, k: usize) -> Option<CandidateQuestion> {
        let ranked: Vec<(&str, Vec<&ColumnProfile>)> = request
            .scope
            .iter()
            .map(|ds| (ds.dataset, ranked_columns(request.category, ds.profiles)))
            .filter(|(_, cols)| !cols.is_empty())
            .collect();

        let slots = comparison_slots(&ranked);
        if slots.is_empty() {
            return None;
        }
        let templates = comparison_templates(request.category);

        let cycle_len = templates.len() * slots.len();
        let cycle = k / cycle_len;
        let j = k % cycle_len;
        let template = templates[j % templates.len()];
        let (ia, a, ib, b) = slots[j / templates.len()];
        let (ds_a, col_a) = (ranked[ia].0, ranked[ia].1[a]);
        let (ds_b, col_b) = (ranked[ib].0, ranked[ib].1[b]);

        let text = template
            .replace("{a_col}", &col_a.name)
            .replace("{b_col}", &col_b.name)
            .replace("{a}", ds_a)
            .replace("{b}", ds_b)
            .replace("{window}", &window_phrase(cycle))
            .replace("{objective}", request.context.objective(k));

        Some(CandidateQuestion {
            text,
            category: request.category,
            referenced_columns: BTreeSet::from([
                ColumnRef::new(ds_a, &col_a.name),
                ColumnRef::new(ds_b, &col_b.name),
            ]),
            origin: Origin::Offline,
            ordinal: k,
        })
    }
}

/// Every (dataset A, column of A, dataset B, column of B) combination over
/// dataset pairs, best-ranked columns first and pairs interleaved.
fn comparison_slots(ranked: &[(&str, Vec<&ColumnProfile>)]) -> Vec<(usize, usize, usize, usize)> {
    let mut slots = Vec::new();
    for ia in 0..ranked.len() {
        for ib in ia + 1..ranked.len() {
            for a in 0..ranked[ia].1.len() {
                for b in 0..ranked[ib].1.len() {
                    slots.push((ia, a, ib, b));
                }
            }
        }
    }
    slots.sort_by_key(|&(ia, a, ib, b)| (a + b, a, ia, ib));
    slots
}

#[async_trait]
impl QuestionStrategy for OfflineStrategy {
    async fn generate(
        &self,
        request: &GenerationRequest<'_>,
    ) -> Result<Vec<CandidateQuestion>, GenerationError> {
        Ok(self.candidates(request))
    }

    fn origin(&self) -> Origin {
        Origin::Offline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::DatasetColumns;
    use crate::input::AnalysisContext;
    use crate::profile::ColumnAnalyzer;
    use std::collections::HashSet;

    fn sample_profiles() -> Vec<ColumnProfile> {
        let analyzer = ColumnAnalyzer::new();
        vec![
            analyzer.analyze_column("year", &["2021", "2022", "2023"]),
            analyzer.analyze_column("region", &["north", "south", "east"]),
            analyzer.analyze_column("revenue", &["100", "250", "175"]),
            analyzer.analyze_column("units", &["10", "12", "9"]),
        ]
    }

    fn request<'a>(
        category: QuestionCategory,
        count: usize,
        offset: usize,
        scope: &'a [DatasetColumns<'a>],
        context: &'a AnalysisContext,
    ) -> GenerationRequest<'a> {
        GenerationRequest {
            category,
            count,
            scope,
            context,
            offset,
        }
    }

    #[test]
    fn test_window_phrases_are_distinct() {
        let phrases: HashSet<String> = (0..50).map(|c| window_phrase(c).into_owned()).collect();
        assert_eq!(phrases.len(), 50);
    }

    #[test]
    fn test_business_impact_ranks_financial_first() {
        let profiles = sample_profiles();
        let ranked = ranked_columns(QuestionCategory::BusinessImpact, &profiles);
        assert_eq!(ranked[0].name, "revenue");
    }

    #[test]
    fn test_candidates_are_deterministic_and_distinct() {
        let profiles = sample_profiles();
        let scope = [DatasetColumns { dataset: "sales.csv", profiles: &profiles }];
        let context = AnalysisContext::new("retail analytics").with_objective("pricing strategy");
        let strategy = OfflineStrategy::new();

        for category in QuestionCategory::ALL {
            let first = strategy.candidates(&request(category, 200, 0, &scope, &context));
            let again = strategy.candidates(&request(category, 200, 0, &scope, &context));
            assert_eq!(first, again);

            let texts: HashSet<&str> = first.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(texts.len(), 200, "{category} repeated a text");
            assert!(first.iter().all(|c| !c.referenced_columns.is_empty()));
            assert!(first.iter().all(|c| c.origin == Origin::Offline));
        }
    }

    #[test]
    fn test_offset_continues_sequence() {
        let profiles = sample_profiles();
        let scope = [DatasetColumns { dataset: "sales.csv", profiles: &profiles }];
        let context = AnalysisContext::default();
        let strategy = OfflineStrategy::new();

        let all = strategy.candidates(&request(QuestionCategory::Pattern, 10, 0, &scope, &context));
        let tail = strategy.candidates(&request(QuestionCategory::Pattern, 4, 6, &scope, &context));
        assert_eq!(&all[6..], &tail[..]);
    }

    #[test]
    fn test_single_column_scope() {
        let analyzer = ColumnAnalyzer::new();
        let profiles = vec![analyzer.analyze_column("score", &["1", "2"])];
        let scope = [DatasetColumns { dataset: "s", profiles: &profiles }];
        let context = AnalysisContext::default();
        let out = OfflineStrategy::new()
            .candidates(&request(QuestionCategory::Comparative, 6, 0, &scope, &context));
        assert_eq!(out.len(), 6);
        assert!(out[0].text.contains("segment"));
    }

    #[test]
    fn test_comparison_references_both_datasets() {
        let analyzer = ColumnAnalyzer::new();
        let a = vec![
            analyzer.analyze_column("total_assets", &["1", "2"]),
            analyzer.analyze_column("year", &["2020", "2021"]),
        ];
        let b = vec![analyzer.analyze_column("total_liabilities", &["3", "4"])];
        let scope = [
            DatasetColumns { dataset: "Assets", profiles: &a },
            DatasetColumns { dataset: "Liabilities", profiles: &b },
        ];
        let context = AnalysisContext::default();
        let strategy = OfflineStrategy::new();

        for category in QuestionCategory::ALL {
            let out = strategy.candidates(&request(category, 30, 0, &scope, &context));
            let texts: HashSet<&str> = out.iter().map(|c| c.text.as_str()).collect();
            assert_eq!(texts.len(), 30);
            for c in &out {
                let datasets = c.datasets();
                assert!(datasets.contains("Assets") && datasets.contains("Liabilities"));
            }
        }
    }

    #[test]
    fn test_empty_scope_yields_nothing() {
        let analyzer = ColumnAnalyzer::new();
        let profiles = vec![analyzer.analyze_column("blank", &["", ""])];
        let scope = [DatasetColumns { dataset: "s", profiles: &profiles }];
        let context = AnalysisContext::default();
        let out = OfflineStrategy::new()
            .candidates(&request(QuestionCategory::Descriptive, 3, 0, &scope, &context));
        assert!(out.is_empty());
    }
}
