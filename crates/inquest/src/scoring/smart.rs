//! SMART scoring of candidate questions.
//!
//! Each candidate gets five component scores in `[0, 1]` from lexical
//! heuristics over its text, its referenced columns and the analysis
//! context. The aggregate is a weighted sum compared against a threshold.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::generation::{CandidateQuestion, ColumnRef, QuestionCategory};
use crate::input::AnalysisContext;

/// Quantitative and comparative vocabulary. A trailing `*` matches any word
/// with that prefix; other entries match the word or its plural.
const MEASURABLE_TERMS: &[&str] = &[
    "accelerat*", "averag*", "chang*", "compar*", "concentrat*", "correlat*", "declin*",
    "decreas*", "deviat*", "differ*", "distribut*", "grow*", "increas*", "percent*",
    "proportion*", "varian*", "volatil*", "count", "gap", "growth", "higher", "highest",
    "largest", "lower", "lowest", "maximum", "mean", "median", "minimum", "outlier", "peak",
    "range", "rank", "rate", "ratio", "share", "smallest", "sum", "total", "trend", "versus",
    "vs",
];

/// Analytical verbs.
const ACTION_TERMS: &[&str] = &[
    "allocat*", "assess*", "compar*", "decid*", "decision*", "detect*", "determin*",
    "evaluat*", "forecast*", "identif*", "improv*", "measur*", "optimi*", "predict*",
    "prioriti*", "quantif*", "reallocat*", "reduc*", "focus", "rank",
];

/// Openings that only ask for a description.
const DESCRIPTIVE_OPENINGS: &[&str] = &["what is", "list", "describe", "show"];

const GENERIC_PHRASES: &[&str] = &["the data", "this dataset", "the dataset", "these data"];

const TEMPORAL_TERMS: &[&str] = &[
    "annual*", "month*", "period*", "quarter*", "season*", "week*", "year*", "daily",
    "latest", "prior", "recent", "ytd", "q1", "q2", "q3", "q4",
];

/// The five SMART criteria.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SmartCriterion {
    Specificity,
    Measurability,
    Actionability,
    Relevance,
    TimeBound,
}

impl SmartCriterion {
    pub const ALL: [SmartCriterion; 5] = [
        SmartCriterion::Specificity,
        SmartCriterion::Measurability,
        SmartCriterion::Actionability,
        SmartCriterion::Relevance,
        SmartCriterion::TimeBound,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            SmartCriterion::Specificity => "Specific",
            SmartCriterion::Measurability => "Measurable",
            SmartCriterion::Actionability => "Action-oriented",
            SmartCriterion::Relevance => "Relevant",
            SmartCriterion::TimeBound => "Time-bound",
        }
    }
}

impl fmt::Display for SmartCriterion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Component scores, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SmartScores {
    pub specificity: f64,
    pub measurability: f64,
    pub actionability: f64,
    pub relevance: f64,
    pub time_bound: f64,
}

impl SmartScores {
    pub fn get(&self, criterion: SmartCriterion) -> f64 {
        match criterion {
            SmartCriterion::Specificity => self.specificity,
            SmartCriterion::Measurability => self.measurability,
            SmartCriterion::Actionability => self.actionability,
            SmartCriterion::Relevance => self.relevance,
            SmartCriterion::TimeBound => self.time_bound,
        }
    }

    /// Weighted sum; `weights` are normalised first.
    pub fn aggregate(&self, weights: &SmartWeights) -> f64 {
        let w = weights.normalized();
        SmartCriterion::ALL
            .iter()
            .map(|c| self.get(*c) * w.get(*c))
            .sum()
    }
}

/// Relative weight of each criterion.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmartWeights {
    pub specificity: f64,
    pub measurability: f64,
    pub actionability: f64,
    pub relevance: f64,
    pub time_bound: f64,
}

impl Default for SmartWeights {
    fn default() -> Self {
        Self {
            specificity: 0.2,
            measurability: 0.2,
            actionability: 0.2,
            relevance: 0.2,
            time_bound: 0.2,
        }
    }
}

impl SmartWeights {
    pub fn get(&self, criterion: SmartCriterion) -> f64 {
        match criterion {
            SmartCriterion::Specificity => self.specificity,
            SmartCriterion::Measurability => self.measurability,
            SmartCriterion::Actionability => self.actionability,
            SmartCriterion::Relevance => self.relevance,
            SmartCriterion::TimeBound => self.time_bound,
        }
    }

    /// Weights scaled to sum to 1. Negative weights count as zero; all-zero
    /// weights fall back to equal weighting.
    pub fn normalized(&self) -> SmartWeights {
        let clamp = |w: f64| if w.is_finite() { w.max(0.0) } else { 0.0 };
        let raw = [
            clamp(self.specificity),
            clamp(self.measurability),
            clamp(self.actionability),
            clamp(self.relevance),
            clamp(self.time_bound),
        ];
        let total: f64 = raw.iter().sum();
        if total <= f64::EPSILON {
            return SmartWeights::default();
        }
        SmartWeights {
            specificity: raw[0] / total,
            measurability: raw[1] / total,
            actionability: raw[2] / total,
            relevance: raw[3] / total,
            time_bound: raw[4] / total,
        }
    }
}

/// Scoring configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub weights: SmartWeights,
    /// Minimum aggregate score for acceptance.
    pub threshold: f64,
    /// Extra candidates requested per category before accepting the best
    /// remaining ones as degraded.
    pub max_retries: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: SmartWeights::default(),
            threshold: 0.7,
            max_retries: 3,
        }
    }
}

/// A candidate with its SMART scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredQuestion {
    #[serde(flatten)]
    pub question: CandidateQuestion,
    pub scores: SmartScores,
    pub aggregate_score: f64,
    /// Met the threshold.
    pub accepted: bool,
    /// Kept below the threshold after retries ran out.
    pub degraded: bool,
}

impl ScoredQuestion {
    pub fn text(&self) -> &str {
        &self.question.text
    }

    pub fn category(&self) -> QuestionCategory {
        self.question.category
    }

    pub fn referenced_columns(&self) -> &BTreeSet<ColumnRef> {
        &self.question.referenced_columns
    }

    /// Whether the enforcer may select it.
    pub fn is_eligible(&self) -> bool {
        self.accepted || self.degraded
    }
}

/// Scores candidates against one analysis context.
#[derive(Debug, Clone)]
pub struct SmartValidator {
    config: ScoringConfig,
    weights: SmartWeights,
    keywords: Vec<String>,
}

impl SmartValidator {
    pub fn new(config: ScoringConfig, context: &AnalysisContext) -> Self {
        Self {
            weights: config.weights.normalized(),
            keywords: context.keywords(),
            config,
        }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    pub fn threshold(&self) -> f64 {
        self.config.threshold
    }

    /// Score a candidate. `has_temporal` says whether the scope has a
    /// temporal column.
    pub fn score(&self, question: CandidateQuestion, has_temporal: bool) -> ScoredQuestion {
        let scores = self.score_text(&question.text, question.referenced_columns.len(), has_temporal);
        let aggregate_score = scores.aggregate(&self.weights);
        ScoredQuestion {
            question,
            scores,
            aggregate_score,
            accepted: aggregate_score >= self.config.threshold,
            degraded: false,
        }
    }

    /// Component scores for a question text referencing `column_refs`
    /// real columns.
    pub fn score_text(&self, text: &str, column_refs: usize, has_temporal: bool) -> SmartScores {
        let lower = text.to_lowercase();
        let words = words(&lower);
        let has_digit = lower.chars().any(|c| c.is_ascii_digit());

        SmartScores {
            specificity: specificity(&lower, column_refs, has_digit),
            measurability: measurability(&words, has_digit),
            actionability: actionability(&lower, &words),
            relevance: self.relevance(&words),
            time_bound: time_bound(&lower, &words, has_temporal),
        }
    }

    fn relevance(&self, words: &[&str]) -> f64 {
        if self.keywords.is_empty() {
            return 0.7;
        }
        let matches = self
            .keywords
            .iter()
            .filter(|k| words.iter().any(|w| keyword_matches(k, w)))
            .count();
        if matches == 0 {
            0.2
        } else {
            (0.3 + 0.25 * matches as f64).min(1.0)
        }
    }
}

fn words(lower: &str) -> Vec<&str> {
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect()
}

/// Match a vocabulary entry against one word.
fn term_matches(term: &str, word: &str) -> bool {
    match term.strip_suffix('*') {
        Some(stem) => word.starts_with(stem),
        None => {
            word == term
                || word.strip_suffix("es") == Some(term)
                || word.strip_suffix('s') == Some(term)
        }
    }
}

fn keyword_matches(keyword: &str, word: &str) -> bool {
    word.starts_with(keyword) || (word.len() >= 5 && keyword.starts_with(word))
}

fn term_hits(words: &[&str], terms: &[&str]) -> usize {
    words
        .iter()
        .filter(|w| terms.iter().any(|t| term_matches(t, w)))
        .count()
}

fn specificity(lower: &str, column_refs: usize, has_digit: bool) -> f64 {
    if column_refs == 0 {
        return 0.1;
    }
    let mut score = (0.4 + 0.3 * column_refs as f64).min(1.0);
    if has_digit {
        score += 0.1;
    }
    if GENERIC_PHRASES.iter().any(|p| lower.contains(p)) {
        score -= 0.1;
    }
    score.clamp(0.0, 1.0)
}

fn measurability(words: &[&str], has_digit: bool) -> f64 {
    let hits = term_hits(words, MEASURABLE_TERMS) + usize::from(has_digit);
    if hits == 0 {
        0.1
    } else {
        (0.2 + 0.25 * hits as f64).min(1.0)
    }
}

fn actionability(lower: &str, words: &[&str]) -> f64 {
    let hits = term_hits(words, ACTION_TERMS);
    if hits > 0 {
        return 0.3 + 0.35 * hits.min(2) as f64;
    }
    if DESCRIPTIVE_OPENINGS.iter().any(|p| lower.trim_start().starts_with(p)) {
        0.2
    } else {
        0.4
    }
}

fn time_bound(lower: &str, words: &[&str], has_temporal: bool) -> f64 {
    if !has_temporal {
        return 0.7;
    }
    let year = |w: &&str| w.len() == 4 && (w.starts_with("19") || w.starts_with("20")) && w.chars().all(|c| c.is_ascii_digit());
    if term_hits(words, TEMPORAL_TERMS) > 0 || words.iter().any(year) || lower.contains("over time") {
        1.0
    } else {
        0.3
    }
}
