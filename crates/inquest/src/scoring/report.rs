//! Quality summary of a question set.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::smart::{ScoredQuestion, SmartCriterion};
use crate::generation::QuestionCategory;

/// A component score at or above this counts as covering the criterion.
const COVERAGE_SCORE: f64 = 0.6;

/// Criteria covered by fewer questions than this share get a recommendation.
const COVERAGE_TARGET: f64 = 0.8;

/// Overall quality band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualityRating {
    Excellent,
    Good,
    Acceptable,
    NeedsImprovement,
}

impl QualityRating {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            QualityRating::Excellent
        } else if score >= 0.7 {
            QualityRating::Good
        } else if score >= 0.6 {
            QualityRating::Acceptable
        } else {
            QualityRating::NeedsImprovement
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QualityRating::Excellent => "Excellent",
            QualityRating::Good => "Good",
            QualityRating::Acceptable => "Acceptable",
            QualityRating::NeedsImprovement => "Needs improvement",
        }
    }
}

impl std::fmt::Display for QualityRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Aggregate quality figures for one set of scored questions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    pub total_questions: usize,
    pub average_score: f64,
    /// Questions at or above the acceptance threshold.
    pub high_quality_count: usize,
    pub degraded_count: usize,
    pub best_question: Option<String>,
    /// Share of questions scoring at least 0.6 on each criterion.
    pub smart_coverage: IndexMap<SmartCriterion, f64>,
    /// Normalised entropy of the category mix, in `[0, 1]`.
    pub diversity_score: f64,
    pub recommendations: Vec<String>,
    pub rating: QualityRating,
}

impl QualityReport {
    pub fn from_questions(questions: &[ScoredQuestion], threshold: f64) -> Self {
        let total = questions.len();
        let average_score = if total == 0 {
            0.0
        } else {
            questions.iter().map(|q| q.aggregate_score).sum::<f64>() / total as f64
        };

        let best_question = questions
            .iter()
            .max_by(|a, b| {
                a.aggregate_score
                    .total_cmp(&b.aggregate_score)
                    .then(b.question.ordinal.cmp(&a.question.ordinal))
            })
            .map(|q| q.text().to_string());

        let smart_coverage: IndexMap<SmartCriterion, f64> = SmartCriterion::ALL
            .iter()
            .map(|c| {
                let covered = questions.iter().filter(|q| q.scores.get(*c) >= COVERAGE_SCORE).count();
                let share = if total == 0 { 0.0 } else { covered as f64 / total as f64 };
                (*c, share)
            })
            .collect();

        let recommendations = smart_coverage
            .iter()
            .filter(|(_, share)| **share < COVERAGE_TARGET)
            .map(|(c, share)| recommendation(*c, *share))
            .collect();

        Self {
            total_questions: total,
            average_score,
            high_quality_count: questions.iter().filter(|q| q.aggregate_score >= threshold).count(),
            degraded_count: questions.iter().filter(|q| q.degraded).count(),
            best_question,
            smart_coverage,
            diversity_score: diversity(questions),
            recommendations,
            rating: QualityRating::from_score(average_score),
        }
    }
}

fn recommendation(criterion: SmartCriterion, share: f64) -> String {
    let advice = match criterion {
        SmartCriterion::Specificity => "name concrete columns and values",
        SmartCriterion::Measurability => "ask for rates, ratios, rankings or comparisons",
        SmartCriterion::Actionability => "use analytical verbs such as identify, quantify or prioritise",
        SmartCriterion::Relevance => "tie questions to the stated objectives",
        SmartCriterion::TimeBound => "add an explicit time window",
    };
    format!(
        "{} coverage is {:.0}%: {}",
        criterion.label(),
        share * 100.0,
        advice
    )
}

/// Shannon entropy of the category counts over the maximum for five
/// categories.
fn diversity(questions: &[ScoredQuestion]) -> f64 {
    if questions.is_empty() {
        return 0.0;
    }
    let total = questions.len() as f64;
    let entropy: f64 = QuestionCategory::ALL
        .iter()
        .map(|c| questions.iter().filter(|q| q.category() == *c).count() as f64 / total)
        .filter(|p| *p > 0.0)
        .map(|p| -p * p.ln())
        .sum();
    entropy / (QuestionCategory::ALL.len() as f64).ln()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::{CandidateQuestion, Origin};
    use crate::scoring::SmartScores;
    use std::collections::BTreeSet;

    fn scored(category: QuestionCategory, aggregate: f64, time_bound: f64) -> ScoredQuestion {
        ScoredQuestion {
            question: CandidateQuestion {
                text: format!("{} question scoring {}", category, aggregate),
                category,
                referenced_columns: BTreeSet::new(),
                origin: Origin::Offline,
                ordinal: 0,
            },
            scores: SmartScores {
                specificity: 0.9,
                measurability: 0.9,
                actionability: 0.9,
                relevance: 0.9,
                time_bound,
            },
            aggregate_score: aggregate,
            accepted: aggregate >= 0.7,
            degraded: aggregate < 0.7,
        }
    }

    #[test]
    fn test_report_figures() {
        let questions: Vec<ScoredQuestion> = QuestionCategory::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| scored(*c, 0.62 + 0.05 * i as f64, if i < 2 { 0.3 } else { 1.0 }))
            .collect();
        let report = QualityReport::from_questions(&questions, 0.7);

        assert_eq!(report.total_questions, 5);
        assert!((report.average_score - 0.72).abs() < 1e-9);
        assert_eq!(report.high_quality_count, 3);
        assert_eq!(report.degraded_count, 2);
        assert!((report.diversity_score - 1.0).abs() < 1e-9);
        assert!((report.smart_coverage[&SmartCriterion::TimeBound] - 0.6).abs() < 1e-9);
        assert_eq!(report.recommendations.len(), 1);
        assert!(report.recommendations[0].starts_with("Time-bound"));
        assert_eq!(report.rating, QualityRating::Good);
        assert!(report.best_question.unwrap().starts_with("Relationship discovery"));
    }

    #[test]
    fn test_single_category_has_zero_diversity() {
        let questions = vec![
            scored(QuestionCategory::Pattern, 0.9, 1.0),
            scored(QuestionCategory::Pattern, 0.85, 1.0),
        ];
        let report = QualityReport::from_questions(&questions, 0.7);
        assert_eq!(report.diversity_score, 0.0);
        assert_eq!(report.rating, QualityRating::Excellent);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_empty_report() {
        let report = QualityReport::from_questions(&[], 0.7);
        assert_eq!(report.total_questions, 0);
        assert_eq!(report.rating, QualityRating::NeedsImprovement);
        assert!(report.best_question.is_none());
    }
}
