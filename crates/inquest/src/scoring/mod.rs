//! SMART scoring and quality reporting.

mod report;
mod smart;

pub use report::{QualityRating, QualityReport};
pub use smart::{
    ScoredQuestion, ScoringConfig, SmartCriterion, SmartScores, SmartValidator, SmartWeights,
};
