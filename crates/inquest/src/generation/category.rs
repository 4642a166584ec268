//! Analytical question categories.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::profile::ColumnKind;

/// The five analytical categories a question set is balanced across.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionCategory {
    /// What the data looks like: levels, ranges, distributions.
    Descriptive,
    /// How segments, periods or entities differ.
    Comparative,
    /// Trends, seasonality and anomalies.
    Pattern,
    /// Financial and operational consequences.
    BusinessImpact,
    /// How variables move together.
    RelationshipDiscovery,
}

impl QuestionCategory {
    /// Every category in output order.
    pub const ALL: [QuestionCategory; 5] = [
        QuestionCategory::Descriptive,
        QuestionCategory::Comparative,
        QuestionCategory::Pattern,
        QuestionCategory::BusinessImpact,
        QuestionCategory::RelationshipDiscovery,
    ];

    /// Rank used to break ties when handing out remainder quota (lower first).
    pub fn tie_priority(&self) -> u8 {
        match self {
            QuestionCategory::Descriptive => 0,
            QuestionCategory::Comparative => 1,
            QuestionCategory::BusinessImpact => 2,
            QuestionCategory::Pattern => 3,
            QuestionCategory::RelationshipDiscovery => 4,
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            QuestionCategory::Descriptive => "Descriptive",
            QuestionCategory::Comparative => "Comparative",
            QuestionCategory::Pattern => "Pattern",
            QuestionCategory::BusinessImpact => "Business impact",
            QuestionCategory::RelationshipDiscovery => "Relationship discovery",
        }
    }

    /// What questions of this category should achieve, for prompts.
    pub fn intent(&self) -> &'static str {
        match self {
            QuestionCategory::Descriptive => {
                "quantify current levels, ranges and distributions of key metrics"
            }
            QuestionCategory::Comparative => {
                "compare segments, entities or periods against each other on specific metrics"
            }
            QuestionCategory::Pattern => {
                "identify trends, seasonality, volatility and anomalies over time"
            }
            QuestionCategory::BusinessImpact => {
                "assess the financial or operational consequences and decisions the metrics support"
            }
            QuestionCategory::RelationshipDiscovery => {
                "determine correlations and drivers linking two or more variables"
            }
        }
    }

    /// How well a column kind suits this category as the measured column;
    /// higher first.
    pub fn kind_relevance(&self, kind: ColumnKind) -> u8 {
        use ColumnKind::*;
        let order: &[ColumnKind] = match self {
            QuestionCategory::Descriptive => &[Financial, NumericGeneric, Categorical, Temporal, Geographic],
            QuestionCategory::Comparative => &[Financial, NumericGeneric, Categorical, Geographic, Identifier],
            QuestionCategory::Pattern => &[Financial, NumericGeneric, Categorical, Temporal],
            QuestionCategory::BusinessImpact => &[Financial, NumericGeneric, Categorical, Geographic],
            QuestionCategory::RelationshipDiscovery => &[NumericGeneric, Financial, Categorical, Boolean],
        };
        order
            .iter()
            .position(|k| *k == kind)
            .map(|p| (order.len() - p) as u8 + 1)
            .unwrap_or(1)
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}
