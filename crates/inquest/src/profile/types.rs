//! Column profile types.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Coarse semantic kind of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    /// Calendar or period values (year, quarter, dates).
    Temporal,
    /// Monetary amounts and financial ratios.
    Financial,
    /// Keys, codes and entity identifiers.
    Identifier,
    /// Discrete labels used for grouping.
    Categorical,
    /// Two-valued flags.
    Boolean,
    /// Places and regions.
    Geographic,
    /// Numbers with no recognised meaning.
    NumericGeneric,
    /// Text with no recognised meaning.
    TextualGeneric,
}

impl ColumnKind {
    /// Returns true if values of this kind are usually aggregated numerically.
    pub fn is_quantitative(&self) -> bool {
        matches!(self, ColumnKind::Financial | ColumnKind::NumericGeneric)
    }

    /// Returns true if values of this kind are usually used to group rows.
    pub fn is_grouping(&self) -> bool {
        matches!(
            self,
            ColumnKind::Categorical
                | ColumnKind::Identifier
                | ColumnKind::Geographic
                | ColumnKind::Boolean
        )
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ColumnKind::Temporal => "temporal",
            ColumnKind::Financial => "financial",
            ColumnKind::Identifier => "identifier",
            ColumnKind::Categorical => "categorical",
            ColumnKind::Boolean => "boolean",
            ColumnKind::Geographic => "geographic",
            ColumnKind::NumericGeneric => "numeric",
            ColumnKind::TextualGeneric => "text",
        };
        write!(f, "{}", s)
    }
}

/// Fine-grained meaning recognised from a column name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticTag {
    Year,
    Quarter,
    Month,
    Date,
    Timestamp,
    Ratio,
    Percentage,
    Revenue,
    Cost,
    BalanceSheet,
    Profit,
    Price,
    Identifier,
    Code,
    Carrier,
    Ticker,
    Name,
    Category,
    Status,
    Flag,
    Location,
    Country,
    Count,
    Score,
    Description,
}

impl SemanticTag {
    /// The coarse kind this tag belongs to.
    pub fn kind(&self) -> ColumnKind {
        use SemanticTag::*;
        match self {
            Year | Quarter | Month | Date | Timestamp => ColumnKind::Temporal,
            Ratio | Revenue | Cost | BalanceSheet | Profit | Price => ColumnKind::Financial,
            Identifier | Code | Carrier | Ticker => ColumnKind::Identifier,
            Name | Category | Status => ColumnKind::Categorical,
            Flag => ColumnKind::Boolean,
            Location | Country => ColumnKind::Geographic,
            Percentage | Count | Score => ColumnKind::NumericGeneric,
            Description => ColumnKind::TextualGeneric,
        }
    }
}

/// A minimum or maximum observed in a column.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum StatValue {
    Number(f64),
    Date(NaiveDate),
}

impl StatValue {
    /// The numeric value, if this is a number.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            StatValue::Number(n) => Some(*n),
            StatValue::Date(_) => None,
        }
    }

    /// The date value, if this is a date.
    pub fn as_date(&self) -> Option<NaiveDate> {
        match self {
            StatValue::Date(d) => Some(*d),
            StatValue::Number(_) => None,
        }
    }
}

impl fmt::Display for StatValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            StatValue::Number(n) => write!(f, "{:.2}", n),
            StatValue::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Statistics computed over the non-null values of a column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    /// Smallest value (numeric or date columns only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min: Option<StatValue>,
    /// Largest value (numeric or date columns only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<StatValue>,
    /// Arithmetic mean (numeric columns only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<f64>,
    /// Number of distinct non-null values.
    pub distinct_count: usize,
    /// Number of null/missing values.
    pub null_count: usize,
    /// Number of non-null values.
    pub non_null_count: usize,
    /// Most frequent value; ties go to the first one seen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_value: Option<String>,
}

impl ColumnStats {
    /// Returns true if min/max are numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self.min, Some(StatValue::Number(_)))
    }

    /// Returns true if min/max are dates.
    pub fn is_date(&self) -> bool {
        matches!(self.min, Some(StatValue::Date(_)))
    }
}

/// Semantic profile of one column. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name as it appears in the header.
    pub name: String,
    /// Coarse semantic kind.
    pub declared_kind: ColumnKind,
    /// Tag of the name rule that matched, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<SemanticTag>,
    /// Statistics; `None` when the column has no non-null values.
    pub stats: Option<ColumnStats>,
    /// One-sentence description.
    pub narrative: String,
}

impl ColumnProfile {
    /// Returns true if the column carries at least one non-null value.
    pub fn is_usable(&self) -> bool {
        self.stats.is_some()
    }

    /// Returns true if the column is temporal.
    pub fn is_temporal(&self) -> bool {
        self.declared_kind == ColumnKind::Temporal
    }
}
