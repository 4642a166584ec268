//! Column intelligence: classify each column and describe it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rules::classify_name;
use super::stats::{compute_stats, is_boolean_like, numeric_share};
use super::types::{ColumnKind, ColumnProfile, ColumnStats, SemanticTag, StatValue};
use crate::error::{InquestError, Result};
use crate::input::DataTable;

/// Configuration for column profiling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    /// Rows per column examined (None = every loaded row).
    pub sample_rows: Option<usize>,
    /// Share of non-null values that must parse for a numeric or date reading.
    pub parse_ratio: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            sample_rows: Some(10_000),
            parse_ratio: 0.9,
        }
    }
}

/// Builds [`ColumnProfile`]s. Purely local; never calls an external service.
#[derive(Debug, Clone, Default)]
pub struct ColumnAnalyzer {
    config: ProfileConfig,
}

impl ColumnAnalyzer {
    /// Create an analyzer with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(config: ProfileConfig) -> Self {
        Self { config }
    }

    /// Profile every column of a table.
    ///
    /// Fails when the table has no columns, no rows, or no column with a
    /// single non-null value.
    pub fn analyze_table(&self, dataset: &str, table: &DataTable) -> Result<Vec<ColumnProfile>> {
        if table.column_count() == 0 {
            return Err(InquestError::profiling(dataset, "table has no columns"));
        }
        if table.row_count() == 0 {
            return Err(InquestError::profiling(dataset, "table has no rows"));
        }

        let limit = self.config.sample_rows.unwrap_or(usize::MAX);
        let profiles: Vec<ColumnProfile> = table
            .headers
            .iter()
            .enumerate()
            .map(|(i, header)| {
                let name = if header.trim().is_empty() {
                    format!("column_{}", i + 1)
                } else {
                    header.clone()
                };
                let values: Vec<&str> = table.column_values(i).take(limit).collect();
                self.analyze_column(&name, &values)
            })
            .collect();

        if !profiles.iter().any(ColumnProfile::is_usable) {
            return Err(InquestError::profiling(dataset, "no column has any values"));
        }

        debug!(
            dataset,
            columns = profiles.len(),
            usable = profiles.iter().filter(|p| p.is_usable()).count(),
            "profiled columns"
        );

        Ok(profiles)
    }

    /// Profile a single column.
    pub fn analyze_column(&self, name: &str, values: &[&str]) -> ColumnProfile {
        let stats = compute_stats(values.iter().copied(), self.config.parse_ratio);

        let Some(stats) = stats else {
            return ColumnProfile {
                name: name.to_string(),
                declared_kind: ColumnKind::TextualGeneric,
                tag: None,
                stats: None,
                narrative: "Empty column with no recorded values.".to_string(),
            };
        };

        let tag = classify_name(name).map(|rule| rule.tag);
        let declared_kind = match tag {
            Some(tag) => tag.kind(),
            None => self.kind_from_values(values),
        };
        let narrative = narrative(tag, declared_kind, &stats);

        ColumnProfile {
            name: name.to_string(),
            declared_kind,
            tag,
            stats: Some(stats),
            narrative,
        }
    }

    fn kind_from_values(&self, values: &[&str]) -> ColumnKind {
        if is_boolean_like(values.iter().copied()) {
            ColumnKind::Boolean
        } else if numeric_share(values.iter().copied()) >= self.config.parse_ratio {
            ColumnKind::NumericGeneric
        } else {
            ColumnKind::TextualGeneric
        }
    }
}

// =============================================================================
// NARRATIVES
// =============================================================================

/// How a numeric range is rendered.
#[derive(Clone, Copy)]
enum RangeStyle {
    /// `2013-2023`
    Span,
    /// `1,200 to 5,400`
    Grouped,
    /// `0.12 to 0.56, Avg: 0.31`
    Decimal,
    /// `1.00 to 9.00, Mean: 4.20`
    Full,
}

fn narrative(tag: Option<SemanticTag>, kind: ColumnKind, stats: &ColumnStats) -> String {
    use SemanticTag::*;

    let distinct = stats.distinct_count;
    let example = stats.top_value.as_deref().unwrap_or("");

    let (lead, style) = match tag {
        Some(Year) => ("Temporal identifier representing calendar year.".to_string(), Some(RangeStyle::Span)),
        Some(Quarter) => (
            "Quarterly time period identifier. Enables seasonal analysis and quarterly performance tracking.".to_string(),
            None,
        ),
        Some(Month) => (
            "Monthly time period identifier. Supports monthly trend analysis and seasonal pattern detection.".to_string(),
            None,
        ),
        Some(Date) | Some(Timestamp) if stats.is_date() => ("Date field.".to_string(), Some(RangeStyle::Span)),
        Some(Date) | Some(Timestamp) => (
            "Time period identifier. Supports granular time-series analysis.".to_string(),
            Some(RangeStyle::Span),
        ),
        Some(Ratio) => ("Financial ratio/rate metric.".to_string(), Some(RangeStyle::Decimal)),
        Some(Percentage) => ("Percentage metric.".to_string(), Some(RangeStyle::Decimal)),
        Some(Revenue) => ("Revenue/income metric.".to_string(), Some(RangeStyle::Grouped)),
        Some(Cost) => ("Cost/expense metric.".to_string(), Some(RangeStyle::Grouped)),
        Some(BalanceSheet) => ("Balance sheet item.".to_string(), Some(RangeStyle::Grouped)),
        Some(Profit) => ("Profitability metric.".to_string(), Some(RangeStyle::Decimal)),
        Some(Price) => ("Price/amount metric.".to_string(), Some(RangeStyle::Full)),
        Some(Identifier) | Some(Code) | Some(Carrier) | Some(Ticker) => (
            format!("Categorical identifier. {} unique values (e.g., '{}').", distinct, example),
            None,
        ),
        Some(Name) => (format!("Descriptive name/label field. {} unique values.", distinct), None),
        Some(Category) => (
            format!("Classification/category field. {} categories (most common: '{}').", distinct, example),
            None,
        ),
        Some(Status) => (
            format!("Status/state indicator. {} possible states (e.g., '{}').", distinct, example),
            None,
        ),
        Some(Flag) => (format!("Boolean flag. {} distinct values.", distinct), None),
        Some(Location) | Some(Country) => (
            format!("Geographic identifier. {} locations. Supports regional comparisons.", distinct),
            None,
        ),
        Some(Count) => ("Count metric.".to_string(), Some(RangeStyle::Full)),
        Some(Score) => ("Score/rating metric.".to_string(), Some(RangeStyle::Full)),
        Some(Description) => (format!("Free-text description field. {} unique values.", distinct), None),
        None => match kind {
            ColumnKind::Boolean => (format!("Boolean flag. {} distinct values.", distinct), None),
            ColumnKind::NumericGeneric => (
                format!("Numeric metric. {} unique values.", distinct),
                Some(RangeStyle::Full),
            ),
            _ => (
                format!(
                    "Categorical text field. {} unique values (most common: '{}').",
                    distinct, example
                ),
                None,
            ),
        },
    };

    match style.and_then(|style| range_phrase(stats, style)) {
        Some(range) => format!("{} {}", lead, range),
        None => lead,
    }
}

fn range_phrase(stats: &ColumnStats, style: RangeStyle) -> Option<String> {
    let (min, max) = (stats.min?, stats.max?);
    if let (StatValue::Date(_), StatValue::Date(_)) = (min, max) {
        return Some(format!("Range: {} to {}.", min, max));
    }
    let (lo, hi) = (min.as_number()?, max.as_number()?);
    let phrase = match style {
        RangeStyle::Span => format!("Range: {}-{}.", min, max),
        RangeStyle::Grouped => format!("Range: {} to {}.", group_digits(lo), group_digits(hi)),
        RangeStyle::Decimal => match stats.mean {
            Some(mean) => format!("Range: {:.2} to {:.2}, Avg: {:.2}.", lo, hi, mean),
            None => format!("Range: {:.2} to {:.2}.", lo, hi),
        },
        RangeStyle::Full => match stats.mean {
            Some(mean) => format!("Range: {:.2} to {:.2}, Mean: {:.2}.", lo, hi, mean),
            None => format!("Range: {:.2} to {:.2}.", lo, hi),
        },
    };
    Some(phrase)
}

/// Round to an integer and insert thousands separators.
fn group_digits(value: f64) -> String {
    let rounded = value.round() as i64;
    let digits = rounded.unsigned_abs().to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if rounded < 0 {
        format!("-{}", out)
    } else {
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn strings(values: &[&'static str]) -> Vec<&'static str> {
        values.to_vec()
    }

    #[test]
    fn test_year_column_is_temporal() {
        let years: Vec<String> = (2013..=2023).map(|y| y.to_string()).collect();
        let values: Vec<&str> = years.iter().map(String::as_str).collect();
        let profile = ColumnAnalyzer::new().analyze_column("YEAR", &values);

        assert_eq!(profile.declared_kind, ColumnKind::Temporal);
        assert_eq!(profile.tag, Some(SemanticTag::Year));
        let stats = profile.stats.unwrap();
        assert_eq!(stats.min, Some(StatValue::Number(2013.0)));
        assert_eq!(stats.max, Some(StatValue::Number(2023.0)));
        assert_eq!(
            profile.narrative,
            "Temporal identifier representing calendar year. Range: 2013-2023."
        );
    }

    #[test]
    fn test_transaction_date_is_temporal_with_dates() {
        let values = strings(&["2023-02-01", "2023-01-05", "2023-03-09"]);
        let profile = ColumnAnalyzer::new().analyze_column("transaction_date", &values);

        assert_eq!(profile.declared_kind, ColumnKind::Temporal);
        let stats = profile.stats.unwrap();
        let min = stats.min.unwrap().as_date().unwrap();
        let max = stats.max.unwrap().as_date().unwrap();
        assert!(min <= max);
        assert_eq!(min, NaiveDate::from_ymd_opt(2023, 1, 5).unwrap());
        assert!(profile.narrative.contains("2023-01-05 to 2023-03-09"));
    }

    #[test]
    fn test_financial_narratives() {
        let analyzer = ColumnAnalyzer::new();
        let ratio = analyzer.analyze_column("CURRENT_RATIO", &strings(&["0.5", "1.5"]));
        assert_eq!(ratio.declared_kind, ColumnKind::Financial);
        assert_eq!(
            ratio.narrative,
            "Financial ratio/rate metric. Range: 0.50 to 1.50, Avg: 1.00."
        );

        let revenue = analyzer.analyze_column("total_revenue", &strings(&["1200", "2500000"]));
        assert_eq!(revenue.narrative, "Revenue/income metric. Range: 1,200 to 2,500,000.");
    }

    #[test]
    fn test_value_based_fallbacks() {
        let analyzer = ColumnAnalyzer::new();
        let flag = analyzer.analyze_column("active", &strings(&["yes", "no", "yes"]));
        assert_eq!(flag.declared_kind, ColumnKind::Boolean);
        assert!(flag.tag.is_none());

        let numeric = analyzer.analyze_column("foo", &strings(&["1", "2", "3.5"]));
        assert_eq!(numeric.declared_kind, ColumnKind::NumericGeneric);

        let text = analyzer.analyze_column("foo", &strings(&["red", "blue", "red"]));
        assert_eq!(text.declared_kind, ColumnKind::TextualGeneric);
        assert!(text.narrative.contains("most common: 'red'"));
    }

    #[test]
    fn test_embedded_keywords_do_not_misclassify() {
        let analyzer = ColumnAnalyzer::new();
        let name = analyzer.analyze_column("corporate_name", &strings(&["alice", "bob", "carol"]));
        assert_eq!(name.tag, Some(SemanticTag::Name));
        assert_eq!(name.declared_kind, ColumnKind::Categorical);

        let candidate = analyzer.analyze_column("candidate", &strings(&["alice", "bob", "carol"]));
        assert!(candidate.tag.is_none());
        assert_eq!(candidate.declared_kind, ColumnKind::TextualGeneric);

        let estate = analyzer.analyze_column("real_estate", &strings(&["1", "2", "3"]));
        assert!(estate.tag.is_none());
        assert_eq!(estate.declared_kind, ColumnKind::NumericGeneric);
    }

    #[test]
    fn test_empty_column() {
        let profile = ColumnAnalyzer::new().analyze_column("revenue", &strings(&["", "NA"]));
        assert_eq!(profile.declared_kind, ColumnKind::TextualGeneric);
        assert!(profile.stats.is_none());
        assert!(!profile.is_usable());
    }

    #[test]
    fn test_table_errors() {
        let analyzer = ColumnAnalyzer::new();

        let no_rows = DataTable::new(vec!["a".into()], vec![], b',');
        let err = analyzer.analyze_table("t", &no_rows).unwrap_err();
        assert!(err.is_profiling());

        let no_cols = DataTable::new(vec![], vec![vec![]], b',');
        assert!(analyzer.analyze_table("t", &no_cols).is_err());

        let all_empty = DataTable::from_columns(vec![
            ("a".to_string(), vec!["".to_string(), "NA".to_string()]),
            ("b".to_string(), vec!["".to_string(), "".to_string()]),
        ]);
        assert!(analyzer.analyze_table("t", &all_empty).unwrap_err().is_profiling());
    }

    #[test]
    fn test_blank_headers_are_named() {
        let table = DataTable::from_columns(vec![("".to_string(), vec!["1".to_string()])]);
        let profiles = ColumnAnalyzer::new().analyze_table("t", &table).unwrap();
        assert_eq!(profiles[0].name, "column_1");
    }

    #[test]
    fn test_group_digits() {
        assert_eq!(group_digits(0.0), "0");
        assert_eq!(group_digits(999.0), "999");
        assert_eq!(group_digits(1000.0), "1,000");
        assert_eq!(group_digits(-1234567.4), "-1,234,567");
    }
}
