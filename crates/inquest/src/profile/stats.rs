//! Value parsing and column statistics.

use chrono::{NaiveDate, NaiveDateTime};
use indexmap::IndexMap;

use super::types::{ColumnStats, StatValue};
use crate::input::DataTable;

/// Date formats tried in order.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Datetime formats tried in order; only the date part is kept.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Pairs of values that mark a two-valued boolean column.
const BOOLEAN_PAIRS: &[(&str, &str)] = &[
    ("true", "false"),
    ("yes", "no"),
    ("y", "n"),
    ("t", "f"),
    ("1", "0"),
];

/// Parse a number, tolerating currency symbols, thousands separators and a
/// trailing percent sign.
pub fn parse_number(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let trimmed = trimmed.trim_start_matches(['$', '€', '£']);
    let trimmed = trimmed.strip_suffix('%').unwrap_or(trimmed);
    let cleaned: String = trimmed.chars().filter(|&c| c != ',').collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Parse a calendar date in one of the supported formats.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() < 8 {
        return None;
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(trimmed, fmt) {
            return Some(d);
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt.date());
        }
    }
    chrono::DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.date_naive())
}

/// Returns true if the non-null values use at most two boolean-like tokens
/// from the same pair.
pub fn is_boolean_like<'a>(values: impl IntoIterator<Item = &'a str>) -> bool {
    let mut seen: Vec<String> = Vec::new();
    for v in values {
        if DataTable::is_null_value(v) {
            continue;
        }
        let lower = v.trim().to_lowercase();
        if !seen.contains(&lower) {
            seen.push(lower);
            if seen.len() > 2 {
                return false;
            }
        }
    }
    !seen.is_empty()
        && BOOLEAN_PAIRS
            .iter()
            .any(|(a, b)| seen.iter().all(|s| s == a || s == b))
}

/// Single-pass accumulator for min, max and mean.
#[derive(Debug, Clone)]
struct Accumulator {
    count: usize,
    mean: f64,
    min: f64,
    max: f64,
}

impl Accumulator {
    fn new() -> Self {
        Self {
            count: 0,
            mean: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
    }
}

/// Compute statistics for a column's values.
///
/// Returns `None` when no value is non-null. `parse_ratio` is the share of
/// non-null values that must parse for numeric or date statistics to be kept.
pub fn compute_stats<'a>(
    values: impl IntoIterator<Item = &'a str>,
    parse_ratio: f64,
) -> Option<ColumnStats> {
    let mut null_count = 0;
    let mut frequencies: IndexMap<&str, usize> = IndexMap::new();
    let mut numbers = Accumulator::new();
    let mut date_min: Option<NaiveDate> = None;
    let mut date_max: Option<NaiveDate> = None;
    let mut date_count = 0;

    for value in values {
        if DataTable::is_null_value(value) {
            null_count += 1;
            continue;
        }
        let value = value.trim();
        *frequencies.entry(value).or_insert(0) += 1;

        if let Some(n) = parse_number(value) {
            numbers.push(n);
        } else if let Some(d) = parse_date(value) {
            date_count += 1;
            date_min = Some(date_min.map_or(d, |m| m.min(d)));
            date_max = Some(date_max.map_or(d, |m| m.max(d)));
        }
    }

    let non_null_count: usize = frequencies.values().sum();
    if non_null_count == 0 {
        return None;
    }

    let required = non_null_count as f64 * parse_ratio;
    let (min, max, mean) = if numbers.count > 0 && numbers.count as f64 >= required {
        (
            Some(StatValue::Number(numbers.min)),
            Some(StatValue::Number(numbers.max)),
            Some(numbers.mean),
        )
    } else if date_count > 0 && date_count as f64 >= required {
        (date_min.map(StatValue::Date), date_max.map(StatValue::Date), None)
    } else {
        (None, None, None)
    };

    // First maximal entry wins, so ties resolve to the earliest value.
    let top_value = frequencies
        .iter()
        .fold(None::<(&str, usize)>, |best, (&v, &c)| match best {
            Some((_, bc)) if bc >= c => best,
            _ => Some((v, c)),
        })
        .map(|(v, _)| v.to_string());

    Some(ColumnStats {
        min,
        max,
        mean,
        distinct_count: frequencies.len(),
        null_count,
        non_null_count,
        top_value,
    })
}

/// Share of non-null values that parse as numbers.
pub fn numeric_share<'a>(values: impl IntoIterator<Item = &'a str>) -> f64 {
    let mut total = 0usize;
    let mut numeric = 0usize;
    for v in values {
        if DataTable::is_null_value(v) {
            continue;
        }
        total += 1;
        if parse_number(v).is_some() {
            numeric += 1;
        }
    }
    if total == 0 {
        0.0
    } else {
        numeric as f64 / total as f64
    }
}
