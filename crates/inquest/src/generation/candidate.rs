//! Candidate questions and the columns they reference.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::category::QuestionCategory;
use crate::profile::ColumnProfile;

/// A column qualified by the dataset it belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ColumnRef {
    pub dataset: String,
    pub column: String,
}

impl ColumnRef {
    pub fn new(dataset: impl Into<String>, column: impl Into<String>) -> Self {
        Self {
            dataset: dataset.into(),
            column: column.into(),
        }
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.dataset, self.column)
    }
}

/// Which strategy produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    Online,
    Offline,
}

/// A question before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateQuestion {
    pub text: String,
    pub category: QuestionCategory,
    pub referenced_columns: BTreeSet<ColumnRef>,
    pub origin: Origin,
    /// Generation order within the scope; earlier wins ties.
    pub ordinal: usize,
}

impl CandidateQuestion {
    /// Normalized text used for duplicate detection.
    pub fn normalized_text(&self) -> String {
        normalize_text(&self.text)
    }

    /// Datasets this question draws columns from.
    pub fn datasets(&self) -> BTreeSet<&str> {
        self.referenced_columns
            .iter()
            .map(|c| c.dataset.as_str())
            .collect()
    }
}

/// Lower-case and collapse whitespace.
pub fn normalize_text(text: &str) -> String {
    text.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Profiles of one dataset, as seen by the generators.
#[derive(Debug, Clone, Copy)]
pub struct DatasetColumns<'a> {
    pub dataset: &'a str,
    pub profiles: &'a [ColumnProfile],
}

/// Find every known column named in `text`.
///
/// Matching is case-insensitive on word boundaries; underscores in a column
/// name also match spaces.
pub fn find_column_refs(text: &str, scope: &[DatasetColumns<'_>]) -> BTreeSet<ColumnRef> {
    let haystack = text.to_lowercase();
    let mut found = BTreeSet::new();
    for ds in scope {
        for profile in ds.profiles.iter().filter(|p| p.is_usable()) {
            let name = profile.name.to_lowercase();
            let spaced = name.replace('_', " ");
            if contains_word(&haystack, &name) || (spaced != name && contains_word(&haystack, &spaced)) {
                found.insert(ColumnRef::new(ds.dataset, &profile.name));
            }
        }
    }
    found
}

fn contains_word(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return false;
    }
    let is_word = |c: char| c.is_alphanumeric() || c == '_';
    haystack.match_indices(needle).any(|(start, _)| {
        let before = haystack[..start].chars().next_back();
        let after = haystack[start + needle.len()..].chars().next();
        !before.is_some_and(is_word) && !after.is_some_and(is_word)
    })
}
