//! Per-category quotas for a requested question count.

use std::cmp::Reverse;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{InquestError, Result};
use crate::generation::QuestionCategory;

/// Allowed share of the question set for one category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatioBand {
    pub min: f64,
    pub max: f64,
}

impl RatioBand {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn midpoint(&self) -> f64 {
        (self.min + self.max) / 2.0
    }
}

/// Ratio bands per category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AllocatorConfig {
    pub descriptive: RatioBand,
    pub comparative: RatioBand,
    pub pattern: RatioBand,
    pub business_impact: RatioBand,
    pub relationship_discovery: RatioBand,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            descriptive: RatioBand::new(0.20, 0.27),
            comparative: RatioBand::new(0.20, 0.27),
            pattern: RatioBand::new(0.13, 0.20),
            business_impact: RatioBand::new(0.20, 0.27),
            relationship_discovery: RatioBand::new(0.13, 0.20),
        }
    }
}

impl AllocatorConfig {
    pub fn band(&self, category: QuestionCategory) -> RatioBand {
        match category {
            QuestionCategory::Descriptive => self.descriptive,
            QuestionCategory::Comparative => self.comparative,
            QuestionCategory::Pattern => self.pattern,
            QuestionCategory::BusinessImpact => self.business_impact,
            QuestionCategory::RelationshipDiscovery => self.relationship_discovery,
        }
    }

    /// Bands must lie in `[0, 1]` with `min <= max`, and at least one
    /// midpoint must be positive.
    pub fn validate(&self) -> Result<()> {
        for category in QuestionCategory::ALL {
            let band = self.band(category);
            let in_unit = |v: f64| (0.0..=1.0).contains(&v);
            if !in_unit(band.min) || !in_unit(band.max) || band.min > band.max {
                return Err(InquestError::Config(format!(
                    "invalid ratio band for {}: {}..{}",
                    category, band.min, band.max
                )));
            }
        }
        if QuestionCategory::ALL.iter().all(|c| self.band(*c).midpoint() <= 0.0) {
            return Err(InquestError::Config("all ratio bands are zero".to_string()));
        }
        Ok(())
    }

    /// Midpoint ratios scaled to sum to 1, in category order.
    pub fn normalized_midpoints(&self) -> IndexMap<QuestionCategory, f64> {
        let total: f64 = QuestionCategory::ALL.iter().map(|c| self.band(*c).midpoint()).sum();
        QuestionCategory::ALL
            .iter()
            .map(|c| {
                let share = if total > 0.0 {
                    self.band(*c).midpoint() / total
                } else {
                    1.0 / QuestionCategory::ALL.len() as f64
                };
                (*c, share)
            })
            .collect()
    }
}

/// Number of questions each category must contribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quota {
    counts: IndexMap<QuestionCategory, usize>,
}

impl Quota {
    /// Quota from explicit counts; categories not given get zero.
    pub fn from_counts(counts: impl IntoIterator<Item = (QuestionCategory, usize)>) -> Self {
        let given: IndexMap<QuestionCategory, usize> = counts.into_iter().collect();
        Self {
            counts: QuestionCategory::ALL
                .iter()
                .map(|c| (*c, given.get(c).copied().unwrap_or(0)))
                .collect(),
        }
    }

    pub fn get(&self, category: QuestionCategory) -> usize {
        self.counts.get(&category).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// `(category, count)` pairs in category order.
    pub fn iter(&self) -> impl Iterator<Item = (QuestionCategory, usize)> + '_ {
        self.counts.iter().map(|(c, n)| (*c, *n))
    }
}

/// Splits a total count across categories by largest remainder.
#[derive(Debug, Clone, Default)]
pub struct DiversityAllocator {
    config: AllocatorConfig,
}

impl DiversityAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: AllocatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AllocatorConfig {
        &self.config
    }

    /// Quota for `total` questions; always sums to `total`.
    ///
    /// Each category first gets `floor(share * total)`. Remaining units go
    /// to the largest fractional remainders, ties broken by
    /// [`QuestionCategory::tie_priority`].
    pub fn allocate(&self, total: usize) -> Quota {
        let shares = self.config.normalized_midpoints();

        let mut entries: Vec<(QuestionCategory, usize, f64)> = shares
            .iter()
            .map(|(c, share)| {
                let exact = share * total as f64;
                let floor = exact.floor();
                (*c, floor as usize, exact - floor)
            })
            .collect();

        let assigned: usize = entries.iter().map(|(_, n, _)| n).sum();
        let remainder = total.saturating_sub(assigned);

        let mut order: Vec<usize> = (0..entries.len()).collect();
        order.sort_by_key(|&i| {
            let (category, _, fraction) = entries[i];
            (Reverse(remainder_units(fraction)), category.tie_priority())
        });
        for &i in order.iter().cycle().take(remainder) {
            entries[i].1 += 1;
        }

        Quota::from_counts(entries.into_iter().map(|(c, n, _)| (c, n)))
    }
}

/// Fractional remainder on a fixed grid, so shares that differ only by
/// float noise compare equal and fall through to tie priority.
fn remainder_units(fraction: f64) -> u64 {
    (fraction * REMAINDER_SCALE).round() as u64
}

const REMAINDER_SCALE: f64 = 1e9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thirteen_questions() {
        let quota = DiversityAllocator::new().allocate(13);
        assert_eq!(quota.total(), 13);
        assert_eq!(quota.get(QuestionCategory::Descriptive), 3);
        assert_eq!(quota.get(QuestionCategory::Comparative), 3);
        assert_eq!(quota.get(QuestionCategory::Pattern), 2);
        assert_eq!(quota.get(QuestionCategory::BusinessImpact), 3);
        assert_eq!(quota.get(QuestionCategory::RelationshipDiscovery), 2);
    }

    #[test]
    fn test_small_totals_follow_tie_priority() {
        let allocator = DiversityAllocator::new();
        let one = allocator.allocate(1);
        assert_eq!(one.get(QuestionCategory::Descriptive), 1);
        assert_eq!(one.total(), 1);

        let three = allocator.allocate(3);
        assert_eq!(three.get(QuestionCategory::Descriptive), 1);
        assert_eq!(three.get(QuestionCategory::Comparative), 1);
        assert_eq!(three.get(QuestionCategory::BusinessImpact), 1);
        assert_eq!(three.get(QuestionCategory::Pattern), 0);

        for n in 1..5 {
            let quota = allocator.allocate(n);
            assert!(quota.iter().any(|(_, count)| count == 0));
        }
    }

    #[test]
    fn test_float_noise_falls_through_to_tie_priority() {
        assert_eq!(remainder_units(0.3), remainder_units(0.1 + 0.2));
        assert!(remainder_units(0.5) > remainder_units(0.499));

        let config = AllocatorConfig {
            descriptive: RatioBand::new(0.1 + 0.2, 0.1 + 0.2),
            comparative: RatioBand::new(0.3, 0.3),
            pattern: RatioBand::new(0.4, 0.4),
            business_impact: RatioBand::new(0.0, 0.0),
            relationship_discovery: RatioBand::new(0.0, 0.0),
        };
        let allocator = DiversityAllocator::with_config(config).unwrap();
        let one = allocator.allocate(1);
        assert_eq!(one.get(QuestionCategory::Pattern), 1);
        let two = allocator.allocate(2);
        assert_eq!(two.total(), 2);
        assert_eq!(two.get(QuestionCategory::Pattern), 1);
        assert_eq!(two.get(QuestionCategory::Descriptive), 1);
    }

    #[test]
    fn test_zero_total() {
        assert_eq!(DiversityAllocator::new().allocate(0).total(), 0);
    }

    #[test]
    fn test_iter_in_category_order() {
        let quota = DiversityAllocator::new().allocate(20);
        let categories: Vec<_> = quota.iter().map(|(c, _)| c).collect();
        assert_eq!(categories, QuestionCategory::ALL.to_vec());
        assert_eq!(quota.total(), 20);
    }

    #[test]
    fn test_custom_bands() {
        let config = AllocatorConfig {
            descriptive: RatioBand::new(1.0, 1.0),
            comparative: RatioBand::new(0.0, 0.0),
            pattern: RatioBand::new(0.0, 0.0),
            business_impact: RatioBand::new(0.0, 0.0),
            relationship_discovery: RatioBand::new(0.0, 0.0),
        };
        let quota = DiversityAllocator::with_config(config).unwrap().allocate(7);
        assert_eq!(quota.get(QuestionCategory::Descriptive), 7);
    }

    #[test]
    fn test_invalid_bands_rejected() {
        let config = AllocatorConfig {
            pattern: RatioBand::new(0.5, 0.2),
            ..Default::default()
        };
        assert!(matches!(
            DiversityAllocator::with_config(config),
            Err(InquestError::Config(_))
        ));
    }
}
