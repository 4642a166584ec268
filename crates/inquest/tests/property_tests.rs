//! Property-based tests for allocation, parsing and offline generation.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p inquest --test property_tests
//!
//! # More cases
//! PROPTEST_CASES=1000 cargo test -p inquest --test property_tests
//! ```

use std::collections::HashSet;

use proptest::prelude::*;

use inquest::generation::{ResponseParser, normalize_text};
use inquest::profile::ColumnAnalyzer;
use inquest::selection::RatioBand;
use inquest::{
    AllocatorConfig, AnalysisContext, DataTable, Dataset, DiversityAllocator, Orchestrator,
    QuestionCategory, QuestionSet,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Column names drawn from common business vocabulary plus random words.
fn column_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("revenue".to_string()),
        Just("region".to_string()),
        Just("order_date".to_string()),
        Just("units_sold".to_string()),
        Just("customer_segment".to_string()),
        Just("discount_rate".to_string()),
        "[a-z]{3,10}",
    ]
}

fn band() -> impl Strategy<Value = RatioBand> {
    (0.0f64..0.5, 0.0f64..0.5).prop_map(|(a, b)| RatioBand::new(a.min(b), a.max(b)))
}

fn allocator_config() -> impl Strategy<Value = AllocatorConfig> {
    (band(), band(), band(), band(), band())
        .prop_filter("at least one positive band", |(a, b, c, d, e)| {
            [a, b, c, d, e].iter().any(|band| band.midpoint() > 0.0)
        })
        .prop_map(|(a, b, c, d, e)| AllocatorConfig {
            descriptive: a,
            comparative: b,
            pattern: c,
            business_impact: d,
            relationship_discovery: e,
        })
}

/// A small table with distinct column names and numeric or text values.
fn dataset() -> impl Strategy<Value = Dataset> {
    prop::collection::btree_set(column_name(), 1..6).prop_flat_map(|names| {
        let names: Vec<String> = names.into_iter().collect();
        let width = names.len();
        prop::collection::vec(prop::collection::vec("[a-z][0-9]{1,5}", width), 3..12).prop_map(
            move |rows| Dataset::new("random", DataTable::new(names.clone(), rows, b',')),
        )
    })
}

fn generate(dataset: &Dataset, count: usize) -> QuestionSet {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime
        .block_on(Orchestrator::new().generate_questions(dataset, &AnalysisContext::default(), count))
        .unwrap()
}

fn sales() -> Dataset {
    let rows = (0..24)
        .map(|i| {
            vec![
                format!("2023-{:02}-01", i % 12 + 1),
                ["north", "south", "west"][i % 3].to_string(),
                format!("{}", 500 + i * 17),
                format!("{}", 3 + i % 9),
            ]
        })
        .collect();
    let headers = ["order_date", "region", "revenue", "units_sold"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    Dataset::new("sales", DataTable::new(headers, rows, b','))
}

// =============================================================================
// Allocation
// =============================================================================

proptest! {
    #[test]
    fn quota_sums_to_total(total in 0usize..200) {
        let quota = DiversityAllocator::new().allocate(total);
        prop_assert_eq!(quota.total(), total);
    }

    #[test]
    fn quota_stays_within_one_of_ideal_share(config in allocator_config(), total in 1usize..200) {
        let shares = config.normalized_midpoints();
        let quota = DiversityAllocator::with_config(config).unwrap().allocate(total);

        prop_assert_eq!(quota.total(), total);
        for category in QuestionCategory::ALL {
            let ideal = shares[&category] * total as f64;
            let diff = (quota.get(category) as f64 - ideal).abs();
            prop_assert!(diff < 1.0 + 1e-9, "{}: {} vs {}", category, quota.get(category), ideal);
        }
    }

    #[test]
    fn quota_is_deterministic(total in 0usize..100) {
        let allocator = DiversityAllocator::new();
        prop_assert_eq!(allocator.allocate(total), allocator.allocate(total));
    }
}

// =============================================================================
// Parsing and profiling
// =============================================================================

proptest! {
    #[test]
    fn response_parser_never_panics(response in ".{0,400}") {
        let questions = ResponseParser::new().parse(&response);
        prop_assert!(questions.iter().all(|q| !q.trim().is_empty()));
    }

    #[test]
    fn normalize_text_is_idempotent(text in ".{0,120}") {
        let once = normalize_text(&text);
        prop_assert_eq!(normalize_text(&once), once.clone());
    }

    #[test]
    fn analyzer_never_panics(name in column_name(), values in prop::collection::vec(".{0,12}", 0..30)) {
        let refs: Vec<&str> = values.iter().map(String::as_str).collect();
        let profile = ColumnAnalyzer::new().analyze_column(&name, &refs);
        prop_assert_eq!(profile.name, name);
    }
}

// =============================================================================
// Offline generation
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(40))]

    #[test]
    fn offline_run_returns_exact_count(count in 1usize..=40) {
        let set = generate(&sales(), count);
        prop_assert_eq!(set.len(), count);

        let distinct: HashSet<String> = set.iter().map(|q| normalize_text(q.text())).collect();
        prop_assert_eq!(distinct.len(), count);
        for category in QuestionCategory::ALL {
            prop_assert_eq!(set.count_in(category), set.quota.get(category));
        }
    }

    #[test]
    fn offline_run_handles_any_usable_table(ds in dataset(), count in 1usize..=25) {
        let set = generate(&ds, count);
        prop_assert_eq!(set.len(), count);
        prop_assert!(set.all_offline());
    }

    #[test]
    fn offline_run_is_deterministic(ds in dataset(), count in 1usize..=20) {
        let first = generate(&ds, count);
        let second = generate(&ds, count);
        prop_assert_eq!(first.texts(), second.texts());
    }
}
