//! End-to-end tests for question generation through the orchestrator.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use inquest::llm::{MockProvider, MockReply};
use inquest::{
    AnalysisContext, DataTable, Dataset, GenerationMode, InquestConfig, Orchestrator, Origin,
    QuestionCategory, QuestionSet, ScopeState,
};

// =============================================================================
// Fixtures
// =============================================================================

/// Six columns, fifty rows.
fn flights() -> Dataset {
    let carriers = ["AA", "DL", "UA", "WN"];
    let regions = ["north", "south", "east", "west", "central"];
    let rows: Vec<Vec<String>> = (0..50)
        .map(|i| {
            vec![
                (2013 + i % 11).to_string(),
                carriers[i % carriers.len()].to_string(),
                regions[i % regions.len()].to_string(),
                format!("{:.2}", 1000.0 + i as f64 * 37.5),
                (100 + i * 3).to_string(),
                format!("{:.2}", 0.7 + (i % 10) as f64 / 100.0),
            ]
        })
        .collect();
    let headers = ["year", "carrier", "region", "revenue", "passengers", "on_time_rate"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    Dataset::new("flights", DataTable::new(headers, rows, b','))
}

fn weather() -> Dataset {
    let cities = ["denver", "boston", "austin"];
    let rows: Vec<Vec<String>> = (0..30)
        .map(|i| {
            vec![
                cities[i % cities.len()].to_string(),
                format!("{:.1}", 10.0 + i as f64 * 0.8),
                format!("{:.1}", (i % 7) as f64 * 2.5),
            ]
        })
        .collect();
    let headers = ["city", "temperature", "precipitation"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    Dataset::new("weather", DataTable::new(headers, rows, b','))
}

fn no_rows() -> Dataset {
    Dataset::new(
        "empty",
        DataTable::new(vec!["a".to_string(), "b".to_string()], Vec::new(), b','),
    )
}

fn assert_no_duplicates(set: &QuestionSet) {
    let normalized: HashSet<String> = set.iter().map(|q| q.question.normalized_text()).collect();
    assert_eq!(normalized.len(), set.len(), "duplicate questions in {}", set.scope);
}

// =============================================================================
// Offline generation
// =============================================================================

#[tokio::test]
async fn test_thirteen_questions_on_six_columns() {
    let set = Orchestrator::new()
        .generate_questions(&flights(), &AnalysisContext::default(), 13)
        .await
        .unwrap();

    assert_eq!(set.len(), 13);
    assert_eq!(set.quota.total(), 13);
    for category in QuestionCategory::ALL {
        assert_eq!(set.count_in(category), set.quota.get(category));
    }
    assert!(set.all_offline());
    assert!(!set.fallback_engaged);
    assert_no_duplicates(&set);

    assert_eq!(set.history.first(), Some(&ScopeState::Idle));
    assert_eq!(set.history.get(1), Some(&ScopeState::Profiling));
    assert_eq!(set.history.last(), Some(&ScopeState::Done));
}

#[tokio::test]
async fn test_questions_are_ordered_by_category_then_score() {
    let set = Orchestrator::new()
        .generate_questions(&flights(), &AnalysisContext::default(), 20)
        .await
        .unwrap();

    for pair in set.questions.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.category() <= b.category());
        if a.category() == b.category() {
            assert!(a.aggregate_score >= b.aggregate_score);
        }
    }
}

#[tokio::test]
async fn test_every_question_references_a_column() {
    let set = Orchestrator::new()
        .generate_questions(&flights(), &AnalysisContext::default(), 15)
        .await
        .unwrap();
    assert!(set.iter().all(|q| !q.referenced_columns().is_empty()));
}

#[tokio::test]
async fn test_single_usable_column_still_fills_the_count() {
    let table = DataTable::from_columns(vec![(
        "revenue".to_string(),
        (1..=20).map(|i| (i * 10).to_string()).collect(),
    )]);
    let set = Orchestrator::new()
        .generate_questions(&Dataset::new("tiny", table), &AnalysisContext::default(), 25)
        .await
        .unwrap();
    assert_eq!(set.len(), 25);
    assert_no_duplicates(&set);
}

// =============================================================================
// Fallback
// =============================================================================

#[tokio::test(start_paused = true)]
async fn test_service_timeouts_fall_back_to_offline() {
    let mock = Arc::new(MockProvider::always(MockReply::Hang(Duration::from_secs(3600))));
    let orchestrator = Orchestrator::new().with_generator(mock.clone());

    let set = orchestrator
        .generate_questions(&flights(), &AnalysisContext::default(), 13)
        .await
        .unwrap();

    assert_eq!(set.len(), 13);
    assert!(set.all_offline());
    assert!(set.fallback_engaged);
    assert!(mock.calls() >= 1);

    let online = set
        .history
        .iter()
        .position(|s| *s == ScopeState::Generating(GenerationMode::Online))
        .unwrap();
    assert_eq!(
        set.history[online + 1],
        ScopeState::Generating(GenerationMode::Offline)
    );
}

#[tokio::test]
async fn test_fallback_output_is_deterministic() {
    let context = AnalysisContext::default().with_objective("reduce delays");
    let dataset = flights();

    let first = Orchestrator::new()
        .with_generator(Arc::new(MockProvider::always(MockReply::RateLimited)))
        .generate_questions(&dataset, &context, 17)
        .await
        .unwrap();
    let second = Orchestrator::new()
        .with_generator(Arc::new(MockProvider::always(MockReply::ServiceError(
            "503".to_string(),
        ))))
        .generate_questions(&dataset, &context, 17)
        .await
        .unwrap();
    let offline = Orchestrator::new()
        .generate_questions(&dataset, &context, 17)
        .await
        .unwrap();

    assert_eq!(first.texts(), second.texts());
    assert_eq!(first.texts(), offline.texts());
    let scores = |set: &QuestionSet| set.iter().map(|q| q.aggregate_score).collect::<Vec<_>>();
    assert_eq!(scores(&first), scores(&second));
}

#[tokio::test]
async fn test_fallback_resets_between_runs() {
    let mock = Arc::new(
        MockProvider::new()
            .with_reply(MockReply::RateLimited)
            .with_reply(MockReply::RateLimited)
            .with_reply(MockReply::RateLimited)
            .with_reply(MockReply::RateLimited)
            .with_reply(MockReply::RateLimited),
    );
    let orchestrator = Orchestrator::new().with_generator(mock.clone());
    let dataset = flights();
    let context = AnalysisContext::default();

    let first = orchestrator.generate_questions(&dataset, &context, 10).await.unwrap();
    assert!(first.fallback_engaged);

    let calls_after_first = mock.calls();
    let second = orchestrator.generate_questions(&dataset, &context, 10).await.unwrap();
    assert!(mock.calls() > calls_after_first);
    assert_eq!(second.len(), 10);
    assert_eq!(
        second.history[2],
        ScopeState::Generating(GenerationMode::Online)
    );
}

#[tokio::test]
async fn test_exhausted_budget_counts_as_rate_limit() {
    let mut config = InquestConfig::default();
    config.generation.request_budget = Some(2);
    let orchestrator = Orchestrator::with_config(config)
        .unwrap()
        .with_generator(Arc::new(MockProvider::new()));

    let set = orchestrator
        .generate_questions(&flights(), &AnalysisContext::default(), 13)
        .await
        .unwrap();

    assert_eq!(set.len(), 13);
    assert!(set.fallback_engaged);
    assert_eq!(orchestrator.budget().used(), 2);
    assert!(orchestrator.budget().denied() >= 1);
    assert_no_duplicates(&set);
}

// =============================================================================
// Online generation and validation
// =============================================================================

#[tokio::test]
async fn test_low_scoring_candidates_are_degraded_after_retries() {
    let mock = Arc::new(MockProvider::always(MockReply::Text(
        "1. List the revenue values?\n2. Show passengers by region?".to_string(),
    )));
    let orchestrator = Orchestrator::new().with_generator(mock.clone());

    let set = orchestrator
        .generate_questions(&flights(), &AnalysisContext::default(), 13)
        .await
        .unwrap();

    assert_eq!(set.len(), 13);
    assert!(!set.fallback_engaged);
    // One initial request per category, then three retries each.
    assert_eq!(mock.calls(), 5 + 5 * 3);

    let threshold = orchestrator.config().scoring.threshold;
    let degraded: Vec<_> = set.iter().filter(|q| q.degraded).collect();
    assert!(degraded.len() >= 2);
    assert!(degraded.iter().all(|q| q.aggregate_score < threshold));
    assert!(
        set.iter()
            .any(|q| q.degraded && q.question.origin == Origin::Online)
    );
    assert_no_duplicates(&set);
}

#[tokio::test]
async fn test_online_questions_are_used_when_the_service_works() {
    let mock = Arc::new(MockProvider::new());
    let set = Orchestrator::new()
        .with_generator(mock.clone())
        .generate_questions(&flights(), &AnalysisContext::default(), 10)
        .await
        .unwrap();

    assert_eq!(set.len(), 10);
    assert!(!set.fallback_engaged);
    assert!(set.iter().any(|q| q.question.origin == Origin::Online));
    assert!(mock.prompts().iter().all(|p| p.contains("`revenue`")));
    assert_no_duplicates(&set);
}

#[tokio::test]
async fn test_repeated_online_questions_keep_category_quotas() {
    let columns = ["revenue", "passengers", "on_time_rate", "carrier", "region", "year"];
    let text = (0..12)
        .map(|i| {
            format!(
                "{}. How does the average {} compare with {} across the latest {} periods, and what ratio signals the highest growth?",
                i + 1,
                columns[i % columns.len()],
                columns[(i + 1) % columns.len()],
                i + 2
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let mock = Arc::new(MockProvider::always(MockReply::Text(text)));

    let set = Orchestrator::new()
        .with_generator(mock.clone())
        .generate_questions(&flights(), &AnalysisContext::default(), 13)
        .await
        .unwrap();

    assert_eq!(set.len(), 13);
    assert!(!set.fallback_engaged);
    for category in QuestionCategory::ALL {
        assert_eq!(
            set.count_in(category),
            set.quota.get(category),
            "composition of {}",
            category
        );
    }
    assert_no_duplicates(&set);
    assert!(
        set.iter()
            .filter(|q| q.category() == QuestionCategory::Descriptive)
            .all(|q| q.question.origin == Origin::Online)
    );
    assert!(
        set.iter()
            .filter(|q| q.category() == QuestionCategory::Comparative)
            .all(|q| q.question.origin == Origin::Offline)
    );
}

// =============================================================================
// Comparison and batch runs
// =============================================================================

#[tokio::test]
async fn test_comparison_questions_reference_both_datasets() {
    let set = Orchestrator::new()
        .generate_comparison(&[flights(), weather()], &AnalysisContext::default(), 5)
        .await
        .unwrap();

    assert_eq!(set.len(), 5);
    assert_eq!(set.scope.to_string(), "cross-dataset");
    for question in &set {
        let datasets = question.question.datasets();
        assert!(datasets.contains("flights"), "{}", question.text());
        assert!(datasets.contains("weather"), "{}", question.text());
    }
    assert_no_duplicates(&set);
}

#[tokio::test]
async fn test_comparison_with_online_service() {
    let set = Orchestrator::new()
        .with_generator(Arc::new(MockProvider::new()))
        .generate_comparison(&[flights(), weather()], &AnalysisContext::default(), 8)
        .await
        .unwrap();

    assert_eq!(set.len(), 8);
    assert!(set.iter().all(|q| q.question.datasets().len() >= 2));
}

#[tokio::test]
async fn test_comparison_rejects_unprofilable_dataset() {
    let err = Orchestrator::new()
        .generate_comparison(&[flights(), no_rows()], &AnalysisContext::default(), 5)
        .await
        .unwrap_err();
    assert!(err.is_profiling());
}

#[tokio::test]
async fn test_run_reports_each_dataset_and_comparison() {
    let datasets = vec![flights(), no_rows(), weather()];
    let report = Orchestrator::new()
        .run(&datasets, &AnalysisContext::default(), 10, Some(5))
        .await
        .unwrap();

    assert_eq!(report.datasets.len(), 3);
    assert_eq!(report.datasets[0].scope.to_string(), "flights");
    assert_eq!(report.datasets[1].scope.to_string(), "empty");
    assert_eq!(report.datasets[2].scope.to_string(), "weather");

    assert!(report.datasets[0].is_success());
    assert!(!report.datasets[1].is_success());
    assert!(report.datasets[1].error.as_ref().unwrap().contains("empty"));
    assert!(report.datasets[2].is_success());

    let comparison = report.comparison.as_ref().unwrap();
    assert_eq!(comparison.question_set.as_ref().unwrap().len(), 5);

    assert_eq!(report.total_questions, 25);
    assert_eq!(report.question_sets().count(), 3);
    assert_eq!(report.failures().count(), 1);
    assert!(report.average_score > 0.0);
    assert!(!report.fallback_engaged);
}

#[tokio::test]
async fn test_run_skips_comparison_without_two_usable_datasets() {
    let datasets = vec![flights(), no_rows()];
    let report = Orchestrator::new()
        .run(&datasets, &AnalysisContext::default(), 5, Some(5))
        .await
        .unwrap();
    let comparison = report.comparison.unwrap();
    assert!(!comparison.is_success());
}

#[tokio::test]
async fn test_run_with_one_worker_keeps_input_order() {
    let mut config = InquestConfig::default();
    config.generation.max_concurrent_datasets = 1;
    let datasets = vec![weather(), flights()];
    let report = Orchestrator::with_config(config)
        .unwrap()
        .run(&datasets, &AnalysisContext::default(), 6, None)
        .await
        .unwrap();

    let scopes: Vec<String> = report.datasets.iter().map(|r| r.scope.to_string()).collect();
    assert_eq!(scopes, vec!["weather", "flights"]);
    assert!(report.comparison.is_none());
}
