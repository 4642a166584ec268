//! Question pipeline performance benchmarks.
//!
//! Measures profiling, SMART scoring, selection and full offline runs.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::collections::BTreeSet;

use inquest::generation::{
    find_column_refs, CandidateQuestion, DatasetColumns, Origin, QuestionCategory,
};
use inquest::profile::ColumnAnalyzer;
use inquest::scoring::{ScoringConfig, SmartValidator};
use inquest::selection::CountEnforcer;
use inquest::{AnalysisContext, DataTable, Dataset, DiversityAllocator, Orchestrator};

/// Generate a sales table with a date, two categories and three measures.
fn generate_sales_data(rows: usize) -> Dataset {
    let regions = ["north", "south", "east", "west"];
    let channels = ["online", "retail", "partner"];
    let rows = (0..rows)
        .map(|row| {
            vec![
                format!("2023-{:02}-{:02}", row % 12 + 1, row % 28 + 1),
                regions[row % regions.len()].to_string(),
                channels[row % channels.len()].to_string(),
                format!("{:.2}", 250.0 + (row % 97) as f64 * 12.5),
                format!("{}", 1 + row % 40),
                format!("{:.3}", (row % 30) as f64 / 100.0),
            ]
        })
        .collect();
    let headers = ["order_date", "region", "channel", "revenue", "units_sold", "discount_rate"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    Dataset::new("sales", DataTable::new(headers, rows, b','))
}

fn sample_questions() -> Vec<&'static str> {
    vec![
        "What is the average revenue per region in the latest quarter?",
        "How does units_sold compare across channel groups month over month?",
        "List the discount_rate values?",
        "Which region shows the highest revenue growth rate between 2022 and 2023?",
        "How does the correlation between discount_rate and units_sold differ across order_date quarters?",
    ]
}

fn bench_profiling(c: &mut Criterion) {
    let mut group = c.benchmark_group("profiling");
    let analyzer = ColumnAnalyzer::new();

    for rows in [100, 1_000, 10_000] {
        let dataset = generate_sales_data(rows);
        group.throughput(Throughput::Elements(rows as u64));
        group.bench_with_input(BenchmarkId::new("rows", rows), &dataset, |b, ds| {
            b.iter(|| analyzer.analyze_table(black_box(&ds.name), black_box(&ds.table)))
        });
    }

    group.finish();
}

fn bench_scoring(c: &mut Criterion) {
    let dataset = generate_sales_data(200);
    let context = AnalysisContext::new("retail").with_objective("grow revenue per region");
    let validator = SmartValidator::new(ScoringConfig::default(), &context);
    let profiles = ColumnAnalyzer::new()
        .analyze_table(&dataset.name, &dataset.table)
        .unwrap();
    let columns = [DatasetColumns {
        dataset: &dataset.name,
        profiles: &profiles,
    }];

    let candidates: Vec<CandidateQuestion> = sample_questions()
        .into_iter()
        .enumerate()
        .map(|(i, text)| CandidateQuestion {
            text: text.to_string(),
            category: QuestionCategory::ALL[i],
            referenced_columns: find_column_refs(text, &columns),
            origin: Origin::Offline,
            ordinal: i,
        })
        .collect();

    c.bench_function("score_candidates", |b| {
        b.iter(|| {
            candidates
                .iter()
                .map(|q| validator.score(black_box(q.clone()), true).aggregate_score)
                .sum::<f64>()
        })
    });
}

fn bench_selection(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection");
    let allocator = DiversityAllocator::new();
    let context = AnalysisContext::default();
    let validator = SmartValidator::new(ScoringConfig::default(), &context);

    for total in [10, 25, 100] {
        let quota = allocator.allocate(total);
        let pool: Vec<_> = (0..total * 2)
            .map(|i| {
                let category = QuestionCategory::ALL[i % QuestionCategory::ALL.len()];
                let candidate = CandidateQuestion {
                    text: format!("How does the average revenue change across the latest {} months?", i),
                    category,
                    referenced_columns: BTreeSet::new(),
                    origin: Origin::Offline,
                    ordinal: i,
                };
                validator.score(candidate, true)
            })
            .collect();

        group.bench_with_input(BenchmarkId::new("select", total), &pool, |b, pool| {
            b.iter(|| CountEnforcer::new().select(black_box(pool.clone()), &quota))
        });
    }

    group.finish();
}

fn bench_offline_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("offline_run");
    group.sample_size(20);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let dataset = generate_sales_data(500);
    let context = AnalysisContext::default();
    let orchestrator = Orchestrator::new();

    for count in [10, 25, 50] {
        group.bench_with_input(BenchmarkId::new("questions", count), &count, |b, &count| {
            b.iter(|| {
                runtime
                    .block_on(orchestrator.generate_questions(&dataset, &context, black_box(count)))
                    .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_profiling,
    bench_scoring,
    bench_selection,
    bench_offline_run,
);
criterion_main!(benches);
