use criterion::{black_box, criterion_group, criterion_main, Criterion};
use combo_table::search::filter::{filter_indices, Matcher};
use combo_table::{Row, SearchModel, SearchPattern, SearchableModel};

fn create_test_rows(rows: usize) -> Vec<Row> {
    let texts = [
        "California dreaming",
        "All the leaves are brown",
        "the sky is grey",
        "I went for a walk",
        "On such a winter's day",
        "I stopped into a church",
        "the preacher likes the cold",
        "I pretend to pray",
    ];

    (0..rows)
        .map(|i| Row::pair(i.to_string(), format!("{} {}", texts[i % texts.len()], i)))
        .collect()
}

fn benchmark_literal_filter(c: &mut Criterion) {
    let rows_10k = create_test_rows(10_000);
    let rows_100k = create_test_rows(100_000);
    let matcher = Matcher::compile(&SearchPattern::literal("walk")).unwrap();

    let mut group = c.benchmark_group("filter_literal");

    group.bench_function("10k_rows", |b| {
        b.iter(|| filter_indices(black_box(&rows_10k), matcher.as_ref()));
    });

    group.bench_function("100k_rows", |b| {
        b.iter(|| filter_indices(black_box(&rows_100k), matcher.as_ref()));
    });

    group.finish();
}

fn benchmark_regex_filter(c: &mut Criterion) {
    let rows_100k = create_test_rows(100_000);

    let mut group = c.benchmark_group("filter_regex");

    group.bench_function("unanchored", |b| {
        let matcher = Matcher::compile(&SearchPattern::regex("w(a|i)")).unwrap();
        b.iter(|| filter_indices(black_box(&rows_100k), matcher.as_ref()));
    });

    group.bench_function("anchored", |b| {
        let matcher = Matcher::compile(&SearchPattern::regex("the").anchored(true)).unwrap();
        b.iter(|| filter_indices(black_box(&rows_100k), matcher.as_ref()));
    });

    group.finish();
}

fn benchmark_keystroke_refilter(c: &mut Criterion) {
    let mut model = SearchableModel::with_rows(create_test_rows(100_000));
    let prefixes = ["C", "Ca", "Cal", "Cali", "Calif"];

    c.bench_function("refilter_per_keystroke", |b| {
        b.iter(|| {
            for prefix in prefixes {
                let result = model.set_search_pattern(Some(black_box(prefix).to_string()));
                assert!(result.is_ok());
            }
            model.take_events();
        });
    });
}

criterion_group!(
    benches,
    benchmark_literal_filter,
    benchmark_regex_filter,
    benchmark_keystroke_refilter
);
criterion_main!(benches);
