//! Benchmarks for the Aurora search index
//!
//! Run with: cargo bench

use aurora::fetcher::Message;
use aurora::index::{Indexer, SearchIndex};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

const NAMES: [&str; 6] = ["Sophia Al-Farsi", "Fatima El-Tahir", "Armand Dupont", "Hans Müller", "Layla Kawaguchi", "Vikram Desai"];

const PHRASES: [&str; 5] = [
    "Please book a private jet to Paris for this Friday.",
    "Can you confirm my dinner reservation at 8pm?",
    "I need two tickets to the opera in Milan next week.",
    "Arrange a car service from the airport on Tuesday.",
    "What are the best hotels near the Louvre?",
];

fn create_test_messages(count: usize) -> Vec<Message> {
    (0..count)
        .map(|i| {
            Message::new(
                format!("msg-{:05}", i),
                format!("user-{}", i % NAMES.len()),
                NAMES[i % NAMES.len()],
                "2024-05-01T10:00:00Z",
                PHRASES[i % PHRASES.len()],
            )
        })
        .collect()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");

    for size in [100, 1000, 3000] {
        let messages = create_test_messages(size);

        group.throughput(Throughput::Elements(size as u64));

        group.bench_function(format!("build_{}", size), |b| {
            b.iter(|| SearchIndex::build(black_box(messages.clone())))
        });
    }

    group.finish();
}

fn bench_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    let index = SearchIndex::build(create_test_messages(3000));
    group.throughput(Throughput::Elements(index.len() as u64));

    // Frequent hit, rare hit, author hit, miss
    for query in ["paris", "louvre", "müller", "nothing matches this"] {
        group.bench_function(format!("query_{}", query.replace(' ', "_")), |b| {
            b.iter(|| index.search(black_box(query), 1, 10))
        });
    }

    group.bench_function("query_deep_page", |b| {
        b.iter(|| index.search(black_box("book"), black_box(50), 10))
    });

    group.finish();
}

fn bench_indexer(c: &mut Criterion) {
    let mut group = c.benchmark_group("indexer");

    let indexer = Indexer::new();
    indexer.build(create_test_messages(3000));

    group.bench_function("search_via_snapshot", |b| {
        b.iter(|| indexer.search(black_box("tickets"), 1, 10))
    });

    group.bench_function("list_page_1000", |b| {
        b.iter(|| indexer.list_all(black_box(2), 1000))
    });

    group.finish();
}

criterion_group!(benches, bench_build, bench_search, bench_indexer);
criterion_main!(benches);
