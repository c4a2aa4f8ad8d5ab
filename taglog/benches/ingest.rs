//! Benchmarks for insert throughput and tag lookups.
//!
//! These measure the cost of the write path (key allocation plus dual
//! index maintenance) and of posting-list reads on a populated log.

use criterion::{Criterion, black_box, criterion_group, criterion_main};

use taglog::{Log, Timestamp};

const TAGS: &[&str] = &["alpha", "beta", "gamma", "delta", "epsilon"];

fn populated_log(records: usize) -> Log<Timestamp, String> {
    let log = Log::new();
    for i in 0..records {
        log.insert_tagged(format!("record {i}"), [TAGS[i % TAGS.len()]]);
    }
    log
}

fn bench_insert(c: &mut Criterion) {
    c.bench_function("insert_untagged", |b| {
        let log: Log<Timestamp, String> = Log::new();
        b.iter(|| log.insert(black_box("payload".to_string())));
    });

    c.bench_function("insert_with_three_tags", |b| {
        let log: Log<Timestamp, String> = Log::new();
        b.iter(|| {
            log.insert_tagged(
                black_box("payload".to_string()),
                ["alpha", "beta", "gamma"],
            )
        });
    });
}

fn bench_lookup(c: &mut Criterion) {
    let log = populated_log(10_000);

    c.bench_function("entries_for_tag_10k", |b| {
        b.iter(|| black_box(log.entries_for_tag("gamma")).len());
    });

    c.bench_function("entries_for_all_two_tags_10k", |b| {
        b.iter(|| black_box(log.entries_for_all(["alpha", "beta"])).len());
    });
}

criterion_group!(benches, bench_insert, bench_lookup);
criterion_main!(benches);
