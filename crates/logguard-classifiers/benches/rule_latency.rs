//! Latency benchmarks for the rule layer
//!
//! Measures first-match lookup against the built-in table for lines that
//! hit early, hit late, and miss every rule.
//!
//! Run with: cargo bench -p logguard-classifiers

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use std::sync::Arc;

use logguard_classifiers::{HybridClassifier, RuleSet};

fn benchmark_rule_lookup(c: &mut Criterion) {
    let rules = RuleSet::builtin().expect("Failed to compile built-in rules");

    let test_cases = vec![
        ("early_hit", "Unauthorized access to /admin from 10.0.0.7"),
        ("mid_hit", "Kernel panic - not syncing: Fatal exception"),
        ("late_hit", "Packet loss > 12% on eth0"),
        ("miss_short", "heartbeat ok"),
        (
            "miss_long",
            "worker-7 finished compacting segment 0042 in 381ms, 12 files merged, no anomalies",
        ),
    ];

    let mut group = c.benchmark_group("Rule_Lookup");
    group.sample_size(100);

    for (name, text) in test_cases {
        group.bench_with_input(BenchmarkId::new("classify_by_rule", name), &text, |b, text| {
            b.iter(|| rules.classify_by_rule(black_box(text)));
        });
    }

    group.finish();
}

fn benchmark_hybrid_rules_only(c: &mut Criterion) {
    let rules = Arc::new(RuleSet::builtin().expect("Failed to compile built-in rules"));
    let classifier = HybridClassifier::rules_only(rules);

    let mut group = c.benchmark_group("Hybrid_Rules_Only");

    group.bench_function("rule_hit", |b| {
        b.iter(|| classifier.classify(black_box("Database connection failed")))
    });
    group.bench_function("scorer_unavailable", |b| {
        b.iter(|| classifier.classify(black_box("heartbeat ok")))
    });
    group.bench_function("empty", |b| b.iter(|| classifier.classify(black_box("   "))));

    group.finish();
}

fn benchmark_rule_compilation(c: &mut Criterion) {
    c.bench_function("builtin_compile", |b| {
        b.iter(|| RuleSet::builtin().expect("Failed to compile built-in rules"))
    });
}

criterion_group!(
    benches,
    benchmark_rule_lookup,
    benchmark_hybrid_rules_only,
    benchmark_rule_compilation,
);
criterion_main!(benches);
