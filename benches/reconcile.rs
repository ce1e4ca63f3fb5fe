//! Benchmarks for compose reconciliation.
//!
//! Measures `reconcile` over generated templates of growing size, with and
//! without a block delimiter in the selection.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use hecate::catalog::ApplicationCatalog;
use hecate::compose::{reconcile, strip_comment_prefix, ComposeDocument};
use hecate::selection::resolve;

/// A template with `services` commented-out service stanzas.
fn create_template(services: usize) -> ComposeDocument {
    let mut text = String::from("services:\n  nginx:\n    ports:\n");
    for i in 0..services {
        text.push_str(&format!("    #  - \"{}:{}\"\n", 10000 + i, 10000 + i));
        text.push_str("    #  - \"1515:1515\"\n");
        text.push_str(&format!("  # service{}:\n  #   image: example/{}\n", i, i));
    }
    text.push_str("  # uncomment if using Jenkins behind Hecate\n  #  jenkins:\n  # <- finish\n");
    ComposeDocument::from_text(&text)
}

fn bench_reconcile(c: &mut Criterion) {
    let catalog = ApplicationCatalog::builtin();
    let wazuh = resolve("2", "", &catalog).unwrap();
    let all = resolve("all", "", &catalog).unwrap();

    let mut group = c.benchmark_group("reconcile");
    for services in [10, 100, 1000] {
        let document = create_template(services);
        group.bench_with_input(BenchmarkId::new("markers", services), &document, |b, doc| {
            b.iter(|| reconcile(black_box(doc), &wazuh))
        });
        group.bench_with_input(BenchmarkId::new("all", services), &document, |b, doc| {
            b.iter(|| reconcile(black_box(doc), &all))
        });
    }
    group.finish();

    // Second pass over an already reconciled document.
    let reconciled = reconcile(&create_template(1000), &all).document;
    c.bench_function("reconcile_idempotent_pass", |b| {
        b.iter(|| reconcile(black_box(&reconciled), &all))
    });
}

fn bench_strip(c: &mut Criterion) {
    c.bench_function("strip_comment_prefix", |b| {
        b.iter(|| strip_comment_prefix(black_box("    # #  - \"1515:1515\"")))
    });
}

criterion_group!(benches, bench_reconcile, bench_strip);
criterion_main!(benches);
