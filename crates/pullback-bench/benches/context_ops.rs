//! Criterion micro-benchmarks for subcontext allocate/release.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pullback_arena::ArenaConfig;
use pullback_bench::{reference_script, run_context_script, unwind_chain};
use pullback_runtime::LinearMapContext;

/// Benchmark: one allocate + release pair on a warm context.
fn bench_single_pair(c: &mut Criterion) {
    let ctx = LinearMapContext::new(4096);
    c.bench_function("subcontext_alloc_release", |b| {
        b.iter(|| {
            let sub = ctx.allocate_subcontext(black_box(32));
            black_box(sub.buffer());
            sub.release();
        });
    });
}

/// Benchmark: build and unwind chains of increasing depth.
fn bench_chain_depth(c: &mut Criterion) {
    let mut group = c.benchmark_group("subcontext_chain");
    for depth in [16usize, 256, 4096] {
        let ctx = LinearMapContext::new(0);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| unwind_chain(&ctx, depth, 24));
        });
    }
    group.finish();
}

/// Benchmark: replay the reference mixed script, comparing slab sizes.
fn bench_reference_script(c: &mut Criterion) {
    let ops = reference_script(0x5EED, 10_000);
    let mut group = c.benchmark_group("subcontext_reference_script");
    for slab_bytes in [256usize, 4096, 65536] {
        let ctx = LinearMapContext::with_config(ArenaConfig::new(slab_bytes), 0).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(slab_bytes), &ops, |b, ops| {
            b.iter(|| black_box(run_context_script(&ctx, ops)));
        });
    }
    group.finish();
}

/// Benchmark: fresh context per iteration, including slab acquisition.
fn bench_cold_context(c: &mut Criterion) {
    c.bench_function("context_create_and_unwind_64", |b| {
        b.iter(|| {
            let ctx = LinearMapContext::new(black_box(2048));
            unwind_chain(&ctx, 64, 16);
        });
    });
}

criterion_group!(
    benches,
    bench_single_pair,
    bench_chain_depth,
    bench_reference_script,
    bench_cold_context
);
criterion_main!(benches);
