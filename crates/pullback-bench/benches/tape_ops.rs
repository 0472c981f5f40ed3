//! Criterion micro-benchmarks for tape push/pop.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use pullback_runtime::TapeManager;
use pullback_test_utils::fixtures::{Pair, Wide};

/// Benchmark: push then pop one slot on a warm manager.
fn bench_push_pop(c: &mut Criterion) {
    let mut tapes = TapeManager::new();
    let id = tapes.create_tape_for::<Pair>();
    c.bench_function("tape_push_pop", |b| {
        b.iter(|| {
            black_box(tapes.allocate(id));
            black_box(tapes.pop(id));
        });
    });
}

/// Benchmark: fill a tape to `n` slots, then drain it.
fn bench_fill_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("tape_fill_drain");
    for n in [64usize, 1024, 16384] {
        let mut tapes = TapeManager::new();
        let id = tapes.create_tape_for::<Pair>();
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                for _ in 0..n {
                    black_box(tapes.allocate(id));
                }
                for _ in 0..n {
                    black_box(tapes.pop(id));
                }
            });
        });
    }
    group.finish();
}

/// Benchmark: two tapes of different alignment pushed alternately and
/// drained in reverse.
fn bench_interleaved(c: &mut Criterion) {
    let mut tapes = TapeManager::new();
    let pairs = tapes.create_tape_for::<Pair>();
    let wides = tapes.create_tape_for::<Wide>();
    c.bench_function("tape_interleaved_1024", |b| {
        b.iter(|| {
            for _ in 0..512 {
                black_box(tapes.allocate(pairs));
                black_box(tapes.allocate(wides));
            }
            for _ in 0..512 {
                black_box(tapes.pop(wides));
                black_box(tapes.pop(pairs));
            }
        });
    });
}

criterion_group!(benches, bench_push_pop, bench_fill_drain, bench_interleaved);
criterion_main!(benches);
