//! Criterion benchmarks for the sampling hot path.
//!
//! Benchmarks cover:
//! - Point generation from the uniform source
//! - Classification of drawn points
//! - Bounded end-to-end runs with varying worker counts

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use piculator_engine::prelude::*;
use piculator_engine::worker::is_inside;

/// Benchmark raw point generation.
fn bench_point_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("point_generation");

    for n_points in [1_000u64, 10_000, 100_000] {
        group.throughput(Throughput::Elements(n_points));
        group.bench_with_input(
            BenchmarkId::new("uniform", n_points),
            &n_points,
            |b, &n| {
                let mut source = UniformPointSource::from_seed(42, 0);
                b.iter(|| {
                    let mut inside = 0u64;
                    for _ in 0..n {
                        let (x, y) = source.next_point();
                        inside += u64::from(is_inside(x, y));
                    }
                    black_box(inside)
                });
            },
        );
    }

    group.finish();
}

/// Benchmark bounded runs across worker counts.
fn bench_bounded_run(c: &mut Criterion) {
    let mut group = c.benchmark_group("bounded_run");
    group.sample_size(10);

    let per_worker = 200_000u64;
    for workers in [1usize, 2, 4] {
        group.throughput(Throughput::Elements(per_worker * workers as u64));
        group.bench_with_input(
            BenchmarkId::new("workers", workers),
            &workers,
            |b, &workers| {
                let config = EngineConfig::builder()
                    .workers(workers)
                    .checkpoint_interval(50_000)
                    .sample_limit(per_worker)
                    .seed(42)
                    .build()
                    .unwrap();
                b.iter(|| {
                    let mut engine = Engine::new(config.clone());
                    let summary = engine
                        .run_uniform(&StopSignal::new(), TextReport::new(std::io::sink()))
                        .unwrap();
                    black_box(summary.estimate())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_point_generation, bench_bounded_run);
criterion_main!(benches);
