//! Benchmarks for the full MkNN pipeline and its thread scaling.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mknn::{build_mknn_graph, MknnParams, PointSet};
use rand::prelude::*;

fn random_points(n: usize, dim: usize) -> PointSet {
    let mut rng = StdRng::seed_from_u64(7);
    let data = (0..n * dim).map(|_| rng.gen::<f32>()).collect();
    PointSet::new(dim, data).unwrap()
}

fn bench_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("mknn_by_size");
    group.sample_size(20);

    for n in [1_000, 10_000, 50_000].iter() {
        let points = random_points(*n, 4);
        let params = MknnParams::with_k(10);
        group.throughput(Throughput::Elements(*n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| build_mknn_graph(black_box(&points), &params).unwrap())
        });
    }
    group.finish();
}

fn bench_threads(c: &mut Criterion) {
    let mut group = c.benchmark_group("mknn_by_threads");
    group.sample_size(20);
    let points = random_points(20_000, 4);

    for threads in [1, 2, 4, 8].iter() {
        let mut params = MknnParams::with_k(10);
        params.threads = *threads;
        group.bench_with_input(BenchmarkId::from_parameter(threads), threads, |bench, _| {
            bench.iter(|| build_mknn_graph(black_box(&points), &params).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_size, bench_threads);
criterion_main!(benches);
