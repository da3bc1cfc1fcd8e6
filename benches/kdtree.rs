//! Benchmarks for k-d tree construction and queries.
//!
//! Compares tree queries against the exhaustive scan they must agree with.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use mknn::index::{ExhaustiveIndex, KdTree, KdTreeParams};
use mknn::{DistanceMetric, NeighborIndex, PointSet};
use rand::prelude::*;

fn random_points(n: usize, dim: usize) -> PointSet {
    let mut rng = StdRng::seed_from_u64(42);
    let data = (0..n * dim).map(|_| rng.gen::<f32>() * 2.0 - 1.0).collect();
    PointSet::new(dim, data).unwrap()
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_build");

    for n in [1_000, 10_000, 100_000].iter() {
        let points = random_points(*n, 8);
        group.throughput(Throughput::Elements(*n as u64));
        group.bench_with_input(BenchmarkId::from_parameter(n), n, |bench, _| {
            bench.iter(|| {
                KdTree::build(
                    black_box(&points),
                    DistanceMetric::Euclidean,
                    KdTreeParams::default(),
                )
                .unwrap()
            })
        });
    }
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("knn_query");
    let points = random_points(10_000, 4);
    let tree = KdTree::build(&points, DistanceMetric::Euclidean, KdTreeParams::default()).unwrap();
    let flat = ExhaustiveIndex::new(&points, DistanceMetric::Euclidean).unwrap();

    for k in [1, 10, 50].iter() {
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(BenchmarkId::new("kdtree", k), k, |bench, &k| {
            bench.iter(|| {
                for i in 0..100u32 {
                    black_box(tree.query_k_nearest(i, k).unwrap());
                }
            })
        });
        group.bench_with_input(BenchmarkId::new("exhaustive", k), k, |bench, &k| {
            bench.iter(|| {
                for i in 0..100u32 {
                    black_box(flat.query_k_nearest(i, k).unwrap());
                }
            })
        });
    }
    group.finish();
}

fn bench_dimension(c: &mut Criterion) {
    let mut group = c.benchmark_group("kdtree_query_by_dim");

    for dim in [2, 8, 32].iter() {
        let points = random_points(5_000, *dim);
        let tree = KdTree::build(&points, DistanceMetric::Euclidean, KdTreeParams::default()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(dim), dim, |bench, _| {
            bench.iter(|| {
                for i in 0..100u32 {
                    black_box(tree.query_k_nearest(i, 10).unwrap());
                }
            })
        });
    }
    group.finish();
}

criterion_group!(benches, bench_build, bench_query, bench_dimension);
criterion_main!(benches);
