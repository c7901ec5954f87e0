//! Throughput benchmarks using criterion.
//!
//! Measures parallel-for throughput over a large index range and the cost
//! of many single-unit submissions.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use forkpool::TaskPool;
use rand::Rng;

const INDEX_COUNT: usize = 1_000_000;

/// Benchmark one range submission fanned across all cores.
fn bench_parallel_for(c: &mut Criterion) {
    let num_threads = num_cpus::get();
    let pool = TaskPool::new(num_threads);
    pool.wait_idle();

    let mut group = c.benchmark_group("throughput");
    group.throughput(Throughput::Elements(INDEX_COUNT as u64));
    group.sample_size(10);

    group.bench_function(BenchmarkId::new("parallel_for_1m", num_threads), |b| {
        b.iter(|| {
            pool.submit(INDEX_COUNT, |index| {
                std::hint::black_box(index.wrapping_mul(2654435761));
            });
            pool.wait_idle();
        })
    });

    group.finish();
}

/// Benchmark at different thread counts for scaling analysis.
fn bench_scaling(c: &mut Criterion) {
    let mut group = c.benchmark_group("throughput_scaling");
    group.throughput(Throughput::Elements(INDEX_COUNT as u64));
    group.sample_size(10);

    for threads in [1, 2, 4, 8, 16].iter().filter(|&&t| t <= num_cpus::get()) {
        let pool = TaskPool::new(*threads);
        pool.wait_idle();

        group.bench_function(BenchmarkId::new("parallel_for_1m", threads), |b| {
            b.iter(|| {
                pool.submit(INDEX_COUNT, |index| {
                    std::hint::black_box(index.wrapping_mul(2654435761));
                });
                pool.wait_idle();
            })
        });
    }

    group.finish();
}

/// Benchmark many single-unit submissions with a randomized id mix.
fn bench_single_unit_submissions(c: &mut Criterion) {
    let num_threads = num_cpus::get();
    let pool = TaskPool::new(num_threads);
    pool.wait_idle();

    let mut rng = rand::thread_rng();
    let ids: Vec<usize> = (0..200).map(|_| rng.gen_range(0..10_000)).collect();

    let mut group = c.benchmark_group("single_unit");
    group.throughput(Throughput::Elements(ids.len() as u64));

    group.bench_function(BenchmarkId::new("submit_one_x200", num_threads), |b| {
        b.iter(|| {
            for &id in &ids {
                pool.submit_one(id, |index| {
                    std::hint::black_box(index);
                });
            }
            pool.wait_idle();
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_parallel_for,
    bench_scaling,
    bench_single_unit_submissions
);
criterion_main!(benches);
