//! Arena allocation benchmarks
//!
//! Fast-path bumps, block fetches on the slow path and whole-arena lifecycles

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use region_arena::{Arena, ArenaConfig};
use std::hint::black_box;

/// Bump allocations that always fit the current block
fn bench_fast_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("fast_path");

    for size in [8usize, 64, 256] {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                // 1000 * 256 bytes fits a single 256 KiB initial block
                let arena = Arena::with_config(
                    ArenaConfig::production().with_initial_units(64),
                );
                for _ in 0..1000 {
                    black_box(arena.allocate(black_box(size)));
                }
                arena.destroy()
            });
        });
    }

    group.finish();
}

/// Every allocation fetches a new block
fn bench_slow_path(c: &mut Criterion) {
    let mut group = c.benchmark_group("slow_path");

    for unit_size in [1024usize, 4096, 64 * 1024] {
        group.throughput(Throughput::Elements(100));
        group.bench_with_input(
            BenchmarkId::from_parameter(unit_size),
            &unit_size,
            |b, &unit_size| {
                b.iter(|| {
                    let arena = Arena::with_config(
                        ArenaConfig::production().with_block_unit_size(unit_size),
                    );
                    for _ in 0..100 {
                        black_box(arena.allocate(unit_size));
                    }
                    arena.destroy()
                });
            },
        );
    }

    group.finish();
}

/// Requests spanning several block units
fn bench_large_allocations(c: &mut Criterion) {
    let mut group = c.benchmark_group("large_allocation");

    for size in [10_000usize, 100_000, 1024 * 1024] {
        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                let arena = Arena::create();
                black_box(arena.allocate(black_box(size)));
                arena.destroy()
            });
        });
    }

    group.finish();
}

/// Mixed object sizes against a Box per object
fn bench_vs_box(c: &mut Criterion) {
    const SIZES: [usize; 8] = [16, 24, 8, 120, 48, 300, 32, 64];
    let mut group = c.benchmark_group("mixed_objects");

    group.bench_function("arena", |b| {
        b.iter(|| {
            let arena = Arena::with_config(ArenaConfig::production());
            for i in 0..1000 {
                black_box(arena.allocate(SIZES[i % SIZES.len()]));
            }
            arena.destroy()
        });
    });

    group.bench_function("box", |b| {
        b.iter(|| {
            let boxes: Vec<Box<[u8]>> = (0..1000)
                .map(|i| vec![0u8; SIZES[i % SIZES.len()]].into_boxed_slice())
                .collect();
            black_box(boxes)
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_fast_path,
    bench_slow_path,
    bench_large_allocations,
    bench_vs_box
);
criterion_main!(benches);
