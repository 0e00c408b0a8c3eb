//! LED registry benchmarks.
//!
//! Measures the handle lifecycle (acquire + release) and toggling through a
//! held handle against the simulation board.

use criterion::{Criterion, criterion_group, criterion_main};
use sonata_gpio::{LedRegistry, QuotaAllocator, SimulatedBoard};
use std::hint::black_box;
use std::sync::Arc;

fn registry() -> LedRegistry {
    LedRegistry::new(
        Arc::new(SimulatedBoard::new(8)),
        Arc::new(QuotaAllocator::new(1024)),
    )
}

fn bench_acquire_release(c: &mut Criterion) {
    let reg = registry();

    c.bench_function("registry_acquire_release", |b| {
        b.iter(|| {
            let handle = reg.acquire(black_box(3)).unwrap();
            reg.release(&handle);
        });
    });
}

fn bench_toggle(c: &mut Criterion) {
    let reg = registry();
    let handle = reg.acquire(7).unwrap();

    c.bench_function("registry_toggle", |b| {
        b.iter(|| {
            black_box(reg.toggle(black_box(&handle)));
        });
    });
}

fn bench_toggle_stale(c: &mut Criterion) {
    let reg = registry();
    let stale = reg.acquire(7).unwrap();
    reg.release(&stale);

    c.bench_function("registry_toggle_rejected", |b| {
        b.iter(|| {
            black_box(reg.try_toggle(black_box(&stale)).is_err());
        });
    });
}

fn bench_lifecycle(c: &mut Criterion) {
    let reg = registry();

    c.bench_function("registry_acquire_toggle_release_all", |b| {
        b.iter(|| {
            for i in 0..8 {
                let handle = reg.acquire(i).unwrap();
                reg.toggle(&handle);
                reg.release(&handle);
            }
        });
    });
}

criterion_group!(
    benches,
    bench_acquire_release,
    bench_toggle,
    bench_toggle_stale,
    bench_lifecycle
);
criterion_main!(benches);
