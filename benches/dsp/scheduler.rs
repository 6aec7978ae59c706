//! Benchmarks for the render-clock tick path.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulsar_dsp::TickScheduler;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_scheduler(c: &mut Criterion) {
    let mut group = c.benchmark_group("engine/scheduler");

    for &size in BLOCK_SIZES {
        // Steady state: no waiters registered, so the hot path never locks.
        let mut scheduler = TickScheduler::new(SAMPLE_RATE);
        scheduler.start();
        group.bench_with_input(BenchmarkId::new("tick_no_waiters", size), &size, |b, _| {
            b.iter(|| {
                for _ in 0..size {
                    scheduler.tick();
                }
                black_box(scheduler.tick_count())
            })
        });
    }

    group.finish();
}
