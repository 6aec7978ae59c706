//! Benchmarks for the lookahead compressor.

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion};
use pulsar_dsp::Compressor;

use crate::BLOCK_SIZES;

const SAMPLE_RATE: f32 = 48_000.0;

pub fn bench_compressor(c: &mut Criterion) {
    let mut group = c.benchmark_group("dsp/compressor");

    for &size in BLOCK_SIZES {
        // Alternate loud and quiet so both smoothing branches get exercised.
        let input: Vec<f32> = (0..size)
            .map(|i| if (i / 32) % 2 == 0 { 0.9 } else { 0.05 })
            .collect();

        let mut comp = Compressor::new(SAMPLE_RATE);
        comp.set_threshold(-24.0);
        comp.set_ratio(4.0);
        let mut buffer = input.clone();
        group.bench_with_input(BenchmarkId::new("render", size), &size, |b, _| {
            b.iter(|| {
                buffer.copy_from_slice(&input);
                comp.render(black_box(&mut buffer));
            })
        });
    }

    group.finish();
}
