//! Benchmarks for low-level DSP primitives.

mod compressor;
mod delay;
mod oscillator;
mod scheduler;

pub use compressor::bench_compressor;
pub use delay::bench_delay;
pub use oscillator::bench_oscillator;
pub use scheduler::bench_scheduler;
