pub mod dsp; // Per-sample signal primitives
pub mod engine; // Render-clock scheduling
pub mod params; // Process-wide parameter-range tables

/// Upper bound on a delay line's window, in samples (4 seconds at 48 kHz).
pub const MAX_DELAY_SAMPLES: usize = 192_000;

pub use dsp::compressor::Compressor;
pub use dsp::delay::FeedbackDelay;
pub use dsp::oscillator::{Oscillator, OscillatorMode, Waveform};
pub use engine::scheduler::{TickHandle, TickScheduler};
