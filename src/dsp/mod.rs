//! Per-sample signal primitives.
//!
//! Every component here produces or transforms exactly one sample per call,
//! in lockstep with the host's render clock. The steady-state contract is
//! allocation-free, non-blocking, bounded work: these are safe to drive from
//! a hard-realtime render thread. Configuration setters that reallocate are
//! called out on the type and belong off the render thread.

/// Fixed-capacity indexed sample store.
pub mod buffer;
/// Lookahead feed-forward dynamics compressor.
pub mod compressor;
/// Feedback comb delay line.
pub mod delay;
/// Band-limited oscillator with polyBLEP edge correction.
pub mod oscillator;
