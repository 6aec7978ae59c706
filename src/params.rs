//! Process-wide parameter-range tables.
//!
//! Every configurable component validates its setters against a shared,
//! immutable range. Ranges are plain consts, read-only after startup, so they
//! are shared across instances without synchronization.
//!
//! Two validation policies exist. [`check_parameter_range`] clamps and logs a
//! warning, so a setter always proceeds with a usable value. The strict
//! [`ParameterRange::validate`] fails before any state is mutated and is used
//! on cross-thread control paths where silently-adjusted values are harder to
//! observe.

use std::fmt;

use crate::MAX_DELAY_SAMPLES;

/// Inclusive valid range for a single parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParameterRange<T> {
    pub min: T,
    pub max: T,
}

impl<T: PartialOrd + Copy + fmt::Display> ParameterRange<T> {
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: T) -> bool {
        value >= self.min && value <= self.max
    }

    pub fn clamp(&self, value: T) -> T {
        if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Strict check: rejects an out-of-range value instead of adjusting it.
    pub fn validate(&self, name: &'static str, value: T) -> Result<T, ParameterError> {
        if self.contains(value) {
            Ok(value)
        } else {
            Err(ParameterError {
                name,
                value: value.to_string(),
                min: self.min.to_string(),
                max: self.max.to_string(),
            })
        }
    }
}

/// Clamp `value` into `range`, warning when the input was out of range.
///
/// Called from configuration paths only, never from per-sample rendering.
pub fn check_parameter_range<T>(name: &str, value: T, range: ParameterRange<T>) -> T
where
    T: PartialOrd + Copy + fmt::Display,
{
    if !range.contains(value) {
        log::warn!(
            "{name}: {value} outside valid range [{min}, {max}], clamping",
            min = range.min,
            max = range.max
        );
    }
    range.clamp(value)
}

/// A parameter value rejected by strict validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterError {
    pub name: &'static str,
    pub value: String,
    pub min: String,
    pub max: String,
}

impl fmt::Display for ParameterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} outside valid range [{}, {}]",
            self.name, self.value, self.min, self.max
        )
    }
}

impl std::error::Error for ParameterError {}

/// Scheduler tempo, beats per minute.
pub const BPM_RANGE: ParameterRange<u32> = ParameterRange::new(1, 1000);
/// Scheduler resolution, pulses per quarter note.
pub const PPQ_RANGE: ParameterRange<u32> = ParameterRange::new(1, 1000);

/// Delay window, samples.
pub const DELAY_RANGE: ParameterRange<usize> = ParameterRange::new(1, MAX_DELAY_SAMPLES);
/// Delay feedback coefficient. 1.0 recirculates without decay.
pub const FEEDBACK_RANGE: ParameterRange<f32> = ParameterRange::new(0.0, 1.0);

/// Compressor attack time, seconds.
pub const ATTACK_TIME_RANGE: ParameterRange<f32> = ParameterRange::new(1.0e-4, 1.0);
/// Compressor release time, seconds.
pub const RELEASE_TIME_RANGE: ParameterRange<f32> = ParameterRange::new(1.0e-3, 5.0);
/// Compressor threshold, dBFS.
pub const THRESHOLD_RANGE: ParameterRange<f32> = ParameterRange::new(-60.0, 0.0);
/// Compression ratio, n:1.
pub const RATIO_RANGE: ParameterRange<f32> = ParameterRange::new(1.0, 20.0);
/// Compressor pre/post make-up gain, dB.
pub const GAIN_RANGE: ParameterRange<f32> = ParameterRange::new(-30.0, 30.0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_below_and_above() {
        assert_eq!(check_parameter_range("test: bpm", 0u32, BPM_RANGE), 1);
        assert_eq!(check_parameter_range("test: bpm", 4000u32, BPM_RANGE), 1000);
        assert_eq!(check_parameter_range("test: bpm", 120u32, BPM_RANGE), 120);
    }

    #[test]
    fn validate_rejects_out_of_range() {
        let err = BPM_RANGE.validate("BPM", 4000).unwrap_err();
        assert_eq!(err.name, "BPM");
        assert_eq!(err.to_string(), "BPM: 4000 outside valid range [1, 1000]");

        assert_eq!(BPM_RANGE.validate("BPM", 120), Ok(120));
    }

    #[test]
    fn float_range_boundaries_are_inclusive() {
        assert!(FEEDBACK_RANGE.contains(0.0));
        assert!(FEEDBACK_RANGE.contains(1.0));
        assert!(!FEEDBACK_RANGE.contains(1.0001));
        assert_eq!(FEEDBACK_RANGE.clamp(1.5), 1.0);
    }
}
