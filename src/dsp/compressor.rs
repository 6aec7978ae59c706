use crate::dsp::buffer::SampleBuffer;
use crate::params::{
    self, ATTACK_TIME_RANGE, GAIN_RANGE, ParameterRange, RATIO_RANGE, RELEASE_TIME_RANGE,
    THRESHOLD_RANGE,
};

/// Capacity of the lookahead window, samples.
pub const LOOKAHEAD_SAMPLES: usize = 512;

/// Configurable lookahead window, samples.
pub const LOOKAHEAD_RANGE: ParameterRange<usize> = ParameterRange::new(1, LOOKAHEAD_SAMPLES);

// -120 dB; keeps amp_to_db finite for silent input.
const AMP_FLOOR: f32 = 1.0e-6;

/*
Feed-forward lookahead compressor.

The control path measures the input the moment it arrives: the magnitude is
converted to dB and smoothed into a running envelope with asymmetric one-pole
coefficients (fast attack when the level rises above the envelope, slow
release when it falls below). Envelope excess over the threshold maps to a
gain reduction of (envelope - threshold) * slope dB, slope = 1 - 1/ratio.

The audio path is delayed by the lookahead window: each call writes the raw
input and the freshly computed gain into two parallel buffers at a shared
cursor and reads back, before overwriting, the sample captured one full
window earlier. Applying the current gain to that older sample means the gain
curve has already reacted by the time a loud transient reaches the output.
*/
pub struct Compressor {
    sample_rate: f32,

    audio: SampleBuffer,
    gain_tape: SampleBuffer,
    cursor: usize,
    lookahead: usize,

    // Envelope and threshold live in dB; gains are linear factors.
    envelope: f32,
    slope: f32,
    gain: f32,
    attack_gain: f32,
    release_gain: f32,

    attack_time: f32,
    release_time: f32,
    threshold: f32,
    ratio: f32,
    pre_gain: f32,
    post_gain: f32,
}

impl Compressor {
    pub fn new(sample_rate: f32) -> Self {
        let mut comp = Self {
            sample_rate,
            audio: SampleBuffer::new(LOOKAHEAD_SAMPLES),
            gain_tape: SampleBuffer::new(LOOKAHEAD_SAMPLES),
            cursor: LOOKAHEAD_SAMPLES - 1,
            lookahead: LOOKAHEAD_SAMPLES,
            envelope: Self::amp_to_db(0.0),
            slope: 0.0,
            gain: 1.0,
            attack_gain: 0.0,
            release_gain: 0.0,
            attack_time: 0.0,
            release_time: 0.0,
            threshold: 0.0,
            ratio: 1.0,
            pre_gain: 1.0,
            post_gain: 1.0,
        };
        comp.set_attack_time(0.01);
        comp.set_release_time(0.25);
        comp.set_threshold(-24.0);
        comp.set_ratio(2.0);
        comp.set_pre_gain(0.0);
        comp.set_post_gain(0.0);
        comp
    }

    /// Set the attack time in seconds, clamped to [`ATTACK_TIME_RANGE`].
    pub fn set_attack_time(&mut self, seconds: f32) {
        self.attack_time =
            params::check_parameter_range("Compressor: attack time", seconds, ATTACK_TIME_RANGE);
        self.attack_gain = Self::smoothing_gain(self.sample_rate, self.attack_time);
    }

    /// Set the release time in seconds, clamped to [`RELEASE_TIME_RANGE`].
    pub fn set_release_time(&mut self, seconds: f32) {
        self.release_time =
            params::check_parameter_range("Compressor: release time", seconds, RELEASE_TIME_RANGE);
        self.release_gain = Self::smoothing_gain(self.sample_rate, self.release_time);
    }

    /// Set the threshold in dBFS, clamped to [`THRESHOLD_RANGE`].
    pub fn set_threshold(&mut self, db: f32) {
        self.threshold = params::check_parameter_range("Compressor: threshold", db, THRESHOLD_RANGE);
    }

    /// Set the compression ratio, clamped to [`RATIO_RANGE`].
    pub fn set_ratio(&mut self, ratio: f32) {
        self.ratio = params::check_parameter_range("Compressor: ratio", ratio, RATIO_RANGE);
        self.slope = 1.0 - 1.0 / self.ratio;
    }

    /// Set the input make-up gain in dB, clamped to [`GAIN_RANGE`].
    pub fn set_pre_gain(&mut self, db: f32) {
        let db = params::check_parameter_range("Compressor: pre-gain", db, GAIN_RANGE);
        self.pre_gain = Self::db_to_amp(db);
    }

    /// Set the output make-up gain in dB, clamped to [`GAIN_RANGE`].
    pub fn set_post_gain(&mut self, db: f32) {
        let db = params::check_parameter_range("Compressor: post-gain", db, GAIN_RANGE);
        self.post_gain = Self::db_to_amp(db);
    }

    /// Set the lookahead window in samples, clamped to [`LOOKAHEAD_RANGE`].
    ///
    /// Shorter windows trade anticipation for latency; a 1-sample window is
    /// effectively pass-through latency. Clears the window, so the next
    /// `lookahead` outputs are silence. Configuration-time only.
    pub fn set_lookahead(&mut self, samples: usize) {
        self.lookahead =
            params::check_parameter_range("Compressor: lookahead", samples, LOOKAHEAD_RANGE);
        self.reset();
    }

    pub fn attack_time(&self) -> f32 {
        self.attack_time
    }

    pub fn release_time(&self) -> f32 {
        self.release_time
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    pub fn ratio(&self) -> f32 {
        self.ratio
    }

    pub fn lookahead(&self) -> usize {
        self.lookahead
    }

    /// Current envelope estimate in dB.
    pub fn envelope_db(&self) -> f32 {
        self.envelope
    }

    /// Gain reduction currently applied, in dB (zero or negative).
    pub fn gain_reduction_db(&self) -> f32 {
        Self::amp_to_db(self.gain)
    }

    /// Gain that was in effect when the sample about to leave the window was
    /// captured. Useful for metering the control/audio alignment.
    pub fn delayed_gain(&self) -> f32 {
        self.gain_tape.get(self.cursor)
    }

    /// Process one sample through the control and lookahead paths.
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let input = input * self.pre_gain;

        // Asymmetric one-pole smoothing in dB: fast toward rising levels,
        // slow toward falling ones.
        let level = Self::amp_to_db(input.abs());
        let coeff = if level > self.envelope {
            self.attack_gain
        } else {
            self.release_gain
        };
        self.envelope = level + coeff * (self.envelope - level);

        let reduction = if self.envelope > self.threshold {
            (self.envelope - self.threshold) * self.slope
        } else {
            0.0
        };
        self.gain = Self::db_to_amp(-reduction);

        // Read-before-write at the shared cursor yields the sample captured
        // one full window ago.
        let delayed = self.audio.get(self.cursor);
        self.audio.set(self.cursor, input);
        self.gain_tape.set(self.cursor, self.gain);
        self.cursor = (self.cursor + 1) % self.lookahead;

        delayed * self.gain * self.post_gain
    }

    /// Process a block in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    /// Clear the lookahead window and envelope state. The next `lookahead`
    /// outputs are silence while the window refills.
    pub fn reset(&mut self) {
        self.audio.clear();
        self.gain_tape.clear();
        self.cursor = self.lookahead - 1;
        self.envelope = Self::amp_to_db(0.0);
        self.gain = 1.0;
    }

    /// Linear amplitude to dB, floored at -120 dB.
    pub fn amp_to_db(amplitude: f32) -> f32 {
        20.0 * amplitude.max(AMP_FLOOR).log10()
    }

    /// dB to linear amplitude.
    pub fn db_to_amp(db: f32) -> f32 {
        10.0_f32.powf(db / 20.0)
    }

    fn smoothing_gain(sample_rate: f32, seconds: f32) -> f32 {
        (-1.0 / (sample_rate * seconds)).exp()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::{assert_abs_diff_eq, assert_relative_eq};

    const SAMPLE_RATE: f32 = 48_000.0;

    #[test]
    fn amp_db_round_trip() {
        for amp in [1.0e-4, 0.01, 0.1, 0.5, 1.0, 2.0] {
            let back = Compressor::db_to_amp(Compressor::amp_to_db(amp));
            assert_relative_eq!(back, amp, max_relative = 1e-4);
        }
        assert_eq!(Compressor::amp_to_db(0.0), -120.0);
    }

    #[test]
    fn window_fills_with_silence_first() {
        let mut comp = Compressor::new(SAMPLE_RATE);
        for n in 0..LOOKAHEAD_SAMPLES {
            assert_eq!(comp.next_sample(1.0), 0.0, "sample {n}");
        }
        assert_ne!(comp.next_sample(1.0), 0.0);
    }

    #[test]
    fn below_threshold_is_transparent() {
        let mut comp = Compressor::new(SAMPLE_RATE);
        comp.set_threshold(-24.0);
        let input = 0.01; // -40 dB, well under the threshold

        let mut out = 0.0;
        for _ in 0..(SAMPLE_RATE as usize) {
            out = comp.next_sample(input);
        }
        // Envelope converged to the input level, no reduction applied.
        assert_relative_eq!(comp.envelope_db(), Compressor::amp_to_db(input), max_relative = 1e-3);
        assert_eq!(comp.gain_reduction_db(), 0.0);
        assert_relative_eq!(out, input, max_relative = 1e-4);
    }

    #[test]
    fn above_threshold_reduction_approaches_slope_law() {
        let mut comp = Compressor::new(SAMPLE_RATE);
        comp.set_threshold(-24.0);
        comp.set_ratio(4.0);
        comp.set_attack_time(0.0005);

        // Quiet lead-in below threshold, then a sustained 0 dB level.
        for _ in 0..LOOKAHEAD_SAMPLES {
            comp.next_sample(0.01);
        }
        let mut last_reduction = 0.0;
        for _ in 0..(SAMPLE_RATE as usize / 10) {
            comp.next_sample(1.0);
            let reduction = -comp.gain_reduction_db();
            // Reduction only ever grows toward the target on a sustained step.
            assert!(reduction >= last_reduction - 1e-3);
            last_reduction = reduction;
        }

        let slope = 1.0 - 1.0 / 4.0;
        let expected = (0.0 - -24.0) * slope; // 18 dB
        assert_relative_eq!(last_reduction, expected, max_relative = 1e-2);
    }

    #[test]
    fn output_is_delayed_by_the_window() {
        let mut comp = Compressor::new(SAMPLE_RATE);
        comp.set_lookahead(16);
        comp.set_threshold(0.0); // nothing exceeds it, gain stays 1.0

        let mut outputs = vec![comp.next_sample(0.5)];
        for _ in 0..32 {
            outputs.push(comp.next_sample(0.0));
        }
        for (n, out) in outputs.iter().enumerate() {
            let expected = if n == 16 { 0.5 } else { 0.0 };
            assert_abs_diff_eq!(*out, expected, epsilon = 1e-5);
        }
    }

    #[test]
    fn setters_clamp_to_static_ranges() {
        let mut comp = Compressor::new(SAMPLE_RATE);
        comp.set_ratio(100.0);
        assert_eq!(comp.ratio(), 20.0);
        comp.set_threshold(10.0);
        assert_eq!(comp.threshold(), 0.0);
        comp.set_attack_time(0.0);
        assert_eq!(comp.attack_time(), 1.0e-4);
        comp.set_release_time(100.0);
        assert_eq!(comp.release_time(), 5.0);
        comp.set_lookahead(4096);
        assert_eq!(comp.lookahead(), LOOKAHEAD_SAMPLES);
    }

    #[test]
    fn gain_tape_tracks_applied_gain() {
        let mut comp = Compressor::new(SAMPLE_RATE);
        comp.set_lookahead(8);
        comp.set_threshold(0.0);
        for _ in 0..8 {
            comp.next_sample(0.1);
        }
        // With no reduction the tape holds unity gain all the way around.
        assert_relative_eq!(comp.delayed_gain(), 1.0);
    }
}
