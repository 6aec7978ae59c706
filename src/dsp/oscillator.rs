#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use std::f32::consts::{LN_2, PI, TAU};

/*
Band-Limited Oscillator
=======================

Naive saw and square waves jump instantaneously at their edges. A sampled
jump contains energy above Nyquist that folds back into the audible band as
inharmonic aliasing. Oversampling fixes this at a heavy CPU cost; polyBLEP
(polynomial band-limited step) fixes it by splicing a two-sample polynomial
residual over each discontinuity instead.

The residual is expressed in normalized phase t = phase / TAU with
dt = phase_step / TAU (the fraction of a cycle covered per sample):

  t < dt        2t' - t'^2 - 1   where t' = t / dt        (just after an edge)
  t > 1 - dt    t'^2 + 2t' + 1   where t' = (t - 1) / dt  (just before an edge)
  otherwise     0

A saw has one falling edge per cycle, at the phase wrap: subtract one
residual. A square has two edges, at 0 and half a cycle: add the residual at
the wrap, subtract it again half a cycle later via (t + 0.5) mod 1.

Phase advances by phase_step = frequency * TAU / sample_rate each call and
wraps once per cycle. A single wrap per call bounds the usable frequency to
below the sample rate; the host keeps frequencies positive and in range.
*/

/// Normalization applied to every waveform sample before gain.
pub const SCALE: f32 = 1.0;

/// Waveform family generated by the oscillator.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OscillatorMode {
    Sine,
    Saw,
    Square,
    Custom,
}

/// A periodic sampler pluggable into [`Oscillator::set_waveform`].
///
/// Implementations must be pure functions of phase: the oscillator calls
/// `sample` once per rendered sample with its current angle in `[0, TAU)`,
/// and no state may carry across calls.
pub trait Waveform: Send {
    fn sample(&self, phase: f32) -> f32;
}

impl<F> Waveform for F
where
    F: Fn(f32) -> f32 + Send,
{
    fn sample(&self, phase: f32) -> f32 {
        self(phase)
    }
}

/// Band-limited periodic waveform generator.
///
/// Produces one sample per [`Oscillator::next_sample`] call, allocation-free.
/// Owned and advanced by the render thread; configuration setters are not
/// synchronized against rendering.
pub struct Oscillator {
    sample_rate: f32,
    phase: f32,
    phase_step: f32,
    frequency: f32,
    mode: OscillatorMode,
    // Stored as half the requested gain.
    gain: f32,
    active: bool,
    custom: Option<Box<dyn Waveform>>,
}

impl Oscillator {
    /// A sine at middle C with half gain, matching a freshly allocated voice.
    pub fn new(sample_rate: f32) -> Self {
        let mut osc = Self {
            sample_rate,
            phase: 0.0,
            phase_step: 0.0,
            frequency: 0.0,
            mode: OscillatorMode::Sine,
            gain: 0.0,
            active: true,
            custom: None,
        };
        osc.set_gain(0.5);
        osc.set_note(60);
        osc
    }

    /// Equal-temperament conversion from a MIDI note number, A0 (note 21)
    /// anchored at 27.5 Hz.
    pub fn frequency_from_note(note: f32) -> f32 {
        27.5 * 2.0_f32.powf((note - 21.0) / 12.0)
    }

    /// Inverse of [`Oscillator::frequency_from_note`].
    pub fn note_from_frequency(frequency: f32) -> f32 {
        (12.0 / LN_2) * (frequency / 27.5).ln() + 21.0
    }

    /// Set the frequency in Hz. Must be positive and below the sample rate;
    /// the host validates, not the oscillator.
    pub fn set_frequency(&mut self, frequency: f32) {
        self.frequency = frequency;
        self.phase_step = frequency * TAU / self.sample_rate;
    }

    pub fn set_note(&mut self, note: u8) {
        self.set_frequency(Self::frequency_from_note(note as f32));
    }

    pub fn set_mode(&mut self, mode: OscillatorMode) {
        self.mode = mode;
    }

    /// Install a caller-supplied periodic sampler and switch to
    /// [`OscillatorMode::Custom`].
    pub fn set_waveform(&mut self, waveform: impl Waveform + 'static) {
        self.custom = Some(Box::new(waveform));
        self.mode = OscillatorMode::Custom;
    }

    /// Set the output gain. Stored pre-halved so two detuned unison voices
    /// sum within `[-1, 1]`.
    pub fn set_gain(&mut self, gain: f32) {
        self.gain = 0.5 * gain;
    }

    /// An inactive oscillator outputs true silence and holds its phase.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    /// Nearest MIDI note for the current frequency.
    pub fn note(&self) -> u8 {
        Self::note_from_frequency(self.frequency).round() as u8
    }

    /// The stored (pre-halved) gain.
    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn phase(&self) -> f32 {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn mode(&self) -> OscillatorMode {
        self.mode
    }

    /// Generate the next sample and advance the phase by one step.
    ///
    /// When inactive, returns 0.0 without advancing phase, so reactivation
    /// resumes the waveform exactly where it stopped.
    pub fn next_sample(&mut self) -> f32 {
        if !self.active {
            return 0.0;
        }

        let t = self.phase / TAU;
        let value = match self.mode {
            OscillatorMode::Sine => self.phase.sin(),
            OscillatorMode::Saw => 2.0 * t - 1.0 - self.poly_blep(t),
            OscillatorMode::Square => {
                let naive = if self.phase < PI { 1.0 } else { -1.0 };
                // One residual per edge: the wrap and the half-cycle flip.
                naive + self.poly_blep(t) - self.poly_blep((t + 0.5) % 1.0)
            }
            OscillatorMode::Custom => match &self.custom {
                Some(waveform) => waveform.sample(self.phase),
                None => 0.0,
            },
        };

        self.phase += self.phase_step;
        if self.phase >= TAU {
            self.phase = 0.0;
        }

        value * SCALE * self.gain
    }

    /// polyBLEP residual for a discontinuity at the phase wrap, in
    /// normalized phase `t`.
    fn poly_blep(&self, t: f32) -> f32 {
        let dt = self.phase_step / TAU;
        if t < dt {
            let t = t / dt;
            2.0 * t - t * t - 1.0
        } else if t > 1.0 - dt {
            let t = (t - 1.0) / dt;
            t * t + 2.0 * t + 1.0
        } else {
            0.0
        }
    }

    /// Fill `out` with consecutive samples.
    pub fn render(&mut self, out: &mut [f32]) {
        for sample in out.iter_mut() {
            *sample = self.next_sample();
        }
    }
}
