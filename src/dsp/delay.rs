use crate::dsp::buffer::SampleBuffer;
use crate::params::{self, DELAY_RANGE, FEEDBACK_RANGE};

/// Delay window used by a freshly constructed line: one second at 48 kHz.
pub const DEFAULT_DELAY_SAMPLES: usize = 48_000;

/// Feedback comb filter over an exclusively owned circular buffer.
///
/// Each [`FeedbackDelay::next_sample`] call returns the sample written one
/// window ago and recirculates it, attenuated by the feedback coefficient,
/// back into the buffer along with the new input.
///
/// [`FeedbackDelay::set_delay`] reallocates the buffer and must not run
/// concurrently with `next_sample`: configure off the render thread or while
/// rendering is paused.
pub struct FeedbackDelay {
    buffer: SampleBuffer,
    cursor: usize,
    delay: usize,
    feedback: f32,
}

impl FeedbackDelay {
    pub fn new() -> Self {
        Self {
            buffer: SampleBuffer::new(DEFAULT_DELAY_SAMPLES),
            cursor: 0,
            delay: DEFAULT_DELAY_SAMPLES,
            feedback: 0.5,
        }
    }

    pub fn with_delay(delay: usize) -> Self {
        let mut line = Self::new();
        line.set_delay(delay);
        line
    }

    /// Set the delay window in samples, clamped to [`DELAY_RANGE`].
    /// Reallocates and clears the buffer; configuration-time only.
    pub fn set_delay(&mut self, delay: usize) {
        self.delay = params::check_parameter_range("Delay: delay", delay, DELAY_RANGE);
        self.buffer.resize(self.delay);
        self.cursor = 0;
    }

    /// Set the feedback coefficient, clamped to `[0, 1]`.
    pub fn set_feedback(&mut self, feedback: f32) {
        self.feedback = params::check_parameter_range("Delay: feedback", feedback, FEEDBACK_RANGE);
    }

    pub fn delay(&self) -> usize {
        self.delay
    }

    pub fn feedback(&self) -> f32 {
        self.feedback
    }

    /// Process one sample: return the buffered sample from one window ago
    /// and write `input` plus the recirculated tail in its place.
    #[inline]
    pub fn next_sample(&mut self, input: f32) -> f32 {
        let buffered = self.buffer.get(self.cursor);
        self.buffer.set(self.cursor, input + self.feedback * buffered);
        self.cursor = (self.cursor + 1) % self.delay;
        buffered
    }

    /// Process a block in place.
    pub fn render(&mut self, buffer: &mut [f32]) {
        for sample in buffer.iter_mut() {
            *sample = self.next_sample(*sample);
        }
    }

    /// Silence the tail without changing the configured window.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }
}

impl Default for FeedbackDelay {
    fn default() -> Self {
        Self::new()
    }
}
