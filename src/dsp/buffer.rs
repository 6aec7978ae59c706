/// Fixed-capacity indexed sample store.
///
/// Backs the delay line and the compressor's lookahead window. Storage is
/// zero-initialized, and [`SampleBuffer::resize`] zero-fills, so stale audio
/// never leaks into a freshly configured window. Cursor arithmetic lives in
/// the owning component.
pub struct SampleBuffer {
    samples: Vec<f32>,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0.0; capacity],
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    pub fn get(&self, index: usize) -> f32 {
        self.samples[index]
    }

    #[inline]
    pub fn set(&mut self, index: usize, value: f32) {
        self.samples[index] = value;
    }

    /// Resize to `capacity`, discarding contents. Allocates, so this is a
    /// configuration-time operation only.
    pub fn resize(&mut self, capacity: usize) {
        self.samples.clear();
        self.samples.resize(capacity, 0.0);
    }

    pub fn clear(&mut self) {
        self.samples.fill(0.0);
    }
}
