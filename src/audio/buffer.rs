//! Bounded sample buffer that keeps the tail of a recording.
//!
//! [`TailBuffer`] stores at most `capacity` samples; once full, the oldest
//! samples fall off the front so the newest `capacity` samples always
//! survive. A push-to-talk session cares about the tail of the capture, not
//! the head, and the capacity is sized from the configured maximum recording
//! length so a drained session never exceeds what the STT engine accepts.

use std::collections::VecDeque;

// ---------------------------------------------------------------------------
// TailBuffer
// ---------------------------------------------------------------------------

/// Fixed-capacity buffer of `f32` samples with drop-oldest overflow.
#[derive(Debug)]
pub struct TailBuffer {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl TailBuffer {
    /// Create a buffer bounded to `capacity` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity == 0`.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "TailBuffer capacity must be > 0");
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `data`, discarding the oldest samples when the total would
    /// exceed the capacity.
    pub fn push_slice(&mut self, data: &[f32]) {
        // A chunk larger than the whole buffer reduces to its own tail.
        let data = if data.len() > self.capacity {
            &data[data.len() - self.capacity..]
        } else {
            data
        };

        let overflow = (self.samples.len() + data.len()).saturating_sub(self.capacity);
        if overflow > 0 {
            self.samples.drain(..overflow);
        }
        self.samples.extend(data.iter().copied());
    }

    /// Take all stored samples in chronological order, leaving the buffer
    /// empty.
    pub fn drain(&mut self) -> Vec<f32> {
        self.samples.drain(..).collect()
    }

    /// Discard all samples.
    pub fn clear(&mut self) {
        self.samples.clear();
    }

    /// Number of samples currently stored.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// `true` when no samples are stored.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_then_drain_preserves_order() {
        let mut buf = TailBuffer::new(8);
        buf.push_slice(&[1.0, 2.0]);
        buf.push_slice(&[3.0]);
        assert_eq!(buf.drain(), vec![1.0, 2.0, 3.0]);
        assert!(buf.is_empty());
    }

    #[test]
    fn overflow_drops_oldest() {
        let mut buf = TailBuffer::new(4);
        buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buf.drain(), vec![2.0, 3.0, 4.0, 5.0]);
    }

    #[test]
    fn overflow_across_multiple_pushes() {
        let mut buf = TailBuffer::new(3);
        buf.push_slice(&[1.0, 2.0]);
        buf.push_slice(&[3.0, 4.0]);
        assert_eq!(buf.drain(), vec![2.0, 3.0, 4.0]);
    }

    #[test]
    fn chunk_larger_than_capacity_keeps_its_tail() {
        let mut buf = TailBuffer::new(2);
        buf.push_slice(&[1.0, 2.0, 3.0, 4.0, 5.0]);
        assert_eq!(buf.drain(), vec![4.0, 5.0]);
    }

    #[test]
    fn clear_discards_everything() {
        let mut buf = TailBuffer::new(4);
        buf.push_slice(&[1.0, 2.0, 3.0]);
        buf.clear();
        assert_eq!(buf.len(), 0);
        assert!(buf.drain().is_empty());
    }

    #[test]
    #[should_panic(expected = "capacity must be > 0")]
    fn zero_capacity_panics() {
        let _ = TailBuffer::new(0);
    }
}
