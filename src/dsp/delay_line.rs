//! # Delay Line (Ring Buffer)
//!
//! A delay line stores audio samples and lets you read them back a fixed
//! number of samples later. The ping-pong engine owns two of these, one per
//! stereo side.
//!
//! ## How the Heads Move
//!
//! Imagine a circular tape loop of length `active_len`. A read head and a
//! write head travel around it one step per sample. Both are wrapped with
//! the *active* delay length, not the buffer capacity, so changing the tempo
//! changes the loop length without touching the memory:
//!
//! ```text
//!  capacity ───────────────────────────────────────────────────────┐
//!  ┌───────────────────────────────┬───────────────────────────────┐
//!  │  active loop (active_len)     │  unused until the tempo slows │
//!  └───────────────────────────────┴───────────────────────────────┘
//!    ▲ read == write (mod active_len)
//! ```
//!
//! The write head starts `active_len` steps ahead of the read head. After
//! wrapping, both land on the same slot, so each sample reads the value that
//! was written exactly `active_len` samples ago, then overwrites it.

/// A ring buffer of audio samples with a fixed capacity.
///
/// The buffer is allocated in [`reallocate()`](Self::reallocate), which only
/// runs while audio processing is stopped. Reading and writing never
/// allocate.
pub struct DelayLine {
    /// Stored samples. All values start at 0.0 (silence).
    buffer: Vec<f32>,
}

impl DelayLine {
    /// Create a delay line holding `capacity` samples of silence.
    ///
    /// A zero capacity is bumped to one slot so index arithmetic never
    /// divides by zero.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0.0; capacity.max(1)],
        }
    }

    /// Number of samples the line can hold.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Read the sample stored at `pos`.
    ///
    /// Positions past the end wrap around the capacity, so a stale cursor
    /// can never index out of bounds.
    pub fn read(&self, pos: usize) -> f32 {
        self.buffer[pos % self.buffer.len()]
    }

    /// Store `sample` at `pos`, wrapping around the capacity.
    pub fn write(&mut self, pos: usize, sample: f32) {
        let len = self.buffer.len();
        self.buffer[pos % len] = sample;
    }

    /// Resize to `capacity` samples and flush everything to silence.
    ///
    /// This is the only place that may allocate. Call it from the host's
    /// setup path, never from `process()`.
    pub fn reallocate(&mut self, capacity: usize) {
        self.buffer.clear();
        self.buffer.resize(capacity.max(1), 0.0);
    }

    /// Flush the buffer to silence, keeping its capacity.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
    }
}

/// The read/write cursor pair shared by both delay lines.
///
/// Both heads are only ever wrapped by the same modulus and advanced
/// together, so the distance between them is preserved from block to block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heads {
    pub read: usize,
    pub write: usize,
}

impl Heads {
    /// Place the write head `delay_len` steps ahead of the read head.
    pub fn new(delay_len: usize) -> Self {
        Self {
            read: 0,
            write: delay_len,
        }
    }

    /// Fold both heads into `[0, active_len)`.
    ///
    /// Called at the start of every sample, not after advancing. A tempo
    /// change that shrinks `active_len` below a head's position makes it jump
    /// here, which is heard as a short length glitch.
    pub fn wrap(&mut self, active_len: usize) {
        let len = active_len.max(1);
        self.read %= len;
        self.write %= len;
    }

    /// Step both heads forward by one sample.
    pub fn advance(&mut self) {
        self.read += 1;
        self.write += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A value written at a position reads back from that position.
    #[test]
    fn test_write_and_read_exact() {
        let mut dl = DelayLine::new(100);

        dl.write(7, 0.75);

        let result = dl.read(7);
        assert!((result - 0.75).abs() < 1e-6, "Expected 0.75, got {result}");
        assert!(dl.read(8).abs() < 1e-6);
    }

    /// Positions past the capacity wrap instead of panicking.
    #[test]
    fn test_positions_wrap_around_capacity() {
        let mut dl = DelayLine::new(4);

        // Position 6 on a ring of 4 is slot 2.
        dl.write(6, 0.5);
        assert!((dl.read(2) - 0.5).abs() < 1e-6);
        assert!((dl.read(10) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_zero_capacity_is_bumped_to_one() {
        let mut dl = DelayLine::new(0);
        assert_eq!(dl.capacity(), 1);

        dl.write(3, 1.0);
        assert!((dl.read(0) - 1.0).abs() < 1e-6);
    }

    /// Clearing flushes to silence but keeps the allocation.
    #[test]
    fn test_clear() {
        let mut dl = DelayLine::new(10);

        dl.write(3, 0.5);
        dl.clear();

        assert_eq!(dl.capacity(), 10);
        assert!(dl.read(3).abs() < 1e-6, "Expected 0.0 after clear");
    }

    /// Reallocating changes the capacity and discards old samples.
    #[test]
    fn test_reallocate_flushes_and_resizes() {
        let mut dl = DelayLine::new(8);
        for pos in 0..8 {
            dl.write(pos, 1.0);
        }

        dl.reallocate(16);

        assert_eq!(dl.capacity(), 16);
        for pos in 0..16 {
            assert!(dl.read(pos).abs() < 1e-6, "Stale sample at {pos}");
        }
    }

    /// With the write head `len` ahead, wrapping puts both heads on the
    /// same slot, which is what gives a delay of exactly `len` samples.
    #[test]
    fn test_heads_align_after_wrap() {
        let mut heads = Heads::new(5);
        heads.wrap(5);
        assert_eq!(heads, Heads { read: 0, write: 0 });
    }

    /// A ring of length 4 fed 0..12 returns each value 4 samples later.
    #[test]
    fn test_fifo_through_heads() {
        let len = 4;
        let mut dl = DelayLine::new(16);
        let mut heads = Heads::new(len);
        let mut out = Vec::new();

        for i in 0..12 {
            heads.wrap(len);
            out.push(dl.read(heads.read));
            dl.write(heads.write, i as f32);
            heads.advance();
        }

        let expected = [0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
        for (n, (got, want)) in out.iter().zip(expected).enumerate() {
            assert!((got - want).abs() < 1e-6, "sample {n}: {got} != {want}");
        }
    }

    /// Shrinking the loop folds heads that sit beyond the new length.
    #[test]
    fn test_wrap_after_shrink() {
        let mut heads = Heads { read: 7, write: 9 };
        heads.wrap(4);
        assert_eq!(heads, Heads { read: 3, write: 1 });
    }
}
