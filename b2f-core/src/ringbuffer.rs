//! Ring buffer (sliding window) for LZHUF decompression.
//!
//! LZHUF does not start from an empty window: the first `capacity - lookahead`
//! slots are pre-filled with a constant (a space for Winlink) and the write
//! position starts right after them. Back-references may legitimately point
//! into that pre-filled region, so the buffer tracks how many slots hold
//! valid history rather than how many bytes were written.

use crate::error::DecodeError;

/// A ring buffer holding the decompression history.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    /// The underlying buffer.
    buffer: Vec<u8>,
    /// Current write position (next byte will be written here).
    position: usize,
    /// Number of slots holding valid history (up to capacity).
    valid: usize,
    /// Capacity (must be power of 2).
    capacity: usize,
    /// Mask for efficient modulo (capacity - 1).
    mask: usize,
}

impl RingBuffer {
    /// Create an empty ring buffer.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2 or is zero.
    pub fn new(capacity: usize) -> Self {
        Self::with_prefill(capacity, 0, 0)
    }

    /// Create a ring buffer whose first `prefill_len` slots hold `fill`.
    ///
    /// The write position starts at `prefill_len`; the slots after it are
    /// zeroed and do not count as history until written.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is not a power of 2, or if `prefill_len`
    /// exceeds `capacity`.
    pub fn with_prefill(capacity: usize, fill: u8, prefill_len: usize) -> Self {
        assert!(
            capacity.is_power_of_two(),
            "Capacity must be a power of 2, got {}",
            capacity
        );
        assert!(
            prefill_len <= capacity,
            "Prefill {} exceeds capacity {}",
            prefill_len,
            capacity
        );

        let mut buffer = vec![0; capacity];
        buffer[..prefill_len].fill(fill);

        Self {
            buffer,
            position: prefill_len & (capacity - 1),
            valid: prefill_len,
            capacity,
            mask: capacity - 1,
        }
    }

    /// Get the capacity of the buffer.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots holding valid history.
    pub fn len(&self) -> usize {
        self.valid
    }

    /// Check if the buffer holds no history.
    pub fn is_empty(&self) -> bool {
        self.valid == 0
    }

    /// Get the current write position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Write a single byte to the buffer.
    #[inline]
    pub fn write_byte(&mut self, byte: u8) {
        self.buffer[self.position] = byte;
        self.position = (self.position + 1) & self.mask;
        if self.valid < self.capacity {
            self.valid += 1;
        }
    }

    /// Read the byte at an absolute slot (wrapped to the capacity).
    #[inline]
    pub fn byte_at(&self, index: usize) -> u8 {
        self.buffer[index & self.mask]
    }

    /// Copy `length` bytes starting `distance` bytes back, appending each
    /// byte to both the history and `output`.
    ///
    /// The copy runs strictly forward one byte at a time, so a distance
    /// shorter than the length repeats the most recent bytes. With `strict`
    /// set, a distance reaching past the valid history is rejected; without
    /// it, unwritten slots read as zero.
    pub fn copy_match(
        &mut self,
        distance: usize,
        length: usize,
        strict: bool,
        output: &mut Vec<u8>,
    ) -> Result<(), DecodeError> {
        if distance == 0 || distance > self.capacity || (strict && distance > self.valid) {
            return Err(DecodeError::window_underflow(distance, self.valid));
        }

        let mut src_pos = self.position.wrapping_sub(distance) & self.mask;
        for _ in 0..length {
            let byte = self.buffer[src_pos];
            output.push(byte);
            self.write_byte(byte);
            src_pos = (src_pos + 1) & self.mask;
        }

        Ok(())
    }

    /// Get the last N bytes written (for debugging/testing).
    pub fn last_bytes(&self, count: usize) -> Vec<u8> {
        let count = count.min(self.valid);
        (0..count)
            .map(|i| self.buffer[self.position.wrapping_sub(count - i) & self.mask])
            .collect()
    }
}
