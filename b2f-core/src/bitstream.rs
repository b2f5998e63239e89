//! MSB-first bit I/O for LZHUF.
//!
//! LZHUF packs Huffman codes starting from the most significant bit of each
//! byte, unlike DEFLATE and the LHA `-lhN-` methods which are LSB-first.
//! The reader works over an in-memory slice: B2F messages are always fully
//! buffered before decoding starts.
//!
//! # Example
//!
//! ```
//! use b2f_core::bitstream::{BitReader, BitWriter};
//!
//! let mut writer = BitWriter::new();
//! writer.write_bits(0b101, 3);
//! writer.write_bits(0b1100, 4);
//! let data = writer.into_vec();
//!
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_bits(3).unwrap(), 0b101);
//! assert_eq!(reader.read_bits(4).unwrap(), 0b1100);
//! ```

use crate::error::DecodeError;

/// MSB-first bit reader over a byte slice.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// Input data.
    data: &'a [u8],
    /// Next byte to load into the buffer.
    byte_pos: usize,
    /// Bit buffer; valid bits are the low `bits_in_buffer` bits.
    buffer: u32,
    /// Number of valid bits in buffer.
    bits_in_buffer: u8,
    /// Total bits read (for error reporting).
    total_bits_read: u64,
}

impl<'a> BitReader<'a> {
    /// Create a new MSB-first bit reader.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            buffer: 0,
            bits_in_buffer: 0,
            total_bits_read: 0,
        }
    }

    /// Ensure at least `count` bits are buffered.
    #[inline]
    fn fill_buffer(&mut self, count: u8) -> Result<(), DecodeError> {
        while self.bits_in_buffer < count && self.byte_pos < self.data.len() {
            self.buffer = (self.buffer << 8) | self.data[self.byte_pos] as u32;
            self.byte_pos += 1;
            self.bits_in_buffer += 8;
        }

        if self.bits_in_buffer < count {
            return Err(DecodeError::truncated(self.total_bits_read));
        }

        Ok(())
    }

    /// Read a single bit.
    #[inline]
    pub fn read_bit(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_bits(1)? as u8)
    }

    /// Read up to 16 bits, first bit read in the most significant position.
    #[inline]
    pub fn read_bits(&mut self, count: u8) -> Result<u16, DecodeError> {
        debug_assert!(count <= 16, "Cannot read more than 16 bits at once");

        if count == 0 {
            return Ok(0);
        }

        self.fill_buffer(count)?;

        let shift = self.bits_in_buffer - count;
        let mask = (1u32 << count) - 1;
        let value = (self.buffer >> shift) & mask;

        self.bits_in_buffer -= count;
        self.total_bits_read += count as u64;

        Ok(value as u16)
    }

    /// Get the current bit position (for error reporting).
    pub fn bit_position(&self) -> u64 {
        self.total_bits_read
    }

    /// Number of unread bits left in the input.
    pub fn remaining_bits(&self) -> u64 {
        (self.data.len() as u64 * 8).saturating_sub(self.total_bits_read)
    }

    /// Number of input bytes touched so far, counting a partially read byte.
    pub fn bytes_consumed(&self) -> usize {
        self.total_bits_read.div_ceil(8) as usize
    }
}

/// MSB-first bit writer collecting into a `Vec<u8>`.
#[derive(Debug, Default)]
pub struct BitWriter {
    /// Output buffer.
    output: Vec<u8>,
    /// Bit buffer; pending bits are the low `bits_in_buffer` bits.
    buffer: u32,
    /// Number of pending bits.
    bits_in_buffer: u8,
    /// Total bits written.
    total_bits_written: u64,
}

impl BitWriter {
    /// Create a new MSB-first bit writer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write the low `count` bits of `value` (up to 16), most significant first.
    #[inline]
    pub fn write_bits(&mut self, value: u16, count: u8) {
        debug_assert!(count <= 16, "Cannot write more than 16 bits at once");

        if count == 0 {
            return;
        }

        self.buffer = (self.buffer << count) | (value as u32 & ((1u32 << count) - 1));
        self.bits_in_buffer += count;
        self.total_bits_written += count as u64;

        while self.bits_in_buffer >= 8 {
            let byte = (self.buffer >> (self.bits_in_buffer - 8)) as u8;
            self.output.push(byte);
            self.bits_in_buffer -= 8;
        }
    }

    /// Write the top `count` bits of a left-aligned 16-bit code.
    #[inline]
    pub fn write_code(&mut self, code: u16, count: u8) {
        if count == 0 {
            return;
        }
        self.write_bits(code >> (16 - count), count);
    }

    /// Total bits written so far.
    pub fn bits_written(&self) -> u64 {
        self.total_bits_written
    }

    /// Flush remaining bits, padding the last byte with zeros.
    pub fn flush(&mut self) {
        if self.bits_in_buffer > 0 {
            let byte = (self.buffer << (8 - self.bits_in_buffer)) as u8;
            self.output.push(byte);
            self.buffer = 0;
            self.bits_in_buffer = 0;
        }
    }

    /// Flush and return the output data.
    pub fn into_vec(mut self) -> Vec<u8> {
        self.flush();
        self.output
    }
}
