//! # B2F Core
//!
//! Core components shared by the B2F framing and LZHUF crates.
//!
//! - [`bitstream`]: MSB-first bit reader/writer for LZHUF codes
//! - [`ringbuffer`]: Pre-filled sliding window for LZHUF back-references
//! - [`crc`]: CRC-16/XMODEM image checksum
//! - [`error`]: Error taxonomy for framing, decoding, and integrity checks
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Message pipeline                                        │
//! │     decode_message, MessageReader, proposals           │
//! ├─────────────────────────────────────────────────────────┤
//! │ Framing (b2f-frame)                                     │
//! │     SOH header, STX blocks, EOT checksum               │
//! ├─────────────────────────────────────────────────────────┤
//! │ Codec (b2f-lzhuf)                                       │
//! │     LZSS window + adaptive Huffman                     │
//! ├─────────────────────────────────────────────────────────┤
//! │ Core (this crate)                                       │
//! │     BitReader/BitWriter, RingBuffer, CRC, errors       │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust
//! use b2f_core::bitstream::BitReader;
//! use b2f_core::crc::Crc16;
//!
//! let data = [0xAB, 0xCD];
//! let mut reader = BitReader::new(&data);
//! assert_eq!(reader.read_bits(12).unwrap(), 0xABC);
//!
//! assert_eq!(Crc16::compute(b"123456789"), 0x31C3);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod bitstream;
pub mod crc;
pub mod error;
pub mod ringbuffer;

// Re-exports for convenience
pub use bitstream::{BitReader, BitWriter};
pub use crc::Crc16;
pub use error::{B2Error, DataIntegrityError, DecodeError, FrameError, Result};
pub use ringbuffer::RingBuffer;
