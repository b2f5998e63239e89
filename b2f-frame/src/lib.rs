//! # B2F Frame
//!
//! Winlink B2 message framing and the decoding pipeline built on it.
//!
//! A B2F session carries each message as a framed, checksummed, LZHUF
//! compressed image. This crate provides:
//!
//! - [`frame`]: SOH header, STX data blocks, EOT checksum
//! - [`envelope`]: CRC-16 and length at the start of the compressed image
//! - [`proposal`]: `FC` proposal lines and size checks against them
//! - [`message`]: `decode_message`, `encode_message`, resumed transfers and
//!   [`MessageReader`] for buffers holding several messages
//!
//! ## Example
//!
//! ```rust
//! use b2f_frame::{Config, MessageReader, decode_message, encode_message};
//!
//! let config = Config::WINLINK;
//! let raw = encode_message("Net check-in", b"All stations nominal.\r\n", &config);
//!
//! let (message, consumed) = decode_message(&raw, &config).unwrap();
//! assert_eq!(message.data, b"All stations nominal.\r\n");
//! assert_eq!(consumed, raw.len());
//!
//! // Concatenated messages
//! let mut batch = raw.clone();
//! batch.extend(encode_message("Second", b"73\r\n", &config));
//! let subjects: Vec<String> = MessageReader::new(&batch, config)
//!     .map(|m| m.unwrap().subject_lossy())
//!     .collect();
//! assert_eq!(subjects, ["Net check-in", "Second"]);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod envelope;
pub mod frame;
pub mod header;
pub mod message;
pub mod proposal;

// Re-exports
pub use b2f_core::error::{B2Error, DataIntegrityError, DecodeError, FrameError, Result};
pub use config::{Config, CrcCoverage, FrameConfig};
pub use envelope::CompressedEnvelope;
pub use frame::{Frame, checksum, frame, frame_with, parse, parse_with};
pub use header::MessageHeader;
pub use message::{
    DecodedMessage, MessageReader, compress_image, decode_envelope, decode_message,
    decode_resumed, encode_message, resume,
};
pub use proposal::Proposal;
