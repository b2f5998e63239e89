//! # B2F LZHUF
//!
//! Pure Rust implementation of LZHUF (LZSS + adaptive Huffman) as used by
//! FBB and Winlink B2F message transfer.
//!
//! LZHUF is Haruyasu Yoshizaki's 1988 combination of Okumura's LZSS with an
//! adaptive Huffman tree. There is no per-block header: encoder and decoder
//! grow the same tree symbol by symbol. Winlink uses a 2 KB window instead of
//! the classic 4 KB; both are supported through [`LzhufConfig`].
//!
//! - [`huffman`]: adaptive tree over 256 literals and 58 match lengths
//! - [`position`]: static prefix code for match positions
//! - [`lzss`]: pre-filled history window and binary-tree match finder
//!
//! ## Example
//!
//! ```rust
//! use b2f_lzhuf::{decode_lzhuf, encode_lzhuf};
//!
//! let data = b"Hello, World! Hello, World!";
//! let body = encode_lzhuf(data);
//! let decoded = decode_lzhuf(&body, data.len() as u32).unwrap();
//! assert_eq!(decoded, data);
//! ```
//!
//! The body carries no length of its own. In a B2F image it is preceded by a
//! CRC-16 and the little-endian decoded length; see the `b2f-frame` crate.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod decode;
pub mod encode;
pub mod huffman;
pub mod lzss;
pub mod position;

// Re-exports
pub use config::LzhufConfig;
pub use decode::{LzhufDecoder, decode_lzhuf, decode_lzhuf_with};
pub use encode::{LzhufEncoder, encode_lzhuf, encode_lzhuf_with};
pub use huffman::AdaptiveHuffman;
pub use lzss::{LzssDecoder, LzssEncoder, LzssToken};
