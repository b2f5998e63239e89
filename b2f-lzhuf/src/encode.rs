//! LZHUF compression.
//!
//! Tokens from the binary-tree match finder are coded with the same
//! adaptive tree the decoder uses, so the output is bit-identical to the
//! classic `LZHUF.C` encoder run with the same window size.

use crate::config::LzhufConfig;
use crate::config::constants::THRESHOLD;
use crate::huffman::AdaptiveHuffman;
use crate::lzss::{LzssEncoder, LzssToken};
use crate::position::encode_position;
use b2f_core::BitWriter;

/// LZHUF compressor.
#[derive(Debug)]
pub struct LzhufEncoder {
    /// Configuration.
    config: LzhufConfig,
    /// Match finder.
    lzss: LzssEncoder,
    /// Adaptive literal/length tree.
    tree: AdaptiveHuffman,
}

impl LzhufEncoder {
    /// Create a new encoder.
    pub fn new(config: LzhufConfig) -> Self {
        Self {
            config,
            lzss: LzssEncoder::new(&config),
            tree: AdaptiveHuffman::new(),
        }
    }

    /// Reset the encoder.
    pub fn reset(&mut self) {
        self.lzss.reset();
        self.tree.reset();
    }

    /// Compress `data` into an LZHUF body.
    ///
    /// The body carries no length; callers store `data.len()` alongside it.
    /// Empty input yields an empty body.
    pub fn encode(&mut self, data: &[u8]) -> Vec<u8> {
        self.reset();
        let tokens = self.lzss.encode(data);
        let mut writer = BitWriter::new();

        for token in &tokens {
            match *token {
                LzssToken::Literal(byte) => {
                    self.tree.encode_symbol(byte as usize, &mut writer);
                }
                LzssToken::Match { length, distance } => {
                    let symbol = 255 - THRESHOLD + length as usize;
                    self.tree.encode_symbol(symbol, &mut writer);
                    encode_position(distance as usize - 1, &mut writer);
                }
            }
        }

        let body = writer.into_vec();
        log::debug!(
            "LZHUF encode: {} bytes -> {} tokens, {} body bytes",
            data.len(),
            tokens.len(),
            body.len()
        );
        body
    }

    /// Get the configuration.
    pub fn config(&self) -> &LzhufConfig {
        &self.config
    }
}

impl Default for LzhufEncoder {
    fn default() -> Self {
        Self::new(LzhufConfig::WINLINK)
    }
}

/// Compress data with the Winlink configuration.
pub fn encode_lzhuf(data: &[u8]) -> Vec<u8> {
    encode_lzhuf_with(data, LzhufConfig::WINLINK)
}

/// Compress data with a custom configuration.
pub fn encode_lzhuf_with(data: &[u8], config: LzhufConfig) -> Vec<u8> {
    LzhufEncoder::new(config).encode(data)
}
