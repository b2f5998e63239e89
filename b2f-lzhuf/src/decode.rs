//! LZHUF decompression.
//!
//! One adaptive Huffman tree codes both literals and match lengths; match
//! positions use the static code in [`crate::position`]. Decoding runs until
//! the declared number of bytes has been produced, and any bits left over
//! in the body are ignored.

use crate::config::LzhufConfig;
use crate::config::constants::THRESHOLD;
use crate::huffman::AdaptiveHuffman;
use crate::lzss::LzssDecoder;
use crate::position::decode_position;
use b2f_core::BitReader;
use b2f_core::error::DecodeError;

/// LZHUF decompressor for a single body.
#[derive(Debug)]
pub struct LzhufDecoder {
    /// Configuration.
    config: LzhufConfig,
    /// Adaptive literal/length tree.
    tree: AdaptiveHuffman,
    /// History window and output.
    lzss: LzssDecoder,
    /// Number of bytes to produce.
    declared_length: usize,
    /// Whether decoding is finished.
    finished: bool,
}

impl LzhufDecoder {
    /// Create a decoder that produces `declared_length` bytes.
    pub fn new(config: LzhufConfig, declared_length: u32) -> Self {
        let declared_length = declared_length as usize;
        Self {
            config,
            tree: AdaptiveHuffman::new(),
            lzss: LzssDecoder::new(&config, declared_length),
            declared_length,
            finished: false,
        }
    }

    /// Reset the decoder for another body of the same length.
    pub fn reset(&mut self) {
        self.tree.reset();
        self.lzss = LzssDecoder::new(&self.config, self.declared_length);
        self.finished = false;
    }

    /// Decode `body` into exactly `declared_length` bytes.
    pub fn decode(&mut self, body: &[u8]) -> Result<Vec<u8>, DecodeError> {
        let mut reader = BitReader::new(body);

        log::debug!(
            "LZHUF decode: {} body bytes, {} declared, window {}",
            body.len(),
            self.declared_length,
            self.config.window_size()
        );

        while !self.lzss.is_done() {
            let symbol = self.tree.decode_symbol(&mut reader)?;
            if symbol < 256 {
                self.lzss.decode_literal(symbol as u8);
            } else {
                let length = symbol - 255 + THRESHOLD;
                let position = decode_position(&mut reader)?;
                self.lzss.decode_match(length, position + 1)?;
            }
        }

        let unused = body.len().saturating_sub(reader.bytes_consumed());
        if unused > 0 {
            log::debug!("LZHUF decode: ignoring {} trailing body bytes", unused);
        }

        self.finished = true;
        Ok(self.lzss.take_output())
    }

    /// Check if decoding has completed.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Get the configuration.
    pub fn config(&self) -> &LzhufConfig {
        &self.config
    }
}

/// Decompress a Winlink LZHUF body.
pub fn decode_lzhuf(body: &[u8], declared_length: u32) -> Result<Vec<u8>, DecodeError> {
    decode_lzhuf_with(body, declared_length, LzhufConfig::WINLINK)
}

/// Decompress an LZHUF body with a custom configuration.
pub fn decode_lzhuf_with(
    body: &[u8],
    declared_length: u32,
    config: LzhufConfig,
) -> Result<Vec<u8>, DecodeError> {
    LzhufDecoder::new(config, declared_length).decode(body)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// "12345123456789123456789\n" as produced by a reference encoder.
    const DIGITS_BODY: [u8; 16] = [
        0xDE, 0xEF, 0xB7, 0xFC, 0x0E, 0x0C, 0x70, 0x13, 0x85, 0xC3, 0xE2, 0x71, 0x64, 0x81, 0x19,
        0x60,
    ];

    #[test]
    fn test_decode_digits() {
        let decoded = decode_lzhuf(&DIGITS_BODY, 24).unwrap();
        assert_eq!(decoded, b"12345123456789123456789\n");
    }

    #[test]
    fn test_decode_zero_length() {
        assert!(decode_lzhuf(&[], 0).unwrap().is_empty());
        assert!(decode_lzhuf(&DIGITS_BODY, 0).unwrap().is_empty());
    }

    #[test]
    fn test_decode_prefix_only() {
        let decoded = decode_lzhuf(&DIGITS_BODY, 5).unwrap();
        assert_eq!(decoded, b"12345");
    }

    #[test]
    fn test_decode_truncated_body() {
        let err = decode_lzhuf(&DIGITS_BODY[..4], 24).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedBitstream { .. }));
    }

    #[test]
    fn test_decoder_reset() {
        let mut decoder = LzhufDecoder::new(LzhufConfig::WINLINK, 24);
        let first = decoder.decode(&DIGITS_BODY).unwrap();
        assert!(decoder.is_finished());
        decoder.reset();
        assert!(!decoder.is_finished());
        assert_eq!(decoder.decode(&DIGITS_BODY).unwrap(), first);
    }
}
