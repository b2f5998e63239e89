//! Framing and pipeline configuration.

use b2f_lzhuf::LzhufConfig;

/// Largest data block payload a B2 sender emits.
pub const MAX_BLOCK_LEN: u8 = 250;

/// Block framer parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    /// Largest accepted (and emitted) data block payload.
    pub max_block_len: u8,
    /// Reject blocks longer than `max_block_len` when parsing.
    pub strict_block_len: bool,
}

impl FrameConfig {
    /// B2 framing: 250-byte blocks, oversized blocks rejected.
    pub const WINLINK: Self = Self {
        max_block_len: MAX_BLOCK_LEN,
        strict_block_len: true,
    };

    /// Accept any block length a single length byte can express.
    pub fn lenient(mut self) -> Self {
        self.strict_block_len = false;
        self
    }

    /// Use a different block size.
    ///
    /// # Panics
    ///
    /// Panics if `max_block_len` is zero.
    pub fn with_max_block_len(mut self, max_block_len: u8) -> Self {
        assert!(max_block_len > 0, "Block length must be non-zero");
        self.max_block_len = max_block_len;
        self
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self::WINLINK
    }
}

/// What the CRC-16 in the compressed image is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrcCoverage {
    /// The 4-byte length field followed by the LZHUF body.
    #[default]
    CompressedStream,
    /// The decoded message bytes.
    DecodedMessage,
}

/// Complete message pipeline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Block framer parameters.
    pub frame: FrameConfig,
    /// LZHUF codec parameters.
    pub lzhuf: LzhufConfig,
    /// CRC-16 coverage.
    pub crc_coverage: CrcCoverage,
    /// Verify the CRC-16 when decoding.
    pub verify_crc: bool,
}

impl Config {
    /// Winlink B2F defaults.
    ///
    /// - 250-byte blocks
    /// - 2 KB LZHUF window with strict history checks
    /// - CRC-16 over the compressed stream, verified
    pub const WINLINK: Self = Self {
        frame: FrameConfig::WINLINK,
        lzhuf: LzhufConfig::WINLINK,
        crc_coverage: CrcCoverage::CompressedStream,
        verify_crc: true,
    };

    /// Set the CRC coverage.
    pub fn with_crc_coverage(mut self, coverage: CrcCoverage) -> Self {
        self.crc_coverage = coverage;
        self
    }

    /// Set the LZHUF parameters.
    pub fn with_lzhuf(mut self, lzhuf: LzhufConfig) -> Self {
        self.lzhuf = lzhuf;
        self
    }

    /// Set the framer parameters.
    pub fn with_frame(mut self, frame: FrameConfig) -> Self {
        self.frame = frame;
        self
    }

    /// Skip CRC verification when decoding.
    pub fn skip_crc(mut self) -> Self {
        self.verify_crc = false;
        self
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::WINLINK
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_winlink_defaults() {
        let config = Config::default();
        assert_eq!(config, Config::WINLINK);
        assert_eq!(config.frame.max_block_len, 250);
        assert!(config.frame.strict_block_len);
        assert_eq!(config.lzhuf.window_size(), 2048);
        assert_eq!(config.crc_coverage, CrcCoverage::CompressedStream);
        assert!(config.verify_crc);
    }

    #[test]
    fn test_builders() {
        let config = Config::WINLINK
            .with_crc_coverage(CrcCoverage::DecodedMessage)
            .with_lzhuf(LzhufConfig::CLASSIC)
            .with_frame(FrameConfig::WINLINK.with_max_block_len(128).lenient())
            .skip_crc();
        assert_eq!(config.crc_coverage, CrcCoverage::DecodedMessage);
        assert_eq!(config.lzhuf.window_size(), 4096);
        assert_eq!(config.frame.max_block_len, 128);
        assert!(!config.frame.strict_block_len);
        assert!(!config.verify_crc);
    }
}
