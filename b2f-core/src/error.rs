//! Error types for B2F decoding.
//!
//! Errors are split by the stage that detects them:
//!
//! - [`FrameError`]: the SOH/STX/EOT transport framing is broken.
//! - [`DecodeError`]: the LZHUF bitstream is malformed.
//! - [`DataIntegrityError`]: framing and bitstream were fine, but the decoded
//!   content disagrees with the declared length, the CRC, or the proposal.
//!
//! [`B2Error`] wraps all three for the message pipeline. Every variant
//! carries the offset or bit position where the problem was found.

use thiserror::Error;

/// Transport framing errors raised by the block framer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    /// The message does not start with SOH.
    #[error("Missing SOH header marker at offset {offset}: found {found:#04x}")]
    MissingHeaderMarker {
        /// Byte offset of the expected marker.
        offset: usize,
        /// Byte found instead.
        found: u8,
    },

    /// The subject/offset header is not laid out as `subject NUL digits NUL`.
    #[error("Malformed header at offset {offset}: {message}")]
    MalformedHeader {
        /// Byte offset where the problem was detected.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// A non-zero resume offset was not followed by `STX 0x06`.
    #[error("Malformed resume block at offset {offset}: expected [02, 06], found {found:02x?}")]
    MalformedResumeBlock {
        /// Byte offset of the expected resume marker.
        offset: usize,
        /// Bytes found instead.
        found: Vec<u8>,
    },

    /// A block started with something other than STX or EOT.
    #[error("Unexpected block marker at offset {offset}: expected STX or EOT, found {found:#04x}")]
    UnexpectedBlockMarker {
        /// Byte offset of the marker.
        offset: usize,
        /// Byte found instead.
        found: u8,
    },

    /// A data block declares more payload than the protocol allows.
    #[error("Oversized block at offset {offset}: length {length} exceeds maximum {max}")]
    OversizedBlock {
        /// Byte offset of the length byte.
        offset: usize,
        /// Declared block length.
        length: u8,
        /// Maximum allowed block length.
        max: u8,
    },

    /// The EOT checksum does not match the accumulated payload.
    #[error("Checksum mismatch at offset {offset}: expected {expected:#04x}, found {found:#04x}")]
    ChecksumMismatch {
        /// Byte offset of the checksum byte.
        offset: usize,
        /// Checksum computed over the payload.
        expected: u8,
        /// Checksum carried by the terminator.
        found: u8,
    },

    /// The input ended before the message was complete.
    #[error("Truncated input at offset {offset}: need {needed} more bytes")]
    TruncatedInput {
        /// Byte offset where more data was needed.
        offset: usize,
        /// Number of bytes missing.
        needed: usize,
    },
}

impl FrameError {
    /// Create a missing header marker error.
    pub fn missing_header(offset: usize, found: u8) -> Self {
        Self::MissingHeaderMarker { offset, found }
    }

    /// Create a malformed header error.
    pub fn malformed_header(offset: usize, message: impl Into<String>) -> Self {
        Self::MalformedHeader {
            offset,
            message: message.into(),
        }
    }

    /// Create a malformed resume block error.
    pub fn malformed_resume(offset: usize, found: impl Into<Vec<u8>>) -> Self {
        Self::MalformedResumeBlock {
            offset,
            found: found.into(),
        }
    }

    /// Create an unexpected block marker error.
    pub fn unexpected_marker(offset: usize, found: u8) -> Self {
        Self::UnexpectedBlockMarker { offset, found }
    }

    /// Create an oversized block error.
    pub fn oversized_block(offset: usize, length: u8, max: u8) -> Self {
        Self::OversizedBlock {
            offset,
            length,
            max,
        }
    }

    /// Create a checksum mismatch error.
    pub fn checksum_mismatch(offset: usize, expected: u8, found: u8) -> Self {
        Self::ChecksumMismatch {
            offset,
            expected,
            found,
        }
    }

    /// Create a truncated input error.
    pub fn truncated(offset: usize, needed: usize) -> Self {
        Self::TruncatedInput { offset, needed }
    }
}

/// Malformed LZHUF bitstream errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    /// The Huffman walk reached a node outside the code table.
    #[error("Invalid Huffman code at bit position {bit_position} (node {node})")]
    InvalidHuffmanCode {
        /// Bit position where the code started.
        bit_position: u64,
        /// Offending node index.
        node: usize,
    },

    /// A back-reference reaches before the start of the history window.
    #[error("Window underflow: distance {distance} exceeds available history {available}")]
    WindowUnderflow {
        /// Requested back-reference distance.
        distance: usize,
        /// Bytes of valid history.
        available: usize,
    },

    /// The bitstream ended before the declared length was produced.
    #[error("Truncated bitstream at bit position {bit_position}")]
    TruncatedBitstream {
        /// Bit position where more input was needed.
        bit_position: u64,
    },
}

impl DecodeError {
    /// Create an invalid Huffman code error.
    pub fn invalid_huffman(bit_position: u64, node: usize) -> Self {
        Self::InvalidHuffmanCode { bit_position, node }
    }

    /// Create a window underflow error.
    pub fn window_underflow(distance: usize, available: usize) -> Self {
        Self::WindowUnderflow {
            distance,
            available,
        }
    }

    /// Create a truncated bitstream error.
    pub fn truncated(bit_position: u64) -> Self {
        Self::TruncatedBitstream { bit_position }
    }
}

/// Decoded content does not agree with the envelope or proposal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DataIntegrityError {
    /// Output length differs from the declared length.
    #[error("Length mismatch: declared {expected} bytes, decoded {actual}")]
    LengthMismatch {
        /// Declared length from the envelope.
        expected: u64,
        /// Number of bytes actually produced.
        actual: u64,
    },

    /// Recomputed CRC-16 differs from the envelope CRC.
    #[error("CRC mismatch: expected {expected:#06x}, computed {computed:#06x}")]
    CrcMismatch {
        /// CRC carried by the envelope.
        expected: u16,
        /// CRC computed locally.
        computed: u16,
    },

    /// A size announced in the `FC` proposal differs from the transfer.
    #[error("Proposal mismatch for {field}: proposed {expected}, received {actual}")]
    ProposalMismatch {
        /// Which proposal field disagreed.
        field: &'static str,
        /// Value from the proposal.
        expected: u64,
        /// Value observed in the transfer.
        actual: u64,
    },

    /// Data from an earlier session cannot be joined to a resumed transfer.
    #[error("Resume mismatch: {message}")]
    ResumeMismatch {
        /// Description of the disagreement.
        message: String,
    },
}

impl DataIntegrityError {
    /// Create a length mismatch error.
    pub fn length_mismatch(expected: u64, actual: u64) -> Self {
        Self::LengthMismatch { expected, actual }
    }

    /// Create a CRC mismatch error.
    pub fn crc_mismatch(expected: u16, computed: u16) -> Self {
        Self::CrcMismatch { expected, computed }
    }

    /// Create a proposal mismatch error.
    pub fn proposal_mismatch(field: &'static str, expected: u64, actual: u64) -> Self {
        Self::ProposalMismatch {
            field,
            expected,
            actual,
        }
    }

    /// Create a resume mismatch error.
    pub fn resume_mismatch(message: impl Into<String>) -> Self {
        Self::ResumeMismatch {
            message: message.into(),
        }
    }
}

/// The main error type for the message pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum B2Error {
    /// Framing error.
    #[error(transparent)]
    Frame(#[from] FrameError),

    /// Bitstream error.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// Integrity error.
    #[error(transparent)]
    Integrity(#[from] DataIntegrityError),

    /// An `FC` proposal line could not be parsed.
    #[error("Invalid proposal {line:?}: {message}")]
    InvalidProposal {
        /// The offending line.
        line: String,
        /// Description of the problem.
        message: String,
    },
}

impl B2Error {
    /// Create an invalid proposal error.
    pub fn invalid_proposal(line: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidProposal {
            line: line.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for the message pipeline.
pub type Result<T> = std::result::Result<T, B2Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FrameError::checksum_mismatch(42, 0x10, 0x11);
        assert!(err.to_string().contains("Checksum mismatch"));
        assert!(err.to_string().contains("0x10"));

        let err = DecodeError::truncated(77);
        assert!(err.to_string().contains("77"));

        let err = DataIntegrityError::crc_mismatch(0x1234, 0xBEEF);
        assert!(err.to_string().contains("0x1234"));
        assert!(err.to_string().contains("0xbeef"));

        let err = FrameError::malformed_resume(9, vec![0x02, 0x07]);
        assert!(err.to_string().contains("[02, 07]"));
    }

    #[test]
    fn test_conversion_into_b2_error() {
        let err: B2Error = FrameError::truncated(3, 1).into();
        assert!(matches!(err, B2Error::Frame(FrameError::TruncatedInput { .. })));

        let err: B2Error = DecodeError::window_underflow(10, 5).into();
        assert!(matches!(err, B2Error::Decode(_)));

        let err: B2Error = DataIntegrityError::length_mismatch(10, 9).into();
        assert_eq!(
            err.to_string(),
            "Length mismatch: declared 10 bytes, decoded 9"
        );
    }
}
