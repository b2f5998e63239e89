//! `FC` message proposals.
//!
//! Before a message is sent the sender announces it with a line of the form
//!
//! ```text
//! FC <type> <message-id> <uncompressed-size> <compressed-size> [<offset>]
//! ```
//!
//! Both sizes can be checked against what actually arrives: the compressed
//! size is the length of the whole compressed image, CRC and length field
//! included.

use crate::envelope::CompressedEnvelope;
use crate::message::DecodedMessage;
use b2f_core::error::{B2Error, DataIntegrityError, Result};
use std::fmt;

/// A parsed `FC` proposal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    /// Message type, e.g. `EM` (encapsulated mail) or `CM` (Winlink mail).
    pub kind: String,
    /// Message ID.
    pub message_id: String,
    /// Size of the decoded message.
    pub uncompressed_size: u32,
    /// Size of the compressed image.
    pub compressed_size: u32,
    /// Offset the receiver asked to resume from.
    pub offset: u32,
}

impl Proposal {
    /// Parse a proposal line. Trailing `\r`/`\n` are ignored.
    pub fn parse(line: &str) -> Result<Self> {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        let mut fields = trimmed.split_whitespace();

        if fields.next() != Some("FC") {
            return Err(B2Error::invalid_proposal(line, "does not start with FC"));
        }

        let kind = fields
            .next()
            .ok_or_else(|| B2Error::invalid_proposal(line, "missing message type"))?;
        let message_id = fields
            .next()
            .ok_or_else(|| B2Error::invalid_proposal(line, "missing message ID"))?;
        let uncompressed_size = parse_number(line, fields.next(), "uncompressed size")?;
        let compressed_size = parse_number(line, fields.next(), "compressed size")?;
        let offset = match fields.next() {
            Some(field) => parse_number(line, Some(field), "offset")?,
            None => 0,
        };

        Ok(Self {
            kind: kind.to_string(),
            message_id: message_id.to_string(),
            uncompressed_size,
            compressed_size,
            offset,
        })
    }

    /// Check a framed message against the announced sizes.
    pub fn check_envelope(
        &self,
        envelope: &CompressedEnvelope,
    ) -> std::result::Result<(), DataIntegrityError> {
        self.check_sizes(envelope.image_len() as u64, envelope.declared_length as u64)
    }

    /// Check a decoded message against the announced sizes.
    pub fn check_message(
        &self,
        message: &DecodedMessage,
    ) -> std::result::Result<(), DataIntegrityError> {
        self.check_sizes(message.compressed_size as u64, message.data.len() as u64)
    }

    fn check_sizes(
        &self,
        compressed: u64,
        uncompressed: u64,
    ) -> std::result::Result<(), DataIntegrityError> {
        if compressed != self.compressed_size as u64 {
            return Err(DataIntegrityError::proposal_mismatch(
                "compressed size",
                self.compressed_size as u64,
                compressed,
            ));
        }
        if uncompressed != self.uncompressed_size as u64 {
            return Err(DataIntegrityError::proposal_mismatch(
                "uncompressed size",
                self.uncompressed_size as u64,
                uncompressed,
            ));
        }
        Ok(())
    }
}

impl fmt::Display for Proposal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FC {} {} {} {} {}",
            self.kind, self.message_id, self.uncompressed_size, self.compressed_size, self.offset
        )
    }
}

fn parse_number(line: &str, field: Option<&str>, name: &str) -> Result<u32> {
    let field = field.ok_or_else(|| B2Error::invalid_proposal(line, format!("missing {}", name)))?;
    field
        .parse()
        .map_err(|_| B2Error::invalid_proposal(line, format!("bad {} {:?}", name, field)))
}
