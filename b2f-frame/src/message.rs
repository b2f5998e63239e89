//! Message pipeline: framing, decompression and integrity checks.
//!
//! ```text
//! raw bytes ──parse──▶ CompressedEnvelope ──LZHUF──▶ bytes ──length/CRC──▶ DecodedMessage
//! ```

use crate::config::{Config, CrcCoverage};
use crate::envelope::CompressedEnvelope;
use crate::frame::{Frame, frame_with, parse_at};
use crate::header::{LEAD_LEN, MessageHeader};
use crate::proposal::Proposal;
use b2f_core::Crc16;
use b2f_core::error::{DataIntegrityError, Result};
use b2f_lzhuf::{decode_lzhuf_with, encode_lzhuf_with};
use std::collections::VecDeque;

/// A fully decoded and verified message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    /// Subject from the frame header.
    pub subject: Vec<u8>,
    /// Decoded message bytes.
    pub data: Vec<u8>,
    /// CRC-16 carried in the compressed image.
    pub crc16: u16,
    /// Size of the compressed image.
    pub compressed_size: usize,
}

impl DecodedMessage {
    /// Subject as text, with invalid UTF-8 replaced.
    pub fn subject_lossy(&self) -> String {
        String::from_utf8_lossy(&self.subject).into_owned()
    }

    /// Decoded length in bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the message is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Take the decoded bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// CRC-16 of a message under the given coverage.
fn image_crc(coverage: CrcCoverage, declared_length: u32, body: &[u8], data: &[u8]) -> u16 {
    match coverage {
        CrcCoverage::CompressedStream => {
            let mut crc = Crc16::new();
            crc.update(&declared_length.to_le_bytes());
            crc.update(body);
            crc.finalize()
        }
        CrcCoverage::DecodedMessage => Crc16::compute(data),
    }
}

/// Declared and produced lengths must agree.
fn check_length(declared: u32, produced: usize) -> std::result::Result<(), DataIntegrityError> {
    if produced as u64 != declared as u64 {
        return Err(DataIntegrityError::length_mismatch(
            declared as u64,
            produced as u64,
        ));
    }
    Ok(())
}

/// Build the compressed image for `data`: CRC, length, LZHUF body.
///
/// Messages are limited to `u32::MAX` bytes by the length field.
pub fn compress_image(data: &[u8], config: &Config) -> Vec<u8> {
    let body = encode_lzhuf_with(data, config.lzhuf);
    let declared_length = data.len() as u32;
    let crc = image_crc(config.crc_coverage, declared_length, &body, data);

    let mut image = Vec::with_capacity(LEAD_LEN + body.len());
    image.extend_from_slice(&crc.to_le_bytes());
    image.extend_from_slice(&declared_length.to_le_bytes());
    image.extend_from_slice(&body);
    image
}

/// Compress and frame a message.
pub fn encode_message(subject: impl AsRef<[u8]>, data: &[u8], config: &Config) -> Vec<u8> {
    let image = compress_image(data, config);
    frame_with(&MessageHeader::new(subject), &image, &config.frame)
}

/// Decompress a complete envelope and verify length and CRC.
pub fn decode_envelope(envelope: &CompressedEnvelope, config: &Config) -> Result<DecodedMessage> {
    if envelope.header.is_resumed() {
        return Err(DataIntegrityError::resume_mismatch(format!(
            "transfer resumes at offset {}; join it with the earlier image first",
            envelope.header.resume_offset
        ))
        .into());
    }

    let data = decode_lzhuf_with(&envelope.body, envelope.declared_length, config.lzhuf)?;
    check_length(envelope.declared_length, data.len())?;

    if config.verify_crc {
        let computed = image_crc(
            config.crc_coverage,
            envelope.declared_length,
            &envelope.body,
            &data,
        );
        if computed != envelope.crc16 {
            return Err(DataIntegrityError::crc_mismatch(envelope.crc16, computed).into());
        }
    }

    log::debug!(
        "Decoded message {:?}: {} -> {} bytes",
        envelope.header.subject_lossy(),
        envelope.image_len(),
        data.len()
    );

    Ok(DecodedMessage {
        subject: envelope.header.subject.clone(),
        data,
        crc16: envelope.crc16,
        compressed_size: envelope.image_len(),
    })
}

/// Decode the first message in `raw`.
///
/// Returns the message and the number of input bytes it occupied.
pub fn decode_message(raw: &[u8], config: &Config) -> Result<(DecodedMessage, usize)> {
    decode_at(raw, 0, config)
}

fn decode_at(raw: &[u8], start: usize, config: &Config) -> Result<(DecodedMessage, usize)> {
    let frame = parse_at(raw, start, &config.frame)?;
    let message = decode_envelope(&frame.envelope, config)?;
    Ok((message, frame.consumed))
}

/// Join a resumed transfer with the image received in an earlier session.
///
/// The result is `earlier_image[..resume_offset]` followed by the newly
/// received bytes. The lead bytes sent with the resume must equal the first
/// six bytes of the earlier image. A frame that is not resumed is returned
/// as is.
pub fn resume(
    frame: &Frame,
    earlier_image: &[u8],
) -> std::result::Result<CompressedEnvelope, DataIntegrityError> {
    let envelope = &frame.envelope;
    let header = &envelope.header;
    let Some(lead) = header.lead_bytes.filter(|_| header.is_resumed()) else {
        return Ok(envelope.clone());
    };

    let offset = header.resume_offset as usize;
    if offset < LEAD_LEN {
        return Err(DataIntegrityError::resume_mismatch(format!(
            "resume offset {} falls inside the lead bytes",
            offset
        )));
    }
    if earlier_image.len() < offset {
        return Err(DataIntegrityError::resume_mismatch(format!(
            "earlier image has {} bytes, resume offset is {}",
            earlier_image.len(),
            offset
        )));
    }
    if earlier_image[..LEAD_LEN] != lead {
        return Err(DataIntegrityError::resume_mismatch(format!(
            "lead bytes {:02x?} differ from earlier image {:02x?}",
            lead,
            &earlier_image[..LEAD_LEN]
        )));
    }

    let mut body = Vec::with_capacity(offset - LEAD_LEN + envelope.body.len());
    body.extend_from_slice(&earlier_image[LEAD_LEN..offset]);
    body.extend_from_slice(&envelope.body);
    log::debug!(
        "Resumed transfer: {} earlier + {} new body bytes",
        offset - LEAD_LEN,
        envelope.body.len()
    );

    Ok(CompressedEnvelope {
        header: MessageHeader {
            subject: header.subject.clone(),
            resume_offset: 0,
            lead_bytes: None,
        },
        crc16: envelope.crc16,
        declared_length: envelope.declared_length,
        body,
    })
}

/// Decode a resumed transfer using the image received earlier.
pub fn decode_resumed(
    raw: &[u8],
    earlier_image: &[u8],
    config: &Config,
) -> Result<(DecodedMessage, usize)> {
    let frame = parse_at(raw, 0, &config.frame)?;
    let envelope = resume(&frame, earlier_image)?;
    let message = decode_envelope(&envelope, config)?;
    Ok((message, frame.consumed))
}

/// Iterator over the messages in a buffer of concatenated frames.
///
/// Yields one result per message and stops after the first error.
#[derive(Debug)]
pub struct MessageReader<'a> {
    raw: &'a [u8],
    position: usize,
    config: Config,
    proposals: VecDeque<Proposal>,
    failed: bool,
}

impl<'a> MessageReader<'a> {
    /// Create a reader over `raw`.
    pub fn new(raw: &'a [u8], config: Config) -> Self {
        Self {
            raw,
            position: 0,
            config,
            proposals: VecDeque::new(),
            failed: false,
        }
    }

    /// Check each message against the matching proposal, in order.
    pub fn with_proposals(mut self, proposals: impl IntoIterator<Item = Proposal>) -> Self {
        self.proposals = proposals.into_iter().collect();
        self
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.raw[self.position..]
    }

    fn next_message(&mut self) -> Result<DecodedMessage> {
        let (message, consumed) = decode_at(self.raw, self.position, &self.config)?;
        self.position += consumed;

        if let Some(proposal) = self.proposals.pop_front() {
            if let Err(err) = proposal.check_message(&message) {
                log::warn!("Message {} does not match its proposal: {}", proposal.message_id, err);
                return Err(err.into());
            }
        }
        Ok(message)
    }
}

impl Iterator for MessageReader<'_> {
    type Item = Result<DecodedMessage>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.position >= self.raw.len() {
            return None;
        }

        let result = self.next_message();
        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::frame;
    use b2f_core::error::{B2Error, DecodeError, FrameError};

    const TEXT: &[u8] = b"Mid: 6Q7UVPAB1EXS\r\nSubject: Net check-in\r\nBody: 24\r\n\r\nAll stations nominal.\r\n";

    #[test]
    fn test_encode_decode() {
        let raw = encode_message("Net check-in", TEXT, &Config::WINLINK);
        let (message, consumed) = decode_message(&raw, &Config::WINLINK).unwrap();
        assert_eq!(consumed, raw.len());
        assert_eq!(message.data, TEXT);
        assert_eq!(message.subject_lossy(), "Net check-in");
        assert_eq!(message.len(), TEXT.len());
    }

    #[test]
    fn test_empty_message() {
        let raw = encode_message("empty", b"", &Config::WINLINK);
        let (message, _) = decode_message(&raw, &Config::WINLINK).unwrap();
        assert!(message.is_empty());
        assert_eq!(message.compressed_size, 6);
        // CRC over a zero length field is zero.
        assert_eq!(message.crc16, 0);
    }

    #[test]
    fn test_decoded_message_coverage() {
        let config = Config::WINLINK.with_crc_coverage(CrcCoverage::DecodedMessage);
        let image = compress_image(TEXT, &config);
        assert_eq!(
            u16::from_le_bytes([image[0], image[1]]),
            Crc16::compute(TEXT)
        );

        let raw = frame(&MessageHeader::new("x"), &image);
        assert!(decode_message(&raw, &config).is_ok());
        // The default coverage disagrees with this CRC.
        assert!(matches!(
            decode_message(&raw, &Config::WINLINK),
            Err(B2Error::Integrity(DataIntegrityError::CrcMismatch { .. }))
        ));
        assert!(decode_message(&raw, &Config::WINLINK.skip_crc()).is_ok());
    }

    #[test]
    fn test_length_check() {
        assert!(check_length(5, 5).is_ok());
        assert_eq!(
            check_length(10, 7).unwrap_err(),
            DataIntegrityError::LengthMismatch {
                expected: 10,
                actual: 7
            }
        );
    }

    #[test]
    fn test_crc_mismatch() {
        let mut image = compress_image(TEXT, &Config::WINLINK);
        image[0] ^= 0x01;
        let raw = frame(&MessageHeader::new("x"), &image);
        let err = decode_message(&raw, &Config::WINLINK).unwrap_err();
        assert!(matches!(
            err,
            B2Error::Integrity(DataIntegrityError::CrcMismatch { .. })
        ));
    }

    #[test]
    fn test_overstated_length_is_truncation() {
        let mut image = compress_image(TEXT, &Config::WINLINK);
        image[2] = image[2].wrapping_add(100);
        let raw = frame(&MessageHeader::new("x"), &image);
        let err = decode_message(&raw, &Config::WINLINK).unwrap_err();
        assert!(matches!(
            err,
            B2Error::Decode(DecodeError::TruncatedBitstream { .. })
        ));
    }

    #[test]
    fn test_resumed_without_earlier_data() {
        let image = compress_image(TEXT, &Config::WINLINK);
        let lead: [u8; 6] = image[..6].try_into().unwrap();
        let raw = frame(&MessageHeader::resumed("x", 20, lead), &image);
        let err = decode_message(&raw, &Config::WINLINK).unwrap_err();
        assert!(matches!(
            err,
            B2Error::Integrity(DataIntegrityError::ResumeMismatch { .. })
        ));
    }

    #[test]
    fn test_reader_stops_after_error() {
        let mut raw = encode_message("one", b"first", &Config::WINLINK);
        raw.extend_from_slice(b"\x05garbage");
        raw.extend(encode_message("three", b"third", &Config::WINLINK));

        let mut reader = MessageReader::new(&raw, Config::WINLINK);
        assert_eq!(reader.next().unwrap().unwrap().data, b"first");
        assert!(matches!(
            reader.next(),
            Some(Err(B2Error::Frame(FrameError::MissingHeaderMarker {
                found: 0x05,
                ..
            })))
        ));
        assert!(reader.next().is_none());
    }
}
