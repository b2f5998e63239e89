//! B2 message header parsing and writing.
//!
//! ```text
//! SOH len subject NUL offset NUL [STX 0x06 lead0..lead5]
//! ```
//!
//! `len` covers `subject NUL offset NUL`. The offset is ASCII decimal; when
//! it is non-zero the transfer resumes an earlier one and the six lead bytes
//! (the CRC and length at the start of the compressed image) follow.

use crate::frame::markers::{NUL, RESUME, SOH, STX};
use b2f_core::error::FrameError;

/// Number of lead bytes sent with a resumed transfer.
pub const LEAD_LEN: usize = 6;

/// Longest subject written by [`MessageHeader::new`].
pub const MAX_SUBJECT_LEN: usize = 80;

/// B2 message header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageHeader {
    /// Subject bytes, without the terminating NUL.
    pub subject: Vec<u8>,
    /// Offset into the compressed image where this transfer starts.
    pub resume_offset: u32,
    /// First six bytes of the compressed image, sent only when resuming.
    pub lead_bytes: Option<[u8; LEAD_LEN]>,
}

impl MessageHeader {
    /// Create a header for a transfer starting at offset zero.
    ///
    /// The subject is cut at the first NUL and at [`MAX_SUBJECT_LEN`] bytes.
    pub fn new(subject: impl AsRef<[u8]>) -> Self {
        let subject = subject.as_ref();
        let end = subject
            .iter()
            .position(|&b| b == NUL)
            .unwrap_or(subject.len())
            .min(MAX_SUBJECT_LEN);
        Self {
            subject: subject[..end].to_vec(),
            resume_offset: 0,
            lead_bytes: None,
        }
    }

    /// Create a header for a transfer resuming at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is zero.
    pub fn resumed(subject: impl AsRef<[u8]>, offset: u32, lead_bytes: [u8; LEAD_LEN]) -> Self {
        assert!(offset != 0, "Resumed transfer needs a non-zero offset");
        Self {
            resume_offset: offset,
            lead_bytes: Some(lead_bytes),
            ..Self::new(subject)
        }
    }

    /// Check if this header continues an earlier transfer.
    pub fn is_resumed(&self) -> bool {
        self.resume_offset != 0
    }

    /// Subject as text, with invalid UTF-8 replaced.
    pub fn subject_lossy(&self) -> String {
        String::from_utf8_lossy(&self.subject).into_owned()
    }

    /// Parse a header starting at `start`.
    ///
    /// Returns the header and the offset of the first byte after it.
    pub fn parse(raw: &[u8], start: usize) -> Result<(Self, usize), FrameError> {
        let mut pos = start;

        let marker = byte_at(raw, pos)?;
        if marker != SOH {
            return Err(FrameError::missing_header(pos, marker));
        }
        pos += 1;

        let header_len = byte_at(raw, pos)? as usize;
        pos += 1;
        let fields = slice_at(raw, pos, header_len)?;
        let fields_start = pos;
        pos += header_len;

        let (subject, offset_digits) = split_fields(fields, fields_start)?;
        let resume_offset = parse_offset(offset_digits, fields_start + subject.len() + 1)?;

        log::debug!(
            "B2 header at {}: subject {:?}, offset {}",
            start,
            String::from_utf8_lossy(subject),
            resume_offset
        );

        let lead_bytes = if resume_offset != 0 {
            let marker = slice_at(raw, pos, 2)?;
            if marker != [STX, RESUME] {
                return Err(FrameError::malformed_resume(pos, marker));
            }
            pos += 2;

            let mut lead = [0u8; LEAD_LEN];
            lead.copy_from_slice(slice_at(raw, pos, LEAD_LEN)?);
            pos += LEAD_LEN;
            log::debug!("B2 resume at offset {}: lead bytes {:02x?}", resume_offset, lead);
            Some(lead)
        } else {
            None
        };

        Ok((
            Self {
                subject: subject.to_vec(),
                resume_offset,
                lead_bytes,
            },
            pos,
        ))
    }

    /// Append the header (and resume block, if any) to `out`.
    ///
    /// A subject too long for the one-byte length field is shortened.
    pub fn write(&self, out: &mut Vec<u8>) {
        let offset = self.resume_offset.to_string();
        let room = u8::MAX as usize - offset.len() - 2;
        let subject = &self.subject[..self.subject.len().min(room)];

        out.push(SOH);
        out.push((subject.len() + offset.len() + 2) as u8);
        out.extend_from_slice(subject);
        out.push(NUL);
        out.extend_from_slice(offset.as_bytes());
        out.push(NUL);

        if self.resume_offset != 0 {
            out.push(STX);
            out.push(RESUME);
            out.extend_from_slice(&self.lead_bytes.unwrap_or_default());
        }
    }
}

/// Read one byte or report how much input is missing.
pub(crate) fn byte_at(raw: &[u8], pos: usize) -> Result<u8, FrameError> {
    raw.get(pos)
        .copied()
        .ok_or_else(|| FrameError::truncated(pos, 1))
}

/// Borrow `len` bytes or report how much input is missing.
pub(crate) fn slice_at(raw: &[u8], pos: usize, len: usize) -> Result<&[u8], FrameError> {
    raw.get(pos..pos + len)
        .ok_or_else(|| FrameError::truncated(pos, pos + len - raw.len()))
}

/// Split `subject NUL offset NUL` into subject and offset digits.
fn split_fields(fields: &[u8], start: usize) -> Result<(&[u8], &[u8]), FrameError> {
    let Some((&last, rest)) = fields.split_last() else {
        return Err(FrameError::malformed_header(start, "empty header"));
    };
    if last != NUL {
        return Err(FrameError::malformed_header(
            start + fields.len() - 1,
            "header does not end with NUL",
        ));
    }

    let Some(split) = rest.iter().position(|&b| b == NUL) else {
        return Err(FrameError::malformed_header(start, "missing NUL after subject"));
    };
    Ok((&rest[..split], &rest[split + 1..]))
}

fn parse_offset(digits: &[u8], start: usize) -> Result<u32, FrameError> {
    if digits.is_empty() {
        return Err(FrameError::malformed_header(start, "empty offset field"));
    }
    if let Some(i) = digits.iter().position(|b| !b.is_ascii_digit()) {
        return Err(FrameError::malformed_header(
            start + i,
            format!("offset field has non-digit byte {:#04x}", digits[i]),
        ));
    }

    // All ASCII digits, so only overflow can fail.
    std::str::from_utf8(digits)
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| FrameError::malformed_header(start, "offset field out of range"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_header() {
        let raw = b"\x01\x0cHello World\x000\x00\x02";
        let err = MessageHeader::parse(raw, 0).unwrap_err();
        // Length byte says 12, but "Hello World\00\0" is 14 bytes.
        assert!(matches!(err, FrameError::MalformedHeader { .. }));

        let raw = b"\x01\x0eHello World\x000\x00\x02";
        let (header, next) = MessageHeader::parse(raw, 0).unwrap();
        assert_eq!(header.subject, b"Hello World");
        assert_eq!(header.resume_offset, 0);
        assert_eq!(header.lead_bytes, None);
        assert_eq!(next, 16);
    }

    #[test]
    fn test_parse_resumed_header() {
        let mut raw = b"\x01\x08Re: x\x00\x39\x00".to_vec();
        raw.extend_from_slice(&[0x02, 0x06, 1, 2, 3, 4, 5, 6]);
        let (header, next) = MessageHeader::parse(&raw, 0).unwrap();
        assert_eq!(header.resume_offset, 9);
        assert_eq!(header.lead_bytes, Some([1, 2, 3, 4, 5, 6]));
        assert!(header.is_resumed());
        assert_eq!(next, raw.len());
    }

    #[test]
    fn test_missing_soh() {
        let err = MessageHeader::parse(b"\x02\x05", 0).unwrap_err();
        assert_eq!(
            err,
            FrameError::MissingHeaderMarker {
                offset: 0,
                found: 0x02
            }
        );
    }

    #[test]
    fn test_bad_offset_digits() {
        let err = MessageHeader::parse(b"\x01\x06ab\x001x\x00", 0).unwrap_err();
        assert!(matches!(err, FrameError::MalformedHeader { offset: 6, .. }));

        let err = MessageHeader::parse(b"\x01\x04ab\x00\x00", 0).unwrap_err();
        assert!(matches!(err, FrameError::MalformedHeader { .. }));
    }

    #[test]
    fn test_missing_resume_marker() {
        let raw = b"\x01\x04a\x005\x00\x02\x07123456";
        let err = MessageHeader::parse(raw, 0).unwrap_err();
        assert_eq!(
            err,
            FrameError::MalformedResumeBlock {
                offset: 6,
                found: vec![0x02, 0x07]
            }
        );
    }

    #[test]
    fn test_truncated_header() {
        let err = MessageHeader::parse(b"\x01\x10abc", 0).unwrap_err();
        assert_eq!(
            err,
            FrameError::TruncatedInput {
                offset: 2,
                needed: 13
            }
        );
        assert!(matches!(
            MessageHeader::parse(b"\x01", 0),
            Err(FrameError::TruncatedInput { offset: 1, .. })
        ));
    }

    #[test]
    fn test_write_parse_roundtrip() {
        for header in [
            MessageHeader::new("Net check-in"),
            MessageHeader::resumed("Resumed", 1234, [9, 8, 7, 6, 5, 4]),
        ] {
            let mut out = Vec::new();
            header.write(&mut out);
            let (parsed, next) = MessageHeader::parse(&out, 0).unwrap();
            assert_eq!(parsed, header);
            assert_eq!(next, out.len());
        }
    }

    #[test]
    fn test_new_trims_subject() {
        let header = MessageHeader::new(b"abc\x00def");
        assert_eq!(header.subject, b"abc");
        let header = MessageHeader::new("x".repeat(200));
        assert_eq!(header.subject.len(), MAX_SUBJECT_LEN);
    }

    #[test]
    fn test_write_clamps_long_subject() {
        let header = MessageHeader {
            subject: vec![b'y'; 300],
            resume_offset: 0,
            lead_bytes: None,
        };
        let mut out = Vec::new();
        header.write(&mut out);
        assert_eq!(out[1], 255);
        let (parsed, _) = MessageHeader::parse(&out, 0).unwrap();
        assert_eq!(parsed.subject.len(), 252);
    }
}
