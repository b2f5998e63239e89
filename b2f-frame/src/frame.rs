//! B2 block framing.
//!
//! A framed message is a header followed by data blocks and a terminator:
//!
//! ```text
//! SOH len subject NUL offset NUL    header
//! [STX 0x06 lead × 6]               resume block (offset != 0 only)
//! STX n payload × n                 repeated, n <= 250
//! EOT checksum                      (-sum of image bytes) & 0xFF
//! ```
//!
//! The checksum covers every image byte carried by the frame, including the
//! lead bytes of a resumed transfer.

use crate::config::FrameConfig;
use crate::envelope::CompressedEnvelope;
use crate::header::{MessageHeader, byte_at, slice_at};
use b2f_core::error::FrameError;

/// Framing control bytes.
pub mod markers {
    /// Field terminator inside the header.
    pub const NUL: u8 = 0x00;
    /// Start of header.
    pub const SOH: u8 = 0x01;
    /// Start of a data block.
    pub const STX: u8 = 0x02;
    /// End of transmission, followed by the checksum.
    pub const EOT: u8 = 0x04;
    /// Second byte of the resume block.
    pub const RESUME: u8 = 0x06;
}

use markers::{EOT, STX};

/// One message taken off the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Header and compressed image.
    pub envelope: CompressedEnvelope,
    /// Bytes of input that belonged to this message.
    pub consumed: usize,
    /// Number of data blocks.
    pub blocks: usize,
}

/// B2 checksum: two's complement of the byte sum, truncated to 8 bits.
pub fn checksum(bytes: &[u8]) -> u8 {
    byte_sum(bytes).wrapping_neg()
}

fn byte_sum(bytes: &[u8]) -> u8 {
    bytes.iter().fold(0u8, |sum, &b| sum.wrapping_add(b))
}

/// Parse one framed message at the start of `raw`.
pub fn parse(raw: &[u8]) -> Result<Frame, FrameError> {
    parse_with(raw, &FrameConfig::WINLINK)
}

/// Parse one framed message with a custom configuration.
///
/// Trailing bytes after the checksum are left alone; feed
/// `&raw[frame.consumed..]` back in for the next message.
pub fn parse_with(raw: &[u8], config: &FrameConfig) -> Result<Frame, FrameError> {
    parse_at(raw, 0, config)
}

/// Parse a message starting at `start`; error offsets are relative to `raw`.
pub(crate) fn parse_at(
    raw: &[u8],
    start: usize,
    config: &FrameConfig,
) -> Result<Frame, FrameError> {
    let (header, mut pos) = MessageHeader::parse(raw, start)?;

    let mut image = Vec::new();
    if let Some(lead) = header.lead_bytes {
        image.extend_from_slice(&lead);
    }

    let mut blocks = 0;
    loop {
        let marker = byte_at(raw, pos)?;
        match marker {
            STX => {
                let length = byte_at(raw, pos + 1)?;
                if config.strict_block_len && length > config.max_block_len {
                    return Err(FrameError::oversized_block(
                        pos + 1,
                        length,
                        config.max_block_len,
                    ));
                }
                let payload = slice_at(raw, pos + 2, length as usize)?;
                log::debug!("B2 block {} at {}: {} bytes", blocks, pos, length);
                image.extend_from_slice(payload);
                pos += 2 + length as usize;
                blocks += 1;
            }
            EOT => {
                let found = byte_at(raw, pos + 1)?;
                let expected = checksum(&image);
                if found != expected {
                    return Err(FrameError::checksum_mismatch(pos + 1, expected, found));
                }
                log::debug!("B2 checksum {:#04x} matches", found);
                pos += 2;
                break;
            }
            other => return Err(FrameError::unexpected_marker(pos, other)),
        }
    }

    let envelope = CompressedEnvelope::from_image(header, &image, pos)?;
    Ok(Frame {
        envelope,
        consumed: pos - start,
        blocks,
    })
}

/// Frame a compressed image behind `header` using 250-byte blocks.
///
/// `image` is the complete compressed image. For a resumed header only the
/// bytes from the resume offset on are sent, after the lead bytes.
pub fn frame(header: &MessageHeader, image: &[u8]) -> Vec<u8> {
    frame_with(header, image, &FrameConfig::WINLINK)
}

/// Frame a compressed image with a custom block size.
pub fn frame_with(header: &MessageHeader, image: &[u8], config: &FrameConfig) -> Vec<u8> {
    let payload = if header.is_resumed() {
        &image[(header.resume_offset as usize).min(image.len())..]
    } else {
        image
    };

    let block_len = config.max_block_len.max(1) as usize;
    let mut out = Vec::with_capacity(payload.len() + payload.len() / block_len * 2 + 300);
    header.write(&mut out);

    let mut sum = match header.lead_bytes {
        Some(lead) if header.is_resumed() => byte_sum(&lead),
        _ => 0,
    };

    for block in payload.chunks(block_len) {
        out.push(STX);
        out.push(block.len() as u8);
        out.extend_from_slice(block);
        sum = sum.wrapping_add(byte_sum(block));
    }

    out.push(EOT);
    out.push(sum.wrapping_neg());
    out
}
