//! Compressed image layout.
//!
//! ```text
//! +--------+--------+--------+--------+--------+--------+-----------
//! | CRC-16 (LE)     | decoded length (LE u32)           | LZHUF body
//! +--------+--------+--------+--------+--------+--------+-----------
//! ```

use crate::header::{LEAD_LEN, MessageHeader};
use b2f_core::error::FrameError;

/// Header plus the unpacked compressed image of one message.
///
/// For a resumed transfer `body` holds only the bytes sent in this session;
/// see [`crate::message::resume`] to join it with the earlier part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedEnvelope {
    /// Message header.
    pub header: MessageHeader,
    /// CRC-16 carried in the image.
    pub crc16: u16,
    /// Decoded length carried in the image.
    pub declared_length: u32,
    /// LZHUF body.
    pub body: Vec<u8>,
}

impl CompressedEnvelope {
    /// Split a compressed image into CRC, length and body.
    ///
    /// `offset` is the input position reported if the image is too short.
    pub fn from_image(
        header: MessageHeader,
        image: &[u8],
        offset: usize,
    ) -> Result<Self, FrameError> {
        if image.len() < LEAD_LEN {
            return Err(FrameError::truncated(offset, LEAD_LEN - image.len()));
        }

        Ok(Self {
            header,
            crc16: u16::from_le_bytes([image[0], image[1]]),
            declared_length: u32::from_le_bytes([image[2], image[3], image[4], image[5]]),
            body: image[LEAD_LEN..].to_vec(),
        })
    }

    /// Size of the compressed image, as announced in a proposal.
    pub fn image_len(&self) -> usize {
        LEAD_LEN + self.body.len()
    }

    /// The six bytes that start the image.
    pub fn lead_bytes(&self) -> [u8; LEAD_LEN] {
        let crc = self.crc16.to_le_bytes();
        let len = self.declared_length.to_le_bytes();
        [crc[0], crc[1], len[0], len[1], len[2], len[3]]
    }

    /// Reassemble the compressed image.
    pub fn to_image(&self) -> Vec<u8> {
        let mut image = Vec::with_capacity(self.image_len());
        image.extend_from_slice(&self.lead_bytes());
        image.extend_from_slice(&self.body);
        image
    }
}
