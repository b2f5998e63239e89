//! Static coding of match positions.
//!
//! A match position (distance minus one, 0..4096) is split into its upper
//! six bits, sent with a fixed prefix code of 3 to 8 bits, and its lower
//! six bits, sent verbatim. The prefix code is canonical, so the code table
//! and the byte-indexed decode tables are all derived from the lengths.

use b2f_core::bitstream::{BitReader, BitWriter};
use b2f_core::error::DecodeError;

/// Prefix code length for each upper-six-bit value.
pub const P_LEN: [u8; 64] = [
    3, 4, 4, 4, 5, 5, 5, 5, 5, 5, 5, 5, 6, 6, 6, 6, //
    6, 6, 6, 6, 6, 6, 6, 6, 7, 7, 7, 7, 7, 7, 7, 7, //
    7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, 7, //
    8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, 8, //
];

/// Left-aligned 8-bit prefix code for each upper-six-bit value.
pub const P_CODE: [u8; 64] = build_p_code();

/// Upper-six-bit value for every possible leading byte.
pub const D_CODE: [u8; 256] = build_decode_tables().0;

/// Prefix length for every possible leading byte.
pub const D_LEN: [u8; 256] = build_decode_tables().1;

/// Largest position the 12-bit coding can express.
pub const MAX_POSITION: usize = 0xFFF;

const fn build_p_code() -> [u8; 64] {
    let mut codes = [0u8; 64];
    let mut next = 0u16;
    let mut i = 0;
    while i < 64 {
        codes[i] = next as u8;
        next += 1 << (8 - P_LEN[i]);
        i += 1;
    }
    codes
}

const fn build_decode_tables() -> ([u8; 256], [u8; 256]) {
    let mut code = [0u8; 256];
    let mut len = [0u8; 256];
    let p_code = build_p_code();
    let mut i = 0;
    while i < 64 {
        let span = 1usize << (8 - P_LEN[i]);
        let mut j = 0;
        while j < span {
            code[p_code[i] as usize + j] = i as u8;
            len[p_code[i] as usize + j] = P_LEN[i];
            j += 1;
        }
        i += 1;
    }
    (code, len)
}

/// Write a match position.
pub fn encode_position(position: usize, writer: &mut BitWriter) {
    debug_assert!(position <= MAX_POSITION, "Position {} out of range", position);

    let upper = position >> 6;
    writer.write_code((P_CODE[upper] as u16) << 8, P_LEN[upper]);
    writer.write_code(((position & 0x3F) as u16) << 10, 6);
}

/// Read a match position.
///
/// The first byte selects the prefix; the remaining `D_LEN - 2` bits
/// complete the six low bits.
pub fn decode_position(reader: &mut BitReader<'_>) -> Result<usize, DecodeError> {
    let first = reader.read_bits(8)? as usize;
    let upper = (D_CODE[first] as usize) << 6;
    let extra = D_LEN[first] - 2;
    let rest = reader.read_bits(extra)? as usize;
    let low = ((first << extra) | rest) & 0x3F;
    Ok(upper | low)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_table() {
        assert_eq!(P_CODE[0], 0x00);
        assert_eq!(P_CODE[1], 0x20);
        assert_eq!(P_CODE[4], 0x50);
        assert_eq!(P_CODE[12], 0x90);
        assert_eq!(P_CODE[24], 0xC0);
        assert_eq!(P_CODE[48], 0xF0);
        assert_eq!(P_CODE[63], 0xFF);
    }

    #[test]
    fn test_decode_tables_cover_every_byte() {
        assert_eq!(D_CODE[0x00], 0);
        assert_eq!(D_LEN[0x1F], 3);
        assert_eq!(D_CODE[0x20], 1);
        assert_eq!(D_LEN[0x20], 4);
        assert_eq!(D_CODE[0xFF], 63);
        assert_eq!(D_LEN[0xFF], 8);
        assert!(D_LEN.iter().all(|&l| (3..=8).contains(&l)));
    }

    #[test]
    fn test_position_roundtrip() {
        let positions = [0, 1, 63, 64, 255, 1000, 2047, 4095];

        let mut writer = BitWriter::new();
        for &p in &positions {
            encode_position(p, &mut writer);
        }
        let data = writer.into_vec();

        let mut reader = BitReader::new(&data);
        for &p in &positions {
            assert_eq!(decode_position(&mut reader).unwrap(), p);
        }
    }

    #[test]
    fn test_short_prefix_bit_count() {
        let mut writer = BitWriter::new();
        encode_position(5, &mut writer);
        assert_eq!(writer.bits_written(), 9);
    }
}
