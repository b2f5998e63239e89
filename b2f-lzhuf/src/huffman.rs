//! Adaptive Huffman coding for the LZHUF literal/length alphabet.
//!
//! The tree is never transmitted. Encoder and decoder both start from the
//! same balanced tree and apply the same update after every symbol, so the
//! two stay in lockstep.
//!
//! # Layout
//!
//! Nodes live in one array of `TABLE_SIZE` slots ordered by ascending
//! frequency; the root is the last slot. Only the left child of an internal
//! node is stored in `son`, the right child is always `son + 1`. A `son`
//! value of `TABLE_SIZE + s` marks a leaf for symbol `s`, and
//! `parent[TABLE_SIZE + s]` maps a symbol back to its leaf.

use crate::config::constants::{MAX_FREQ, N_CHAR, ROOT, TABLE_SIZE};
use b2f_core::bitstream::{BitReader, BitWriter};
use b2f_core::error::DecodeError;

/// Adaptive Huffman tree over the combined literal/length alphabet.
#[derive(Debug, Clone)]
pub struct AdaptiveHuffman {
    /// Node frequencies; the extra last slot is a sentinel above any count.
    freq: Vec<u32>,
    /// Parent of each node, followed by the symbol-to-leaf map.
    parent: Vec<usize>,
    /// Left child of each internal node, or `TABLE_SIZE + symbol` for leaves.
    son: Vec<usize>,
}

impl AdaptiveHuffman {
    /// Create the initial tree shared by encoder and decoder.
    pub fn new() -> Self {
        let mut tree = Self {
            freq: vec![0; TABLE_SIZE + 1],
            parent: vec![0; TABLE_SIZE + N_CHAR],
            son: vec![0; TABLE_SIZE],
        };
        tree.reset();
        tree
    }

    /// Restore the initial tree: every symbol has frequency 1.
    pub fn reset(&mut self) {
        for i in 0..N_CHAR {
            self.freq[i] = 1;
            self.son[i] = i + TABLE_SIZE;
            self.parent[i + TABLE_SIZE] = i;
        }

        let mut i = 0;
        let mut j = N_CHAR;
        while j <= ROOT {
            self.freq[j] = self.freq[i] + self.freq[i + 1];
            self.son[j] = i;
            self.parent[i] = j;
            self.parent[i + 1] = j;
            i += 2;
            j += 1;
        }

        self.freq[TABLE_SIZE] = u32::MAX;
        self.parent[ROOT] = 0;
    }

    /// Total of all symbol frequencies (the root count).
    pub fn root_frequency(&self) -> u32 {
        self.freq[ROOT]
    }

    /// Current frequency of a symbol.
    pub fn symbol_frequency(&self, symbol: usize) -> u32 {
        self.freq[self.parent[symbol + TABLE_SIZE]]
    }

    /// Code length in bits of a symbol under the current tree.
    pub fn code_length(&self, symbol: usize) -> usize {
        // Starts at the leaf node, so every edge up to the root is counted.
        let mut node = self.parent[symbol + TABLE_SIZE];
        let mut length = 0;
        while node != ROOT {
            node = self.parent[node];
            length += 1;
        }
        length
    }

    /// Rebuild the tree from halved leaf frequencies.
    fn rebuild(&mut self) {
        log::trace!("Rebuilding adaptive Huffman tree at root frequency {}", self.freq[ROOT]);

        // Collect leaves into the first N_CHAR slots.
        let mut j = 0;
        for i in 0..TABLE_SIZE {
            if self.son[i] >= TABLE_SIZE {
                self.freq[j] = self.freq[i].div_ceil(2);
                self.son[j] = self.son[i];
                j += 1;
            }
        }

        // Join pairs of nodes, inserting each parent in frequency order.
        let mut i = 0;
        for j in N_CHAR..TABLE_SIZE {
            let f = self.freq[i] + self.freq[i + 1];
            let mut k = j;
            while k > 0 && f < self.freq[k - 1] {
                k -= 1;
            }
            self.freq.copy_within(k..j, k + 1);
            self.freq[k] = f;
            self.son.copy_within(k..j, k + 1);
            self.son[k] = i;
            i += 2;
        }

        for i in 0..TABLE_SIZE {
            let k = self.son[i];
            self.parent[k] = i;
            if k < TABLE_SIZE {
                self.parent[k + 1] = i;
            }
        }
    }

    /// Count one occurrence of `symbol` and restore the sibling order.
    pub fn update(&mut self, symbol: usize) {
        if self.freq[ROOT] == MAX_FREQ {
            self.rebuild();
        }

        let mut c = self.parent[symbol + TABLE_SIZE];
        loop {
            self.freq[c] += 1;
            let k = self.freq[c];

            // Order broken: swap with the last node of smaller frequency.
            if k > self.freq[c + 1] {
                let mut l = c + 1;
                while k > self.freq[l + 1] {
                    l += 1;
                }

                self.freq[c] = self.freq[l];
                self.freq[l] = k;

                let i = self.son[c];
                self.parent[i] = l;
                if i < TABLE_SIZE {
                    self.parent[i + 1] = l;
                }

                let j = self.son[l];
                self.son[l] = i;

                self.parent[j] = c;
                if j < TABLE_SIZE {
                    self.parent[j + 1] = c;
                }
                self.son[c] = j;

                c = l;
            }

            c = self.parent[c];
            if c == 0 {
                break;
            }
        }
    }

    /// Decode one symbol by walking from the root, then update the tree.
    pub fn decode_symbol(&mut self, reader: &mut BitReader<'_>) -> Result<usize, DecodeError> {
        let start = reader.bit_position();
        let mut c = self.son[ROOT];

        while c < TABLE_SIZE {
            let next = c + reader.read_bit()? as usize;
            if next >= TABLE_SIZE {
                return Err(DecodeError::invalid_huffman(start, next));
            }
            c = self.son[next];
        }

        let symbol = c - TABLE_SIZE;
        if symbol >= N_CHAR {
            return Err(DecodeError::invalid_huffman(start, c));
        }

        self.update(symbol);
        Ok(symbol)
    }

    /// Encode one symbol as its current code, then update the tree.
    pub fn encode_symbol(&mut self, symbol: usize, writer: &mut BitWriter) {
        debug_assert!(symbol < N_CHAR, "Symbol {} out of range", symbol);

        // Walk leaf to root; odd slots are right children.
        let mut code = 0u32;
        let mut length = 0u8;
        let mut node = self.parent[symbol + TABLE_SIZE];
        loop {
            code >>= 1;
            if node & 1 != 0 {
                code |= 0x8000_0000;
            }
            length += 1;
            node = self.parent[node];
            if node == ROOT {
                break;
            }
        }

        // Trees can grow deeper than 16 levels between rebuilds.
        if length > 16 {
            writer.write_code((code >> 16) as u16, 16);
            writer.write_code(code as u16, length - 16);
        } else {
            writer.write_code((code >> 16) as u16, length);
        }

        self.update(symbol);
    }

    /// Check that frequencies are non-decreasing and every parent count is
    /// the sum of its children.
    pub fn is_consistent(&self) -> bool {
        for i in 0..ROOT {
            if self.freq[i] > self.freq[i + 1] {
                return false;
            }
        }
        for i in 0..TABLE_SIZE {
            let k = self.son[i];
            if k < TABLE_SIZE {
                if self.freq[i] != self.freq[k] + self.freq[k + 1] {
                    return false;
                }
                if self.parent[k] != i || self.parent[k + 1] != i {
                    return false;
                }
            } else if self.parent[k] != i {
                return false;
            }
        }
        true
    }
}

impl Default for AdaptiveHuffman {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_tree() {
        let tree = AdaptiveHuffman::new();
        assert_eq!(tree.root_frequency(), N_CHAR as u32);
        assert!(tree.is_consistent());

        // 314 leaves: the first 116 sit one level deeper than the rest.
        assert_eq!(tree.code_length(0), 9);
        assert_eq!(tree.code_length(115), 9);
        assert_eq!(tree.code_length(116), 8);
        assert_eq!(tree.code_length(N_CHAR - 1), 8);
    }

    #[test]
    fn test_code_length_matches_bits_written() {
        let mut tree = AdaptiveHuffman::new();
        for &symbol in b"code length follows the tree as it adapts" {
            let symbol = symbol as usize;
            let expected = tree.code_length(symbol);
            let mut writer = BitWriter::new();
            tree.encode_symbol(symbol, &mut writer);
            assert_eq!(writer.bits_written(), expected as u64, "symbol {}", symbol);
        }
    }

    #[test]
    fn test_update_keeps_order() {
        let mut tree = AdaptiveHuffman::new();
        for &symbol in b"abracadabra, abracadabra!" {
            tree.update(symbol as usize);
            assert!(tree.is_consistent());
        }
        assert_eq!(tree.symbol_frequency(b'a' as usize), 11);
        assert_eq!(tree.symbol_frequency(b'z' as usize), 1);
        assert!(tree.code_length(b'a' as usize) < tree.code_length(b'z' as usize));
    }

    #[test]
    fn test_rebuild_halves_frequencies() {
        let mut tree = AdaptiveHuffman::new();
        let mut count = N_CHAR as u32;
        while count < MAX_FREQ {
            tree.update(b'e' as usize);
            count += 1;
        }
        assert_eq!(tree.root_frequency(), MAX_FREQ);
        let before = tree.symbol_frequency(b'e' as usize);

        // The next update triggers the rebuild first.
        tree.update(b'e' as usize);
        assert!(tree.is_consistent());
        assert_eq!(tree.symbol_frequency(b'e' as usize), before.div_ceil(2) + 1);
        assert_eq!(tree.symbol_frequency(b'q' as usize), 1);
        assert!(tree.root_frequency() < MAX_FREQ);
    }

    #[test]
    fn test_symbol_roundtrip() {
        let symbols: Vec<usize> = b"the rain in spain stays mainly"
            .iter()
            .map(|&b| b as usize)
            .chain([256, 300, 313, 256, 0, 255])
            .collect();

        let mut encoder = AdaptiveHuffman::new();
        let mut writer = BitWriter::new();
        for &s in &symbols {
            encoder.encode_symbol(s, &mut writer);
        }
        let data = writer.into_vec();

        let mut decoder = AdaptiveHuffman::new();
        let mut reader = BitReader::new(&data);
        for &s in &symbols {
            assert_eq!(decoder.decode_symbol(&mut reader).unwrap(), s);
        }
    }

    #[test]
    fn test_decode_truncated() {
        let mut tree = AdaptiveHuffman::new();
        let mut reader = BitReader::new(&[]);
        let err = tree.decode_symbol(&mut reader).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedBitstream { .. }));

        // One zero byte is a whole 8-bit code.
        let mut tree = AdaptiveHuffman::new();
        let mut reader = BitReader::new(&[0x00]);
        assert_eq!(tree.decode_symbol(&mut reader).unwrap(), 116);
        let err = tree.decode_symbol(&mut reader).unwrap_err();
        assert!(matches!(err, DecodeError::TruncatedBitstream { .. }));
    }
}
