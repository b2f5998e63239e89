//! LZSS layer of LZHUF.
//!
//! The decoder side wraps a pre-filled [`RingBuffer`]. The encoder side is a
//! binary search tree over every window position, which finds the longest
//! match for the lookahead and prefers the nearest position on ties. The
//! tree is deterministic, so identical input always yields identical tokens.

use crate::config::LzhufConfig;
use crate::config::constants::{FILL_BYTE, LOOKAHEAD, THRESHOLD};
use b2f_core::RingBuffer;
use b2f_core::error::DecodeError;

/// LZSS token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LzssToken {
    /// A literal byte.
    Literal(u8),
    /// A match reference to earlier history.
    Match {
        /// Number of bytes to copy (`THRESHOLD + 1..=LOOKAHEAD`).
        length: u16,
        /// Distance back into the history window (at least 1).
        distance: u16,
    },
}

/// LZSS decoder over a pre-filled window.
///
/// Output stops at the declared length: a match that would run past it is
/// clipped.
#[derive(Debug)]
pub struct LzssDecoder {
    /// Ring buffer for history.
    ring: RingBuffer,
    /// Output buffer.
    output: Vec<u8>,
    /// Number of bytes the stream should produce.
    expected: usize,
    /// Reject references to never-written slots.
    strict: bool,
}

/// Upper bound on the up-front output allocation.
const MAX_PREALLOC: usize = 1 << 20;

impl LzssDecoder {
    /// Create a decoder expecting `expected` bytes of output.
    pub fn new(config: &LzhufConfig, expected: usize) -> Self {
        Self {
            ring: RingBuffer::with_prefill(config.window_size(), FILL_BYTE, config.prefill_len()),
            output: Vec::with_capacity(expected.min(MAX_PREALLOC)),
            expected,
            strict: config.strict_window,
        }
    }

    /// Bytes still to be produced.
    pub fn remaining(&self) -> usize {
        self.expected - self.output.len()
    }

    /// Check if the declared length has been reached.
    pub fn is_done(&self) -> bool {
        self.output.len() >= self.expected
    }

    /// Decode a literal byte.
    pub fn decode_literal(&mut self, byte: u8) {
        self.ring.write_byte(byte);
        self.output.push(byte);
    }

    /// Decode a match (length, distance), clipped to the declared length.
    pub fn decode_match(&mut self, length: usize, distance: usize) -> Result<(), DecodeError> {
        let length = length.min(self.remaining());
        self.ring
            .copy_match(distance, length, self.strict, &mut self.output)
    }

    /// Get the decoded output.
    pub fn output(&self) -> &[u8] {
        &self.output
    }

    /// Take the decoded output.
    pub fn take_output(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.output)
    }
}

/// Binary-tree match finder.
///
/// Node `i` stands for the string starting at window slot `i`. Slots
/// `window + 1..=window + 256` are the roots of one tree per first byte.
/// The text buffer carries `LOOKAHEAD - 1` mirror bytes past the window
/// end so comparisons never wrap.
#[derive(Debug)]
pub struct LzssEncoder {
    /// Window plus mirrored tail.
    text: Vec<u8>,
    left: Vec<usize>,
    right: Vec<usize>,
    parent: Vec<usize>,
    /// Window size; also the "no node" marker.
    window: usize,
    mask: usize,
    match_position: usize,
    match_length: usize,
}

impl LzssEncoder {
    /// Create an encoder for the configured window.
    pub fn new(config: &LzhufConfig) -> Self {
        let window = config.window_size();
        Self {
            text: vec![0; window + LOOKAHEAD - 1],
            left: vec![window; window + 1],
            right: vec![window; window + 257],
            parent: vec![window; window + 1],
            window,
            mask: window - 1,
            match_position: 0,
            match_length: 0,
        }
    }

    /// Restore the empty state.
    pub fn reset(&mut self) {
        self.text.fill(0);
        self.left.fill(self.window);
        self.right.fill(self.window);
        self.parent.fill(self.window);
        self.match_position = 0;
        self.match_length = 0;
    }

    fn nil(&self) -> usize {
        self.window
    }

    /// Insert the string at slot `r` and record the longest match for it.
    fn insert_node(&mut self, r: usize) {
        let nil = self.nil();
        let mut cmp: i32 = 1;
        let mut p = self.window + 1 + self.text[r] as usize;
        self.left[r] = nil;
        self.right[r] = nil;
        self.match_length = 0;

        loop {
            if cmp >= 0 {
                if self.right[p] != nil {
                    p = self.right[p];
                } else {
                    self.right[p] = r;
                    self.parent[r] = p;
                    return;
                }
            } else if self.left[p] != nil {
                p = self.left[p];
            } else {
                self.left[p] = r;
                self.parent[r] = p;
                return;
            }

            let mut i = 1;
            while i < LOOKAHEAD {
                cmp = self.text[r + i] as i32 - self.text[p + i] as i32;
                if cmp != 0 {
                    break;
                }
                i += 1;
            }

            if i > THRESHOLD {
                let position = (r.wrapping_sub(p) & self.mask) - 1;
                if i > self.match_length {
                    self.match_position = position;
                    self.match_length = i;
                    if i >= LOOKAHEAD {
                        break;
                    }
                } else if i == self.match_length && position < self.match_position {
                    self.match_position = position;
                }
            }
        }

        // Full-length match: `r` takes over the place of `p`.
        self.parent[r] = self.parent[p];
        self.left[r] = self.left[p];
        self.right[r] = self.right[p];
        let (l, rt) = (self.left[p], self.right[p]);
        self.parent[l] = r;
        self.parent[rt] = r;
        let dad = self.parent[p];
        if self.right[dad] == p {
            self.right[dad] = r;
        } else {
            self.left[dad] = r;
        }
        self.parent[p] = nil;
    }

    /// Remove the string at slot `p` from its tree.
    fn delete_node(&mut self, p: usize) {
        let nil = self.nil();
        if self.parent[p] == nil {
            return;
        }

        let q = if self.right[p] == nil {
            self.left[p]
        } else if self.left[p] == nil {
            self.right[p]
        } else {
            let mut q = self.left[p];
            if self.right[q] != nil {
                while self.right[q] != nil {
                    q = self.right[q];
                }
                let dq = self.parent[q];
                self.right[dq] = self.left[q];
                let lq = self.left[q];
                self.parent[lq] = dq;
                self.left[q] = self.left[p];
                let lp = self.left[p];
                self.parent[lp] = q;
            }
            self.right[q] = self.right[p];
            let rp = self.right[p];
            self.parent[rp] = q;
            q
        };

        self.parent[q] = self.parent[p];
        let dad = self.parent[p];
        if self.right[dad] == p {
            self.right[dad] = q;
        } else {
            self.left[dad] = q;
        }
        self.parent[p] = nil;
    }

    /// Store one input byte at slot `s`, mirroring the head of the window.
    fn store(&mut self, s: usize, byte: u8) {
        self.text[s] = byte;
        if s < LOOKAHEAD - 1 {
            self.text[s + self.window] = byte;
        }
    }

    /// Split `data` into literals and matches.
    ///
    /// The window starts filled with spaces, so leading runs of spaces may
    /// be matched against history that was never sent.
    pub fn encode(&mut self, data: &[u8]) -> Vec<LzssToken> {
        let mut tokens = Vec::new();
        if data.is_empty() {
            return tokens;
        }
        self.reset();

        let mut s = 0;
        let mut r = self.window - LOOKAHEAD;
        self.text[..r].fill(FILL_BYTE);

        let mut input = data.iter().copied();
        let mut len = 0;
        while len < LOOKAHEAD {
            match input.next() {
                Some(byte) => {
                    self.text[r + len] = byte;
                    len += 1;
                }
                None => break,
            }
        }

        for i in 1..=LOOKAHEAD {
            self.insert_node(r - i);
        }
        self.insert_node(r);

        loop {
            if self.match_length > len {
                self.match_length = len;
            }

            if self.match_length <= THRESHOLD {
                self.match_length = 1;
                tokens.push(LzssToken::Literal(self.text[r]));
            } else {
                tokens.push(LzssToken::Match {
                    length: self.match_length as u16,
                    distance: (self.match_position + 1) as u16,
                });
            }

            let last_match_length = self.match_length;
            let mut i = 0;
            while i < last_match_length {
                let Some(byte) = input.next() else {
                    break;
                };
                self.delete_node(s);
                self.store(s, byte);
                s = (s + 1) & self.mask;
                r = (r + 1) & self.mask;
                self.insert_node(r);
                i += 1;
            }

            while i < last_match_length {
                i += 1;
                self.delete_node(s);
                s = (s + 1) & self.mask;
                r = (r + 1) & self.mask;
                len -= 1;
                if len > 0 {
                    self.insert_node(r);
                }
            }

            if len == 0 {
                break;
            }
        }

        tokens
    }
}
