//! LZHUF configuration and protocol constants.
//!
//! The alphabet, lookahead and match threshold are fixed by the adaptive
//! Huffman tree layout. The window size differs between the classic 1989
//! `LZHUF.C` (4 KB) and the FBB/Winlink variant (2 KB), so it is part of
//! [`LzhufConfig`].

/// Fixed LZHUF constants.
pub mod constants {
    /// Lookahead buffer size; also the longest match.
    pub const LOOKAHEAD: usize = 60;
    /// Matches of this length or shorter are sent as literals.
    pub const THRESHOLD: usize = 2;
    /// Number of symbols: 256 literals plus one per match length.
    pub const N_CHAR: usize = 256 - THRESHOLD + LOOKAHEAD;
    /// Number of nodes in the Huffman tree.
    pub const TABLE_SIZE: usize = N_CHAR * 2 - 1;
    /// Index of the root node.
    pub const ROOT: usize = TABLE_SIZE - 1;
    /// Root frequency at which the tree is rebuilt with halved counts.
    pub const MAX_FREQ: u32 = 0x8000;
    /// Byte the history window is pre-filled with.
    pub const FILL_BYTE: u8 = b' ';
    /// Window size used by FBB and Winlink B2F.
    pub const WINLINK_WINDOW: usize = 2048;
    /// Window size used by the original `LZHUF.C`.
    pub const CLASSIC_WINDOW: usize = 4096;
}

use constants::{CLASSIC_WINDOW, LOOKAHEAD, WINLINK_WINDOW};

/// LZHUF configuration parameters.
///
/// The window size can only be set through [`LzhufConfig::new`] or the
/// presets, so every config reaching the codec has a valid window:
///
/// ```compile_fail
/// let config = b2f_lzhuf::LzhufConfig {
///     window_size: 32,
///     strict_window: true,
/// };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LzhufConfig {
    window_size: usize,
    /// Reject back-references that reach past the valid history.
    ///
    /// The pre-filled region counts as valid history; only never-written
    /// slots are rejected.
    pub strict_window: bool,
}

impl LzhufConfig {
    /// FBB / Winlink B2F configuration.
    ///
    /// - 2048-byte window
    /// - Space pre-fill of the first 1988 bytes
    /// - Strict window checks
    pub const WINLINK: Self = Self {
        window_size: WINLINK_WINDOW,
        strict_window: true,
    };

    /// Original `LZHUF.C` configuration.
    ///
    /// - 4096-byte window
    /// - Space pre-fill of the first 4036 bytes
    /// - Strict window checks
    pub const CLASSIC: Self = Self {
        window_size: CLASSIC_WINDOW,
        strict_window: true,
    };

    /// Create a configuration with the given window size.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is not a power of two between 128 and 4096.
    /// Positions are coded in 12 bits, which bounds the window from above.
    pub fn new(window_size: usize) -> Self {
        assert!(
            window_size.is_power_of_two() && (128..=4096).contains(&window_size),
            "LZHUF window must be a power of two in 128..=4096, got {}",
            window_size
        );
        Self {
            window_size,
            strict_window: true,
        }
    }

    /// Allow back-references into never-written history slots.
    pub fn lenient(mut self) -> Self {
        self.strict_window = false;
        self
    }

    /// Sliding window size in bytes (power of two, 128 to 4096).
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Number of pre-filled history bytes (`window_size - LOOKAHEAD`).
    pub fn prefill_len(&self) -> usize {
        self.window_size - LOOKAHEAD
    }

    /// Mask for wrapping window positions.
    pub fn window_mask(&self) -> usize {
        self.window_size - 1
    }
}

impl Default for LzhufConfig {
    fn default() -> Self {
        Self::WINLINK
    }
}

#[cfg(test)]
mod tests {
    use super::constants::*;
    use super::*;

    #[test]
    fn test_alphabet_layout() {
        assert_eq!(N_CHAR, 314);
        assert_eq!(TABLE_SIZE, 627);
        assert_eq!(ROOT, 626);
    }

    #[test]
    fn test_winlink_config() {
        let config = LzhufConfig::WINLINK;
        assert_eq!(config.window_size(), 2048);
        assert_eq!(config.prefill_len(), 1988);
        assert_eq!(config.window_mask(), 0x7FF);
        assert!(config.strict_window);
        assert_eq!(LzhufConfig::default(), config);
    }

    #[test]
    fn test_classic_config() {
        let config = LzhufConfig::CLASSIC;
        assert_eq!(config.window_size(), 4096);
        assert_eq!(config.prefill_len(), 4036);
        assert!(!config.lenient().strict_window);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_rejects_odd_window() {
        let _ = LzhufConfig::new(3000);
    }

    #[test]
    #[should_panic(expected = "power of two")]
    fn test_rejects_window_smaller_than_lookahead() {
        let _ = LzhufConfig::new(32);
    }

    #[test]
    fn test_smallest_window() {
        let config = LzhufConfig::new(128).lenient();
        assert_eq!(config.window_size(), 128);
        assert_eq!(config.prefill_len(), 128 - LOOKAHEAD);
        assert_eq!(config.window_mask(), 0x7F);
    }
}
