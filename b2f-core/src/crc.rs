//! CRC-16/XMODEM, the checksum carried in the first two bytes of a B2F
//! compressed image. Table driven; the table is built at compile time.

/// CRC-16/XMODEM lookup table (polynomial 0x1021, MSB-first).
const CRC16_XMODEM_TABLE: [u16; 256] = {
    let mut table = [0u16; 256];
    let mut i = 0usize;
    while i < 256 {
        let mut crc = (i as u16) << 8;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000 != 0 {
                crc = (crc << 1) ^ 0x1021;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
};

/// CRC-16 calculator for B2F compressed images.
///
/// - Polynomial: 0x1021
/// - Initial value: 0x0000
/// - Final XOR: none
/// - Reflected input/output: No
///
/// # Example
///
/// ```
/// use b2f_core::crc::Crc16;
///
/// let mut crc = Crc16::new();
/// crc.update(b"123456789");
/// assert_eq!(crc.finalize(), 0x31C3);
/// ```
#[derive(Debug, Clone)]
pub struct Crc16 {
    crc: u16,
}

impl Crc16 {
    /// Create a new CRC-16 calculator.
    pub fn new() -> Self {
        Self { crc: 0x0000 }
    }

    /// Reset the CRC to its initial state.
    pub fn reset(&mut self) {
        self.crc = 0x0000;
    }

    /// Update the CRC with more data.
    pub fn update(&mut self, data: &[u8]) {
        for &byte in data {
            let index = (((self.crc >> 8) ^ byte as u16) & 0xFF) as usize;
            self.crc = (self.crc << 8) ^ CRC16_XMODEM_TABLE[index];
        }
    }

    /// Get the current CRC value.
    pub fn value(&self) -> u16 {
        self.crc
    }

    /// Finalize and return the CRC value.
    pub fn finalize(self) -> u16 {
        self.crc
    }

    /// Compute CRC-16 for a slice in one call.
    pub fn compute(data: &[u8]) -> u16 {
        let mut crc = Self::new();
        crc.update(data);
        crc.finalize()
    }
}

impl Default for Crc16 {
    fn default() -> Self {
        Self::new()
    }
}
