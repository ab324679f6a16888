//! JVS-style 8-bit running checksum.
//!
//! Mirrors the teacher's `Crc32Context` shape (new/step/finalize/reset)
//! but accumulates with 8-bit subtractive arithmetic instead of a CRC-32
//! polynomial: a received frame validates when the running sum over
//! CMD, LEN, ARGS and the trailing checksum byte is zero mod 256.

/// Initial accumulator value: `(-0xff) & 0xff`.
pub const INIT: u8 = (-0xffi32 & 0xff) as u8;

pub struct ChecksumContext {
    init: u8,
    state: u8,
}

impl ChecksumContext {
    pub fn new(init: u8) -> Self {
        ChecksumContext { init, state: init }
    }

    pub fn reset(&mut self) {
        self.state = self.init;
    }

    pub fn value(&self) -> u8 {
        self.state
    }

    pub fn update(&mut self, data: &[u8]) {
        let sum: u8 = data.iter().fold(0u8, |acc, &b| acc.wrapping_add(b));
        self.state = self.state.wrapping_sub(sum);
    }
}

impl Default for ChecksumContext {
    fn default() -> Self {
        ChecksumContext::new(INIT)
    }
}
