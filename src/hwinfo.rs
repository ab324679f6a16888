//! Bit-exact hardware-identity payloads for `get_hw_info` (spec §4.4).
//!
//! Layout is little-endian packed `<8s B 5s 4B>`: an 8-byte model string,
//! a device-class byte, a 5-byte chip part number, and four more bytes
//! (`unk_0xe`, `fw_ver`, `unk_0x10`, `unk_0x11`). 18 bytes total.

use crate::mode::Mode;

pub struct HardwareInfo {
    pub model: [u8; 8],
    pub device_class: u8,
    pub chip_pn: [u8; 5],
    pub unk_0xe: u8,
    pub fw_ver: u8,
    pub unk_0x10: u8,
    pub unk_0x11: u8,
}

pub const DIVA: HardwareInfo = HardwareInfo {
    model: *b"15275   ",
    device_class: 0xa0,
    chip_pn: *b"06687",
    unk_0xe: 0xff,
    fw_ver: 0x90,
    unk_0x10: 0x00,
    unk_0x11: 0x64,
};

pub const CHU: HardwareInfo = HardwareInfo {
    model: *b"15330   ",
    device_class: 0xa0,
    chip_pn: *b"06712",
    unk_0xe: 0xff,
    fw_ver: 0x90,
    unk_0x10: 0x00,
    unk_0x11: 0x64,
};

impl HardwareInfo {
    pub const LEN: usize = 18;

    pub const fn for_mode(mode: Mode) -> &'static HardwareInfo {
        match mode {
            Mode::Diva => &DIVA,
            Mode::Chu => &CHU,
        }
    }

    pub fn to_bytes(&self) -> [u8; Self::LEN] {
        let mut out = [0u8; Self::LEN];
        out[0..8].copy_from_slice(&self.model);
        out[8] = self.device_class;
        out[9..14].copy_from_slice(&self.chip_pn);
        out[14] = self.unk_0xe;
        out[15] = self.fw_ver;
        out[16] = self.unk_0x10;
        out[17] = self.unk_0x11;
        out
    }
}
