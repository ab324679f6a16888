//! Frame stitcher (spec §4.3): reassembles `[CMD | LEN | ARGS | CKSUM]`
//! command frames from the codec's decoded fragments, validating the
//! running checksum before handing a frame up to the dispatcher.

use crate::checksum::{ChecksumContext, INIT};

/// One byte of a command frame's leading tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandCode {
    InputReport,
    LedReport,
    EnableSliderReport,
    DisableSliderReport,
    Unk0x09,
    Unk0x0a,
    Reset,
    Exception,
    GetHwInfo,
    Unknown(u8),
}

impl CommandCode {
    pub fn as_byte(self) -> u8 {
        match self {
            CommandCode::InputReport => 0x01,
            CommandCode::LedReport => 0x02,
            CommandCode::EnableSliderReport => 0x03,
            CommandCode::DisableSliderReport => 0x04,
            CommandCode::Unk0x09 => 0x09,
            CommandCode::Unk0x0a => 0x0a,
            CommandCode::Reset => 0x10,
            CommandCode::Exception => 0xee,
            CommandCode::GetHwInfo => 0xf0,
            CommandCode::Unknown(b) => b,
        }
    }
}

impl From<u8> for CommandCode {
    fn from(b: u8) -> Self {
        match b {
            0x01 => CommandCode::InputReport,
            0x02 => CommandCode::LedReport,
            0x03 => CommandCode::EnableSliderReport,
            0x04 => CommandCode::DisableSliderReport,
            0x09 => CommandCode::Unk0x09,
            0x0a => CommandCode::Unk0x0a,
            0x10 => CommandCode::Reset,
            0xee => CommandCode::Exception,
            0xf0 => CommandCode::GetHwInfo,
            other => CommandCode::Unknown(other),
        }
    }
}

/// A fully reassembled, checksum-validated command frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub cmd: CommandCode,
    pub args: Vec<u8>,
}

/// What happened when a fragment was fed to the stitcher.
pub enum StitchOutcome {
    /// Not enough bytes buffered yet for a complete frame.
    Incomplete,
    /// A frame completed but failed its checksum; already reset internally.
    ChecksumMismatch,
    /// A frame completed and validated.
    Frame(Frame),
}

/// Reassembles one frame's worth of decoded bytes at a time.
pub struct Stitcher {
    buf: Vec<u8>,
    checksum: ChecksumContext,
}

impl Default for Stitcher {
    fn default() -> Self {
        Stitcher {
            buf: Vec::new(),
            checksum: ChecksumContext::new(INIT),
        }
    }
}

impl Stitcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn reset(&mut self) {
        self.buf.clear();
        self.checksum.reset();
    }

    /// Feed one decoded fragment (as produced by `Codec::decode`) into the
    /// stitcher. A fragment may complete zero or one frames; callers feed
    /// fragments one at a time and inspect the outcome after each.
    pub fn feed(&mut self, fragment: &[u8]) -> StitchOutcome {
        self.buf.extend_from_slice(fragment);
        self.checksum.update(fragment);

        if self.buf.len() < 2 {
            return StitchOutcome::Incomplete;
        }

        let argc = self.buf[1] as usize;
        let packet_len = argc + 3;

        assert!(
            self.buf.len() <= packet_len,
            "stitched frame grew past its declared length: buffered={}, expected={}",
            self.buf.len(),
            packet_len
        );

        if self.buf.len() != packet_len {
            return StitchOutcome::Incomplete;
        }

        let outcome = if self.checksum.value() != 0 {
            log::error!(
                "bad checksum on incoming frame (cmd=0x{:02x}, expected running sum 0, got 0x{:02x}): {:02x?}",
                self.buf[0],
                self.checksum.value(),
                self.buf,
            );
            StitchOutcome::ChecksumMismatch
        } else {
            let cmd = CommandCode::from(self.buf[0]);
            let args = self.buf[2..packet_len - 1].to_vec();
            log::debug!("stitched frame cmd={:?} args={:02x?}", cmd, args);
            StitchOutcome::Frame(Frame { cmd, args })
        };

        self.reset();
        outcome
    }
}
