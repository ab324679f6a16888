//! Command dispatcher and reply construction (spec §4.4).

use crate::checksum::{ChecksumContext, INIT};
use crate::codec::Codec;
use crate::frame::{CommandCode, Frame};
use crate::hwinfo::HardwareInfo;
use crate::mode::Mode;

/// Host-provided LED frame (spec §3, §4.4).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedFrame {
    pub brightness: u8,
    pub led_brg: Vec<u8>,
}

impl LedFrame {
    /// Brightness as a ratio in `0.0..=1.0`, clamped.
    ///
    /// Ported from `original_source/app.py`'s `_on_led`
    /// (`min(report['brightness'] / 63, 1.0)`).
    pub fn brightness_ratio(&self) -> f32 {
        (self.brightness as f32 / 63.0).min(1.0)
    }

    /// Reinterprets `led_brg` (BRG-ordered triples) as `(r, g, b)` tuples,
    /// dropping any trailing bytes that don't form a complete triple.
    pub fn pixels(&self) -> impl Iterator<Item = (u8, u8, u8)> + '_ {
        self.led_brg.chunks_exact(3).map(|c| (c[1], c[2], c[0]))
    }
}

/// First byte of an outbound `exception` reply's 2-byte body is always
/// `0xff`; this enumerates the second byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExceptionCode {
    WrongChecksum,
    BusError,
    InternalError,
}

impl ExceptionCode {
    pub fn as_byte(self) -> u8 {
        match self {
            ExceptionCode::WrongChecksum => 0x01,
            ExceptionCode::BusError => 0x02,
            ExceptionCode::InternalError => 0xed,
        }
    }
}

/// An upward event a dispatched command asks the protocol engine to fire.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ReportOneshot,
    Led(LedFrame),
    ReportStateChange(bool),
    Reset,
}

/// Everything one dispatched command produces: an optional upward event
/// (fired first) and an optional reply frame (sent after).
#[derive(Debug, Default)]
pub struct Outcome {
    pub event: Option<Event>,
    pub reply: Option<(CommandCode, Vec<u8>)>,
}

impl Outcome {
    fn none() -> Self {
        Outcome::default()
    }

    fn event(e: Event) -> Self {
        Outcome {
            event: Some(e),
            reply: None,
        }
    }

    fn reply(cmd: CommandCode, args: Vec<u8>) -> Self {
        Outcome {
            event: None,
            reply: Some((cmd, args)),
        }
    }

    fn event_and_reply(e: Event, cmd: CommandCode, args: Vec<u8>) -> Self {
        Outcome {
            event: Some(e),
            reply: Some((cmd, args)),
        }
    }
}

/// Mode-selected command table (spec §4.4).
pub struct Dispatch {
    mode: Mode,
}

impl Dispatch {
    pub fn new(mode: Mode) -> Self {
        Dispatch { mode }
    }

    /// Maps a stitched frame to the event/reply its handler produces.
    /// Does not itself touch the wire; the caller (the `Protocol` engine)
    /// encodes `Outcome::reply` via `encode_reply`.
    pub fn handle(&self, frame: &Frame) -> Outcome {
        use CommandCode::*;

        match (frame.cmd, self.mode) {
            (InputReport, _) => Outcome::event(Event::ReportOneshot),
            (LedReport, _) => {
                if frame.args.is_empty() {
                    log::warn!("led_report with no brightness byte, dropping");
                    return Outcome::none();
                }
                Outcome::event(Event::Led(LedFrame {
                    brightness: frame.args[0],
                    led_brg: frame.args[1..].to_vec(),
                }))
            }
            // Open question resolved in DESIGN.md: no reply on enable.
            (EnableSliderReport, _) => Outcome::event(Event::ReportStateChange(true)),
            (DisableSliderReport, Mode::Chu) => {
                Outcome::event_and_reply(Event::ReportStateChange(false), DisableSliderReport, Vec::new())
            }
            (DisableSliderReport, Mode::Diva) => {
                log::warn!("disable_slider_report is not part of the diva command table, dropping");
                Outcome::none()
            }
            (Reset, _) => Outcome::event_and_reply(Event::Reset, Reset, Vec::new()),
            (GetHwInfo, _) => {
                Outcome::reply(GetHwInfo, HardwareInfo::for_mode(self.mode).to_bytes().to_vec())
            }
            (Unk0x09, Mode::Diva) => Outcome::reply(Unk0x09, Vec::new()),
            (Unk0x0a, Mode::Diva) => Outcome::reply(Unk0x0a, Vec::new()),
            (Unk0x09, Mode::Chu) | (Unk0x0a, Mode::Chu) => {
                log::warn!("cmd {:?} is not part of the chu command table, dropping", frame.cmd);
                Outcome::none()
            }
            (Exception, _) => {
                log::warn!("exception is outbound-only, ignoring unexpected incoming exception frame");
                Outcome::none()
            }
            (Unknown(byte), _) => {
                log::warn!("unknown command 0x{byte:02x}, dropping");
                Outcome::none()
            }
        }
    }
}

/// Encode a full reply frame `[CMD | LEN | ARGS | CKSUM]`, stuffing as it
/// goes via `codec` (spec §4.4 "Reply construction").
pub fn encode_reply(codec: &mut Codec, cmd: CommandCode, args: &[u8]) -> Vec<u8> {
    let mut cksum = ChecksumContext::new(INIT);
    let mut out = Vec::new();

    let cmd_byte = cmd.as_byte();
    let len_byte = args.len() as u8;

    out.extend(codec.encode(&[cmd_byte]));
    cksum.update(&[cmd_byte]);

    out.extend(codec.encode(&[len_byte]));
    cksum.update(&[len_byte]);

    if !args.is_empty() {
        out.extend(codec.encode(args));
        cksum.update(args);
    }

    out.extend(codec.finalize(&[cksum.value()]));
    out
}

/// Encode an `exception` reply (spec §4.4, §7): 2-byte body `[0xff, code1]`.
pub fn encode_exception(codec: &mut Codec, code: ExceptionCode) -> Vec<u8> {
    encode_reply(codec, CommandCode::Exception, &[0xff, code.as_byte()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::{CommandCode, Frame};

    #[test]
    fn get_hw_info_replies_with_mode_constant() {
        let d = Dispatch::new(Mode::Diva);
        let frame = Frame {
            cmd: CommandCode::GetHwInfo,
            args: vec![],
        };
        let outcome = d.handle(&frame);
        assert!(outcome.event.is_none());
        match outcome.reply {
            Some((CommandCode::GetHwInfo, args)) => {
                assert_eq!(args, HardwareInfo::for_mode(Mode::Diva).to_bytes().to_vec());
            }
            _ => panic!("expected a GetHwInfo reply"),
        }
    }

    #[test]
    fn enable_slider_report_has_no_reply() {
        let d = Dispatch::new(Mode::Diva);
        let frame = Frame {
            cmd: CommandCode::EnableSliderReport,
            args: vec![],
        };
        let outcome = d.handle(&frame);
        assert_eq!(outcome.event, Some(Event::ReportStateChange(true)));
        assert!(outcome.reply.is_none());
    }

    #[test]
    fn disable_slider_report_chu_only() {
        let frame = Frame {
            cmd: CommandCode::DisableSliderReport,
            args: vec![],
        };

        let chu = Dispatch::new(Mode::Chu).handle(&frame);
        assert_eq!(chu.event, Some(Event::ReportStateChange(false)));
        assert!(matches!(chu.reply, Some((CommandCode::DisableSliderReport, _))));

        let diva = Dispatch::new(Mode::Diva).handle(&frame);
        assert!(diva.event.is_none());
        assert!(diva.reply.is_none());
    }

    #[test]
    fn reset_emits_event_before_reply() {
        let d = Dispatch::new(Mode::Diva);
        let frame = Frame {
            cmd: CommandCode::Reset,
            args: vec![],
        };
        let outcome = d.handle(&frame);
        assert_eq!(outcome.event, Some(Event::Reset));
        assert!(matches!(outcome.reply, Some((CommandCode::Reset, ref a)) if a.is_empty()));
    }

    #[test]
    fn unk_0x09_0x0a_diva_only() {
        for cmd in [CommandCode::Unk0x09, CommandCode::Unk0x0a] {
            let frame = Frame { cmd, args: vec![] };
            assert!(matches!(
                Dispatch::new(Mode::Diva).handle(&frame).reply,
                Some((_, _))
            ));
            assert!(Dispatch::new(Mode::Chu).handle(&frame).reply.is_none());
        }
    }

    #[test]
    fn led_report_splits_brightness_and_colors() {
        let d = Dispatch::new(Mode::Diva);
        let frame = Frame {
            cmd: CommandCode::LedReport,
            args: vec![0x3f, 1, 2, 3, 4, 5, 6],
        };
        match d.handle(&frame).event {
            Some(Event::Led(led)) => {
                assert_eq!(led.brightness, 0x3f);
                assert_eq!(led.led_brg, vec![1, 2, 3, 4, 5, 6]);
                assert_eq!(led.brightness_ratio(), 1.0);
                assert_eq!(led.pixels().collect::<Vec<_>>(), vec![(2, 3, 1), (5, 6, 4)]);
            }
            _ => panic!("expected Led event"),
        }
    }

    #[test]
    fn exception_reply_body() {
        let mut codec = Codec::new(0xff, 0xfd);
        let wire = encode_exception(&mut codec, ExceptionCode::WrongChecksum);
        // decode it back with a fresh decoder and confirm the payload shape
        let mut dec = Codec::new(0xff, 0xfd);
        let fragments = dec.decode(&wire);
        let payload = &fragments[0];
        assert_eq!(payload[0], 0xee); // cmd
        assert_eq!(payload[1], 0x02); // len
        assert_eq!(payload[2], 0xff);
        assert_eq!(payload[3], 0x01); // wrong_checksum
    }
}
