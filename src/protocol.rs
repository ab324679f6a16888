//! The protocol engine: binds the codec, stitcher, and command dispatcher
//! together behind the event-loop contract of spec §4.6/§5
//! (`connection_made` / `data_received` / `connection_lost`, plus the
//! downward `send_input_report` / `send_exception` calls).
//!
//! One `Protocol` is bound to exactly one transport at a time (spec §3);
//! reconnection always constructs a fresh instance. All methods here run
//! on whatever task drives the bound transport and must not block.

use crate::checksum::INIT;
use crate::codec::Codec;
use crate::dispatch::{encode_exception, encode_reply, Dispatch, Event, ExceptionCode};
use crate::events::SliderEvents;
use crate::frame::{CommandCode, Stitcher, StitchOutcome};
use crate::mode::Mode;

const SYNC: u8 = 0xff;
const ESC: u8 = 0xfd;

pub struct Protocol<E: SliderEvents> {
    mode: Mode,
    codec: Codec,
    stitcher: Stitcher,
    dispatch: Dispatch,
    pub events: E,
}

impl<E: SliderEvents> Protocol<E> {
    pub fn new(mode: Mode, events: E) -> Self {
        Protocol {
            mode,
            codec: Codec::new(SYNC, ESC),
            stitcher: Stitcher::new(),
            dispatch: Dispatch::new(mode),
            events,
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// The transport has been bound; resets codec/stitcher state so a
    /// reconnect never leaks a stale partial frame (spec §3 invariant).
    pub fn connection_made(&mut self) {
        self.codec.reset();
        self.events.connection_made();
    }

    /// The transport has closed. `reason` is `None` for an orderly close
    /// (spec §4.6, §7). The engine becomes inert afterwards; it is the
    /// caller's job to decide whether to reconnect (spec §5).
    pub fn connection_lost(&mut self, reason: Option<String>) {
        self.events.connection_lost(reason);
    }

    /// Feed newly received bytes into the engine. Dispatches every
    /// complete frame the chunk contains (in arrival order) before
    /// returning, firing events synchronously and returning any reply
    /// bytes that should be written back to the transport, in the order
    /// their handlers completed (spec §5 ordering guarantees).
    pub fn data_received(&mut self, data: &[u8]) -> Vec<u8> {
        let mut out = Vec::new();
        let fragments = self.codec.decode(data);
        for fragment in fragments {
            match self.stitcher.feed(&fragment) {
                StitchOutcome::Incomplete => {}
                StitchOutcome::ChecksumMismatch => {
                    out.extend(encode_exception(&mut self.codec, ExceptionCode::WrongChecksum));
                }
                StitchOutcome::Frame(frame) => {
                    let outcome = self.dispatch.handle(&frame);
                    if let Some(event) = outcome.event {
                        self.fire(event);
                    }
                    if let Some((cmd, args)) = outcome.reply {
                        out.extend(encode_reply(&mut self.codec, cmd, &args));
                    }
                }
            }
        }
        out
    }

    fn fire(&mut self, event: Event) {
        match event {
            Event::ReportOneshot => self.events.report_oneshot(),
            Event::Led(frame) => self.events.led(frame),
            Event::ReportStateChange(enabled) => self.events.report_state_change(enabled),
            Event::Reset => self.events.reset(),
        }
    }

    /// Encode an `input_report` frame for the given electrode bytes
    /// (spec §6: `bytes.len()` equals the electrode count, 32 in both
    /// shipped modes). The caller writes the returned bytes to the
    /// transport at its own cadence.
    pub fn send_input_report(&mut self, report: &[u8]) -> Vec<u8> {
        encode_reply(&mut self.codec, CommandCode::InputReport, report)
    }

    /// Encode an `exception` reply with the given first-byte code.
    pub fn send_exception(&mut self, code: ExceptionCode) -> Vec<u8> {
        encode_exception(&mut self.codec, code)
    }
}
