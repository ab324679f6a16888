//! End-to-end protocol tests driven only through the public API: feed wire
//! bytes in via `data_received`, inspect the wire bytes that come back out.
//!
//! The host-side framing helpers below duplicate just enough of the
//! byte-stuffing/checksum wire format to build and read fixtures; they are
//! intentionally independent of the crate's internal `codec`/`checksum`
//! modules.

use slider_proto::{LedFrame, Mode, Protocol, SliderEvents};

const SYNC: u8 = 0xff;
const ESC: u8 = 0xfd;

fn host_encode(cmd: u8, args: &[u8]) -> Vec<u8> {
    let mut body = vec![cmd, args.len() as u8];
    body.extend_from_slice(args);
    let cksum = body.iter().fold(0x01u8, |acc, &b| acc.wrapping_sub(b));
    body.push(cksum);

    let mut out = vec![SYNC];
    for b in body {
        if b == SYNC || b == ESC {
            out.push(ESC);
            out.push(b.wrapping_sub(1));
        } else {
            out.push(b);
        }
    }
    out
}

fn host_decode_one(wire: &[u8]) -> Vec<u8> {
    let mut out = Vec::new();
    let mut escaping = false;
    for &b in wire.iter().skip(1) {
        if b == SYNC {
            break;
        } else if b == ESC {
            escaping = true;
        } else if escaping {
            out.push(b.wrapping_add(1));
            escaping = false;
        } else {
            out.push(b);
        }
    }
    out
}

#[derive(Default)]
struct Recorder {
    leds: Vec<LedFrame>,
    report_state: Vec<bool>,
    oneshots: u32,
    resets: u32,
    connected: bool,
}

impl SliderEvents for Recorder {
    fn connection_made(&mut self) {
        self.connected = true;
    }
    fn led(&mut self, frame: LedFrame) {
        self.leds.push(frame);
    }
    fn report_state_change(&mut self, enabled: bool) {
        self.report_state.push(enabled);
    }
    fn report_oneshot(&mut self) {
        self.oneshots += 1;
    }
    fn reset(&mut self) {
        self.resets += 1;
    }
}

#[test]
fn get_hw_info_round_trip() {
    let mut protocol = Protocol::new(Mode::Diva, Recorder::default());
    protocol.connection_made();

    let wire = host_encode(0xf0, &[]);
    let reply = protocol.data_received(&wire);
    let body = host_decode_one(&reply);

    assert_eq!(body[0], 0xf0);
    assert_eq!(body[1], 18);
    // diva model string "15275   "
    assert_eq!(&body[2..10], b"15275   ");
}

#[test]
fn bad_checksum_produces_exception() {
    let mut protocol = Protocol::new(Mode::Chu, Recorder::default());
    protocol.connection_made();

    let mut wire = host_encode(0xf0, &[]);
    let last = wire.len() - 1;
    wire[last] ^= 0x01;

    let reply = protocol.data_received(&wire);
    let body = host_decode_one(&reply);
    assert_eq!(body, vec![0xee, 0x02, 0xff, 0x01]);
}

#[test]
fn enable_then_periodic_input_report() {
    let mut protocol = Protocol::new(Mode::Diva, Recorder::default());
    protocol.connection_made();

    let enable = host_encode(0x03, &[]);
    let reply = protocol.data_received(&enable);
    assert!(reply.is_empty());
    assert_eq!(protocol.events.report_state, vec![true]);

    let touch = vec![0u8; 32];
    let out = protocol.send_input_report(&touch);
    let body = host_decode_one(&out);
    assert_eq!(body[0], 0x01);
    assert_eq!(body[1], 32);
    assert_eq!(&body[2..], &touch[..]);
}

#[test]
fn disable_slider_report_replies_only_in_chu_mode() {
    let disable = host_encode(0x04, &[]);

    let mut chu = Protocol::new(Mode::Chu, Recorder::default());
    chu.connection_made();
    let chu_reply = chu.data_received(&disable);
    assert!(!chu_reply.is_empty());
    assert_eq!(chu.events.report_state, vec![false]);

    let mut diva = Protocol::new(Mode::Diva, Recorder::default());
    diva.connection_made();
    let diva_reply = diva.data_received(&disable);
    assert!(diva_reply.is_empty());
    assert!(diva.events.report_state.is_empty());
}

#[test]
fn led_report_fires_before_any_reply_bytes() {
    let mut protocol = Protocol::new(Mode::Diva, Recorder::default());
    protocol.connection_made();

    let wire = host_encode(0x02, &[0x3f, 10, 20, 30]);
    let reply = protocol.data_received(&wire);
    assert!(reply.is_empty());
    assert_eq!(protocol.events.leds.len(), 1);
    assert_eq!(protocol.events.leds[0].brightness, 0x3f);
}

#[test]
fn multiple_frames_across_chunk_boundaries() {
    let mut protocol = Protocol::new(Mode::Diva, Recorder::default());
    protocol.connection_made();

    let first = host_encode(0x01, &[]);
    let second = host_encode(0x10, &[]);

    // split the combined wire stream at an arbitrary byte boundary
    let mut combined = first.clone();
    combined.extend_from_slice(&second);
    let mid = combined.len() / 2;

    let mut reply = protocol.data_received(&combined[..mid]);
    reply.extend(protocol.data_received(&combined[mid..]));

    assert_eq!(protocol.events.oneshots, 1);
    assert_eq!(protocol.events.resets, 1);
    let body = host_decode_one(&reply);
    assert_eq!(body[0], 0x10);
}
