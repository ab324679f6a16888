//! Upward-facing event surface (spec §4.6).
//!
//! Per the spec's own Design Notes, the source's `on(event_name, callback)`
//! string-keyed table is replaced with a small polymorphic sink: a trait
//! with one method per event, all defaulted to no-ops so a consumer only
//! implements what it cares about.

use crate::dispatch::LedFrame;

/// Implemented by the UI/front-end collaborator to receive protocol
/// events. All methods fire synchronously from within `Protocol`'s
/// data-received path (spec §4.6); implementations must not block.
pub trait SliderEvents {
    /// Transport bound.
    fn connection_made(&mut self) {}

    /// Transport closed. `reason` is `None` for an orderly close.
    fn connection_lost(&mut self, reason: Option<String>) {
        let _ = reason;
    }

    /// A validated LED frame has arrived.
    fn led(&mut self, frame: LedFrame) {
        let _ = frame;
    }

    /// Periodic reporting was enabled or disabled.
    fn report_state_change(&mut self, enabled: bool) {
        let _ = enabled;
    }

    /// A one-shot input-report request was received.
    fn report_oneshot(&mut self) {}

    /// A reset was handled, fired before the reset reply is sent.
    fn reset(&mut self) {}
}

/// An event sink that does nothing; useful in tests and as a default.
#[derive(Debug, Default)]
pub struct NullEvents;

impl SliderEvents for NullEvents {}

#[cfg(test)]
mod tests {
    use super::*;

    struct Recorder {
        leds: Vec<LedFrame>,
        report_state: Vec<bool>,
        oneshots: u32,
        resets: u32,
    }

    impl SliderEvents for Recorder {
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
    fn default_methods_are_safe_no_ops() {
        let mut sink = NullEvents;
        sink.connection_made();
        sink.connection_lost(None);
        sink.report_oneshot();
        sink.reset();
    }

    #[test]
    fn recorder_captures_events() {
        let mut r = Recorder {
            leds: vec![],
            report_state: vec![],
            oneshots: 0,
            resets: 0,
        };
        r.report_oneshot();
        r.reset();
        r.report_state_change(true);
        assert_eq!(r.oneshots, 1);
        assert_eq!(r.resets, 1);
        assert_eq!(r.report_state, vec![true]);
        assert!(r.leds.is_empty());
    }
}
