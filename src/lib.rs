//! # slider-proto
//!
//! Link-layer and protocol engine for emulating the SEGA arcade
//! touch-slider peripheral wire protocol used by "Project DIVA Arcade
//! Future Tone" and "CHUNITHM" cabinets.
//!
//! The engine is transport-agnostic: [`Protocol`] only ever sees bytes in
//! and bytes out, and [`transport::open`] is one convenient way to get a
//! connected byte stream (TCP, serial, or Bluetooth RFCOMM) from a URI.
//!
//! ## Example
//! ```no_run
//! use slider_proto::{Mode, Protocol, SliderEvents};
//!
//! struct LoggingEvents;
//!
//! impl SliderEvents for LoggingEvents {
//!     fn report_oneshot(&mut self) {
//!         println!("host asked for a one-shot input report");
//!     }
//! }
//!
//! let mut protocol = Protocol::new(Mode::Diva, LoggingEvents);
//! protocol.connection_made();
//!
//! // bytes read from the transport are handed to the engine, and any
//! // bytes it produces in response get written back:
//! let incoming: &[u8] = &[];
//! let outgoing = protocol.data_received(incoming);
//! assert!(outgoing.is_empty());
//! ```

mod checksum;
mod codec;
mod dispatch;
mod error;
mod events;
mod frame;
mod hwinfo;
mod mode;
mod protocol;
mod transport;

pub use dispatch::{ExceptionCode, LedFrame};
pub use error::{Error, Result};
pub use events::{NullEvents, SliderEvents};
pub use frame::{CommandCode, Frame};
pub use hwinfo::HardwareInfo;
pub use mode::{Mode, ParseModeError};
pub use protocol::Protocol;
pub use transport::{open as open_transport, Transport};
