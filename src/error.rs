//! Ambient error type (spec §7).
//!
//! Framing anomalies and checksum mismatches are *not* represented here:
//! per spec §7 they are recoverable protocol events, logged and handled
//! inline (a dropped frame, an `exception` reply). `Error` covers only the
//! cases §7 marks as surfaced-to-caller, plus the oversize-frame assertion.

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("not enough tx space: {overflow} bytes over budget")]
    NoTxSpace { overflow: u16 },

    #[error("unrecognized connection uri: {0:?}")]
    UnknownUri(String),

    #[error("failed to open transport")]
    TransportOpen(#[from] std::io::Error),

    #[error("failed to open serial transport")]
    SerialOpen(#[from] tokio_serial::Error),

    #[error("bluetooth error")]
    Bluetooth(#[from] bluer::Error),

    #[error("no RFCOMM service matched the SDP filter on {addr}")]
    SdpNoMatch { addr: String },

    #[error("mode misconfigured: {0}")]
    ModeMisconfigured(String),

    #[error(transparent)]
    ParseMode(#[from] crate::mode::ParseModeError),

    #[error("invalid uri: {0}")]
    UrlParse(#[from] url::ParseError),
}

pub type Result<T> = std::result::Result<T, Error>;
