//! Transport adapter (spec §4.5): parses a connection URI and opens the
//! matching async byte stream.
//!
//! Three schemes are recognized, mirroring `original_source/protocol.py`'s
//! `create_connection`:
//!
//! - `tcp://host[:port]` (default port 12345)
//! - `serial:/path/to/device` (115200 8N1)
//! - `rfcomm://addr[:channel]` (default channel 1), or
//!   `rfcomm://addr/sdp?name=...&uuid=...` to resolve the channel via SDP
//!
//! `rfcomm://` isn't routed through `url::Url`: its authority is a MAC
//! address that's itself colon-separated, which WHATWG host parsing can't
//! represent, so the scheme is parsed by hand below.
//!
//! `bluer` is the one dependency in this crate with no precedent in the
//! example pack (see DESIGN.md); it's the standard BlueZ D-Bus binding for
//! RFCOMM on Linux and there is no ecosystem alternative for that combined
//! with raw L2CAP access for SDP queries.

use std::pin::Pin;
use std::task::{Context as TaskContext, Poll};

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, ReadBuf};
use url::Url;

use crate::error::{Error, Result};

const DEFAULT_TCP_PORT: u16 = 12345;
const DEFAULT_SERIAL_BAUD: u32 = 115_200;
const DEFAULT_RFCOMM_CHANNEL: u8 = 1;

/// A connected byte stream, whichever of the three transports produced it.
pub enum Transport {
    Tcp(tokio::net::TcpStream),
    Serial(tokio_serial::SerialStream),
    Rfcomm(bluer::rfcomm::Stream),
}

impl AsyncRead for Transport {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_read(cx, buf),
            Transport::Serial(s) => Pin::new(s).poll_read(cx, buf),
            Transport::Rfcomm(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for Transport {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut TaskContext<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_write(cx, buf),
            Transport::Serial(s) => Pin::new(s).poll_write(cx, buf),
            Transport::Rfcomm(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_flush(cx),
            Transport::Serial(s) => Pin::new(s).poll_flush(cx),
            Transport::Rfcomm(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut TaskContext<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Transport::Tcp(s) => Pin::new(s).poll_shutdown(cx),
            Transport::Serial(s) => Pin::new(s).poll_shutdown(cx),
            Transport::Rfcomm(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Open a transport from a connection URI (spec §4.5). `serial:` and
/// `rfcomm:` are parsed by hand; `tcp:` goes through `url::Url`.
pub async fn open(uri: &str) -> Result<Transport> {
    if let Some(path) = uri.strip_prefix("serial:") {
        log::debug!("opening serial transport on {path} at {DEFAULT_SERIAL_BAUD} 8N1");
        let stream = tokio_serial::new(path, DEFAULT_SERIAL_BAUD).open_native_async()?;
        return Ok(Transport::Serial(stream));
    }

    if let Some(rest) = uri.strip_prefix("rfcomm://") {
        return open_rfcomm(uri, rest).await;
    }

    let url = Url::parse(uri).map_err(Error::UrlParse)?;
    match url.scheme() {
        "tcp" => {
            let host = url.host_str().ok_or_else(|| Error::UnknownUri(uri.to_string()))?;
            let port = url.port().unwrap_or(DEFAULT_TCP_PORT);
            log::debug!("opening tcp transport to {host}:{port}");
            let stream = tokio::net::TcpStream::connect((host, port)).await?;
            Ok(Transport::Tcp(stream))
        }
        _ => Err(Error::UnknownUri(uri.to_string())),
    }
}

/// Everything after `rfcomm://`: either `ADDR[:CHANNEL]` or
/// `ADDR/sdp?name=...&uuid=...`.
async fn open_rfcomm(uri: &str, rest: &str) -> Result<Transport> {
    let (before_query, query) = match rest.split_once('?') {
        Some((a, b)) => (a, Some(b)),
        None => (rest, None),
    };
    let mut segments = before_query.splitn(2, '/');
    let authority = segments.next().unwrap_or("");
    let sub_path = segments.next();

    let target_addr = if sub_path == Some("sdp") {
        let addr = parse_address(authority, uri)?;
        let (name, uuid) = parse_sdp_filters(query.unwrap_or(""));
        log::debug!("resolving rfcomm channel for {addr} via sdp (name={name:?}, uuid={uuid:?})");
        let channel = sdp::resolve_channel(addr, name.as_deref(), uuid.as_deref()).await?;
        bluer::rfcomm::SocketAddr::new(addr, channel)
    } else {
        let (addr_part, channel_part) = split_addr_and_channel(authority);
        let addr = parse_address(addr_part, uri)?;
        let channel = match channel_part {
            Some(c) => c.parse().map_err(|_| Error::UnknownUri(uri.to_string()))?,
            None => DEFAULT_RFCOMM_CHANNEL,
        };
        bluer::rfcomm::SocketAddr::new(addr, channel)
    };

    let stream = bluer::rfcomm::Stream::connect(target_addr).await?;
    Ok(Transport::Rfcomm(stream))
}

/// Splits `ADDR[:CHANNEL]` where `ADDR` may itself be `:`-separated (6
/// colon-joined hex octets) or `-`-separated. A colon-MAC authority has 6
/// segments when bare and 7 when a trailing channel is appended; any other
/// split is a dash-MAC with at most one optional trailing channel segment.
fn split_addr_and_channel(authority: &str) -> (&str, Option<&str>) {
    let colon_segments: Vec<&str> = authority.split(':').collect();
    match colon_segments.len() {
        7 => {
            let split_at = authority.rfind(':').unwrap();
            (&authority[..split_at], Some(&authority[split_at + 1..]))
        }
        6 => (authority, None),
        _ => match authority.split_once(':') {
            Some((addr, channel)) => (addr, Some(channel)),
            None => (authority, None),
        },
    }
}

fn parse_address(raw: &str, uri: &str) -> Result<bluer::Address> {
    let normalized = raw.replace('-', ":");
    normalized.parse().map_err(|_| Error::UnknownUri(uri.to_string()))
}

fn parse_sdp_filters(query: &str) -> (Option<String>, Option<String>) {
    let mut name = None;
    let mut uuid = None;
    for (k, v) in url::form_urlencoded::parse(query.as_bytes()) {
        match k.as_ref() {
            "name" => name = Some(v.into_owned()),
            "uuid" => uuid = Some(v.into_owned()),
            _ => {}
        }
    }
    (name, uuid)
}

/// Minimal client-side SDP query over raw L2CAP, used only to resolve the
/// RFCOMM channel for `rfcomm://addr/sdp?...` URIs (spec §4.5).
mod sdp {
    use super::*;

    const SDP_PSM: u16 = 0x0001;
    const UUID_SERIAL_PORT: u16 = 0x1101;
    const UUID_RFCOMM: u16 = 0x0003;
    const ATTR_SERVICE_CLASS_ID_LIST: u16 = 0x0001;
    const ATTR_PROTOCOL_DESCRIPTOR_LIST: u16 = 0x0004;
    const ATTR_SERVICE_NAME: u16 = 0x0100;
    const PDU_SERVICE_SEARCH_ATTRIBUTE_REQUEST: u8 = 0x06;
    const PDU_SERVICE_SEARCH_ATTRIBUTE_RESPONSE: u8 = 0x07;

    /// Browse `addr` for a service whose class list contains the "Serial
    /// Port" UUID (spec §4.5), optionally narrowed by `uuid` (overrides the
    /// searched service class) and `name` (matched against the resolved
    /// service's name attribute). Returns the RFCOMM channel of the first
    /// match, or `SdpNoMatch` if none matches.
    pub async fn resolve_channel(
        addr: bluer::Address,
        name: Option<&str>,
        uuid: Option<&str>,
    ) -> Result<u8> {
        let service_class = match uuid {
            Some(u) => u16::from_str_radix(u.trim_start_matches("0x"), 16)
                .unwrap_or(UUID_SERIAL_PORT),
            None => UUID_SERIAL_PORT,
        };

        let request = build_search_attribute_request(service_class);

        let socket_addr = bluer::l2cap::SocketAddr::new(addr, bluer::AddressType::BrEdr, SDP_PSM);
        let mut socket = bluer::l2cap::Stream::connect(socket_addr)
            .await
            .map_err(|_| Error::SdpNoMatch { addr: addr.to_string() })?;

        socket
            .write_all(&request)
            .await
            .map_err(|_| Error::SdpNoMatch { addr: addr.to_string() })?;

        let mut response = vec![0u8; 1024];
        let n = socket
            .read(&mut response)
            .await
            .map_err(|_| Error::SdpNoMatch { addr: addr.to_string() })?;
        response.truncate(n);

        if response.first() != Some(&PDU_SERVICE_SEARCH_ATTRIBUTE_RESPONSE) {
            return Err(Error::SdpNoMatch { addr: addr.to_string() });
        }

        if let Some(wanted) = name {
            match find_service_name(&response) {
                Some(found) if found.eq_ignore_ascii_case(wanted) => {}
                _ => return Err(Error::SdpNoMatch { addr: addr.to_string() }),
            }
        }

        find_rfcomm_channel(&response).ok_or(Error::SdpNoMatch { addr: addr.to_string() })
    }

    fn push_uuid16(buf: &mut Vec<u8>, uuid: u16) {
        buf.push(0x19); // UUID, 2-byte size
        buf.extend_from_slice(&uuid.to_be_bytes());
    }

    fn push_uint16(buf: &mut Vec<u8>, value: u16) {
        buf.push(0x09); // unsigned int, 2-byte size
        buf.extend_from_slice(&value.to_be_bytes());
    }

    fn build_search_attribute_request(service_class: u16) -> Vec<u8> {
        let mut service_search_pattern = Vec::new();
        push_uuid16(&mut service_search_pattern, service_class);

        let mut attribute_id_list = Vec::new();
        push_uint16(&mut attribute_id_list, ATTR_SERVICE_CLASS_ID_LIST);
        push_uint16(&mut attribute_id_list, ATTR_PROTOCOL_DESCRIPTOR_LIST);
        push_uint16(&mut attribute_id_list, ATTR_SERVICE_NAME);

        let mut params = Vec::new();
        params.push(0x35); // sequence, 1-byte length
        params.push(service_search_pattern.len() as u8);
        params.extend_from_slice(&service_search_pattern);
        params.extend_from_slice(&0xffffu16.to_be_bytes()); // max attribute byte count
        params.push(0x35);
        params.push(attribute_id_list.len() as u8);
        params.extend_from_slice(&attribute_id_list);
        params.push(0x00); // no continuation state

        let mut pdu = Vec::with_capacity(5 + params.len());
        pdu.push(PDU_SERVICE_SEARCH_ATTRIBUTE_REQUEST);
        pdu.extend_from_slice(&0x0001u16.to_be_bytes()); // transaction id
        pdu.extend_from_slice(&(params.len() as u16).to_be_bytes());
        pdu.extend_from_slice(&params);
        pdu
    }

    /// Scans for a `Sequence { UUID(RFCOMM), uint8(channel) }` protocol
    /// descriptor entry rather than walking the full data-element tree.
    fn find_rfcomm_channel(response: &[u8]) -> Option<u8> {
        let pattern = [0x19, (UUID_RFCOMM >> 8) as u8, UUID_RFCOMM as u8];
        let pos = response.windows(3).position(|w| w == pattern)?;
        let after = &response[pos + 3..];
        if after.len() >= 2 && after[0] == 0x08 {
            Some(after[1])
        } else {
            None
        }
    }

    /// Best-effort: finds the first plausible printable-ASCII run long
    /// enough to be a service name string element. Good enough to compare
    /// against a caller-supplied `name` filter without a full DE parser.
    fn find_service_name(response: &[u8]) -> Option<String> {
        let mut best: Option<&[u8]> = None;
        let mut start = None;
        for (i, &b) in response.iter().enumerate() {
            let printable = b.is_ascii_graphic() || b == b' ';
            match (printable, start) {
                (true, None) => start = Some(i),
                (false, Some(s)) => {
                    let run = &response[s..i];
                    if run.len() >= 3 && run.len() > best.map(|b| b.len()).unwrap_or(0) {
                        best = Some(run);
                    }
                    start = None;
                }
                _ => {}
            }
        }
        best.map(|b| String::from_utf8_lossy(b).into_owned())
    }
}
