//! TCP discovery handshake.
//!
//! Before any UDP traffic the controller opens a short-lived TCP connection
//! to the device's discovery port, sends one JSON object announcing itself
//! and the port it will listen on, and reads one JSON object back. The
//! device NUL-terminates its response; some firmwares also pad it with
//! trailing garbage after the NUL, so everything past the first NUL is
//! dropped before parsing.

use std::collections::BTreeMap;
use std::io::{Read, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ClientError, Result};

/// Default discovery TCP port.
pub const DISCOVERY_PORT: u16 = 44444;

/// Controller announcement sent to the device.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectRequest {
    /// Free-form controller platform tag.
    pub controller_type: String,
    /// Human-readable controller name, shown in device UIs.
    pub controller_name: String,
    /// UDP port the controller listens on for device-to-controller traffic.
    pub d2c_port: u16,
    /// Video stream port, zero when streaming is not used.
    pub arstream2_client_stream_port: u16,
    /// Video control port, zero when streaming is not used.
    pub arstream2_client_control_port: u16,
}

impl ConnectRequest {
    pub fn new(controller_name: impl Into<String>, d2c_port: u16) -> Self {
        Self {
            controller_type: "computer".to_string(),
            controller_name: controller_name.into(),
            d2c_port,
            arstream2_client_stream_port: 0,
            arstream2_client_control_port: 0,
        }
    }
}

/// Device reply to a [`ConnectRequest`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectResponse {
    /// Zero on acceptance; anything else is a refusal.
    pub status: i64,
    /// UDP port the device listens on for controller-to-device traffic.
    pub c2d_port: u16,
    /// Remaining negotiation fields (update ports, stream parameters, ...).
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Run the discovery exchange over an established stream.
///
/// Returns the parsed response once the device accepts; a non-zero status
/// maps to [`ClientError::HandshakeFailed`].
pub fn negotiate<S: Read + Write>(
    stream: &mut S,
    request: &ConnectRequest,
) -> Result<ConnectResponse> {
    let payload = serde_json::to_vec(request)?;
    stream.write_all(&payload).map_err(io_to_client)?;
    stream.flush().map_err(io_to_client)?;
    debug!(d2c_port = request.d2c_port, "sent discovery request");

    let mut raw = Vec::with_capacity(512);
    let mut chunk = [0u8; 256];
    loop {
        let n = stream.read(&mut chunk).map_err(io_to_client)?;
        if n == 0 {
            break;
        }
        raw.extend_from_slice(&chunk[..n]);
        if raw.contains(&0) {
            break;
        }
    }
    if let Some(nul) = raw.iter().position(|&b| b == 0) {
        raw.truncate(nul);
    }

    let response: ConnectResponse = serde_json::from_slice(&raw)?;
    if response.status != 0 {
        return Err(ClientError::HandshakeFailed(response.status));
    }
    debug!(c2d_port = response.c2d_port, "discovery accepted");
    Ok(response)
}

fn io_to_client(err: std::io::Error) -> ClientError {
    ClientError::Transport(arlink_transport::TransportError::Io(err))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// In-memory stream: reads from a canned response, records writes.
    struct FakeStream {
        response: Cursor<Vec<u8>>,
        written: Vec<u8>,
    }

    impl FakeStream {
        fn replying(response: &[u8]) -> Self {
            Self {
                response: Cursor::new(response.to_vec()),
                written: Vec::new(),
            }
        }
    }

    impl Read for FakeStream {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            self.response.read(buf)
        }
    }

    impl Write for FakeStream {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn accepted_handshake_yields_c2d_port() {
        let mut stream =
            FakeStream::replying(b"{\"status\":0,\"c2d_port\":54321,\"c2d_update_port\":51}\x00");
        let request = ConnectRequest::new("test-rig", 43210);

        let response = negotiate(&mut stream, &request).unwrap();
        assert_eq!(response.c2d_port, 54321);
        assert_eq!(
            response.extra.get("c2d_update_port"),
            Some(&serde_json::json!(51))
        );

        let sent: serde_json::Value = serde_json::from_slice(&stream.written).unwrap();
        assert_eq!(sent["d2c_port"], 43210);
        assert_eq!(sent["controller_name"], "test-rig");
    }

    #[test]
    fn trailing_bytes_after_nul_are_ignored() {
        let mut stream =
            FakeStream::replying(b"{\"status\":0,\"c2d_port\":2233}\x00{garbage}{");
        let response = negotiate(&mut stream, &ConnectRequest::new("t", 1)).unwrap();
        assert_eq!(response.c2d_port, 2233);
    }

    #[test]
    fn nonzero_status_is_a_refusal() {
        let mut stream = FakeStream::replying(b"{\"status\":-1,\"c2d_port\":0}\x00");
        let err = negotiate(&mut stream, &ConnectRequest::new("t", 1)).unwrap_err();
        assert!(matches!(err, ClientError::HandshakeFailed(-1)));
    }

    #[test]
    fn unterminated_response_parses_at_eof() {
        let mut stream = FakeStream::replying(b"{\"status\":0,\"c2d_port\":7}");
        let response = negotiate(&mut stream, &ConnectRequest::new("t", 1)).unwrap();
        assert_eq!(response.c2d_port, 7);
    }
}
