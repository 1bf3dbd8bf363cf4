use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::Duration;

use crate::error::{Result, TransportError};

/// TCP stream to the device's discovery service.
///
/// Used exactly once per session, to exchange the JSON handshake before any
/// UDP traffic flows. The wrapper exists so the handshake code never deals
/// with socket setup.
pub struct DiscoveryStream {
    stream: TcpStream,
}

impl DiscoveryStream {
    /// Connect to the discovery endpoint with a connect and read timeout.
    pub fn connect(addr: SocketAddr, timeout: Duration) -> Result<Self> {
        let stream = TcpStream::connect_timeout(&addr, timeout)
            .map_err(|source| TransportError::Connect { addr, source })?;
        stream.set_read_timeout(Some(timeout))?;
        stream.set_write_timeout(Some(timeout))?;
        tracing::debug!(%addr, "discovery stream connected");
        Ok(Self { stream })
    }
}

impl Read for DiscoveryStream {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        self.stream.read(buf)
    }
}

impl Write for DiscoveryStream {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.stream.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.stream.flush()
    }
}

impl std::fmt::Debug for DiscoveryStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryStream")
            .field("peer", &self.stream.peer_addr().ok())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::net::{Ipv4Addr, TcpListener};
    use std::thread;

    use super::*;

    #[test]
    fn connect_and_exchange() {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = [0u8; 16];
            let n = stream.read(&mut buf).unwrap();
            stream.write_all(&buf[..n]).unwrap();
        });

        let mut stream = DiscoveryStream::connect(addr, Duration::from_secs(1)).unwrap();
        stream.write_all(b"hello").unwrap();
        let mut buf = [0u8; 16];
        let n = stream.read(&mut buf).unwrap();
        assert_eq!(&buf[..n], b"hello");

        server.join().unwrap();
    }

    #[test]
    fn connect_refused_maps_to_connect_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let result = DiscoveryStream::connect(addr, Duration::from_millis(200));
        assert!(matches!(result, Err(TransportError::Connect { .. })));
    }
}
