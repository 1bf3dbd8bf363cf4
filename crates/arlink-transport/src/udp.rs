use std::io::ErrorKind;
use std::net::{Ipv4Addr, SocketAddr, UdpSocket};
use std::time::Duration;

use crate::error::{Result, TransportError};
use crate::link::DatagramLink;

/// UDP control link to a remote ARNET device.
///
/// Bound first (so the local `d2c_port` can be advertised in the discovery
/// handshake), then connected to the device's `c2d_port` once negotiation
/// completes.
#[derive(Debug)]
pub struct UdpLink {
    socket: UdpSocket,
    local_port: u16,
    peer: Option<SocketAddr>,
}

impl UdpLink {
    /// Bind an unconnected link on an ephemeral local port.
    pub fn bind() -> Result<Self> {
        let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
        let socket = UdpSocket::bind(addr).map_err(|source| TransportError::Bind { addr, source })?;
        let local_port = socket.local_addr()?.port();
        tracing::debug!(local_port, "udp link bound");

        Ok(Self {
            socket,
            local_port,
            peer: None,
        })
    }

    /// Associate the link with the remote control endpoint.
    pub fn connect(&mut self, addr: SocketAddr) -> Result<()> {
        self.socket
            .connect(addr)
            .map_err(|source| TransportError::Connect { addr, source })?;
        self.peer = Some(addr);
        tracing::debug!(%addr, "udp link connected");
        Ok(())
    }

    /// Remote endpoint, if connected.
    pub fn peer(&self) -> Option<SocketAddr> {
        self.peer
    }
}

impl DatagramLink for UdpLink {
    fn send(&mut self, datagram: &[u8]) -> Result<()> {
        if self.peer.is_none() {
            return Err(TransportError::Closed);
        }
        self.socket.send(datagram)?;
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>> {
        // Zero would mean "block forever" on most platforms.
        let timeout = timeout.max(Duration::from_millis(1));
        self.socket.set_read_timeout(Some(timeout))?;

        loop {
            match self.socket.recv(buf) {
                Ok(n) => return Ok(Some(n)),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err)
                    if err.kind() == ErrorKind::WouldBlock || err.kind() == ErrorKind::TimedOut =>
                {
                    return Ok(None);
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }

    fn local_port(&self) -> u16 {
        self.local_port
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_assigns_ephemeral_port() {
        let link = UdpLink::bind().unwrap();
        assert_ne!(link.local_port(), 0);
        assert!(link.peer().is_none());
    }

    #[test]
    fn send_before_connect_fails() {
        let mut link = UdpLink::bind().unwrap();
        assert!(matches!(
            link.send(b"x").unwrap_err(),
            TransportError::Closed
        ));
    }

    #[test]
    fn loopback_roundtrip() {
        let mut a = UdpLink::bind().unwrap();
        let mut b = UdpLink::bind().unwrap();
        let b_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, b.local_port()));
        let a_addr = SocketAddr::from((Ipv4Addr::LOCALHOST, a.local_port()));
        a.connect(b_addr).unwrap();
        b.connect(a_addr).unwrap();

        a.send(b"ping").unwrap();

        let mut buf = [0u8; 64];
        let n = b
            .recv(&mut buf, Duration::from_secs(1))
            .unwrap()
            .expect("datagram should arrive");
        assert_eq!(&buf[..n], b"ping");
    }

    #[test]
    fn recv_timeout_returns_none() {
        let mut link = UdpLink::bind().unwrap();
        let mut buf = [0u8; 16];
        let got = link.recv(&mut buf, Duration::from_millis(20)).unwrap();
        assert!(got.is_none());
    }
}
