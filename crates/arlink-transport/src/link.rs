use std::time::Duration;

use crate::error::Result;

/// A connected datagram link to the remote device.
///
/// The protocol engine sends and receives whole datagrams through this trait;
/// it never touches sockets directly. [`crate::UdpLink`] is the production
/// implementation, [`crate::MockLink`] the in-memory one for tests.
pub trait DatagramLink {
    /// Send one datagram to the remote endpoint.
    fn send(&mut self, datagram: &[u8]) -> Result<()>;

    /// Receive one datagram, waiting at most `timeout`.
    ///
    /// Returns `Ok(None)` when the timeout elapses without traffic.
    fn recv(&mut self, buf: &mut [u8], timeout: Duration) -> Result<Option<usize>>;

    /// Local port the link is bound to (the `d2c_port` advertised during
    /// the discovery handshake).
    fn local_port(&self) -> u16;
}
