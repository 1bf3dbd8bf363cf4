use std::collections::VecDeque;
use std::time::Duration;

use crate::error::Result;
use crate::link::DatagramLink;

/// In-memory datagram link for tests.
///
/// Inbound datagrams are queued with [`MockLink::push_inbound`]; everything
/// the engine sends is captured in [`MockLink::sent`].
#[derive(Debug, Default)]
pub struct MockLink {
    inbound: VecDeque<Vec<u8>>,
    sent: Vec<Vec<u8>>,
    local_port: u16,
}

impl MockLink {
    pub fn new() -> Self {
        Self {
            local_port: 54321,
            ..Self::default()
        }
    }

    /// Queue a datagram for the next `recv` call.
    pub fn push_inbound(&mut self, datagram: impl Into<Vec<u8>>) {
        self.inbound.push_back(datagram.into());
    }

    /// Datagrams sent through the link, in order.
    pub fn sent(&self) -> &[Vec<u8>] {
        &self.sent
    }

    /// Drop the record of sent datagrams.
    pub fn clear_sent(&mut self) {
        self.sent.clear();
    }
}

impl DatagramLink for MockLink {
    fn send(&mut self, datagram: &[u8]) -> Result<()> {
        self.sent.push(datagram.to_vec());
        Ok(())
    }

    fn recv(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<Option<usize>> {
        match self.inbound.pop_front() {
            Some(datagram) => {
                let n = datagram.len().min(buf.len());
                buf[..n].copy_from_slice(&datagram[..n]);
                Ok(Some(n))
            }
            None => Ok(None),
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
    fn queued_datagrams_come_back_in_order() {
        let mut link = MockLink::new();
        link.push_inbound(b"one".to_vec());
        link.push_inbound(b"two".to_vec());

        let mut buf = [0u8; 8];
        let n = link.recv(&mut buf, Duration::ZERO).unwrap().unwrap();
        assert_eq!(&buf[..n], b"one");
        let n = link.recv(&mut buf, Duration::ZERO).unwrap().unwrap();
        assert_eq!(&buf[..n], b"two");
        assert!(link.recv(&mut buf, Duration::ZERO).unwrap().is_none());
    }

    #[test]
    fn sends_are_recorded() {
        let mut link = MockLink::new();
        link.send(b"a").unwrap();
        link.send(b"b").unwrap();
        assert_eq!(link.sent(), &[b"a".to_vec(), b"b".to_vec()]);
    }
}
