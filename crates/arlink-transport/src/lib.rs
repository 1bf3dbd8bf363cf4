//! Network transport for ARNET device connections.
//!
//! Provides the two sockets the protocol needs:
//! - A UDP control link carrying framed command/event traffic ([`UdpLink`])
//! - A TCP stream used once, for the discovery handshake ([`DiscoveryStream`])
//!
//! This is the lowest layer of arlink. The protocol engine only sees the
//! [`DatagramLink`] trait, so tests can substitute the in-memory [`MockLink`].

pub mod error;
pub mod link;
pub mod mock;
pub mod tcp;
pub mod udp;

pub use error::{Result, TransportError};
pub use link::DatagramLink;
pub use mock::MockLink;
pub use tcp::DiscoveryStream;
pub use udp::UdpLink;
