//! Client protocol engine for ARNET devices.
//!
//! Layering, bottom up: [`engine`] owns the datagram link and the frame
//! plumbing (pings, acks, sequencing); [`queue`] serializes
//! response-expecting commands and matches replies, including fragmented
//! list/map streams; [`state`] keeps the last-known device properties;
//! [`watchdog`] kills the session on inbound silence. [`Connection`] wires
//! them together behind one single-owner event loop, and [`connector`]
//! bootstraps a session from the TCP discovery handshake.
//!
//! ```no_run
//! use std::time::Duration;
//! use arlink_client::{connect, ConnectConfig, Feature};
//!
//! # fn main() -> arlink_client::Result<()> {
//! let config = ConnectConfig::new("192.168.42.1".parse().unwrap());
//! let mut conn = connect(&config)?;
//! let properties = conn.subscribe_properties();
//!
//! if conn.has_feature(Feature::Ardrone3) {
//!     conn.ardrone3().take_off()?;
//! }
//! while conn.is_open() {
//!     conn.poll(Duration::from_millis(50))?;
//!     while let Ok(change) = properties.try_recv() {
//!         println!("{}.{} changed", change.feature, change.property);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod connection;
pub mod connector;
pub mod decoded;
pub mod engine;
pub mod error;
pub mod events;
pub mod features;
pub mod handshake;
pub mod queue;
pub mod state;
pub mod watchdog;

pub use connection::Connection;
pub use connector::{connect, connect_with_catalog, ConnectConfig};
pub use decoded::DecodedMessage;
pub use engine::{Inbound, ProtocolEngine};
pub use error::{ClientError, Result};
pub use events::ObserverSet;
pub use features::Feature;
pub use handshake::{ConnectRequest, ConnectResponse, DISCOVERY_PORT};
pub use queue::{CommandHandle, TransactionQueue, DEFAULT_COMMAND_TIMEOUT};
pub use state::{PropertyChange, PropertyValue, StateStore};
pub use watchdog::{LivenessWatchdog, DEFAULT_LIVENESS_TIMEOUT};
