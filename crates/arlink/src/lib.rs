//! Client engine for the ARNET drone-control protocol.
//!
//! arlink speaks the framed UDP wire protocol used by networked drones and
//! their companion controllers: typed command/event messages, explicit
//! acknowledgement, single-flight transactions, and a device property store.
//!
//! # Crate Structure
//!
//! - [`transport`] — UDP control link and TCP discovery stream
//! - [`frame`] — Transport frame and message codecs, channel ids, sequencing
//! - [`catalog`] — Message schemas and the schema-driven argument codec
//! - [`client`] — Connection, transaction queue, state store, watchdog

/// Re-export transport types.
pub mod transport {
    pub use arlink_transport::*;
}

/// Re-export frame types.
pub mod frame {
    pub use arlink_frame::*;
}

/// Re-export catalog types.
pub mod catalog {
    pub use arlink_catalog::*;
}

/// Re-export client types.
pub mod client {
    pub use arlink_client::*;
}
