use std::time::Duration;

/// Errors that can occur in client operations.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] arlink_transport::TransportError),

    /// Frame-level error.
    #[error("frame error: {0}")]
    Frame(#[from] arlink_frame::FrameError),

    /// Catalog or argument coding error.
    #[error("catalog error: {0}")]
    Catalog(#[from] arlink_catalog::CatalogError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The device refused the discovery handshake.
    #[error("handshake refused with status {0}")]
    HandshakeFailed(i64),

    /// No command schema is registered under the given path.
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    /// The expected response did not arrive before the deadline.
    #[error("no response within {0:?}")]
    MessageTimeout(Duration),

    /// The connection was closed while the command was outstanding.
    #[error("connection closed")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, ClientError>;
