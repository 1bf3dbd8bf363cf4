/// Errors that can occur during frame/message encoding and decoding.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Fewer bytes remain than one frame header needs.
    #[error("invalid frame size ({remaining} bytes, header needs 7)")]
    InvalidFrameSize { remaining: usize },

    /// The declared frame length is smaller than the header or overruns
    /// the datagram.
    #[error("frame length {length} out of bounds ({remaining} bytes remain)")]
    LengthOutOfBounds { length: u32, remaining: usize },

    /// The frame type byte is not a known frame type.
    #[error("unknown frame type 0x{0:02x}")]
    InvalidFrameType(u8),

    /// A data frame payload is too short to hold a message header.
    #[error("invalid message size ({remaining} bytes, header needs 4)")]
    InvalidMessageSize { remaining: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
