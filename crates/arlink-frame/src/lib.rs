//! ARNET transport frame and message codecs.
//!
//! Every datagram on the control link carries one or more frames, each with:
//! - A 1-byte frame type (ack, data, low-latency data, ack-data)
//! - A 1-byte channel id for multiplexing
//! - A 1-byte per-channel sequence number
//! - A 4-byte little-endian total length (header included)
//!
//! Data frames carry a message: a 4-byte header (`featureId`, `classId`,
//! `messageId` LE) followed by schema-encoded argument bytes.

pub mod channel;
pub mod codec;
pub mod error;
pub mod message;
pub mod sequence;

pub use codec::{decode_frame, encode_frame, Frame, FrameType, FRAME_HEADER_SIZE};
pub use error::{FrameError, Result};
pub use message::{Message, MESSAGE_HEADER_SIZE};
pub use sequence::SequenceCounters;
