use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Message header: feature (1) + class (1) + message id (2) = 4 bytes.
pub const MESSAGE_HEADER_SIZE: usize = 4;

/// A typed command/event message, carried as one data frame's payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub feature_id: u8,
    pub class_id: u8,
    pub message_id: u16,
    /// Schema-encoded argument bytes.
    pub args: Bytes,
}

impl Message {
    /// Create a new message.
    pub fn new(feature_id: u8, class_id: u8, message_id: u16, args: impl Into<Bytes>) -> Self {
        Self {
            feature_id,
            class_id,
            message_id,
            args: args.into(),
        }
    }

    /// The message identity triple.
    pub fn identity(&self) -> (u8, u8, u16) {
        (self.feature_id, self.class_id, self.message_id)
    }

    /// True if this message carries the given identity.
    pub fn matches(&self, feature_id: u8, class_id: u8, message_id: u16) -> bool {
        self.feature_id == feature_id
            && self.class_id == class_id
            && self.message_id == message_id
    }

    /// Encode header and args into the wire format.
    pub fn encode(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(MESSAGE_HEADER_SIZE + self.args.len());
        buf.put_u8(self.feature_id);
        buf.put_u8(self.class_id);
        buf.put_u16_le(self.message_id);
        buf.put_slice(&self.args);
        buf.freeze()
    }

    /// Decode header and args from a frame payload.
    pub fn decode(mut payload: Bytes) -> Result<Self> {
        if payload.len() < MESSAGE_HEADER_SIZE {
            return Err(FrameError::InvalidMessageSize {
                remaining: payload.len(),
            });
        }

        let feature_id = payload.get_u8();
        let class_id = payload.get_u8();
        let message_id = payload.get_u16_le();

        Ok(Self {
            feature_id,
            class_id,
            message_id,
            args: payload,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let message = Message::new(1, 4, 0x0102, &b"\x05payload"[..]);
        let wire = message.encode();

        assert_eq!(wire.len(), MESSAGE_HEADER_SIZE + 8);
        assert_eq!(&wire[..4], &[1, 4, 0x02, 0x01]);

        let decoded = Message::decode(wire).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn empty_args_roundtrip() {
        let message = Message::new(0, 4, 0, Bytes::new());
        let decoded = Message::decode(message.encode()).unwrap();
        assert!(decoded.args.is_empty());
        assert_eq!(decoded.identity(), (0, 4, 0));
    }

    #[test]
    fn short_payload_rejected() {
        let err = Message::decode(Bytes::from_static(&[1, 2, 3])).unwrap_err();
        assert!(matches!(err, FrameError::InvalidMessageSize { remaining: 3 }));
    }

    #[test]
    fn matches_compares_full_identity() {
        let message = Message::new(1, 0, 5, Bytes::new());
        assert!(message.matches(1, 0, 5));
        assert!(!message.matches(1, 0, 6));
        assert!(!message.matches(1, 1, 5));
        assert!(!message.matches(2, 0, 5));
    }
}
