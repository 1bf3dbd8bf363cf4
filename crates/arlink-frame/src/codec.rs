use bytes::{Buf, BufMut, Bytes, BytesMut};

use crate::error::{FrameError, Result};

/// Frame header: type (1) + channel (1) + sequence (1) + length (4) = 7 bytes.
pub const FRAME_HEADER_SIZE: usize = 7;

/// Transport frame type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FrameType {
    /// Acknowledgement of a with-ack frame.
    Ack = 0x01,
    /// Regular data frame.
    Data = 0x02,
    /// Data that tolerates loss (piloting updates, stream payloads).
    LowLatencyData = 0x03,
    /// Data that must be acknowledged.
    AckData = 0x04,
}

impl TryFrom<u8> for FrameType {
    type Error = FrameError;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0x01 => Ok(FrameType::Ack),
            0x02 => Ok(FrameType::Data),
            0x03 => Ok(FrameType::LowLatencyData),
            0x04 => Ok(FrameType::AckData),
            other => Err(FrameError::InvalidFrameType(other)),
        }
    }
}

/// A transport frame with channel routing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// Frame disposition on the wire.
    pub frame_type: FrameType,
    /// The channel this frame belongs to.
    pub channel_id: u8,
    /// Per-channel sequence number.
    pub sequence: u8,
    /// The frame payload.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(frame_type: FrameType, channel_id: u8, sequence: u8, payload: impl Into<Bytes>) -> Self {
        Self {
            frame_type,
            channel_id,
            sequence,
            payload: payload.into(),
        }
    }

    /// The total wire size of this frame (header + payload).
    pub fn wire_size(&self) -> usize {
        FRAME_HEADER_SIZE + self.payload.len()
    }
}

/// Encode a frame into the wire format.
///
/// Wire format:
/// ```text
/// ┌───────────┬─────────────┬──────────┬──────────────┬───────────────────┐
/// │ Type (1B) │ Channel (1B)│ Seq (1B) │ Length (4B LE)│ Payload           │
/// │           │             │          │ = 7 + len     │ (Length-7 bytes)  │
/// └───────────┴─────────────┴──────────┴──────────────┴───────────────────┘
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(frame.wire_size());
    dst.put_u8(frame.frame_type as u8);
    dst.put_u8(frame.channel_id);
    dst.put_u8(frame.sequence);
    dst.put_u32_le(frame.wire_size() as u32);
    dst.put_slice(&frame.payload);
}

/// Decode the next frame from a datagram buffer.
///
/// Returns `Ok(None)` when the buffer is exhausted. Several frames may be
/// concatenated in one datagram; call in a loop until `None`. On success,
/// consumes the frame bytes from the buffer.
///
/// The declared length field is checked against the actual remaining bytes;
/// a length shorter than the header or longer than the buffer is rejected
/// rather than trusted.
pub fn decode_frame(src: &mut BytesMut) -> Result<Option<Frame>> {
    if src.is_empty() {
        return Ok(None);
    }
    if src.len() < FRAME_HEADER_SIZE {
        return Err(FrameError::InvalidFrameSize {
            remaining: src.len(),
        });
    }

    let frame_type = FrameType::try_from(src[0])?;
    let channel_id = src[1];
    let sequence = src[2];
    let length = u32::from_le_bytes(src[3..7].try_into().expect("4-byte slice"));

    if (length as usize) < FRAME_HEADER_SIZE || length as usize > src.len() {
        return Err(FrameError::LengthOutOfBounds {
            length,
            remaining: src.len(),
        });
    }

    src.advance(FRAME_HEADER_SIZE);
    let payload = src.split_to(length as usize - FRAME_HEADER_SIZE).freeze();

    Ok(Some(Frame {
        frame_type,
        channel_id,
        sequence,
        payload,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channel;

    #[test]
    fn encode_decode_roundtrip() {
        let frame = Frame::new(FrameType::Data, channel::C2D_CMD_WITHACK, 9, &b"args"[..]);
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf);

        assert_eq!(buf.len(), FRAME_HEADER_SIZE + 4);
        assert_eq!(u32::from_le_bytes(buf[3..7].try_into().unwrap()), 11);

        let decoded = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(decoded, frame);
        assert!(buf.is_empty());
    }

    #[test]
    fn empty_buffer_yields_none() {
        let mut buf = BytesMut::new();
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn short_header_rejected() {
        let mut buf = BytesMut::from(&[0x02, 0x0b, 0x00][..]);
        let err = decode_frame(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::InvalidFrameSize { remaining: 3 }));
    }

    #[test]
    fn declared_length_overrunning_buffer_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x02);
        buf.put_u8(0x0b);
        buf.put_u8(0x00);
        buf.put_u32_le(64); // claims 64 bytes, only header present
        let err = decode_frame(&mut buf).unwrap_err();
        assert!(matches!(
            err,
            FrameError::LengthOutOfBounds {
                length: 64,
                remaining: 7
            }
        ));
    }

    #[test]
    fn declared_length_below_header_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x02);
        buf.put_u8(0x0b);
        buf.put_u8(0x00);
        buf.put_u32_le(3);
        buf.put_slice(b"xxxx");
        let err = decode_frame(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::LengthOutOfBounds { length: 3, .. }));
    }

    #[test]
    fn unknown_frame_type_rejected() {
        let mut buf = BytesMut::new();
        buf.put_u8(0x07);
        buf.put_u8(0x0b);
        buf.put_u8(0x00);
        buf.put_u32_le(7);
        let err = decode_frame(&mut buf).unwrap_err();
        assert!(matches!(err, FrameError::InvalidFrameType(0x07)));
    }

    #[test]
    fn concatenated_frames_decode_in_order() {
        let first = Frame::new(FrameType::Data, channel::D2C_CMD_NOACK, 1, &b"one"[..]);
        let second = Frame::new(FrameType::Ack, channel::ack_channel(11), 2, &b"\x01"[..]);

        let mut buf = BytesMut::new();
        encode_frame(&first, &mut buf);
        encode_frame(&second, &mut buf);

        assert_eq!(decode_frame(&mut buf).unwrap().unwrap(), first);
        assert_eq!(decode_frame(&mut buf).unwrap().unwrap(), second);
        assert!(decode_frame(&mut buf).unwrap().is_none());
    }

    #[test]
    fn empty_payload_roundtrip() {
        let frame = Frame::new(FrameType::Data, channel::PING, 0, Bytes::new());
        let mut buf = BytesMut::new();
        encode_frame(&frame, &mut buf);

        let decoded = decode_frame(&mut buf).unwrap().unwrap();
        assert_eq!(decoded.wire_size(), FRAME_HEADER_SIZE);
        assert!(decoded.payload.is_empty());
    }
}
