//! Frame-level engine over a datagram link.
//!
//! Owns the socket and the per-channel outbound sequence counters. Splits
//! incoming datagrams into frames, answers device pings, and acknowledges
//! anything arriving on the acked device-to-controller channel before the
//! payload is handed upward. Channel-level plumbing stops here; command
//! semantics live in the transaction queue.

use bytes::{Bytes, BytesMut};
use tracing::{trace, warn};

use arlink_frame::channel::{
    ack_channel, channel_name, D2C_CMD_NOACK, D2C_CMD_WITHACK, PING, PONG,
};
use arlink_frame::{decode_frame, encode_frame, Frame, FrameType, Message, SequenceCounters};
use arlink_transport::DatagramLink;

use crate::error::Result;

/// One dispatched unit from a datagram.
#[derive(Debug, Clone)]
pub enum Inbound {
    /// Every successfully decoded frame, before channel dispatch.
    Frame(Frame),
    /// A command message from the best-effort channel.
    Command(Message),
    /// A command message from the acked channel; the ack has been sent.
    AckedCommand(Message),
}

#[derive(Debug)]
pub struct ProtocolEngine<L: DatagramLink> {
    link: L,
    seq: SequenceCounters,
}

impl<L: DatagramLink> ProtocolEngine<L> {
    pub fn new(link: L) -> Self {
        Self {
            link,
            seq: SequenceCounters::new(),
        }
    }

    pub fn link(&self) -> &L {
        &self.link
    }

    pub fn link_mut(&mut self) -> &mut L {
        &mut self.link
    }

    /// Send a frame on `channel_id`, consuming its next sequence number.
    pub fn send_frame(
        &mut self,
        frame_type: FrameType,
        channel_id: u8,
        payload: Bytes,
    ) -> Result<()> {
        let sequence = self.seq.next(channel_id);
        self.send_raw(Frame::new(frame_type, channel_id, sequence, payload))
    }

    fn send_raw(&mut self, frame: Frame) -> Result<()> {
        trace!(
            channel = channel_name(frame.channel_id),
            sequence = frame.sequence,
            len = frame.payload.len(),
            "send frame"
        );
        let mut buf = BytesMut::with_capacity(frame.wire_size());
        encode_frame(&frame, &mut buf);
        self.link.send(&buf)?;
        Ok(())
    }

    /// Split one datagram into frames and dispatch each by channel.
    ///
    /// Ping echoes and acks for the acked channel go out before this
    /// returns. A frame whose message header is malformed is reported as
    /// `Inbound::Frame` only.
    pub fn process_datagram(&mut self, datagram: &[u8]) -> Result<Vec<Inbound>> {
        let mut buf = BytesMut::from(datagram);
        let mut out = Vec::new();
        while let Some(frame) = decode_frame(&mut buf)? {
            trace!(
                channel = channel_name(frame.channel_id),
                sequence = frame.sequence,
                len = frame.payload.len(),
                "recv frame"
            );
            out.push(Inbound::Frame(frame.clone()));
            self.dispatch(frame, &mut out)?;
        }
        Ok(out)
    }

    fn dispatch(&mut self, frame: Frame, out: &mut Vec<Inbound>) -> Result<()> {
        match frame.channel_id {
            // Liveness probe: echo the payload back with the same sequence.
            PING => {
                self.send_raw(Frame::new(
                    FrameType::Data,
                    PONG,
                    frame.sequence,
                    frame.payload,
                ))?;
            }
            PONG => {}
            D2C_CMD_WITHACK => {
                self.acknowledge(&frame)?;
                match Message::decode(frame.payload.clone()) {
                    Ok(message) => out.push(Inbound::AckedCommand(message)),
                    Err(err) => warn!(%err, "dropping malformed acked command"),
                }
            }
            D2C_CMD_NOACK => match Message::decode(frame.payload.clone()) {
                Ok(message) => out.push(Inbound::Command(message)),
                Err(err) => warn!(%err, "dropping malformed command"),
            },
            // Acks for our own acked sends; nothing waits on them here.
            id if id >= arlink_frame::channel::ACK_OFFSET => {
                trace!(channel = id, "outbound ack received");
            }
            id => {
                warn!(channel = id, "dropping frame on unhandled channel");
            }
        }
        Ok(())
    }

    /// Ack a frame: one byte carrying the origin sequence, sent on the
    /// origin channel's ack counterpart with that channel's own counter.
    fn acknowledge(&mut self, frame: &Frame) -> Result<()> {
        self.send_frame(
            FrameType::Ack,
            ack_channel(frame.channel_id),
            Bytes::copy_from_slice(&[frame.sequence]),
        )
    }
}
