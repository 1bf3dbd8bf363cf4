//! Reserved channel ids.
//!
//! Each channel id multiplexes an independent sequence-number space inside
//! the single UDP link. Ids below 128 carry traffic; adding
//! [`ACK_OFFSET`] to an id yields the channel its acknowledgements travel on.

/// Device keep-alive request; answered with [`PONG`].
pub const PING: u8 = 0x00;

/// Keep-alive reply, echoing the ping sequence and payload.
pub const PONG: u8 = 0x01;

/// Controller-to-device commands that need no acknowledgement.
pub const C2D_CMD_NOACK: u8 = 0x0a;

/// Controller-to-device commands the device must acknowledge.
pub const C2D_CMD_WITHACK: u8 = 0x0b;

/// Controller-to-device high-priority commands (emergency path).
pub const C2D_CMD_HIGHPRIO: u8 = 0x0c;

/// Device-to-controller events we must acknowledge.
pub const D2C_CMD_WITHACK: u8 = 126;

/// Device-to-controller events needing no acknowledgement.
pub const D2C_CMD_NOACK: u8 = 127;

/// Offset mapping a channel to its acknowledgement channel.
pub const ACK_OFFSET: u8 = 128;

/// The channel acknowledgements for frames on `id` travel on.
pub fn ack_channel(id: u8) -> u8 {
    id.wrapping_add(ACK_OFFSET)
}

/// Returns a human-readable name for a channel id.
pub fn channel_name(id: u8) -> &'static str {
    match id {
        PING => "PING",
        PONG => "PONG",
        C2D_CMD_NOACK => "C2D_CMD_NOACK",
        C2D_CMD_WITHACK => "C2D_CMD_WITHACK",
        C2D_CMD_HIGHPRIO => "C2D_CMD_HIGHPRIO",
        D2C_CMD_WITHACK => "D2C_CMD_WITHACK",
        D2C_CMD_NOACK => "D2C_CMD_NOACK",
        id if id >= ACK_OFFSET => "ACK",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ack_channel_adds_offset() {
        assert_eq!(ack_channel(D2C_CMD_WITHACK), 254);
        assert_eq!(ack_channel(C2D_CMD_WITHACK), 139);
    }

    #[test]
    fn names_cover_reserved_ids() {
        assert_eq!(channel_name(PING), "PING");
        assert_eq!(channel_name(PONG), "PONG");
        assert_eq!(channel_name(D2C_CMD_NOACK), "D2C_CMD_NOACK");
        assert_eq!(channel_name(200), "ACK");
        assert_eq!(channel_name(42), "UNKNOWN");
    }
}
