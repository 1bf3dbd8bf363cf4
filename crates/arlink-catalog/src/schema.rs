//! Message schemas and the per-argument binary codec.
//!
//! Arguments are laid out back to back with no padding. Multi-byte integers
//! and floats are little-endian; strings are NUL-terminated UTF-8; enums go
//! on the wire as a 4-byte signed index into the schema's variant name list.

use bytes::{Buf, BufMut, Bytes, BytesMut};

use arlink_frame::channel;
use arlink_frame::Message;

use crate::error::{CatalogError, Result};
use crate::value::{ArgValue, Params};

/// Wire representation of one argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgKind {
    U8,
    U16,
    U32,
    U64,
    I8,
    I16,
    I32,
    I64,
    Float,
    Double,
    String,
    /// Signed 4-byte index into the declared variant names.
    Enum(Vec<&'static str>),
}

impl ArgKind {
    fn expected(&self) -> &'static str {
        match self {
            ArgKind::U8 => "u8",
            ArgKind::U16 => "u16",
            ArgKind::U32 => "u32",
            ArgKind::U64 => "u64",
            ArgKind::I8 => "i8",
            ArgKind::I16 => "i16",
            ArgKind::I32 => "i32",
            ArgKind::I64 => "i64",
            ArgKind::Float => "float",
            ArgKind::Double => "double",
            ArgKind::String => "string",
            ArgKind::Enum(_) => "enum",
        }
    }

    /// Fixed wire width, or `None` for strings.
    fn fixed_width(&self) -> Option<usize> {
        match self {
            ArgKind::U8 | ArgKind::I8 => Some(1),
            ArgKind::U16 | ArgKind::I16 => Some(2),
            ArgKind::U32 | ArgKind::I32 | ArgKind::Float | ArgKind::Enum(_) => Some(4),
            ArgKind::U64 | ArgKind::I64 | ArgKind::Double => Some(8),
            ArgKind::String => None,
        }
    }
}

/// A named argument slot in a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct ArgSpec {
    pub name: &'static str,
    pub kind: ArgKind,
}

impl ArgSpec {
    pub fn new(name: &'static str, kind: ArgKind) -> Self {
        Self { name, kind }
    }
}

/// How a command is carried and acknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckClass {
    /// Best-effort channel, no acknowledgement (piloting loops).
    NoAck,
    /// Acknowledged channel, retransmitted until acked.
    WithAck,
    /// Acknowledged low-latency channel (emergency).
    HighPrio,
}

impl AckClass {
    pub fn channel_id(self) -> u8 {
        match self {
            AckClass::NoAck => channel::C2D_CMD_NOACK,
            AckClass::WithAck => channel::C2D_CMD_WITHACK,
            AckClass::HighPrio => channel::C2D_CMD_HIGHPRIO,
        }
    }
}

/// Selector for the event(s) that complete a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Expectation {
    pub feature_id: u8,
    pub class_id: u8,
    pub message_id: u16,
}

impl Expectation {
    pub const fn new(feature_id: u8, class_id: u8, message_id: u16) -> Self {
        Self {
            feature_id,
            class_id,
            message_id,
        }
    }

    pub fn matches(&self, message: &Message) -> bool {
        message.feature_id == self.feature_id
            && message.class_id == self.class_id
            && message.message_id == self.message_id
    }
}

/// How an event's payload contributes to device state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventContent {
    /// A single value; each arrival overwrites the previous one.
    Plain,
    /// One element of an ordered collection, terminated by `list_flags`.
    ListItem,
    /// One element of a keyed collection; the named argument is the key.
    MapItem(&'static str),
}

/// Direction and role of a message.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKind {
    /// Controller-to-device.
    Command {
        ack: AckClass,
        /// Response selector, when the command produces one.
        expects: Option<Expectation>,
    },
    /// Device-to-controller.
    Event { content: EventContent },
}

/// One message definition: identity, naming, and argument layout.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSchema {
    pub feature_id: u8,
    pub class_id: u8,
    pub message_id: u16,
    /// Feature name, e.g. `"ardrone3"`.
    pub feature: &'static str,
    /// Message name within the feature, e.g. `"TakeOff"`.
    pub name: &'static str,
    /// Dotted resolution path, e.g. `"ardrone3.Piloting.TakeOff"`.
    pub path: String,
    /// Project-style features address state by `"classId.name"`; feature-style
    /// ones have no class tier and address state by message name alone.
    pub flat: bool,
    pub kind: MessageKind,
    pub args: Vec<ArgSpec>,
}

impl MessageSchema {
    /// A command under a `feature.Class.Name` path.
    pub fn command(
        ids: (u8, u8, u16),
        feature: &'static str,
        class: &'static str,
        name: &'static str,
        ack: AckClass,
        expects: Option<Expectation>,
        args: Vec<ArgSpec>,
    ) -> Self {
        Self {
            feature_id: ids.0,
            class_id: ids.1,
            message_id: ids.2,
            feature,
            name,
            path: format!("{feature}.{class}.{name}"),
            flat: false,
            kind: MessageKind::Command { ack, expects },
            args,
        }
    }

    /// An event under a `feature.Class.Name` path.
    pub fn event(
        ids: (u8, u8, u16),
        feature: &'static str,
        class: &'static str,
        name: &'static str,
        content: EventContent,
        args: Vec<ArgSpec>,
    ) -> Self {
        Self {
            feature_id: ids.0,
            class_id: ids.1,
            message_id: ids.2,
            feature,
            name,
            path: format!("{feature}.{class}.{name}"),
            flat: false,
            kind: MessageKind::Event { content },
            args,
        }
    }

    /// A command in a feature-style feature (no class tier in the path).
    pub fn flat_command(
        ids: (u8, u8, u16),
        feature: &'static str,
        name: &'static str,
        ack: AckClass,
        expects: Option<Expectation>,
        args: Vec<ArgSpec>,
    ) -> Self {
        Self {
            feature_id: ids.0,
            class_id: ids.1,
            message_id: ids.2,
            feature,
            name,
            path: format!("{feature}.{name}"),
            flat: true,
            kind: MessageKind::Command { ack, expects },
            args,
        }
    }

    /// An event in a feature-style feature.
    pub fn flat_event(
        ids: (u8, u8, u16),
        feature: &'static str,
        name: &'static str,
        content: EventContent,
        args: Vec<ArgSpec>,
    ) -> Self {
        Self {
            feature_id: ids.0,
            class_id: ids.1,
            message_id: ids.2,
            feature,
            name,
            path: format!("{feature}.{name}"),
            flat: true,
            kind: MessageKind::Event { content },
            args,
        }
    }

    pub fn identity(&self) -> (u8, u8, u16) {
        (self.feature_id, self.class_id, self.message_id)
    }

    pub fn is_command(&self) -> bool {
        matches!(self.kind, MessageKind::Command { .. })
    }

    /// The channel this message is sent on (commands only).
    pub fn channel_id(&self) -> Option<u8> {
        match &self.kind {
            MessageKind::Command { ack, .. } => Some(ack.channel_id()),
            MessageKind::Event { .. } => None,
        }
    }

    /// The response selector, for commands that carry one.
    pub fn expects(&self) -> Option<Expectation> {
        match &self.kind {
            MessageKind::Command { expects, .. } => *expects,
            MessageKind::Event { .. } => None,
        }
    }

    /// Encode `params` into this schema's argument layout.
    ///
    /// Every declared argument must be present with a matching type; extras
    /// in `params` are ignored.
    pub fn encode(&self, params: &Params) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        for spec in &self.args {
            let value = params
                .get(spec.name)
                .ok_or_else(|| CatalogError::MissingArgument(spec.name.to_string()))?;
            encode_arg(spec, value, &mut buf)?;
        }
        Ok(buf.freeze())
    }

    /// Decode an argument buffer against this schema's layout.
    ///
    /// Trailing bytes beyond the declared arguments are ignored; devices are
    /// allowed to append fields older definitions do not know about.
    pub fn decode(&self, mut args: &[u8]) -> Result<Params> {
        let mut params = Params::new();
        for spec in &self.args {
            let value = decode_arg(spec, &mut args)?;
            params.set(spec.name, value);
        }
        Ok(params)
    }

    /// Encode a full wire message from `params`.
    pub fn message(&self, params: &Params) -> Result<Message> {
        Ok(Message::new(
            self.feature_id,
            self.class_id,
            self.message_id,
            self.encode(params)?,
        ))
    }
}

fn type_error(spec: &ArgSpec) -> CatalogError {
    CatalogError::ArgumentType {
        arg: spec.name.to_string(),
        expected: spec.kind.expected(),
    }
}

fn encode_arg(spec: &ArgSpec, value: &ArgValue, buf: &mut BytesMut) -> Result<()> {
    match (&spec.kind, value) {
        (ArgKind::U8, ArgValue::U8(v)) => buf.put_u8(*v),
        (ArgKind::U16, ArgValue::U16(v)) => buf.put_u16_le(*v),
        (ArgKind::U32, ArgValue::U32(v)) => buf.put_u32_le(*v),
        (ArgKind::U64, ArgValue::U64(v)) => buf.put_u64_le(*v),
        (ArgKind::I8, ArgValue::I8(v)) => buf.put_i8(*v),
        (ArgKind::I16, ArgValue::I16(v)) => buf.put_i16_le(*v),
        (ArgKind::I32, ArgValue::I32(v)) => buf.put_i32_le(*v),
        (ArgKind::I64, ArgValue::I64(v)) => buf.put_i64_le(*v),
        (ArgKind::Float, ArgValue::Float(v)) => buf.put_f32_le(*v),
        (ArgKind::Double, ArgValue::Double(v)) => buf.put_f64_le(*v),
        (ArgKind::String, ArgValue::Str(v)) => {
            if v.as_bytes().contains(&0) {
                return Err(CatalogError::EmbeddedNul(spec.name.to_string()));
            }
            buf.put_slice(v.as_bytes());
            buf.put_u8(0);
        }
        (ArgKind::Enum(names), ArgValue::Enum(name)) => {
            let index = names.iter().position(|n| n == name).ok_or_else(|| {
                CatalogError::UnknownEnumVariant {
                    arg: spec.name.to_string(),
                    variant: name.clone(),
                }
            })?;
            buf.put_i32_le(index as i32);
        }
        // Raw index form, validated against the declared variants.
        (ArgKind::Enum(names), ArgValue::I32(index)) => {
            if usize::try_from(*index).map_or(true, |i| i >= names.len()) {
                return Err(CatalogError::UnknownEnumValue {
                    arg: spec.name.to_string(),
                    value: *index,
                });
            }
            buf.put_i32_le(*index);
        }
        _ => return Err(type_error(spec)),
    }
    Ok(())
}

fn decode_arg(spec: &ArgSpec, buf: &mut &[u8]) -> Result<ArgValue> {
    if let Some(width) = spec.kind.fixed_width() {
        if buf.len() < width {
            return Err(CatalogError::ShortBuffer {
                arg: spec.name.to_string(),
                need: width,
                have: buf.len(),
            });
        }
    }
    let value = match &spec.kind {
        ArgKind::U8 => ArgValue::U8(buf.get_u8()),
        ArgKind::U16 => ArgValue::U16(buf.get_u16_le()),
        ArgKind::U32 => ArgValue::U32(buf.get_u32_le()),
        ArgKind::U64 => ArgValue::U64(buf.get_u64_le()),
        ArgKind::I8 => ArgValue::I8(buf.get_i8()),
        ArgKind::I16 => ArgValue::I16(buf.get_i16_le()),
        ArgKind::I32 => ArgValue::I32(buf.get_i32_le()),
        ArgKind::I64 => ArgValue::I64(buf.get_i64_le()),
        ArgKind::Float => ArgValue::Float(buf.get_f32_le()),
        ArgKind::Double => ArgValue::Double(buf.get_f64_le()),
        ArgKind::String => {
            let nul = buf
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| CatalogError::UnterminatedString(spec.name.to_string()))?;
            let text = std::str::from_utf8(&buf[..nul])
                .map_err(|_| CatalogError::InvalidUtf8(spec.name.to_string()))?
                .to_string();
            buf.advance(nul + 1);
            ArgValue::Str(text)
        }
        ArgKind::Enum(names) => {
            let index = buf.get_i32_le();
            let name = usize::try_from(index)
                .ok()
                .and_then(|i| names.get(i))
                .ok_or(CatalogError::UnknownEnumValue {
                    arg: spec.name.to_string(),
                    value: index,
                })?;
            ArgValue::Enum(name.to_string())
        }
    };
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema_with(args: Vec<ArgSpec>) -> MessageSchema {
        MessageSchema::command(
            (1, 0, 7),
            "ardrone3",
            "Piloting",
            "moveBy",
            AckClass::WithAck,
            None,
            args,
        )
    }

    #[test]
    fn fixed_width_round_trip() {
        let schema = schema_with(vec![
            ArgSpec::new("a", ArgKind::U8),
            ArgSpec::new("b", ArgKind::U16),
            ArgSpec::new("c", ArgKind::U32),
            ArgSpec::new("d", ArgKind::I8),
            ArgSpec::new("e", ArgKind::I16),
            ArgSpec::new("f", ArgKind::I32),
            ArgSpec::new("g", ArgKind::Float),
            ArgSpec::new("h", ArgKind::Double),
        ]);
        let params = Params::new()
            .with("a", 0xffu8)
            .with("b", 0xbeefu16)
            .with("c", 0xdead_beefu32)
            .with("d", -5i8)
            .with("e", -300i16)
            .with("f", -70_000i32)
            .with("g", 1.5f32)
            .with("h", -2.25f64);

        let encoded = schema.encode(&params).unwrap();
        assert_eq!(encoded.len(), 1 + 2 + 4 + 1 + 2 + 4 + 4 + 8);
        assert_eq!(schema.decode(&encoded).unwrap(), params);
    }

    #[test]
    fn sixty_four_bit_values_survive_the_trip() {
        let schema = schema_with(vec![
            ArgSpec::new("big", ArgKind::U64),
            ArgSpec::new("signed", ArgKind::I64),
        ]);
        let params = Params::new()
            .with("big", u64::MAX - 1)
            .with("signed", i64::MIN + 3);

        let encoded = schema.encode(&params).unwrap();
        assert_eq!(encoded.len(), 16);
        assert_eq!(schema.decode(&encoded).unwrap(), params);
    }

    #[test]
    fn negative_byte_decodes_signed() {
        let schema = schema_with(vec![ArgSpec::new("tilt", ArgKind::I8)]);
        let params = schema.decode(&[0xfe]).unwrap();
        assert_eq!(params.get("tilt"), Some(&ArgValue::I8(-2)));
    }

    #[test]
    fn string_is_nul_terminated() {
        let schema = schema_with(vec![
            ArgSpec::new("name", ArgKind::String),
            ArgSpec::new("tail", ArgKind::U8),
        ]);
        let params = Params::new().with("name", "Anafi").with("tail", 9u8);

        let encoded = schema.encode(&params).unwrap();
        assert_eq!(&encoded[..], b"Anafi\x00\x09");
        assert_eq!(encoded[5], 0);
        assert_eq!(schema.decode(&encoded).unwrap(), params);
    }

    #[test]
    fn empty_string_is_a_lone_nul() {
        let schema = schema_with(vec![ArgSpec::new("name", ArgKind::String)]);
        let encoded = schema
            .encode(&Params::new().with("name", ""))
            .unwrap();
        assert_eq!(&encoded[..], [0]);
    }

    #[test]
    fn embedded_nul_is_rejected_on_encode() {
        let schema = schema_with(vec![ArgSpec::new("name", ArgKind::String)]);
        let err = schema
            .encode(&Params::new().with("name", "a\0b"))
            .unwrap_err();
        assert!(matches!(err, CatalogError::EmbeddedNul(_)));
    }

    #[test]
    fn unterminated_string_is_rejected_on_decode() {
        let schema = schema_with(vec![ArgSpec::new("name", ArgKind::String)]);
        let err = schema.decode(b"abc").unwrap_err();
        assert!(matches!(err, CatalogError::UnterminatedString(_)));
    }

    #[test]
    fn enum_goes_on_the_wire_as_index() {
        let schema = schema_with(vec![ArgSpec::new(
            "state",
            ArgKind::Enum(vec!["landed", "takingoff", "hovering"]),
        )]);
        let encoded = schema
            .encode(&Params::new().with("state", ArgValue::Enum("hovering".into())))
            .unwrap();
        assert_eq!(&encoded[..], [2, 0, 0, 0]);

        let params = schema.decode(&encoded).unwrap();
        assert_eq!(params.get("state"), Some(&ArgValue::Enum("hovering".into())));
    }

    #[test]
    fn enum_accepts_a_raw_index() {
        let schema = schema_with(vec![ArgSpec::new(
            "state",
            ArgKind::Enum(vec!["landed", "takingoff"]),
        )]);
        let encoded = schema
            .encode(&Params::new().with("state", 1i32))
            .unwrap();
        assert_eq!(&encoded[..], [1, 0, 0, 0]);

        let err = schema
            .encode(&Params::new().with("state", 5i32))
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownEnumValue { value: 5, .. }));
    }

    #[test]
    fn unknown_enum_name_and_index_error() {
        let schema = schema_with(vec![ArgSpec::new(
            "state",
            ArgKind::Enum(vec!["landed", "takingoff"]),
        )]);
        let err = schema
            .encode(&Params::new().with("state", ArgValue::Enum("flying".into())))
            .unwrap_err();
        assert!(matches!(err, CatalogError::UnknownEnumVariant { .. }));

        let err = schema.decode(&[9, 0, 0, 0]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownEnumValue { value: 9, .. }
        ));

        let err = schema.decode(&[0xff, 0xff, 0xff, 0xff]).unwrap_err();
        assert!(matches!(
            err,
            CatalogError::UnknownEnumValue { value: -1, .. }
        ));
    }

    #[test]
    fn missing_and_mistyped_arguments_error() {
        let schema = schema_with(vec![ArgSpec::new("roll", ArgKind::I8)]);

        let err = schema.encode(&Params::new()).unwrap_err();
        assert!(matches!(err, CatalogError::MissingArgument(_)));

        let err = schema
            .encode(&Params::new().with("roll", 1u32))
            .unwrap_err();
        assert!(matches!(
            err,
            CatalogError::ArgumentType {
                expected: "i8",
                ..
            }
        ));
    }

    #[test]
    fn short_buffer_names_the_argument() {
        let schema = schema_with(vec![
            ArgSpec::new("a", ArgKind::U8),
            ArgSpec::new("b", ArgKind::U32),
        ]);
        let err = schema.decode(&[1, 2]).unwrap_err();
        match err {
            CatalogError::ShortBuffer { arg, need, have } => {
                assert_eq!(arg, "b");
                assert_eq!(need, 4);
                assert_eq!(have, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn trailing_bytes_are_ignored() {
        let schema = schema_with(vec![ArgSpec::new("a", ArgKind::U8)]);
        let params = schema.decode(&[7, 1, 2, 3]).unwrap();
        assert_eq!(params.get("a"), Some(&ArgValue::U8(7)));
    }

    #[test]
    fn ack_class_maps_to_channel() {
        assert_eq!(AckClass::NoAck.channel_id(), channel::C2D_CMD_NOACK);
        assert_eq!(AckClass::WithAck.channel_id(), channel::C2D_CMD_WITHACK);
        assert_eq!(AckClass::HighPrio.channel_id(), channel::C2D_CMD_HIGHPRIO);
    }

    #[test]
    fn expectation_matches_identity_only() {
        let expect = Expectation::new(0, 5, 0);
        assert!(expect.matches(&Message::new(0, 5, 0, Bytes::new())));
        assert!(!expect.matches(&Message::new(0, 5, 1, Bytes::new())));
        assert!(!expect.matches(&Message::new(1, 5, 0, Bytes::new())));
    }
}
