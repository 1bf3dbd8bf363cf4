use std::sync::Arc;

use arlink_catalog::{MessageSchema, Params};
use arlink_frame::Message;

/// A received wire message paired with its schema and decoded arguments.
#[derive(Debug, Clone)]
pub struct DecodedMessage {
    pub message: Message,
    pub schema: Arc<MessageSchema>,
    pub params: Params,
}

impl DecodedMessage {
    pub fn new(message: Message, schema: Arc<MessageSchema>, params: Params) -> Self {
        Self {
            message,
            schema,
            params,
        }
    }

    /// Dotted path of the underlying schema.
    pub fn path(&self) -> &str {
        &self.schema.path
    }
}
