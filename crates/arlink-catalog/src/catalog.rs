use std::collections::HashMap;
use std::sync::Arc;

use arlink_frame::Message;

use crate::error::{CatalogError, Result};
use crate::schema::MessageSchema;

/// Registry of message schemas, resolvable by identity triple or dotted path.
#[derive(Debug, Default, Clone)]
pub struct MessageCatalog {
    schemas: Vec<Arc<MessageSchema>>,
    by_identity: HashMap<(u8, u8, u16), usize>,
    by_path: HashMap<String, usize>,
}

impl MessageCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema. Both the identity triple and the path must be new.
    pub fn insert(&mut self, schema: MessageSchema) -> Result<()> {
        if self.by_identity.contains_key(&schema.identity()) {
            return Err(CatalogError::DuplicateMessage(format!(
                "{}.{}.{}",
                schema.feature_id, schema.class_id, schema.message_id
            )));
        }
        if self.by_path.contains_key(&schema.path) {
            return Err(CatalogError::DuplicateMessage(schema.path.clone()));
        }
        let index = self.schemas.len();
        self.by_identity.insert(schema.identity(), index);
        self.by_path.insert(schema.path.clone(), index);
        self.schemas.push(Arc::new(schema));
        Ok(())
    }

    pub fn resolve(&self, identity: (u8, u8, u16)) -> Option<Arc<MessageSchema>> {
        self.by_identity
            .get(&identity)
            .map(|&i| Arc::clone(&self.schemas[i]))
    }

    /// Look up by dotted path, e.g. `"ardrone3.Piloting.TakeOff"`.
    pub fn resolve_path(&self, path: &str) -> Result<Arc<MessageSchema>> {
        self.by_path
            .get(path)
            .map(|&i| Arc::clone(&self.schemas[i]))
            .ok_or_else(|| CatalogError::UnknownMessage(path.to_string()))
    }

    /// Schema for a received wire message.
    pub fn resolve_message(&self, message: &Message) -> Option<Arc<MessageSchema>> {
        self.resolve((message.feature_id, message.class_id, message.message_id))
    }

    /// Whether any message for `feature_id` is registered.
    pub fn has_feature_id(&self, feature_id: u8) -> bool {
        self.schemas.iter().any(|s| s.feature_id == feature_id)
    }

    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<MessageSchema>> {
        self.schemas.iter()
    }
}
