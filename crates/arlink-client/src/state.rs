//! Last-known device property store.
//!
//! Every decoded inbound message lands here. Plain events overwrite their
//! property and notify on each occurrence; list/map fragment streams are
//! reassembled and notify exactly once, when the terminator fragment
//! arrives, with the complete collection.
//!
//! Property naming follows the catalog's two addressing styles: classed
//! messages store under `Class.Name` with a trailing `Changed` stripped
//! (`CommonState.BatteryStateChanged` -> `CommonState.BatteryState`),
//! class-less feature messages store under the bare message name.

use std::collections::{BTreeMap, HashMap};

use tracing::trace;

use arlink_catalog::{EventContent, MessageKind, MessageSchema, Params};

use crate::decoded::DecodedMessage;
use crate::queue::{LIST_FLAG_FIRST, LIST_FLAG_LAST};

/// A cached property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Scalar(Params),
    List(Vec<Params>),
    Map(BTreeMap<String, Params>),
}

/// Snapshot notification for one property update.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyChange {
    pub feature: &'static str,
    pub property: String,
    pub value: PropertyValue,
}

#[derive(Debug, Default)]
pub struct StateStore {
    buffers: HashMap<&'static str, HashMap<String, PropertyValue>>,
}

fn property_path(schema: &MessageSchema) -> String {
    if schema.flat {
        return schema.name.to_string();
    }
    // "feature.Class.Name" -> "Class.Name", minus any Changed suffix.
    let tail = schema
        .path
        .strip_prefix(schema.feature)
        .and_then(|p| p.strip_prefix('.'))
        .unwrap_or(&schema.path);
    tail.strip_suffix("Changed").unwrap_or(tail).to_string()
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one decoded message; returns a notification when a property
    /// value became visible (every time for plain values, once per
    /// completed stream for list/map values).
    pub fn handle(&mut self, decoded: &DecodedMessage) -> Option<PropertyChange> {
        let schema = &decoded.schema;
        let property = property_path(schema);
        let content = match &schema.kind {
            MessageKind::Event { content } => content.clone(),
            // Inbound traffic on command identities still lands as a value.
            MessageKind::Command { .. } => EventContent::Plain,
        };
        let feature = self.buffers.entry(schema.feature).or_default();

        match content {
            EventContent::Plain => {
                let value = PropertyValue::Scalar(decoded.params.clone());
                trace!(feature = schema.feature, property, "property updated");
                feature.insert(property.clone(), value.clone());
                Some(PropertyChange {
                    feature: schema.feature,
                    property,
                    value,
                })
            }
            EventContent::ListItem => {
                let flags = decoded.params.list_flags().unwrap_or(0);
                let slot = feature
                    .entry(property.clone())
                    .or_insert_with(|| PropertyValue::List(Vec::new()));
                if flags & LIST_FLAG_FIRST != 0 || !matches!(slot, PropertyValue::List(_)) {
                    *slot = PropertyValue::List(Vec::new());
                }
                let PropertyValue::List(items) = &mut *slot else {
                    unreachable!("slot reset to a list above");
                };
                items.push(decoded.params.clone());
                (flags & LIST_FLAG_LAST != 0).then(|| PropertyChange {
                    feature: schema.feature,
                    property,
                    value: slot.clone(),
                })
            }
            EventContent::MapItem(key_field) => {
                let flags = decoded.params.list_flags().unwrap_or(0);
                let slot = feature
                    .entry(property.clone())
                    .or_insert_with(|| PropertyValue::Map(BTreeMap::new()));
                if flags & LIST_FLAG_FIRST != 0 || !matches!(slot, PropertyValue::Map(_)) {
                    *slot = PropertyValue::Map(BTreeMap::new());
                }
                let PropertyValue::Map(entries) = &mut *slot else {
                    unreachable!("slot reset to a map above");
                };
                let key = decoded
                    .params
                    .get(key_field)
                    .map(|v| v.to_string())
                    .unwrap_or_default();
                entries.insert(key, decoded.params.clone());
                (flags & LIST_FLAG_LAST != 0).then(|| PropertyChange {
                    feature: schema.feature,
                    property,
                    value: slot.clone(),
                })
            }
        }
    }

    /// Look up `"feature.property"`, e.g. `"common.CommonState.BatteryState"`.
    pub fn buffer(&self, path: &str) -> Option<&PropertyValue> {
        let (feature, property) = path.split_once('.')?;
        self.buffers.get(feature)?.get(property)
    }

    /// True once any property has been observed for `feature`.
    pub fn observed(&self, feature: &str) -> bool {
        self.buffers
            .get(feature)
            .is_some_and(|props| !props.is_empty())
    }
}
