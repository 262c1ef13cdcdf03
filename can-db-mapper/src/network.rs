//! Network assembly
//!
//! Runs the message extractor over every entry of the mapping and keeps the
//! messages that resolved at least one signal.

use crate::diagnostics::Diagnostics;
use crate::mapping::MappingSpec;
use crate::message::{extract_message, Message};
use crate::signals::CanoeDatabase;
use crate::types::{format_message_id, MessageId, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// All exported messages on a single bus
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Network {
    /// Exported messages by CAN ID; never contains a message without signals
    messages: BTreeMap<MessageId, Message>,
}

impl Network {
    /// An empty network (`{"messages": {}}`)
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the network for a mapping against a parsed database
    pub fn assemble(
        database: &CanoeDatabase,
        mapping: &MappingSpec,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let mut network = Self::new();

        for (id, mapped) in mapping.resolve(diagnostics) {
            let Some(message) = extract_message(database, id, mapped, diagnostics)? else {
                continue;
            };
            // Colliding keys arrive in key order; a later non-empty entry replaces
            network.insert(message);
        }

        log::info!(
            "Assembled network: {} of {} mapped messages exported",
            network.len(),
            mapping.messages.len()
        );
        Ok(network)
    }

    /// Add a message; messages without signals are dropped
    ///
    /// Returns whether the message was kept.
    pub fn insert(&mut self, message: Message) -> bool {
        if message.signals.is_empty() {
            log::debug!(
                "Dropping message {} ({}): no signals resolved",
                format_message_id(message.id),
                message.name
            );
            return false;
        }
        self.messages.insert(message.id, message);
        true
    }

    /// Get an exported message by CAN ID
    pub fn message(&self, id: MessageId) -> Option<&Message> {
        self.messages.get(&id)
    }

    /// Exported messages, ascending by CAN ID
    pub fn messages(&self) -> impl Iterator<Item = &Message> {
        self.messages.values()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Serialize to a `serde_json::Value`
    pub fn to_dict(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

/// Serializes as `{"messages": {"0x<id>": <message>, ...}}`, ascending by ID
impl Serialize for Network {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("messages", &MessageDict(&self.messages))?;
        map.end()
    }
}

struct MessageDict<'a>(&'a BTreeMap<MessageId, Message>);

impl Serialize for MessageDict<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for message in self.0.values() {
            map.serialize_entry(&message.key(), message)?;
        }
        map.end()
    }
}
