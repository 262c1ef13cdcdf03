//! Mapping file loading
//!
//! The mapping file selects which messages and signals to export:
//!
//! ```json
//! {"messages": {"0x100": {"signals": {"engine_speed": "ENGINE_RPM"}}}}
//! ```
//!
//! Keys under `messages` are CAN IDs in any base; each `signals` entry maps
//! an application-facing generic name to the native database signal name.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::types::{parse_message_id, MapperError, MessageId, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level mapping document
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MappingSpec {
    /// Message ID (as written in the file) -> requested signals
    #[serde(default)]
    pub messages: BTreeMap<String, MessageMapping>,
}

/// Signals requested for one message
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MessageMapping {
    /// Generic name -> native signal name
    #[serde(default)]
    pub signals: BTreeMap<String, String>,
}

impl MessageMapping {
    /// Convenience constructor from (generic, native) pairs
    pub fn from_pairs<G, N>(pairs: impl IntoIterator<Item = (G, N)>) -> Self
    where
        G: Into<String>,
        N: Into<String>,
    {
        Self {
            signals: pairs
                .into_iter()
                .map(|(generic, native)| (generic.into(), native.into()))
                .collect(),
        }
    }
}

impl MappingSpec {
    /// Load a mapping file from disk
    pub fn load(path: &Path) -> Result<Self> {
        log::info!("Loading mapping file: {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|e| MapperError::io(path, e))?;
        let mapping = Self::from_json_str(&content)?;

        log::info!("Mapping lists {} messages", mapping.messages.len());
        Ok(mapping)
    }

    /// Parse a mapping document
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(MapperError::MappingParseError)
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Normalize message ID keys to numeric IDs, ordered by ID
    ///
    /// Keys that are not a number in any supported base are skipped with a
    /// [`DiagnosticKind::InvalidMessageId`] warning. Keys that collide after
    /// normalization are all returned, in key order, so that a later entry
    /// replaces an earlier one downstream; each collision records a
    /// [`DiagnosticKind::DuplicateMessageId`].
    pub fn resolve(&self, diagnostics: &mut Diagnostics) -> Vec<(MessageId, &MessageMapping)> {
        let mut resolved: Vec<(MessageId, &MessageMapping)> = Vec::new();

        for (key, message) in &self.messages {
            let Some(id) = parse_message_id(key) else {
                diagnostics.push(DiagnosticKind::InvalidMessageId(key.clone()));
                continue;
            };

            if resolved.iter().any(|(seen, _)| *seen == id) {
                diagnostics.push(DiagnosticKind::DuplicateMessageId(id));
            }
            resolved.push((id, message));
        }

        // Stable: colliding keys stay in key order
        resolved.sort_by_key(|(id, _)| *id);
        resolved
    }
}
