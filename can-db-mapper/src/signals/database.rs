//! CANoe XML signal database
//!
//! Wraps the parsed XML tree and indexes its `/Node/TxMessage` elements by
//! numeric CAN ID so each mapping entry is a single lookup.

use crate::signals::xml::{self, XmlElement};
use crate::types::{parse_message_id, MessageId, Result};
use std::collections::HashMap;
use std::path::Path;

/// The parsed database: XML tree plus message index
#[derive(Debug)]
pub struct CanoeDatabase {
    /// Root element of the database document
    root: XmlElement,

    /// Message lookup by CAN ID
    /// Key: CAN ID, Value: (node index, TxMessage index within that node)
    messages_by_id: HashMap<MessageId, (usize, usize)>,
}

impl CanoeDatabase {
    /// Parse a database file
    pub fn load(path: &Path) -> Result<Self> {
        let database = Self::from_root(xml::parse_file(path)?);

        let stats = database.stats();
        log::info!(
            "Database loaded: {} nodes, {} messages, {} signals",
            stats.num_nodes,
            stats.num_messages,
            stats.num_signals
        );
        Ok(database)
    }

    /// Parse a database from an in-memory XML document
    pub fn from_xml_str(content: &str) -> Result<Self> {
        Ok(Self::from_root(xml::parse_str(content)?))
    }

    /// Index an already parsed XML tree
    pub fn from_root(root: XmlElement) -> Self {
        let mut messages_by_id = HashMap::new();

        for (node_idx, node) in root.children.iter().enumerate() {
            if node.name != "Node" {
                continue;
            }

            for (msg_idx, message) in node.children.iter().enumerate() {
                if message.name != "TxMessage" {
                    continue;
                }

                let id_text = message.child_text("ID").unwrap_or_default();
                match parse_message_id(id_text) {
                    Some(id) => {
                        // First TxMessage in document order wins
                        messages_by_id.entry(id).or_insert((node_idx, msg_idx));
                    }
                    None => log::warn!(
                        "Skipping TxMessage {:?} with invalid ID {:?}",
                        message.child_text("Name").unwrap_or("<unnamed>"),
                        id_text
                    ),
                }
            }
        }

        Self {
            root,
            messages_by_id,
        }
    }

    /// Root element of the database document
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Find the `TxMessage` element for a CAN ID
    pub fn find_message(&self, id: MessageId) -> Option<&XmlElement> {
        let &(node_idx, msg_idx) = self.messages_by_id.get(&id)?;
        Some(&self.root.children[node_idx].children[msg_idx])
    }

    /// All indexed CAN IDs, sorted
    pub fn message_ids(&self) -> Vec<MessageId> {
        let mut ids: Vec<MessageId> = self.messages_by_id.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Get database statistics
    pub fn stats(&self) -> DatabaseStats {
        let nodes: Vec<&XmlElement> = self.root.children("Node").collect();
        let messages: Vec<&XmlElement> = nodes
            .iter()
            .flat_map(|node| node.children("TxMessage"))
            .collect();

        DatabaseStats {
            num_nodes: nodes.len(),
            num_messages: messages.len(),
            num_signals: messages.iter().map(|m| m.children("Signal").count()).sum(),
        }
    }
}

/// Find the first `<Signal>` child of a message whose `<Name>` matches
pub fn find_signal<'a>(message: &'a XmlElement, native_name: &str) -> Option<&'a XmlElement> {
    message
        .children("Signal")
        .find(|signal| signal.child_text("Name") == Some(native_name))
}

/// Database statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseStats {
    /// Number of `Node` elements
    pub num_nodes: usize,
    /// Number of `TxMessage` elements
    pub num_messages: usize,
    /// Number of `Signal` elements across all messages
    pub num_signals: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    const DATABASE: &str = r#"
        <Network>
          <Node>
            <Name>ECU1</Name>
            <TxMessage>
              <Name>EngineData</Name>
              <ID>0x100</ID>
              <Signal><Name>ENGINE_RPM</Name><Bitposition>0</Bitposition><Bitsize>16</Bitsize></Signal>
              <Signal><Name>ENGINE_RPM</Name><Bitposition>32</Bitposition><Bitsize>8</Bitsize></Signal>
            </TxMessage>
          </Node>
          <Node>
            <TxMessage><Name>Body</Name><ID>512</ID></TxMessage>
            <TxMessage><Name>Shadow</Name><ID>0x200</ID></TxMessage>
            <TxMessage><Name>Broken</Name><ID>not-a-number</ID></TxMessage>
          </Node>
        </Network>"#;

    #[test]
    fn test_empty_database() {
        let db = CanoeDatabase::from_xml_str("<Network/>").unwrap();
        let stats = db.stats();
        assert_eq!(stats.num_nodes, 0);
        assert_eq!(stats.num_messages, 0);
        assert!(db.message_ids().is_empty());
    }

    #[test]
    fn test_message_lookup_normalizes_ids() {
        let db = CanoeDatabase::from_xml_str(DATABASE).unwrap();

        let engine = db.find_message(256).unwrap();
        assert_eq!(engine.child_text("Name"), Some("EngineData"));

        // Duplicate ID: first in document order wins
        let body = db.find_message(0x200).unwrap();
        assert_eq!(body.child_text("Name"), Some("Body"));

        assert!(db.find_message(999).is_none());
        assert_eq!(db.message_ids(), vec![0x100, 0x200]);
    }

    #[test]
    fn test_stats() {
        let db = CanoeDatabase::from_xml_str(DATABASE).unwrap();
        assert_eq!(
            db.stats(),
            DatabaseStats {
                num_nodes: 2,
                num_messages: 4,
                num_signals: 2,
            }
        );
    }

    #[test]
    fn test_find_signal_first_match_wins() {
        let db = CanoeDatabase::from_xml_str(DATABASE).unwrap();
        let engine = db.find_message(0x100).unwrap();

        let signal = find_signal(engine, "ENGINE_RPM").unwrap();
        assert_eq!(signal.child_text("Bitposition"), Some("0"));
        assert!(find_signal(engine, "COOLANT").is_none());
    }
}
