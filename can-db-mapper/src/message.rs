//! Message extraction
//!
//! Projects one `TxMessage` from the database onto the signals requested for
//! it in the mapping file.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::mapping::MessageMapping;
use crate::signals::database::find_signal;
use crate::signals::{CanoeDatabase, Signal, XmlElement};
use crate::types::{format_message_id, parse_message_id, MapperError, MessageId, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One CAN message selected for export
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    /// CAN message ID from the database `<ID>` field
    pub id: MessageId,
    /// Message name from the database `<Name>` field
    pub name: String,
    /// Resolved signals, in mapping order
    pub signals: Vec<Signal>,
}

impl Message {
    /// Build a message from its `TxMessage` element
    ///
    /// Requested signals that are not present in the element are dropped.
    /// A native name requested under two generic names is emitted once,
    /// under the generic name that comes last in mapping order.
    pub fn from_xml_node(
        node: &XmlElement,
        mapped: &MessageMapping,
        diagnostics: &mut Diagnostics,
    ) -> Result<Self> {
        let id_text = node.child_text("ID").unwrap_or_default();
        let id = parse_message_id(id_text).ok_or_else(|| {
            MapperError::InvalidMessage(format!("TxMessage has invalid ID {:?}", id_text))
        })?;
        let name = node.child_text("Name").unwrap_or_default().to_string();

        let mut signals: Vec<Signal> = Vec::with_capacity(mapped.signals.len());

        for (generic_name, native_name) in &mapped.signals {
            let Some(signal_node) = find_signal(node, native_name) else {
                diagnostics.push(DiagnosticKind::SignalNotFound {
                    message_id: id,
                    signal: native_name.clone(),
                });
                continue;
            };

            if let Some(existing) = signals.iter_mut().find(|s| &s.name == native_name) {
                diagnostics.push(DiagnosticKind::DuplicateSignal {
                    message_id: id,
                    signal: native_name.clone(),
                });
                existing.set_generic_name(generic_name.as_str());
                continue;
            }

            let mut signal = Signal::from_xml_node(signal_node)?;
            signal.set_generic_name(generic_name.as_str());
            signals.push(signal);
        }

        log::debug!(
            "Message {} ({}): {}/{} requested signals resolved",
            format_message_id(id),
            name,
            signals.len(),
            mapped.signals.len()
        );

        Ok(Self { id, name, signals })
    }

    /// Output key for this message (`0x` + lowercase hex)
    pub fn key(&self) -> String {
        format_message_id(self.id)
    }
}

/// Serializes as `{"name": ..., "signals": {<native name>: <signal dict>}}`
impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("name", &self.name)?;
        map.serialize_entry("signals", &SignalDict(&self.signals))?;
        map.end()
    }
}

struct SignalDict<'a>(&'a [Signal]);

impl Serialize for SignalDict<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for signal in self.0 {
            map.serialize_entry(&signal.name, signal)?;
        }
        map.end()
    }
}

/// Locate a message in the database and project it onto the requested signals
///
/// Returns `Ok(None)` and records [`DiagnosticKind::MessageNotFound`] when
/// the database has no `TxMessage` with this ID.
pub fn extract_message(
    database: &CanoeDatabase,
    id: MessageId,
    mapped: &MessageMapping,
    diagnostics: &mut Diagnostics,
) -> Result<Option<Message>> {
    match database.find_message(id) {
        Some(node) => Message::from_xml_node(node, mapped, diagnostics).map(Some),
        None => {
            diagnostics.push(DiagnosticKind::MessageNotFound(id));
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Severity;

    const DATABASE: &str = r#"
        <Network>
          <Node>
            <TxMessage>
              <Name>EngineData</Name>
              <ID>0x100</ID>
              <Signal><Name>ENGINE_RPM</Name><Bitposition>0</Bitposition><Bitsize>16</Bitsize></Signal>
              <Signal><Name>COOLANT_TEMP</Name><Bitposition>16</Bitposition><Bitsize>8</Bitsize><Offset>-40</Offset></Signal>
              <Signal><Name>ENGINE_RPM</Name><Bitposition>40</Bitposition><Bitsize>16</Bitsize></Signal>
            </TxMessage>
          </Node>
        </Network>"#;

    fn database() -> CanoeDatabase {
        CanoeDatabase::from_xml_str(DATABASE).unwrap()
    }

    #[test]
    fn test_extract_requested_signals() {
        let mapped = MessageMapping::from_pairs([
            ("engine_speed", "ENGINE_RPM"),
            ("coolant_temperature", "COOLANT_TEMP"),
        ]);
        let mut diagnostics = Diagnostics::new();

        let message = extract_message(&database(), 256, &mapped, &mut diagnostics)
            .unwrap()
            .unwrap();

        assert_eq!(message.id, 0x100);
        assert_eq!(message.name, "EngineData");
        assert_eq!(message.key(), "0x100");
        // Generic-name order: coolant_temperature < engine_speed
        let names: Vec<_> = message.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["COOLANT_TEMP", "ENGINE_RPM"]);
        assert_eq!(
            message.signals[1].generic_name.as_deref(),
            Some("engine_speed")
        );
        // First ENGINE_RPM in document order
        assert_eq!(message.signals[1].bit_position, 0);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_missing_signal_is_dropped_quietly() {
        let mapped = MessageMapping::from_pairs([
            ("engine_speed", "ENGINE_RPM"),
            ("vehicle_speed", "VEHICLE_SPEED"),
        ]);
        let mut diagnostics = Diagnostics::new();

        let message = extract_message(&database(), 0x100, &mapped, &mut diagnostics)
            .unwrap()
            .unwrap();

        assert_eq!(message.signals.len(), 1);
        assert_eq!(diagnostics.len(), 1);
        assert!(diagnostics.iter().all(|d| d.severity == Severity::Info));
    }

    #[test]
    fn test_missing_message_is_a_warning() {
        let mapped = MessageMapping::from_pairs([("engine_speed", "ENGINE_RPM")]);
        let mut diagnostics = Diagnostics::new();

        let message = extract_message(&database(), 999, &mapped, &mut diagnostics).unwrap();

        assert!(message.is_none());
        assert_eq!(
            diagnostics.warnings().next().map(|d| &d.kind),
            Some(&DiagnosticKind::MessageNotFound(999))
        );
    }

    #[test]
    fn test_same_native_signal_under_two_generic_names() {
        let mapped = MessageMapping::from_pairs([
            ("a_rpm", "ENGINE_RPM"),
            ("b_coolant", "COOLANT_TEMP"),
            ("c_rpm", "ENGINE_RPM"),
        ]);
        let mut diagnostics = Diagnostics::new();

        let message = extract_message(&database(), 0x100, &mapped, &mut diagnostics)
            .unwrap()
            .unwrap();

        // Last generic name wins, the signal keeps its first position
        let names: Vec<_> = message.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ENGINE_RPM", "COOLANT_TEMP"]);
        assert_eq!(message.signals[0].generic_name.as_deref(), Some("c_rpm"));
        assert_eq!(
            diagnostics.warnings().map(|d| d.kind.clone()).collect::<Vec<_>>(),
            vec![DiagnosticKind::DuplicateSignal {
                message_id: 0x100,
                signal: "ENGINE_RPM".to_string(),
            }]
        );
    }

    #[test]
    fn test_message_serialization_shape() {
        let mapped = MessageMapping::from_pairs([("coolant_temperature", "COOLANT_TEMP")]);
        let message = extract_message(&database(), 0x100, &mapped, &mut Diagnostics::new())
            .unwrap()
            .unwrap();

        let value = serde_json::to_value(&message).unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.len(), 2);
        assert_eq!(object["name"], "EngineData");
        assert_eq!(
            object["signals"]["COOLANT_TEMP"]["generic_name"],
            "coolant_temperature"
        );
        assert_eq!(object["signals"]["COOLANT_TEMP"]["offset"], -40.0);
    }
}
