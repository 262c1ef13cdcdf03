//! Non-fatal conversion diagnostics
//!
//! The library never prints or aborts on a tolerable gap in the inputs. It
//! records a [`Diagnostic`] and keeps going; the caller decides how to report
//! the collected entries and whether any of them should fail the run.

use crate::types::{format_message_id, MessageId};
use std::fmt;

/// How loudly a diagnostic should be reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Expected gap, only interesting when debugging a mapping
    Info,
    /// Something the operator asked for could not be produced
    Warning,
}

/// What went wrong
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticKind {
    /// The mapping file lists no messages at all
    EmptyMapping,
    /// A mapped message ID has no `TxMessage` in the database
    MessageNotFound(MessageId),
    /// A mapped native signal name is absent from its message
    SignalNotFound { message_id: MessageId, signal: String },
    /// A mapping key is not a CAN ID in any supported base
    InvalidMessageId(String),
    /// Two mapping keys normalize to the same message ID
    DuplicateMessageId(MessageId),
    /// Two generic names point at the same native signal
    DuplicateSignal { message_id: MessageId, signal: String },
}

impl DiagnosticKind {
    /// Default severity for this kind of diagnostic
    pub fn severity(&self) -> Severity {
        match self {
            DiagnosticKind::SignalNotFound { .. } => Severity::Info,
            _ => Severity::Warning,
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticKind::EmptyMapping => {
                write!(f, "No messages specified for mapping from XML")
            }
            DiagnosticKind::MessageNotFound(id) => write!(
                f,
                "Unable to find message ID {} ({}) in XML",
                id,
                format_message_id(*id)
            ),
            DiagnosticKind::SignalNotFound { message_id, signal } => write!(
                f,
                "Signal '{}' not found in message {}",
                signal,
                format_message_id(*message_id)
            ),
            DiagnosticKind::InvalidMessageId(key) => {
                write!(f, "Mapping key {:?} is not a CAN message ID, skipping it", key)
            }
            DiagnosticKind::DuplicateMessageId(id) => write!(
                f,
                "Message ID {} is mapped more than once, the last entry wins",
                format_message_id(*id)
            ),
            DiagnosticKind::DuplicateSignal { message_id, signal } => write!(
                f,
                "Signal '{}' in message {} is mapped to more than one generic name, the last one wins",
                signal,
                format_message_id(*message_id)
            ),
        }
    }
}

/// A single recorded diagnostic
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagnosticKind,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Collector threaded through a conversion
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic at its default severity
    pub fn push(&mut self, kind: DiagnosticKind) {
        log::debug!("Recorded diagnostic: {}", kind);
        self.entries.push(Diagnostic {
            severity: kind.severity(),
            kind,
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Entries at [`Severity::Warning`]
    pub fn warnings(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries
            .iter()
            .filter(|d| d.severity == Severity::Warning)
    }

    pub fn has_warnings(&self) -> bool {
        self.warnings().next().is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_per_kind() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(DiagnosticKind::SignalNotFound {
            message_id: 0x100,
            signal: "COOLANT".to_string(),
        });
        assert!(!diagnostics.has_warnings());
        assert_eq!(diagnostics.len(), 1);

        diagnostics.push(DiagnosticKind::MessageNotFound(999));
        assert!(diagnostics.has_warnings());
        assert_eq!(diagnostics.warnings().count(), 1);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            DiagnosticKind::MessageNotFound(999).to_string(),
            "Unable to find message ID 999 (0x3e7) in XML"
        );
        assert_eq!(
            DiagnosticKind::EmptyMapping.to_string(),
            "No messages specified for mapping from XML"
        );
    }
}
