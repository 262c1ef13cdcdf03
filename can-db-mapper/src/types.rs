//! Core types for the CAN database mapper library
//!
//! Error type, result alias and the message ID helpers shared by every
//! stage of the conversion.

/// Result type for mapper operations
pub type Result<T> = std::result::Result<T, MapperError>;

/// CAN message identifier (11-bit or 29-bit)
pub type MessageId = u32;

/// Fatal errors that abort a conversion
///
/// Recoverable gaps (missing messages, missing signals) are never errors;
/// they are recorded as [`crate::Diagnostic`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum MapperError {
    #[error("Failed to parse XML database: {0}")]
    XmlParseError(String),

    #[error("Failed to parse mapping file: {0}")]
    MappingParseError(#[source] serde_json::Error),

    #[error("Invalid signal definition: {0}")]
    InvalidSignalDefinition(String),

    #[error("Invalid message definition: {0}")]
    InvalidMessage(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error on {path:?}: {source}")]
    Io {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MapperError {
    pub(crate) fn io(path: &std::path::Path, source: std::io::Error) -> Self {
        MapperError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Parse a numeric message ID with automatic base detection
///
/// Accepts `0x`/`0X` (hex), `0o`/`0O` (octal), `0b`/`0B` (binary) prefixes
/// and plain decimal. Surrounding whitespace and `_` separators are ignored.
pub fn parse_message_id(text: &str) -> Option<MessageId> {
    let cleaned: String = text.trim().chars().filter(|c| *c != '_').collect();
    if cleaned.is_empty() {
        return None;
    }

    let (digits, radix) = match cleaned.get(..2) {
        Some("0x") | Some("0X") => (&cleaned[2..], 16),
        Some("0o") | Some("0O") => (&cleaned[2..], 8),
        Some("0b") | Some("0B") => (&cleaned[2..], 2),
        _ => (cleaned.as_str(), 10),
    };

    // from_str_radix accepts a leading '+', which is not a valid ID prefix here
    if digits.is_empty() || digits.starts_with('+') {
        return None;
    }

    MessageId::from_str_radix(digits, radix).ok()
}

/// Format a message ID the way it is keyed in the output (`0x` + lowercase hex)
pub fn format_message_id(id: MessageId) -> String {
    format!("0x{:x}", id)
}
