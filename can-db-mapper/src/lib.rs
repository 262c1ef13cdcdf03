//! CAN DB Mapper Library
//!
//! Converts a CANoe XML bus database into a compact JSON document that only
//! contains the signals an operator chose to expose under generic names.
//!
//! # Architecture
//!
//! - Parses the XML database once into a read-only element tree
//! - Indexes `/Node/TxMessage` elements by numeric CAN ID
//! - Projects each mapped message onto its requested signals
//! - Assembles the exported messages and serializes them as JSON
//!
//! Gaps in the inputs (unknown message IDs, unknown signal names) never
//! fail a conversion. They are recorded in a [`Diagnostics`] collector and the
//! caller decides how to report them.
//!
//! # Example Usage
//!
//! ```no_run
//! use can_db_mapper::{convert, write_json, Diagnostics, MappingSpec, DEFAULT_INDENT};
//! use std::path::Path;
//!
//! let mapping = MappingSpec::load(Path::new("mapping.json")).unwrap();
//!
//! let mut diagnostics = Diagnostics::new();
//! let network = convert(Path::new("canoe.xml"), &mapping, &mut diagnostics).unwrap();
//!
//! for warning in diagnostics.warnings() {
//!     eprintln!("WARNING: {}", warning);
//! }
//!
//! write_json(Path::new("dump.json"), &network, DEFAULT_INDENT).unwrap();
//! ```

// Public modules
pub mod converter;
pub mod diagnostics;
pub mod mapping;
pub mod message;
pub mod network;
pub mod signals;
pub mod types;

// Re-export main types for convenience
pub use converter::{convert, to_json_string, write_json, DEFAULT_INDENT};
pub use diagnostics::{Diagnostic, DiagnosticKind, Diagnostics, Severity};
pub use mapping::{MappingSpec, MessageMapping};
pub use message::{extract_message, Message};
pub use network::Network;
pub use signals::{CanoeDatabase, DatabaseStats, Signal, XmlElement};
pub use types::{format_message_id, parse_message_id, MapperError, MessageId, Result};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_basics() {
        // Smoke test: an empty database indexes nothing
        let database = CanoeDatabase::from_xml_str("<Network/>").unwrap();
        let stats = database.stats();
        assert_eq!(stats.num_messages, 0);
    }
}
