//! Conversion driver
//!
//! Ties the stages together: mapping -> database (parsed once) -> network ->
//! indented JSON.

use crate::diagnostics::{DiagnosticKind, Diagnostics};
use crate::mapping::MappingSpec;
use crate::network::Network;
use crate::signals::CanoeDatabase;
use crate::types::{MapperError, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Indentation used by [`write_json`] when the caller has no preference
pub const DEFAULT_INDENT: usize = 4;

/// Convert a database file using an already loaded mapping
///
/// When the mapping lists no messages, the database file is never opened and
/// an empty network is returned along with a
/// [`DiagnosticKind::EmptyMapping`] warning.
///
/// # Example
/// ```no_run
/// use can_db_mapper::{convert, write_json, Diagnostics, MappingSpec, DEFAULT_INDENT};
/// use std::path::Path;
///
/// let mapping = MappingSpec::load(Path::new("mapping.json")).unwrap();
/// let mut diagnostics = Diagnostics::new();
/// let network = convert(Path::new("canoe.xml"), &mapping, &mut diagnostics).unwrap();
/// write_json(Path::new("dump.json"), &network, DEFAULT_INDENT).unwrap();
/// ```
pub fn convert(
    database_path: &Path,
    mapping: &MappingSpec,
    diagnostics: &mut Diagnostics,
) -> Result<Network> {
    if mapping.is_empty() {
        diagnostics.push(DiagnosticKind::EmptyMapping);
        return Ok(Network::new());
    }

    let database = CanoeDatabase::load(database_path)?;
    Network::assemble(&database, mapping, diagnostics)
}

/// Serialize a network as indented JSON text
pub fn to_json_string(network: &Network, indent: usize) -> Result<String> {
    let mut buf = Vec::new();
    write_pretty(&mut buf, network, indent)?;
    // serde_json only ever emits UTF-8
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a network as indented JSON text to `path`
///
/// The file is created (or truncated) and always ends with a newline.
pub fn write_json(path: &Path, network: &Network, indent: usize) -> Result<()> {
    let file = File::create(path).map_err(|e| MapperError::io(path, e))?;
    let mut writer = BufWriter::new(file);

    write_pretty(&mut writer, network, indent)?;
    writer.flush().map_err(|e| MapperError::io(path, e))?;

    log::info!("Wrote {} messages to {:?}", network.len(), path);
    Ok(())
}

fn write_pretty<W: Write>(writer: &mut W, network: &Network, indent: usize) -> Result<()> {
    let indent = " ".repeat(indent);
    let formatter = serde_json::ser::PrettyFormatter::with_indent(indent.as_bytes());
    let mut serializer = serde_json::Serializer::with_formatter(&mut *writer, formatter);

    network.serialize(&mut serializer)?;
    writer.write_all(b"\n").map_err(serde_json::Error::io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mapping_skips_database() {
        let mut diagnostics = Diagnostics::new();
        let network = convert(
            Path::new("does/not/exist.xml"),
            &MappingSpec::default(),
            &mut diagnostics,
        )
        .unwrap();

        assert!(network.is_empty());
        assert_eq!(
            diagnostics.iter().map(|d| d.kind.clone()).collect::<Vec<_>>(),
            vec![DiagnosticKind::EmptyMapping]
        );
    }

    #[test]
    fn test_missing_database_is_fatal() {
        let mapping = MappingSpec::from_json_str(
            r#"{"messages": {"256": {"signals": {"engine_speed": "ENGINE_RPM"}}}}"#,
        )
        .unwrap();

        let result = convert(
            Path::new("does/not/exist.xml"),
            &mapping,
            &mut Diagnostics::new(),
        );
        assert!(matches!(result, Err(MapperError::Io { .. })));
    }

    #[test]
    fn test_empty_network_json() {
        assert_eq!(
            to_json_string(&Network::new(), DEFAULT_INDENT).unwrap(),
            "{\n    \"messages\": {}\n}\n"
        );
        assert_eq!(
            to_json_string(&Network::new(), 2).unwrap(),
            "{\n  \"messages\": {}\n}\n"
        );
    }
}
