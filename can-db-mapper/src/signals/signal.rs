//! Signal adapter
//!
//! Builds a [`Signal`] from a CANoe `<Signal>` element and serializes it to
//! the plain mapping emitted in the output JSON.

use crate::signals::xml::XmlElement;
use crate::types::{MapperError, Result};
use serde::Serialize;

/// A CAN signal selected for export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    /// Native signal name from the database (unique within a message)
    #[serde(skip)]
    pub name: String,
    /// Application-facing name, assigned after construction
    pub generic_name: Option<String>,
    /// Start bit in the CAN frame
    pub bit_position: u32,
    /// Length in bits
    pub bit_size: u32,
    /// Scale factor to convert raw value to physical value
    pub factor: f64,
    /// Offset to add after scaling
    pub offset: f64,
    /// Minimum physical value
    pub min_value: Option<f64>,
    /// Maximum physical value
    pub max_value: Option<f64>,
    /// Engineering unit (e.g., "km/h", "rpm")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

impl Signal {
    /// Build a signal from a `<Signal>` element
    ///
    /// `Name`, `Bitposition` and `Bitsize` are required. `Factor` defaults
    /// to 1, `Offset` to 0; `Minimum`, `Maximum` and `Unit` are optional.
    /// Numeric fields must be finite (`NaN` and `inf` are rejected).
    pub fn from_xml_node(node: &XmlElement) -> Result<Self> {
        let name = node
            .child_text("Name")
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                MapperError::InvalidSignalDefinition("signal without a <Name>".to_string())
            })?
            .to_string();

        let bit_position = required(node, &name, "Bitposition")?;
        let bit_size: u32 = required(node, &name, "Bitsize")?;
        if bit_size == 0 {
            return Err(MapperError::InvalidSignalDefinition(format!(
                "signal '{}' has zero width",
                name
            )));
        }

        Ok(Self {
            bit_position,
            bit_size,
            factor: number(node, &name, "Factor")?.unwrap_or(1.0),
            offset: number(node, &name, "Offset")?.unwrap_or(0.0),
            min_value: number(node, &name, "Minimum")?,
            max_value: number(node, &name, "Maximum")?,
            unit: node
                .child_text("Unit")
                .filter(|u| !u.is_empty())
                .map(str::to_string),
            generic_name: None,
            name,
        })
    }

    /// Attach the application-facing name
    pub fn set_generic_name(&mut self, generic_name: impl Into<String>) {
        self.generic_name = Some(generic_name.into());
    }

    /// Builder-style variant of [`Signal::set_generic_name`]
    pub fn with_generic_name(mut self, generic_name: impl Into<String>) -> Self {
        self.set_generic_name(generic_name);
        self
    }

    /// Serialize to a plain JSON mapping (the native name is the key, not a field)
    pub fn to_dict(&self) -> Result<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }
}

fn required<T: std::str::FromStr>(node: &XmlElement, signal: &str, field: &str) -> Result<T> {
    optional(node, signal, field)?.ok_or_else(|| {
        MapperError::InvalidSignalDefinition(format!(
            "signal '{}' is missing <{}>",
            signal, field
        ))
    })
}

fn optional<T: std::str::FromStr>(
    node: &XmlElement,
    signal: &str,
    field: &str,
) -> Result<Option<T>> {
    match node.child_text(field).map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => text.parse::<T>().map(Some).map_err(|_| {
            MapperError::InvalidSignalDefinition(format!(
                "signal '{}' has invalid <{}>: {:?}",
                signal, field, text
            ))
        }),
    }
}

/// Optional float field; JSON has no representation for non-finite values
fn number(node: &XmlElement, signal: &str, field: &str) -> Result<Option<f64>> {
    match optional::<f64>(node, signal, field)? {
        Some(value) if !value.is_finite() => Err(MapperError::InvalidSignalDefinition(format!(
            "signal '{}' has non-finite <{}>: {}",
            signal, field, value
        ))),
        value => Ok(value),
    }
}
