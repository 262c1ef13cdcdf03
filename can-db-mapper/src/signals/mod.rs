//! CANoe XML database reader and signal adapter
//!
//! This module contains the XML tree parser, the message index built over it,
//! and the adapter that turns a `<Signal>` element into a [`Signal`].

pub mod database;
pub mod signal;
pub mod xml;

// Re-export key types for convenience
pub use database::{CanoeDatabase, DatabaseStats};
pub use signal::Signal;
pub use xml::XmlElement;
