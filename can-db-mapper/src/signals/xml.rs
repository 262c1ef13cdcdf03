//! Minimal XML element tree built with quick-xml
//!
//! The CANoe database export is a plain element tree (no attributes of
//! interest, no mixed content), so it is read once into an owned
//! [`XmlElement`] tree and queried read-only afterwards.

use crate::types::{MapperError, Result};
use quick_xml::encoding::Decoder;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// One element of the parsed XML document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    /// Local element name (namespace prefix stripped)
    pub name: String,
    /// Concatenated, trimmed text content of this element
    pub text: String,
    /// Child elements in document order
    pub children: Vec<XmlElement>,
}

impl XmlElement {
    fn from_start(start: &BytesStart<'_>, decoder: Decoder) -> Result<Self> {
        Ok(Self {
            name: decoder
                .decode(start.local_name().as_ref())
                .map_err(|e| MapperError::XmlParseError(e.to_string()))?
                .into_owned(),
            text: String::new(),
            children: Vec::new(),
        })
    }

    /// First child with the given name, in document order
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// All children with the given name, in document order
    pub fn children<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// Text of the first child with the given name
    pub fn child_text(&self, name: &str) -> Option<&str> {
        self.child(name).map(|c| c.text.as_str())
    }

    /// All elements below this one with the given name (depth-first, document order)
    pub fn descendants<'a>(&'a self, name: &'a str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        let mut stack: Vec<&XmlElement> = self.children.iter().rev().collect();
        while let Some(element) = stack.pop() {
            if element.name == name {
                found.push(element);
            }
            stack.extend(element.children.iter().rev());
        }
        found
    }
}

/// Parse an XML document from a file and return its root element
///
/// The file is read as bytes; the character encoding comes from a BOM or the
/// `encoding` of the XML declaration (UTF-8 when neither is present), so
/// Latin-1 / Windows-1252 exports are read as such.
pub fn parse_file(path: &Path) -> Result<XmlElement> {
    log::info!("Parsing XML database: {:?}", path);

    let file = File::open(path).map_err(|e| MapperError::io(path, e))?;
    read_tree(Reader::from_reader(BufReader::new(file)))
}

/// Parse an XML document and return its root element
pub fn parse_str(xml: &str) -> Result<XmlElement> {
    read_tree(Reader::from_str(xml))
}

fn read_tree<R: BufRead>(mut reader: Reader<R>) -> Result<XmlElement> {
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) => stack.push(XmlElement::from_start(&e, reader.decoder())?),
            Ok(Event::Empty(e)) => {
                let element = XmlElement::from_start(&e, reader.decoder())?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack.pop().ok_or_else(|| {
                    MapperError::XmlParseError("unexpected closing tag".to_string())
                })?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(t)) => {
                // Decodes with the encoding the reader detected
                let text = t
                    .unescape()
                    .map_err(|e| MapperError::XmlParseError(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                let text = reader
                    .decoder()
                    .decode(&c)
                    .map_err(|e| MapperError::XmlParseError(e.to_string()))?;
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text);
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(MapperError::XmlParseError(format!(
                    "at byte {}: {}",
                    reader.buffer_position(),
                    e
                )))
            }
            _ => {}
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(MapperError::XmlParseError(format!(
            "unclosed element <{}>",
            open.name
        )));
    }

    root.ok_or_else(|| MapperError::XmlParseError("document has no root element".to_string()))
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(MapperError::XmlParseError(format!(
                "multiple root elements (second is <{}>)",
                element.name
            )))
        }
    }
    Ok(())
}
