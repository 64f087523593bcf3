//! Renders [`XmlDocument`]s to UTF-8 bytes with quick-xml.

use std::fmt::Display;
use std::io::Write;

use quick_xml::escape::partial_escape;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::error::DocumentError;

use super::{XmlBody, XmlDocument, XmlElement};

/// Output layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOptions {
    /// Spaces per nesting level; 0 writes everything on one line.
    pub indent: usize,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self { indent: 2 }
    }
}

impl WriteOptions {
    pub fn compact() -> Self {
        Self { indent: 0 }
    }
}

fn write_err(e: impl Display) -> DocumentError {
    DocumentError::Write(e.to_string())
}

/// Writes documents with an XML declaration and the configured indentation.
#[derive(Debug, Clone, Default)]
pub struct XmlWriter {
    options: WriteOptions,
}

impl XmlWriter {
    pub fn new(options: WriteOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> WriteOptions {
        self.options
    }

    /// Write `document` to any sink.
    pub fn write_to<W: Write>(&self, sink: W, document: &XmlDocument) -> Result<(), DocumentError> {
        let mut writer = if self.options.indent > 0 {
            Writer::new_with_indent(sink, b' ', self.options.indent)
        } else {
            Writer::new(sink)
        };

        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
            .map_err(write_err)?;
        write_element(&mut writer, document.root())
    }

    /// Render `document` to bytes.
    pub fn to_bytes(&self, document: &XmlDocument) -> Result<Vec<u8>, DocumentError> {
        let mut buffer = Vec::new();
        self.write_to(&mut buffer, document)?;
        Ok(buffer)
    }

    /// Render `document` to a string.
    pub fn to_string(&self, document: &XmlDocument) -> Result<String, DocumentError> {
        String::from_utf8(self.to_bytes(document)?).map_err(write_err)
    }
}

fn write_element<W: Write>(writer: &mut Writer<W>, element: &XmlElement) -> Result<(), DocumentError> {
    let mut start = BytesStart::new(element.name());
    for (key, value) in element.attributes() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    match element.body() {
        XmlBody::Empty => writer.write_event(Event::Empty(start)).map_err(write_err),
        XmlBody::Text(text) if text.is_empty() => {
            writer.write_event(Event::Empty(start)).map_err(write_err)
        }
        XmlBody::Text(text) => {
            writer.write_event(Event::Start(start)).map_err(write_err)?;
            writer
                // Quotes stay literal in text; only `&`, `<` and `>` are escaped
                .write_event(Event::Text(BytesText::from_escaped(partial_escape(text))))
                .map_err(write_err)?;
            writer
                .write_event(Event::End(BytesEnd::new(element.name())))
                .map_err(write_err)
        }
        XmlBody::Children(children) => {
            writer.write_event(Event::Start(start)).map_err(write_err)?;
            for child in children {
                write_element(writer, child)?;
            }
            writer
                .write_event(Event::End(BytesEnd::new(element.name())))
                .map_err(write_err)
        }
    }
}
