//! Serialization of trees and cursors to text and bytes.

use std::io::Write;

use super::writer::{OutputProperties, WriterFactory};
use crate::cursor::{EventCursor, TreeCursor};
use crate::dom::Document;
use crate::error::Result;
use crate::writer::{copy_events, EventWriter};

/// Copies structural events into serialized markup.
#[derive(Debug, Clone, Default)]
pub struct Transformer {
    writers: WriterFactory,
}

impl Transformer {
    pub fn new(properties: OutputProperties) -> Self {
        Transformer {
            writers: WriterFactory::with_properties(properties),
        }
    }

    pub fn properties(&self) -> &OutputProperties {
        self.writers.properties()
    }

    /// Writes every remaining event of `cursor`, starting with the current
    /// one, to `out` in the configured encoding.
    pub fn transform<C, W>(&self, cursor: &mut C, out: &mut W) -> Result<()>
    where
        C: EventCursor + ?Sized,
        W: Write,
    {
        let mut writer = self.writers.create_event_writer(out)?;
        copy_events(cursor, &mut writer)?;
        writer.flush()
    }

    pub fn transform_to_bytes<C: EventCursor + ?Sized>(&self, cursor: &mut C) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        self.transform(cursor, &mut out)?;
        Ok(out)
    }

    /// Serializes to a string. The encoding only affects the XML declaration.
    pub fn transform_to_string<C: EventCursor + ?Sized>(&self, cursor: &mut C) -> Result<String> {
        let mut serializer = self.writers.create_char_serializer();
        copy_events(cursor, &mut serializer)?;
        serializer.write_end_document()?;
        Ok(serializer.take_chunk().into_iter().collect())
    }

    pub fn document_to_string(&self, document: &Document) -> Result<String> {
        self.transform_to_string(&mut TreeCursor::new(document.clone()))
    }

    pub fn document_to_bytes(&self, document: &Document) -> Result<Vec<u8>> {
        self.transform_to_bytes(&mut TreeCursor::new(document.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::XmlStreamCursor;
    use crate::dom::{Element, Node};
    use crate::event::Attribute;

    fn sample() -> Document {
        Document::new(
            Element::new("a").with_child(Node::Element(
                Element::new("b")
                    .with_attribute(Attribute::new("x", "1"))
                    .with_child(Node::Text("hi".into())),
            )),
        )
    }

    #[test]
    fn test_document_to_string() {
        let t = Transformer::default();
        assert_eq!(t.document_to_string(&sample()).unwrap(), r#"<a><b x="1">hi</b></a>"#);
    }

    #[test]
    fn test_declaration_and_encoding() {
        let props = OutputProperties {
            encoding: "ISO-8859-1".into(),
            omit_xml_declaration: false,
        };
        let t = Transformer::new(props);
        let mut cursor = XmlStreamCursor::new("<a>é</a>".as_bytes());
        let bytes = t.transform_to_bytes(&mut cursor).unwrap();
        let mut expected = br#"<?xml version="1.0" encoding="windows-1252"?><a>"#.to_vec();
        expected.push(0xE9);
        expected.extend_from_slice(b"</a>");
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_empty_document_serializes_to_nothing() {
        let t = Transformer::default();
        assert!(t.document_to_bytes(&Document::default()).unwrap().is_empty());
    }
}
