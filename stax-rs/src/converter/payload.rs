//! Representations a conversion can start from or produce.

use std::fmt;
use std::io::Read;

use crate::cursor::{decode_document, EventCursor, EventListCursor};
use crate::dom::{Document, Element};
use crate::error::{Error, Result};
use crate::event::XmlEvent;
use crate::stream::CharRead;

/// Discriminant of a [`Payload`], used to look up converters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PayloadKind {
    Text,
    Bytes,
    Document,
    Element,
    Events,
    Cursor,
    Stream,
}

impl fmt::Display for PayloadKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PayloadKind::Text => "text",
            PayloadKind::Bytes => "bytes",
            PayloadKind::Document => "document",
            PayloadKind::Element => "element",
            PayloadKind::Events => "events",
            PayloadKind::Cursor => "cursor",
            PayloadKind::Stream => "stream",
        };
        f.write_str(name)
    }
}

/// XML in one of its supported representations.
pub enum Payload {
    Text(String),
    Bytes(Vec<u8>),
    Document(Document),
    Element(Element),
    Events(EventSource),
    Cursor(StaxSource),
    Stream(StreamSource),
}

impl Payload {
    pub fn kind(&self) -> PayloadKind {
        match self {
            Payload::Text(_) => PayloadKind::Text,
            Payload::Bytes(_) => PayloadKind::Bytes,
            Payload::Document(_) => PayloadKind::Document,
            Payload::Element(_) => PayloadKind::Element,
            Payload::Events(_) => PayloadKind::Events,
            Payload::Cursor(_) => PayloadKind::Cursor,
            Payload::Stream(_) => PayloadKind::Stream,
        }
    }

    pub fn into_text(self) -> Option<String> {
        match self {
            Payload::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            Payload::Bytes(bytes) => Some(bytes),
            _ => None,
        }
    }

    pub fn into_document(self) -> Option<Document> {
        match self {
            Payload::Document(document) => Some(document),
            _ => None,
        }
    }

    pub fn into_element(self) -> Option<Element> {
        match self {
            Payload::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn into_events(self) -> Option<EventSource> {
        match self {
            Payload::Events(events) => Some(events),
            _ => None,
        }
    }

    pub fn into_cursor(self) -> Option<StaxSource> {
        match self {
            Payload::Cursor(source) => Some(source),
            _ => None,
        }
    }

    pub fn into_stream(self) -> Option<StreamSource> {
        match self {
            Payload::Stream(source) => Some(source),
            _ => None,
        }
    }
}

impl fmt::Debug for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Text(text) => f.debug_tuple("Text").field(text).finish(),
            Payload::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            Payload::Document(document) => f.debug_tuple("Document").field(document).finish(),
            Payload::Element(element) => f.debug_tuple("Element").field(element).finish(),
            Payload::Events(events) => f.debug_tuple("Events").field(events).finish(),
            Payload::Cursor(source) => f.debug_tuple("Cursor").field(source).finish(),
            Payload::Stream(source) => f.debug_tuple("Stream").field(source).finish(),
        }
    }
}

impl From<String> for Payload {
    fn from(text: String) -> Self {
        Payload::Text(text)
    }
}

impl From<&str> for Payload {
    fn from(text: &str) -> Self {
        Payload::Text(text.to_string())
    }
}

impl From<Vec<u8>> for Payload {
    fn from(bytes: Vec<u8>) -> Self {
        Payload::Bytes(bytes)
    }
}

impl From<Document> for Payload {
    fn from(document: Document) -> Self {
        Payload::Document(document)
    }
}

impl From<Element> for Payload {
    fn from(element: Element) -> Self {
        Payload::Element(element)
    }
}

/// A materialized sequence of structural events.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EventSource {
    events: Vec<XmlEvent>,
}

impl EventSource {
    pub fn new(events: Vec<XmlEvent>) -> Self {
        EventSource { events }
    }

    pub fn events(&self) -> &[XmlEvent] {
        &self.events
    }

    /// Returns a cursor over a copy of the events.
    pub fn replay(&self) -> EventListCursor {
        EventListCursor::new(self.events.clone())
    }

    pub fn into_cursor(self) -> EventListCursor {
        EventListCursor::new(self.events)
    }

    pub fn into_events(self) -> Vec<XmlEvent> {
        self.events
    }
}

/// A pull cursor handed over as a value.
pub struct StaxSource {
    cursor: Box<dyn EventCursor + Send>,
}

impl StaxSource {
    pub fn new<C: EventCursor + Send + 'static>(cursor: C) -> Self {
        StaxSource {
            cursor: Box::new(cursor),
        }
    }

    pub fn cursor(&self) -> &(dyn EventCursor + Send) {
        &*self.cursor
    }

    pub fn cursor_mut(&mut self) -> &mut (dyn EventCursor + Send) {
        &mut *self.cursor
    }

    pub fn into_cursor(self) -> Box<dyn EventCursor + Send> {
        self.cursor
    }
}

impl fmt::Debug for StaxSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaxSource")
            .field("current", self.cursor.current())
            .finish()
    }
}

/// A byte or character stream of serialized XML.
pub enum StreamSource {
    Bytes(Box<dyn Read + Send>),
    Chars(Box<dyn CharRead + Send>),
}

impl StreamSource {
    pub fn from_read<R: Read + Send + 'static>(reader: R) -> Self {
        StreamSource::Bytes(Box::new(reader))
    }

    pub fn from_char_read<R: CharRead + Send + 'static>(reader: R) -> Self {
        StreamSource::Chars(Box::new(reader))
    }

    /// Reads the rest of the stream into a string. Byte streams are decoded
    /// in the encoding the document declares.
    pub fn read_to_string(&mut self) -> Result<String> {
        match self {
            StreamSource::Bytes(reader) => {
                let mut bytes = Vec::new();
                reader.read_to_end(&mut bytes)?;
                decode_document(&bytes).map_err(|e| Error::Encoding(e.to_string()))
            }
            StreamSource::Chars(reader) => {
                let mut text = String::new();
                reader.read_to_string(&mut text)?;
                Ok(text)
            }
        }
    }
}

impl fmt::Debug for StreamSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StreamSource::Bytes(_) => f.write_str("StreamSource::Bytes(..)"),
            StreamSource::Chars(_) => f.write_str("StreamSource::Chars(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::collect_events;
    use crate::stream::StrReader;

    #[test]
    fn test_kinds() {
        assert_eq!(Payload::from("<a/>").kind(), PayloadKind::Text);
        assert_eq!(Payload::from(b"<a/>".to_vec()).kind(), PayloadKind::Bytes);
        assert_eq!(Payload::from(Element::new("a")).kind(), PayloadKind::Element);
        assert_eq!(PayloadKind::Cursor.to_string(), "cursor");
    }

    #[test]
    fn test_accessors_reject_other_kinds() {
        assert_eq!(Payload::from("x").into_text(), Some("x".to_string()));
        assert!(Payload::from("x").into_bytes().is_none());
        assert!(Payload::from(Document::default()).into_element().is_none());
    }

    #[test]
    fn test_event_source_replays() {
        let source = EventSource::new(vec![XmlEvent::start_element("a"), XmlEvent::end_element("a")]);
        let first = collect_events(&mut source.replay()).unwrap();
        let second = collect_events(&mut source.into_cursor()).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 4);
    }

    #[test]
    fn test_stream_source_read_to_string() {
        let mut bytes = StreamSource::from_read(std::io::Cursor::new(b"<a/>".to_vec()));
        assert_eq!(bytes.read_to_string().unwrap(), "<a/>");
        let mut chars = StreamSource::from_char_read(StrReader::new("<b/>"));
        assert_eq!(chars.read_to_string().unwrap(), "<b/>");
        let mut bad = StreamSource::from_read(std::io::Cursor::new(b"<a>\xC3</a>".to_vec()));
        assert!(matches!(bad.read_to_string(), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_stream_source_decodes_declared_encoding() {
        let latin = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>\xE9</a>".to_vec();
        let mut source = StreamSource::from_read(std::io::Cursor::new(latin));
        assert_eq!(
            source.read_to_string().unwrap(),
            "<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>é</a>"
        );
    }
}
