//! Structural event sinks.
//!
//! An [`EventWriter`] receives one call per structural event. The
//! [`EventSerializer`] turns those calls into markup accumulated in a chunk
//! buffer; [`StreamEventWriter`] forwards that markup to an [`io::Write`].

mod encoder;
mod serializer;

pub use encoder::{ByteEncoder, CharEncoder, Charset, ChunkEncoder};
pub use serializer::EventSerializer;

use std::io;

use crate::cursor::EventCursor;
use crate::error::Result;
use crate::event::XmlEvent;

/// A sink for structural events.
pub trait EventWriter {
    fn write_start_document(&mut self) -> Result<()>;

    fn write_start_element(&mut self, name: &str) -> Result<()>;

    /// Declares a namespace on the element just started. An empty prefix
    /// declares the default namespace.
    fn write_namespace(&mut self, prefix: &str, uri: &str) -> Result<()>;

    /// Adds an attribute to the element just started.
    fn write_attribute(
        &mut self,
        prefix: &str,
        namespace_uri: &str,
        local_name: &str,
        value: &str,
    ) -> Result<()>;

    fn write_characters(&mut self, text: &str) -> Result<()>;

    fn write_cdata(&mut self, text: &str) -> Result<()>;

    fn write_comment(&mut self, text: &str) -> Result<()>;

    /// Closes the innermost open element.
    fn write_end_element(&mut self) -> Result<()>;

    /// Closes every element still open.
    fn write_end_document(&mut self) -> Result<()>;
}

/// Writes one event to a sink. Namespace declarations precede attributes,
/// each in the order the event lists them.
pub fn write_event<W: EventWriter + ?Sized>(sink: &mut W, event: &XmlEvent) -> Result<()> {
    match event {
        XmlEvent::StartDocument => sink.write_start_document(),
        XmlEvent::StartElement {
            name,
            attributes,
            namespaces,
        } => {
            sink.write_start_element(name)?;
            for ns in namespaces {
                sink.write_namespace(&ns.prefix, &ns.uri)?;
            }
            for attr in attributes {
                sink.write_attribute(&attr.prefix, &attr.namespace_uri, &attr.local_name, &attr.value)?;
            }
            Ok(())
        }
        XmlEvent::EndElement { .. } => sink.write_end_element(),
        XmlEvent::Characters(text) => sink.write_characters(text),
        XmlEvent::CData(text) => sink.write_cdata(text),
        XmlEvent::Comment(text) => sink.write_comment(text),
        XmlEvent::EndDocument => sink.write_end_document(),
    }
}

/// Copies the current event and every remaining event of `cursor` into `sink`.
pub fn copy_events<C, W>(cursor: &mut C, sink: &mut W) -> Result<()>
where
    C: EventCursor + ?Sized,
    W: EventWriter + ?Sized,
{
    write_event(sink, cursor.current())?;
    while cursor.has_next() {
        cursor.next()?;
        write_event(sink, cursor.current())?;
    }
    Ok(())
}

/// An event writer that serializes straight into an [`io::Write`].
pub struct StreamEventWriter<W: io::Write> {
    out: W,
    serializer: EventSerializer<ByteEncoder>,
}

impl<W: io::Write> StreamEventWriter<W> {
    pub fn new(out: W, serializer: EventSerializer<ByteEncoder>) -> Self {
        StreamEventWriter { out, serializer }
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> Result<()> {
        self.serializer.write_chunk_to(&mut self.out)?;
        self.out.flush()?;
        Ok(())
    }

    /// Returns the underlying writer. Markup already serialized has been
    /// written to it.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn forward(&mut self, result: Result<()>) -> Result<()> {
        result?;
        self.serializer.write_chunk_to(&mut self.out)
    }
}

impl<W: io::Write> EventWriter for StreamEventWriter<W> {
    fn write_start_document(&mut self) -> Result<()> {
        let result = self.serializer.write_start_document();
        self.forward(result)
    }

    fn write_start_element(&mut self, name: &str) -> Result<()> {
        let result = self.serializer.write_start_element(name);
        self.forward(result)
    }

    fn write_namespace(&mut self, prefix: &str, uri: &str) -> Result<()> {
        let result = self.serializer.write_namespace(prefix, uri);
        self.forward(result)
    }

    fn write_attribute(
        &mut self,
        prefix: &str,
        namespace_uri: &str,
        local_name: &str,
        value: &str,
    ) -> Result<()> {
        let result = self
            .serializer
            .write_attribute(prefix, namespace_uri, local_name, value);
        self.forward(result)
    }

    fn write_characters(&mut self, text: &str) -> Result<()> {
        let result = self.serializer.write_characters(text);
        self.forward(result)
    }

    fn write_cdata(&mut self, text: &str) -> Result<()> {
        let result = self.serializer.write_cdata(text);
        self.forward(result)
    }

    fn write_comment(&mut self, text: &str) -> Result<()> {
        let result = self.serializer.write_comment(text);
        self.forward(result)
    }

    fn write_end_element(&mut self) -> Result<()> {
        let result = self.serializer.write_end_element();
        self.forward(result)
    }

    fn write_end_document(&mut self) -> Result<()> {
        let result = self.serializer.write_end_document();
        self.forward(result)?;
        self.out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::XmlStreamCursor;

    #[test]
    fn test_copy_events_round_trip() {
        let xml = r#"<p:a xmlns:p="urn:p" p:k="v"><b>t &amp; u</b><!--c--><![CDATA[x]]></p:a>"#;
        let mut cursor = XmlStreamCursor::new(xml.as_bytes());
        let mut serializer = EventSerializer::new(CharEncoder::new());
        copy_events(&mut cursor, &mut serializer).unwrap();
        let out: String = serializer.take_chunk().into_iter().collect();
        assert_eq!(out, xml);
    }

    #[test]
    fn test_stream_writer_forwards_every_event() {
        let mut writer =
            StreamEventWriter::new(Vec::new(), EventSerializer::new(ByteEncoder::default()));
        writer.write_start_document().unwrap();
        writer.write_start_element("a").unwrap();
        writer.write_attribute("", "", "x", "1").unwrap();
        assert_eq!(writer.out, br#"<a x="1""#.to_vec());
        writer.write_characters("hi").unwrap();
        writer.write_end_document().unwrap();
        assert_eq!(writer.into_inner(), br#"<a x="1">hi</a>"#.to_vec());
    }
}
