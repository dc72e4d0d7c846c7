//! Priority-ordered table of pairwise converters.

use std::io::{self, Read};

use super::context::ConversionContext;
use super::payload::{EventSource, Payload, PayloadKind, StaxSource, StreamSource};
use super::XmlConverter;
use crate::cursor::{collect_events, decode_document, TreeCursor};
use crate::dom::Document;
use crate::error::{Error, Result};
use crate::stream::CharRead;

/// Converts a payload. `Ok(None)` declines the conversion.
pub type ConvertFn = fn(&XmlConverter, Payload, &ConversionContext) -> Result<Option<Payload>>;

/// Order of the built-in converters. Entries with a lower order win.
pub const BUILTIN_ORDER: i32 = 100;

/// A converter registered for one `(from, to)` pair.
#[derive(Debug, Clone, Copy)]
pub struct ConverterEntry {
    pub order: i32,
    pub from: PayloadKind,
    pub to: PayloadKind,
    pub convert: ConvertFn,
}

impl ConverterEntry {
    pub fn new(order: i32, from: PayloadKind, to: PayloadKind, convert: ConvertFn) -> Self {
        ConverterEntry {
            order,
            from,
            to,
            convert,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConverterRegistry {
    entries: Vec<ConverterEntry>,
}

impl ConverterRegistry {
    /// Creates a registry holding the built-in converters.
    pub fn with_builtin() -> Self {
        use PayloadKind::*;

        let builtin: [(PayloadKind, PayloadKind, ConvertFn); 37] = [
            (Text, Document, text_to_document),
            (Bytes, Document, bytes_to_document),
            (Stream, Document, stream_to_document),
            (Cursor, Document, cursor_to_document),
            (Events, Document, events_to_document),
            (Element, Document, element_to_document),
            (Document, Element, document_to_element),
            (Document, Text, document_to_text),
            (Element, Text, element_to_text),
            (Cursor, Text, cursor_to_text),
            (Events, Text, events_to_text),
            (Stream, Text, stream_to_text),
            (Bytes, Text, bytes_to_text),
            (Document, Bytes, document_to_bytes),
            (Element, Bytes, element_to_bytes),
            (Cursor, Bytes, cursor_to_bytes),
            (Events, Bytes, events_to_bytes),
            (Stream, Bytes, stream_to_bytes),
            (Text, Bytes, text_to_bytes),
            (Text, Cursor, text_to_cursor),
            (Bytes, Cursor, bytes_to_cursor),
            (Document, Cursor, document_to_cursor),
            (Element, Cursor, element_to_cursor),
            (Events, Cursor, events_to_cursor),
            (Stream, Cursor, stream_to_cursor),
            (Text, Events, text_to_events),
            (Bytes, Events, bytes_to_events),
            (Document, Events, document_to_events),
            (Element, Events, element_to_events),
            (Cursor, Events, cursor_to_events),
            (Stream, Events, stream_to_events),
            (Document, Stream, document_to_stream),
            (Element, Stream, element_to_stream),
            (Cursor, Stream, cursor_to_stream),
            (Events, Stream, events_to_stream),
            (Text, Stream, text_to_stream),
            (Bytes, Stream, bytes_to_stream),
        ];

        let mut registry = ConverterRegistry::default();
        for (from, to, convert) in builtin {
            registry.register(ConverterEntry::new(BUILTIN_ORDER, from, to, convert));
        }
        registry
    }

    pub fn register(&mut self, entry: ConverterEntry) {
        self.entries.push(entry);
    }

    /// Returns the converter with the lowest order for the pair. Among equal
    /// orders the first registered wins.
    pub fn lookup(&self, from: PayloadKind, to: PayloadKind) -> Option<&ConverterEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.from == from && entry.to == to)
            .min_by_key(|entry| entry.order)
    }

    pub fn entries(&self) -> &[ConverterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn text_to_document(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Text(text) = payload else {
        return Ok(None);
    };
    let document = conv.document_builder(ctx).parse_str(&text)?;
    Ok(Some(Payload::Document(document)))
}

fn bytes_to_document(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Bytes(bytes) = payload else {
        return Ok(None);
    };
    let document = conv.document_builder(ctx).parse_bytes(&bytes)?;
    Ok(Some(Payload::Document(document)))
}

fn stream_to_document(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Stream(source) = payload else {
        return Ok(None);
    };
    let builder = conv.document_builder(ctx);
    let document = match source {
        StreamSource::Bytes(reader) => builder.parse_reader(reader)?,
        StreamSource::Chars(mut reader) => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            builder.parse_str(&text)?
        }
    };
    Ok(Some(Payload::Document(document)))
}

fn cursor_to_document(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Cursor(mut source) = payload else {
        return Ok(None);
    };
    let document = conv.to_document_from_cursor(source.cursor_mut())?;
    Ok(Some(Payload::Document(document)))
}

fn events_to_document(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Events(events) = payload else {
        return Ok(None);
    };
    let document = conv.to_document_from_cursor(&mut events.into_cursor())?;
    Ok(Some(Payload::Document(document)))
}

fn element_to_document(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Element(element) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Document(conv.to_document_from_element(element))))
}

fn document_to_element(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Document(document) = payload else {
        return Ok(None);
    };
    Ok(conv.to_root_element(document).map(Payload::Element))
}

fn document_to_text(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Document(document) = payload else {
        return Ok(None);
    };
    let text = conv.to_string_with(&document, conv.output_properties_for(ctx))?;
    Ok(Some(Payload::Text(text)))
}

fn document_to_bytes(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Document(document) = payload else {
        return Ok(None);
    };
    let bytes = conv.to_bytes_with(&document, conv.output_properties_for(ctx))?;
    Ok(Some(Payload::Bytes(bytes)))
}

fn element_to_text(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Element(element) = payload else {
        return Ok(None);
    };
    document_to_text(conv, Payload::Document(Document::new(element)), ctx)
}

fn element_to_bytes(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Element(element) = payload else {
        return Ok(None);
    };
    document_to_bytes(conv, Payload::Document(Document::new(element)), ctx)
}

fn cursor_to_text(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Cursor(mut source) = payload else {
        return Ok(None);
    };
    let text = conv.transformer_for(ctx).transform_to_string(source.cursor_mut())?;
    Ok(Some(Payload::Text(text)))
}

fn events_to_text(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Events(events) = payload else {
        return Ok(None);
    };
    let text = conv
        .transformer_for(ctx)
        .transform_to_string(&mut events.into_cursor())?;
    Ok(Some(Payload::Text(text)))
}

fn stream_to_text(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Stream(mut source) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Text(source.read_to_string()?)))
}

fn text_to_cursor(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Text(text) = payload else {
        return Ok(None);
    };
    let cursor = conv.stax.create_text_cursor(io::Cursor::new(text.into_bytes()));
    Ok(Some(Payload::Cursor(StaxSource::new(cursor))))
}

fn bytes_to_cursor(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Bytes(bytes) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Cursor(conv.to_stax_source_from_bytes(bytes))))
}

fn document_to_cursor(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Document(document) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Cursor(StaxSource::new(TreeCursor::new(document)))))
}

fn events_to_cursor(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Events(events) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Cursor(StaxSource::new(events.into_cursor()))))
}

fn text_to_events(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Text(text) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Events(conv.to_event_source_from_str(&text)?)))
}

fn document_to_events(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Document(document) = payload else {
        return Ok(None);
    };
    let events = collect_events(&mut TreeCursor::new(document))?;
    Ok(Some(Payload::Events(EventSource::new(events))))
}

fn cursor_to_events(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Cursor(mut source) = payload else {
        return Ok(None);
    };
    let events = collect_events(source.cursor_mut())?;
    Ok(Some(Payload::Events(EventSource::new(events))))
}

fn document_to_stream(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Document(document) = payload else {
        return Ok(None);
    };
    let stream = conv.input_stream_for(TreeCursor::new(document), ctx)?;
    Ok(Some(Payload::Stream(StreamSource::from_read(stream))))
}

fn text_to_stream(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Text(text) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Stream(conv.to_stream_source_from_str(&text))))
}

fn bytes_to_stream(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Bytes(bytes) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Stream(conv.to_stream_source_from_bytes(bytes))))
}

fn bytes_to_text(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Bytes(bytes) = payload else {
        return Ok(None);
    };
    let text = decode_document(&bytes).map_err(|e| Error::Encoding(e.to_string()))?;
    Ok(Some(Payload::Text(text)))
}

/// Text is held as UTF-8, so its bytes are the UTF-8 encoding.
fn text_to_bytes(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Text(text) = payload else {
        return Ok(None);
    };
    Ok(Some(Payload::Bytes(text.into_bytes())))
}

fn cursor_to_bytes(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Cursor(mut source) = payload else {
        return Ok(None);
    };
    let bytes = conv.transformer_for(ctx).transform_to_bytes(source.cursor_mut())?;
    Ok(Some(Payload::Bytes(bytes)))
}

fn events_to_bytes(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Events(events) = payload else {
        return Ok(None);
    };
    let bytes = conv
        .transformer_for(ctx)
        .transform_to_bytes(&mut events.into_cursor())?;
    Ok(Some(Payload::Bytes(bytes)))
}

/// Byte streams are passed on as they are; character streams are encoded
/// as UTF-8.
fn stream_to_bytes(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Stream(source) = payload else {
        return Ok(None);
    };
    let bytes = match source {
        StreamSource::Bytes(mut reader) => {
            let mut bytes = Vec::new();
            reader.read_to_end(&mut bytes)?;
            bytes
        }
        StreamSource::Chars(mut reader) => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            text.into_bytes()
        }
    };
    Ok(Some(Payload::Bytes(bytes)))
}

fn element_to_cursor(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Element(element) = payload else {
        return Ok(None);
    };
    let cursor = TreeCursor::new(Document::new(element));
    Ok(Some(Payload::Cursor(StaxSource::new(cursor))))
}

/// Byte streams are parsed as they are read; character streams are read
/// to a string first.
fn stream_to_cursor(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Stream(source) = payload else {
        return Ok(None);
    };
    let cursor = match source {
        StreamSource::Bytes(reader) => conv.to_stax_source_from_reader(reader),
        StreamSource::Chars(mut reader) => {
            let mut text = String::new();
            reader.read_to_string(&mut text)?;
            let cursor = conv.stax.create_text_cursor(io::Cursor::new(text.into_bytes()));
            StaxSource::new(cursor)
        }
    };
    Ok(Some(Payload::Cursor(cursor)))
}

fn bytes_to_events(
    conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Bytes(bytes) = payload else {
        return Ok(None);
    };
    let events = collect_events(&mut conv.stax.create_cursor_from_bytes(&bytes))?;
    Ok(Some(Payload::Events(EventSource::new(events))))
}

fn element_to_events(
    _conv: &XmlConverter,
    payload: Payload,
    _ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Element(element) = payload else {
        return Ok(None);
    };
    let events = collect_events(&mut TreeCursor::new(Document::new(element)))?;
    Ok(Some(Payload::Events(EventSource::new(events))))
}

fn stream_to_events(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Some(Payload::Cursor(mut source)) = stream_to_cursor(conv, payload, ctx)? else {
        return Ok(None);
    };
    let events = collect_events(source.cursor_mut())?;
    Ok(Some(Payload::Events(EventSource::new(events))))
}

fn element_to_stream(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Element(element) = payload else {
        return Ok(None);
    };
    document_to_stream(conv, Payload::Document(Document::new(element)), ctx)
}

/// Wraps the cursor in a lazy byte stream; events are pulled as the stream
/// is read.
fn cursor_to_stream(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Cursor(source) = payload else {
        return Ok(None);
    };
    let stream = conv.input_stream_for(source.into_cursor(), ctx)?;
    Ok(Some(Payload::Stream(StreamSource::from_read(stream))))
}

fn events_to_stream(
    conv: &XmlConverter,
    payload: Payload,
    ctx: &ConversionContext,
) -> Result<Option<Payload>> {
    let Payload::Events(events) = payload else {
        return Ok(None);
    };
    let stream = conv.input_stream_for(events.into_cursor(), ctx)?;
    Ok(Some(Payload::Stream(StreamSource::from_read(stream))))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decline(_: &XmlConverter, _: Payload, _: &ConversionContext) -> Result<Option<Payload>> {
        Ok(None)
    }

    #[test]
    fn test_builtin_pairs_are_unique() {
        let registry = ConverterRegistry::with_builtin();
        for entry in registry.entries() {
            let same_pair = registry
                .entries()
                .iter()
                .filter(|e| e.from == entry.from && e.to == entry.to)
                .count();
            assert_eq!(same_pair, 1, "{} -> {}", entry.from, entry.to);
        }
    }

    #[test]
    fn test_lowest_order_wins() {
        let mut registry = ConverterRegistry::with_builtin();
        registry.register(ConverterEntry::new(
            BUILTIN_ORDER - 1,
            PayloadKind::Text,
            PayloadKind::Document,
            decline,
        ));
        registry.register(ConverterEntry::new(
            BUILTIN_ORDER + 1,
            PayloadKind::Document,
            PayloadKind::Text,
            decline,
        ));
        let chosen = registry.lookup(PayloadKind::Text, PayloadKind::Document).unwrap();
        assert_eq!(chosen.order, BUILTIN_ORDER - 1);
        let chosen = registry.lookup(PayloadKind::Document, PayloadKind::Text).unwrap();
        assert_eq!(chosen.order, BUILTIN_ORDER);
    }

    #[test]
    fn test_missing_pair() {
        let registry = ConverterRegistry::with_builtin();
        assert!(registry.lookup(PayloadKind::Bytes, PayloadKind::Element).is_none());
        assert!(ConverterRegistry::default().is_empty());
    }
}
