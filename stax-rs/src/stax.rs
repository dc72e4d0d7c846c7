//! Pooled creation of cursors, event writers and stream adapters.

use std::io::{BufRead, BufReader, Read, Write};
use std::sync::Arc;

use log::debug;

use crate::config::ConverterConfig;
use crate::constants::BUFFER_SIZE;
use crate::cursor::{EventCursor, XmlStreamCursor};
use crate::error::Result;
use crate::factory::{ParserFactory, WriterFactory};
use crate::pool::FactoryPool;
use crate::stream::{XmlEventCharReader, XmlEventInputStream};
use crate::writer::{ByteEncoder, CharEncoder, EventSerializer, StreamEventWriter};

/// Creates cursors and writers from pooled factories.
///
/// Each creation leases a factory for the duration of the call. A factory
/// set with [`set_input_factory`](Self::set_input_factory) or
/// [`set_output_factory`](Self::set_output_factory) is used instead of the
/// pool and never enters it.
#[derive(Debug, Clone)]
pub struct StaxConverter {
    input_pool: Arc<FactoryPool<ParserFactory>>,
    output_pool: Arc<FactoryPool<WriterFactory>>,
    input_factory: Option<ParserFactory>,
    output_factory: Option<WriterFactory>,
    buffer_size: usize,
}

impl Default for StaxConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl StaxConverter {
    /// Creates a converter with its own default-sized pools.
    pub fn new() -> Self {
        Self::with_pools(
            Arc::new(FactoryPool::with_default_capacity()),
            Arc::new(FactoryPool::with_default_capacity()),
        )
    }

    /// Creates a converter sharing the given pools.
    pub fn with_pools(
        input_pool: Arc<FactoryPool<ParserFactory>>,
        output_pool: Arc<FactoryPool<WriterFactory>>,
    ) -> Self {
        StaxConverter {
            input_pool,
            output_pool,
            input_factory: None,
            output_factory: None,
            buffer_size: BUFFER_SIZE,
        }
    }

    /// Creates a converter from configuration. Non-default parser or output
    /// settings are installed as injected factories.
    pub fn from_config(config: &ConverterConfig) -> Result<Self> {
        config.validate()?;
        let capacity = config.pool_capacity();
        let mut converter = Self::with_pools(
            Arc::new(FactoryPool::new(capacity)),
            Arc::new(FactoryPool::new(capacity)),
        );
        converter.buffer_size = config.buffer_size;

        let features = config.parser.features();
        if !features.is_empty() {
            converter.set_input_factory(ParserFactory::with_features(features));
        }
        if config.output != Default::default() {
            converter.set_output_factory(WriterFactory::with_properties(config.output.clone()));
        }
        debug!(
            "Created StAX converter (pool capacity {}, buffer size {})",
            capacity, config.buffer_size
        );
        Ok(converter)
    }

    pub fn set_input_factory(&mut self, factory: ParserFactory) {
        self.input_factory = Some(factory);
    }

    pub fn set_output_factory(&mut self, factory: WriterFactory) {
        self.output_factory = Some(factory);
    }

    pub fn input_factory(&self) -> Option<&ParserFactory> {
        self.input_factory.as_ref()
    }

    pub fn output_factory(&self) -> Option<&WriterFactory> {
        self.output_factory.as_ref()
    }

    pub fn input_pool(&self) -> &Arc<FactoryPool<ParserFactory>> {
        &self.input_pool
    }

    pub fn output_pool(&self) -> &Arc<FactoryPool<WriterFactory>> {
        &self.output_pool
    }

    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Sets the staging buffer size of the stream adapters (at least one).
    pub fn set_buffer_size(&mut self, buffer_size: usize) {
        self.buffer_size = buffer_size.max(1);
    }

    pub fn create_cursor<R: BufRead>(&self, source: R) -> XmlStreamCursor<R> {
        let factory = self
            .input_pool
            .lease(self.input_factory.as_ref(), ParserFactory::new);
        factory.create_cursor(source)
    }

    /// Creates a cursor over text that is already decoded to UTF-8.
    pub fn create_text_cursor<R: BufRead>(&self, source: R) -> XmlStreamCursor<R> {
        let factory = self
            .input_pool
            .lease(self.input_factory.as_ref(), ParserFactory::new);
        factory.create_text_cursor(source)
    }

    pub fn create_cursor_from_str<'a>(&self, xml: &'a str) -> XmlStreamCursor<&'a [u8]> {
        self.create_text_cursor(xml.as_bytes())
    }

    pub fn create_cursor_from_bytes<'a>(&self, xml: &'a [u8]) -> XmlStreamCursor<&'a [u8]> {
        self.create_cursor(xml)
    }

    pub fn create_cursor_from_read<R: Read>(&self, source: R) -> XmlStreamCursor<BufReader<R>> {
        self.create_cursor(BufReader::new(source))
    }

    pub fn create_byte_serializer(&self) -> Result<EventSerializer<ByteEncoder>> {
        let factory = self
            .output_pool
            .lease(self.output_factory.as_ref(), WriterFactory::new);
        factory.create_byte_serializer()
    }

    pub fn create_char_serializer(&self) -> EventSerializer<CharEncoder> {
        let factory = self
            .output_pool
            .lease(self.output_factory.as_ref(), WriterFactory::new);
        factory.create_char_serializer()
    }

    pub fn create_event_writer<W: Write>(&self, out: W) -> Result<StreamEventWriter<W>> {
        Ok(StreamEventWriter::new(out, self.create_byte_serializer()?))
    }

    /// Exposes the events of `cursor` as a byte stream in the configured
    /// output encoding.
    pub fn create_input_stream<C: EventCursor>(&self, cursor: C) -> Result<XmlEventInputStream<C>> {
        let serializer = self.create_byte_serializer()?;
        Ok(XmlEventInputStream::with_serializer(cursor, serializer, self.buffer_size))
    }

    /// Exposes the events of `cursor` as a character stream.
    pub fn create_reader<C: EventCursor>(&self, cursor: C) -> XmlEventCharReader<C> {
        XmlEventCharReader::with_serializer(cursor, self.create_char_serializer(), self.buffer_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParserSettings;
    use crate::factory::{OutputProperties, ParserFeatures};
    use crate::stream::CharRead;

    #[test]
    fn test_factories_return_to_pool() {
        let converter = StaxConverter::new();
        let _cursor = converter.create_cursor_from_str("<a/>");
        assert_eq!(converter.input_pool().len(), 1);
        let _cursor = converter.create_cursor_from_bytes(b"<b/>");
        assert_eq!(converter.input_pool().len(), 1);
        converter.create_event_writer(Vec::new()).unwrap();
        assert_eq!(converter.output_pool().len(), 1);
    }

    #[test]
    fn test_injected_factories_bypass_pool() {
        let mut converter = StaxConverter::new();
        converter.set_input_factory(ParserFactory::with_features(ParserFeatures::TRIM_TEXT));
        let mut cursor = converter.create_cursor_from_str("<a>  x  </a>");
        cursor.next().unwrap();
        cursor.next().unwrap();
        assert_eq!(cursor.text(), Some("x"));
        assert!(converter.input_pool().is_empty());
    }

    #[test]
    fn test_pools_are_shared() {
        let inputs = Arc::new(FactoryPool::new(2));
        let outputs = Arc::new(FactoryPool::new(2));
        let a = StaxConverter::with_pools(Arc::clone(&inputs), Arc::clone(&outputs));
        let b = StaxConverter::with_pools(Arc::clone(&inputs), Arc::clone(&outputs));
        a.create_cursor_from_str("<a/>");
        b.create_cursor_from_str("<b/>");
        assert_eq!(inputs.len(), 1);
    }

    #[test]
    fn test_from_config() {
        let config = ConverterConfig {
            pool_capacity: Some(5),
            buffer_size: 7,
            output: OutputProperties {
                encoding: "UTF-16LE".into(),
                omit_xml_declaration: true,
            },
            parser: ParserSettings::default(),
        };
        let converter = StaxConverter::from_config(&config).unwrap();
        assert_eq!(converter.buffer_size(), 7);
        assert_eq!(converter.input_pool().capacity(), 5);
        assert!(converter.input_factory().is_none());
        assert!(converter.output_factory().is_some());

        let cursor = converter.create_cursor_from_str("<a/>");
        let mut stream = converter.create_input_stream(cursor).unwrap();
        assert_eq!(stream.buffer_size(), 7);
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b"<\0a\0>\0<\0/\0a\0>\0");
        assert!(converter.output_pool().is_empty());
    }

    #[test]
    fn test_create_reader() {
        let converter = StaxConverter::new();
        let cursor = converter.create_cursor_from_read("<r><x/></r>".as_bytes());
        let mut reader = converter.create_reader(cursor);
        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "<r><x></x></r>");
    }
}
