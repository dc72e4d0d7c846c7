//! Conversions between XML representations.
//!
//! [`XmlConverter`] offers typed conversions (text to tree, tree to byte
//! stream, and so on) and a dynamic [`convert`](XmlConverter::convert) entry
//! point backed by a priority-ordered converter table.
//!
//! Two kinds of failure are kept apart:
//!
//! - `Ok(None)` means no converter handles the pair, or the chosen converter
//!   declined the payload or produced a different representation.
//! - `Err(_)` means a converter ran and the input was malformed or could not
//!   be serialized.

mod context;
mod payload;
mod registry;

pub use context::ConversionContext;
pub use payload::{EventSource, Payload, PayloadKind, StaxSource, StreamSource};
pub use registry::{ConvertFn, ConverterEntry, ConverterRegistry, BUILTIN_ORDER};

use std::io::{self, Read};
use std::path::Path;

use log::{debug, trace, warn};

use crate::config::ConverterConfig;
use crate::cursor::{collect_events, EventCursor, TreeCursor};
use crate::dom::{Document, Element};
use crate::error::Result;
use crate::factory::{
    DocumentBuilder, DocumentBuilderFactory, OutputProperties, Transformer, WriterFactory,
};
use crate::stax::StaxConverter;
use crate::stream::{StrReader, XmlEventCharReader, XmlEventInputStream};

/// Converts XML between text, bytes, trees, event lists, cursors and streams.
#[derive(Debug, Clone)]
pub struct XmlConverter {
    stax: StaxConverter,
    document_builder_factory: DocumentBuilderFactory,
    output_properties: OutputProperties,
    registry: ConverterRegistry,
}

impl Default for XmlConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl XmlConverter {
    pub fn new() -> Self {
        Self::with_stax(StaxConverter::new())
    }

    /// Creates a converter that takes cursors and writers from `stax`.
    pub fn with_stax(stax: StaxConverter) -> Self {
        let output_properties = stax
            .output_factory()
            .map(|factory| factory.properties().clone())
            .unwrap_or_default();
        let document_builder_factory = stax
            .input_factory()
            .map(|factory| DocumentBuilderFactory::with_features(factory.features()))
            .unwrap_or_default();
        XmlConverter {
            stax,
            document_builder_factory,
            output_properties,
            registry: ConverterRegistry::with_builtin(),
        }
    }

    pub fn from_config(config: &ConverterConfig) -> Result<Self> {
        let stax = StaxConverter::from_config(config)?;
        let mut converter = Self::with_stax(stax);
        converter.document_builder_factory =
            DocumentBuilderFactory::with_features(config.parser.features());
        converter.output_properties = config.output.clone();
        debug!("Created XML converter with {} converters", converter.registry.len());
        Ok(converter)
    }

    pub fn stax(&self) -> &StaxConverter {
        &self.stax
    }

    pub fn registry(&self) -> &ConverterRegistry {
        &self.registry
    }

    /// Adds a converter to the table. It takes precedence over the built-in
    /// one for the same pair if its order is lower than [`BUILTIN_ORDER`].
    pub fn register(&mut self, entry: ConverterEntry) {
        self.registry.register(entry);
    }

    pub fn document_builder_factory(&self) -> &DocumentBuilderFactory {
        &self.document_builder_factory
    }

    pub fn set_document_builder_factory(&mut self, factory: DocumentBuilderFactory) {
        self.document_builder_factory = factory;
    }

    pub fn output_properties(&self) -> &OutputProperties {
        &self.output_properties
    }

    /// Sets the default output properties, including those of the stream
    /// adapters.
    pub fn set_output_properties(&mut self, properties: OutputProperties) {
        self.stax
            .set_output_factory(WriterFactory::with_properties(properties.clone()));
        self.output_properties = properties;
    }

    // Text, bytes and files to trees

    pub fn to_document_from_str(&self, xml: &str) -> Result<Document> {
        self.document_builder_factory
            .new_document_builder()
            .parse_str(xml)
    }

    pub fn to_document_from_bytes(&self, xml: &[u8]) -> Result<Document> {
        self.document_builder_factory
            .new_document_builder()
            .parse_bytes(xml)
    }

    pub fn to_document_from_reader<R: Read>(&self, source: R) -> Result<Document> {
        self.document_builder_factory
            .new_document_builder()
            .parse_reader(source)
    }

    pub fn to_document_from_path<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        self.document_builder_factory
            .new_document_builder()
            .parse_path(path)
    }

    /// Builds a tree from the current and remaining events of `cursor`.
    pub fn to_document_from_cursor<C: EventCursor + ?Sized>(&self, cursor: &mut C) -> Result<Document> {
        Document::from_cursor(cursor)
    }

    pub fn to_document_from_element(&self, element: Element) -> Document {
        Document::new(element)
    }

    /// Returns the root element of `document`, or `None` if it has none.
    pub fn to_root_element(&self, document: Document) -> Option<Element> {
        document.into_root()
    }

    // Trees to text and bytes

    pub fn to_string(&self, document: &Document) -> Result<String> {
        self.to_string_with(document, &self.output_properties)
    }

    pub fn to_string_with(&self, document: &Document, properties: &OutputProperties) -> Result<String> {
        Transformer::new(properties.clone()).document_to_string(document)
    }

    pub fn to_bytes(&self, document: &Document) -> Result<Vec<u8>> {
        self.to_bytes_with(document, &self.output_properties)
    }

    pub fn to_bytes_with(&self, document: &Document, properties: &OutputProperties) -> Result<Vec<u8>> {
        Transformer::new(properties.clone()).document_to_bytes(document)
    }

    // Cursor sources

    /// Creates a cursor source over a copy of `xml`. Parse errors surface
    /// while the cursor is advanced.
    pub fn to_stax_source_from_str(&self, xml: &str) -> StaxSource {
        let source = io::Cursor::new(xml.as_bytes().to_vec());
        StaxSource::new(self.stax.create_text_cursor(source))
    }

    pub fn to_stax_source_from_bytes(&self, xml: Vec<u8>) -> StaxSource {
        StaxSource::new(self.stax.create_cursor(io::Cursor::new(xml)))
    }

    pub fn to_stax_source_from_reader<R: Read + Send + 'static>(&self, source: R) -> StaxSource {
        StaxSource::new(self.stax.create_cursor_from_read(source))
    }

    // Stream sources

    pub fn to_stream_source_from_str(&self, xml: &str) -> StreamSource {
        StreamSource::from_char_read(StrReader::new(xml))
    }

    pub fn to_stream_source_from_bytes(&self, xml: Vec<u8>) -> StreamSource {
        StreamSource::from_read(io::Cursor::new(xml))
    }

    // Event sources

    pub fn to_event_source(&self, document: &Document) -> Result<EventSource> {
        let events = collect_events(&mut TreeCursor::new(document.clone()))?;
        Ok(EventSource::new(events))
    }

    pub fn to_event_source_from_str(&self, xml: &str) -> Result<EventSource> {
        let events = collect_events(&mut self.stax.create_cursor_from_str(xml))?;
        Ok(EventSource::new(events))
    }

    // Lazy streams over trees

    /// Serializes `document` lazily as a byte stream in the output encoding.
    pub fn to_input_stream(&self, document: &Document) -> Result<XmlEventInputStream<TreeCursor>> {
        self.stax.create_input_stream(TreeCursor::new(document.clone()))
    }

    pub fn to_reader(&self, document: &Document) -> XmlEventCharReader<TreeCursor> {
        self.stax.create_reader(TreeCursor::new(document.clone()))
    }

    // Dynamic conversion

    /// Converts `payload` to the `target` representation with the default
    /// settings.
    pub fn convert(&self, payload: Payload, target: PayloadKind) -> Result<Option<Payload>> {
        self.convert_with(payload, target, &ConversionContext::default())
    }

    /// Converts `payload` to the `target` representation. Settings present
    /// in `ctx` override the converter defaults.
    pub fn convert_with(
        &self,
        payload: Payload,
        target: PayloadKind,
        ctx: &ConversionContext,
    ) -> Result<Option<Payload>> {
        let from = payload.kind();
        if from == target {
            return Ok(Some(payload));
        }
        let Some(entry) = self.registry.lookup(from, target) else {
            debug!("No converter from {} to {}", from, target);
            return Ok(None);
        };
        trace!("Converting {} to {} (order {})", from, target, entry.order);
        match (entry.convert)(self, payload, ctx)? {
            Some(converted) if converted.kind() != target => {
                warn!(
                    "Converter from {} to {} produced {}; discarding it",
                    from,
                    target,
                    converted.kind()
                );
                Ok(None)
            }
            converted => Ok(converted),
        }
    }

    fn document_builder(&self, ctx: &ConversionContext) -> DocumentBuilder {
        ctx.document_builder_factory()
            .unwrap_or(&self.document_builder_factory)
            .new_document_builder()
    }

    fn output_properties_for<'a>(&'a self, ctx: &'a ConversionContext) -> &'a OutputProperties {
        ctx.output_properties().unwrap_or(&self.output_properties)
    }

    fn transformer_for(&self, ctx: &ConversionContext) -> Transformer {
        Transformer::new(self.output_properties_for(ctx).clone())
    }

    fn input_stream_for<C: EventCursor>(
        &self,
        cursor: C,
        ctx: &ConversionContext,
    ) -> Result<XmlEventInputStream<C>> {
        match ctx.output_properties() {
            Some(properties) => {
                let serializer = WriterFactory::with_properties(properties.clone())
                    .create_byte_serializer()?;
                Ok(XmlEventInputStream::with_serializer(
                    cursor,
                    serializer,
                    self.stax.buffer_size(),
                ))
            }
            None => self.stax.create_input_stream(cursor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::event::XmlEvent;
    use crate::factory::ParserFeatures;
    use crate::stream::CharRead;

    const XML: &str = r#"<a><b x="1">hi</b></a>"#;

    #[test]
    fn test_text_document_round_trip() {
        let converter = XmlConverter::new();
        let document = converter.to_document_from_str(XML).unwrap();
        assert_eq!(converter.to_string(&document).unwrap(), XML);
        assert_eq!(converter.to_bytes(&document).unwrap(), XML.as_bytes());
    }

    #[test]
    fn test_output_properties_override() {
        let converter = XmlConverter::new();
        let document = converter.to_document_from_str("<a/>").unwrap();
        let props = OutputProperties {
            encoding: "UTF-8".into(),
            omit_xml_declaration: false,
        };
        assert_eq!(
            converter.to_string_with(&document, &props).unwrap(),
            r#"<?xml version="1.0" encoding="UTF-8"?><a></a>"#
        );
    }

    #[test]
    fn test_input_stream_and_reader() {
        let converter = XmlConverter::new();
        let document = converter.to_document_from_str(XML).unwrap();

        let mut bytes = Vec::new();
        converter
            .to_input_stream(&document)
            .unwrap()
            .read_to_end(&mut bytes)
            .unwrap();
        assert_eq!(bytes, XML.as_bytes());

        let mut text = String::new();
        converter.to_reader(&document).read_to_string(&mut text).unwrap();
        assert_eq!(text, XML);
    }

    #[test]
    fn test_event_sources() {
        let converter = XmlConverter::new();
        let from_text = converter.to_event_source_from_str(XML).unwrap();
        let document = converter.to_document_from_str(XML).unwrap();
        let from_tree = converter.to_event_source(&document).unwrap();
        assert_eq!(from_text, from_tree);
        assert_eq!(from_text.events().first(), Some(&XmlEvent::StartDocument));
        assert_eq!(from_text.events().last(), Some(&XmlEvent::EndDocument));
    }

    #[test]
    fn test_stax_source_reports_errors_lazily() {
        let converter = XmlConverter::new();
        let mut source = converter.to_stax_source_from_str("<a><b></a>");
        let err = collect_events(source.cursor_mut()).unwrap_err();
        assert!(matches!(err, Error::Xml(_) | Error::Parse(_)));
    }

    #[test]
    fn test_root_element() {
        let converter = XmlConverter::new();
        let document = converter.to_document_from_str(XML).unwrap();
        let root = converter.to_root_element(document).unwrap();
        assert_eq!(root.name(), "a");
        assert!(converter.to_root_element(Document::default()).is_none());
        let again = converter.to_document_from_element(root);
        assert_eq!(converter.to_string(&again).unwrap(), XML);
    }

    #[test]
    fn test_convert_soft_and_hard_failures() {
        let converter = XmlConverter::new();
        let unsupported = converter
            .convert(Payload::from(XML.as_bytes().to_vec()), PayloadKind::Element)
            .unwrap();
        assert!(unsupported.is_none());

        let declined = converter
            .convert(Payload::from(Document::default()), PayloadKind::Element)
            .unwrap();
        assert!(declined.is_none());

        let malformed = converter.convert(Payload::from("<a><b></a>"), PayloadKind::Document);
        assert!(malformed.is_err());
    }

    #[test]
    fn test_convert_chain() {
        let converter = XmlConverter::new();
        let events = converter
            .convert(Payload::from(XML), PayloadKind::Events)
            .unwrap()
            .unwrap();
        let cursor = converter.convert(events, PayloadKind::Cursor).unwrap().unwrap();
        let document = converter.convert(cursor, PayloadKind::Document).unwrap().unwrap();
        let stream = converter.convert(document, PayloadKind::Stream).unwrap().unwrap();
        let text = converter.convert(stream, PayloadKind::Text).unwrap().unwrap();
        assert_eq!(text.into_text().unwrap(), XML);
    }

    #[test]
    fn test_identity_conversion() {
        let converter = XmlConverter::new();
        let same = converter.convert(Payload::from(XML), PayloadKind::Text).unwrap().unwrap();
        assert_eq!(same.into_text().unwrap(), XML);
    }

    #[test]
    fn test_context_overrides_defaults() {
        let converter = XmlConverter::new();
        let mut factory = DocumentBuilderFactory::new();
        factory.set_feature("ignore-comments", true);
        let ctx = ConversionContext::new()
            .with_document_builder_factory(factory)
            .with_output_properties(OutputProperties {
                encoding: "UTF-16BE".into(),
                omit_xml_declaration: true,
            });

        let document = converter
            .convert_with(Payload::from("<a><!--c--></a>"), PayloadKind::Document, &ctx)
            .unwrap()
            .unwrap();
        let bytes = converter
            .convert_with(document, PayloadKind::Bytes, &ctx)
            .unwrap()
            .unwrap()
            .into_bytes()
            .unwrap();
        let expected: Vec<u8> = "<a></a>".encode_utf16().flat_map(u16::to_be_bytes).collect();
        assert_eq!(bytes, expected);
    }

    #[test]
    fn test_from_config() {
        let config = ConverterConfig::from_properties([
            ("xmlstax.parser.feature:trim-text", "true"),
            ("xmlstax.buffer-size", "3"),
        ])
        .unwrap();
        let converter = XmlConverter::from_config(&config).unwrap();
        assert_eq!(
            converter.document_builder_factory().features(),
            ParserFeatures::TRIM_TEXT
        );
        let document = converter.to_document_from_str("<a>  x  </a>").unwrap();
        assert_eq!(converter.to_string(&document).unwrap(), "<a>x</a>");
        assert_eq!(converter.to_input_stream(&document).unwrap().buffer_size(), 3);
    }

    #[test]
    fn test_custom_converter_takes_precedence() {
        fn shout(_: &XmlConverter, payload: Payload, _: &ConversionContext) -> Result<Option<Payload>> {
            Ok(payload.into_text().map(|t| Payload::Bytes(t.to_uppercase().into_bytes())))
        }
        let mut converter = XmlConverter::new();
        converter.register(ConverterEntry::new(
            BUILTIN_ORDER - 1,
            PayloadKind::Text,
            PayloadKind::Bytes,
            shout,
        ));
        let out = converter.convert(Payload::from("<a/>"), PayloadKind::Bytes).unwrap().unwrap();
        assert_eq!(out.into_bytes().unwrap(), b"<A/>");
    }

    #[test]
    fn test_result_of_wrong_kind_is_discarded() {
        fn echo(_: &XmlConverter, payload: Payload, _: &ConversionContext) -> Result<Option<Payload>> {
            Ok(Some(payload))
        }
        let mut converter = XmlConverter::new();
        converter.register(ConverterEntry::new(
            BUILTIN_ORDER - 1,
            PayloadKind::Text,
            PayloadKind::Stream,
            echo,
        ));
        let out = converter.convert(Payload::from("<a/>"), PayloadKind::Stream).unwrap();
        assert!(out.is_none());
    }

    #[test]
    fn test_cursor_then_stream() {
        let converter = XmlConverter::new();
        let cursor = converter
            .convert(Payload::from(XML), PayloadKind::Cursor)
            .unwrap()
            .unwrap();
        let Payload::Stream(StreamSource::Bytes(mut stream)) = converter
            .convert(cursor, PayloadKind::Stream)
            .unwrap()
            .unwrap()
        else {
            panic!("expected a byte stream");
        };
        let mut out = Vec::new();
        let mut buf = [0u8; 4];
        loop {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                break;
            }
            out.extend_from_slice(&buf[..n]);
        }
        assert_eq!(out, XML.as_bytes());
    }

    #[test]
    fn test_every_pair_of_representations_converts() {
        use PayloadKind::*;

        let converter = XmlConverter::new();
        let document = converter.to_document_from_str(XML).unwrap();
        let make = |kind: PayloadKind| -> Payload {
            let payload = Payload::from(document.clone());
            if kind == Document {
                return payload;
            }
            converter.convert(payload, kind).unwrap().unwrap()
        };

        let kinds = [Text, Bytes, Document, Element, Events, Cursor, Stream];
        for from in kinds {
            for to in kinds {
                // Only a document has a root element to extract.
                if to == Element && from != Document && from != Element {
                    continue;
                }
                let converted = converter
                    .convert(make(from), to)
                    .unwrap()
                    .unwrap_or_else(|| panic!("no conversion from {} to {}", from, to));
                assert_eq!(converted.kind(), to);
                let text = converter
                    .convert(converted, Text)
                    .unwrap()
                    .unwrap()
                    .into_text()
                    .unwrap();
                assert_eq!(text, XML, "{} -> {}", from, to);
            }
        }
    }

    #[test]
    fn test_bytes_and_text_use_document_encoding() {
        let converter = XmlConverter::new();
        let latin1 = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><a>\xE9</a>";
        let text = converter
            .convert(Payload::from(latin1.to_vec()), PayloadKind::Text)
            .unwrap()
            .unwrap()
            .into_text()
            .unwrap();
        assert!(text.ends_with("<a>é</a>"));
        let bytes = converter
            .convert(Payload::from("<a>é</a>"), PayloadKind::Bytes)
            .unwrap()
            .unwrap();
        assert_eq!(bytes.into_bytes().unwrap(), "<a>é</a>".as_bytes());
    }
}
