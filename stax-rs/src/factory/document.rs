//! Document builders: text, bytes and files to parsed trees.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use log::debug;

use super::parser::{ParserFactory, ParserFeatures};
use crate::dom::Document;
use crate::error::Result;

/// Configures and creates [`DocumentBuilder`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocumentBuilderFactory {
    parser: ParserFactory,
}

impl DocumentBuilderFactory {
    pub fn new() -> Self {
        debug!("Created document builder factory");
        Self::default()
    }

    pub fn with_features(features: ParserFeatures) -> Self {
        DocumentBuilderFactory {
            parser: ParserFactory::with_features(features),
        }
    }

    pub fn features(&self) -> ParserFeatures {
        self.parser.features()
    }

    /// See [`ParserFactory::set_feature`].
    pub fn set_feature(&mut self, name: &str, value: bool) -> bool {
        self.parser.set_feature(name, value)
    }

    pub fn new_document_builder(&self) -> DocumentBuilder {
        DocumentBuilder {
            parser: self.parser.clone(),
        }
    }
}

/// Parses complete documents into trees.
#[derive(Debug, Clone)]
pub struct DocumentBuilder {
    parser: ParserFactory,
}

impl DocumentBuilder {
    pub fn parse_str(&self, xml: &str) -> Result<Document> {
        let mut cursor = self.parser.create_cursor_from_str(xml);
        Document::from_cursor(&mut cursor)
    }

    pub fn parse_bytes(&self, xml: &[u8]) -> Result<Document> {
        let mut cursor = self.parser.create_cursor_from_bytes(xml);
        Document::from_cursor(&mut cursor)
    }

    pub fn parse_reader<R: Read>(&self, source: R) -> Result<Document> {
        let mut cursor = self.parser.create_cursor_from_read(source);
        Document::from_cursor(&mut cursor)
    }

    pub fn parse_path<P: AsRef<Path>>(&self, path: P) -> Result<Document> {
        let file = File::open(path.as_ref())?;
        let mut cursor = self.parser.create_cursor(BufReader::new(file));
        Document::from_cursor(&mut cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Node;
    use crate::error::Error;
    use std::io::Write;

    #[test]
    fn test_parse_str() {
        let doc = DocumentBuilderFactory::new()
            .new_document_builder()
            .parse_str(r#"<a><b x="1">hi</b></a>"#)
            .unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.name(), "a");
        let b = root.child_elements().next().unwrap();
        assert_eq!(b.attribute("x"), Some("1"));
        assert_eq!(b.text_content(), "hi");
    }

    #[test]
    fn test_builder_honors_features() {
        let mut factory = DocumentBuilderFactory::new();
        factory.set_feature("ignore-comments", true);
        let doc = factory
            .new_document_builder()
            .parse_bytes(b"<a><!--c-->t</a>")
            .unwrap();
        assert_eq!(doc.root().unwrap().children(), &[Node::Text("t".into())]);
    }

    #[test]
    fn test_parse_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"<doc><item/></doc>").unwrap();
        let doc = DocumentBuilderFactory::new()
            .new_document_builder()
            .parse_path(file.path())
            .unwrap();
        assert_eq!(doc.root().unwrap().child_elements().count(), 1);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DocumentBuilderFactory::new()
            .new_document_builder()
            .parse_path(dir.path().join("missing.xml"))
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        let builder = DocumentBuilderFactory::new().new_document_builder();
        assert!(builder.parse_str("<a><b></a>").is_err());
        assert!(builder.parse_reader("not xml".as_bytes()).is_err());
    }
}
