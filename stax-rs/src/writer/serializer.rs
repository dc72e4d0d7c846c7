//! Event serializer that accumulates markup into a trimmable chunk.

use std::collections::VecDeque;
use std::io::Write;

use quick_xml::escape::{escape, partial_escape};

use super::encoder::ChunkEncoder;
use super::EventWriter;
use crate::constants::XMLNS;
use crate::error::{Error, Result};

/// Serializes structural events into an in-memory chunk of output units.
///
/// Start tags are left open until the next piece of content arrives, so
/// attributes and namespace declarations can follow the start element.
/// Empty elements are written as a start and end tag pair.
#[derive(Debug)]
pub struct EventSerializer<E: ChunkEncoder> {
    encoder: E,
    chunk: VecDeque<E::Unit>,
    /// Names of open elements, innermost last.
    open: Vec<String>,
    start_tag_open: bool,
    omit_declaration: bool,
    document_started: bool,
}

impl<E: ChunkEncoder> EventSerializer<E> {
    /// Creates a serializer that omits the XML declaration.
    pub fn new(encoder: E) -> Self {
        EventSerializer {
            encoder,
            chunk: VecDeque::new(),
            open: Vec::new(),
            start_tag_open: false,
            omit_declaration: true,
            document_started: false,
        }
    }

    /// Sets whether the start of the document writes an XML declaration.
    pub fn with_declaration(mut self, declaration: bool) -> Self {
        self.omit_declaration = !declaration;
        self
    }

    /// Number of serialized units not yet taken from the chunk.
    pub fn len(&self) -> usize {
        self.chunk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunk.is_empty()
    }

    /// Number of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Moves units from the front of the chunk into `dst` and returns how
    /// many were moved.
    pub fn drain_into(&mut self, dst: &mut [E::Unit]) -> usize {
        let n = dst.len().min(self.chunk.len());
        for (slot, unit) in dst.iter_mut().zip(self.chunk.drain(..n)) {
            *slot = unit;
        }
        n
    }

    /// Removes and returns the whole chunk.
    pub fn take_chunk(&mut self) -> Vec<E::Unit> {
        self.chunk.drain(..).collect()
    }

    fn emit(&mut self, text: &str) {
        self.encoder.encode(text, &mut self.chunk);
    }

    fn close_start_tag(&mut self) {
        if self.start_tag_open {
            self.emit(">");
            self.start_tag_open = false;
        }
    }

    fn require_start_tag(&self, what: &str) -> Result<()> {
        if self.start_tag_open {
            Ok(())
        } else {
            Err(Error::Stream(format!(
                "{} must directly follow a start element",
                what
            )))
        }
    }
}

impl<E: ChunkEncoder<Unit = u8>> EventSerializer<E> {
    /// Writes the chunk to `out` and clears it.
    pub fn write_chunk_to<W: Write + ?Sized>(&mut self, out: &mut W) -> Result<()> {
        let (front, back) = self.chunk.as_slices();
        out.write_all(front)?;
        out.write_all(back)?;
        self.chunk.clear();
        Ok(())
    }
}

impl<E: ChunkEncoder> EventWriter for EventSerializer<E> {
    fn write_start_document(&mut self) -> Result<()> {
        if self.document_started {
            return Ok(());
        }
        self.document_started = true;
        if self.omit_declaration {
            return Ok(());
        }
        let declaration = match self.encoder.encoding_name() {
            Some(name) => format!("<?xml version=\"1.0\" encoding=\"{}\"?>", name),
            None => "<?xml version=\"1.0\"?>".to_string(),
        };
        self.emit(&declaration);
        Ok(())
    }

    fn write_start_element(&mut self, name: &str) -> Result<()> {
        self.close_start_tag();
        self.emit("<");
        self.emit(name);
        self.open.push(name.to_string());
        self.start_tag_open = true;
        Ok(())
    }

    fn write_namespace(&mut self, prefix: &str, uri: &str) -> Result<()> {
        self.require_start_tag("a namespace declaration")?;
        self.emit(" ");
        self.emit(XMLNS);
        if !prefix.is_empty() {
            self.emit(":");
            self.emit(prefix);
        }
        self.emit("=\"");
        self.emit(&escape(uri));
        self.emit("\"");
        Ok(())
    }

    fn write_attribute(
        &mut self,
        prefix: &str,
        _namespace_uri: &str,
        local_name: &str,
        value: &str,
    ) -> Result<()> {
        self.require_start_tag("an attribute")?;
        self.emit(" ");
        if !prefix.is_empty() {
            self.emit(prefix);
            self.emit(":");
        }
        self.emit(local_name);
        self.emit("=\"");
        self.emit(&escape(value));
        self.emit("\"");
        Ok(())
    }

    fn write_characters(&mut self, text: &str) -> Result<()> {
        self.close_start_tag();
        self.emit(&partial_escape(text));
        Ok(())
    }

    fn write_cdata(&mut self, text: &str) -> Result<()> {
        self.close_start_tag();
        self.emit("<![CDATA[");
        // A terminator inside the content has to be split across sections.
        self.emit(&text.replace("]]>", "]]]]><![CDATA[>"));
        self.emit("]]>");
        Ok(())
    }

    fn write_comment(&mut self, text: &str) -> Result<()> {
        self.close_start_tag();
        self.emit("<!--");
        self.emit(text);
        self.emit("-->");
        Ok(())
    }

    fn write_end_element(&mut self) -> Result<()> {
        let name = self.open.pop().ok_or_else(|| {
            Error::Stream("end element written with no open element".to_string())
        })?;
        self.close_start_tag();
        self.emit("</");
        self.emit(&name);
        self.emit(">");
        Ok(())
    }

    fn write_end_document(&mut self) -> Result<()> {
        while !self.open.is_empty() {
            self.write_end_element()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{ByteEncoder, CharEncoder, Charset};

    fn serializer() -> EventSerializer<CharEncoder> {
        EventSerializer::new(CharEncoder::new())
    }

    fn output(s: &mut EventSerializer<CharEncoder>) -> String {
        s.take_chunk().into_iter().collect()
    }

    #[test]
    fn test_canonical_element_output() {
        let mut s = serializer();
        s.write_start_document().unwrap();
        s.write_start_element("a").unwrap();
        s.write_start_element("b").unwrap();
        s.write_attribute("", "", "x", "1").unwrap();
        s.write_characters("hi").unwrap();
        s.write_end_element().unwrap();
        s.write_end_element().unwrap();
        s.write_end_document().unwrap();
        assert_eq!(output(&mut s), r#"<a><b x="1">hi</b></a>"#);
    }

    #[test]
    fn test_empty_element_is_not_self_closed() {
        let mut s = serializer();
        s.write_start_element("e").unwrap();
        s.write_end_element().unwrap();
        assert_eq!(output(&mut s), "<e></e>");
    }

    #[test]
    fn test_namespaces_and_prefixed_attributes() {
        let mut s = serializer();
        s.write_start_element("p:a").unwrap();
        s.write_namespace("p", "urn:p").unwrap();
        s.write_namespace("", "urn:d").unwrap();
        s.write_attribute("p", "urn:p", "id", "7").unwrap();
        s.write_end_element().unwrap();
        assert_eq!(
            output(&mut s),
            r#"<p:a xmlns:p="urn:p" xmlns="urn:d" p:id="7"></p:a>"#
        );
    }

    #[test]
    fn test_escaping() {
        let mut s = serializer();
        s.write_start_element("r").unwrap();
        s.write_attribute("", "", "q", "a\"<&>").unwrap();
        s.write_characters("1 < 2 & 3 > \"x\"").unwrap();
        s.write_end_element().unwrap();
        assert_eq!(
            output(&mut s),
            r#"<r q="a&quot;&lt;&amp;&gt;">1 &lt; 2 &amp; 3 &gt; "x"</r>"#
        );
    }

    #[test]
    fn test_cdata_terminator_is_split() {
        let mut s = serializer();
        s.write_start_element("r").unwrap();
        s.write_cdata("a]]>b").unwrap();
        s.write_comment(" c ").unwrap();
        s.write_end_element().unwrap();
        assert_eq!(
            output(&mut s),
            "<r><![CDATA[a]]]]><![CDATA[>b]]><!-- c --></r>"
        );
    }

    #[test]
    fn test_declaration() {
        let mut s = EventSerializer::new(ByteEncoder::new(Charset::Utf8)).with_declaration(true);
        s.write_start_document().unwrap();
        s.write_start_document().unwrap();
        let bytes = s.take_chunk();
        assert_eq!(bytes, br#"<?xml version="1.0" encoding="UTF-8"?>"#.to_vec());

        let mut s = serializer().with_declaration(true);
        s.write_start_document().unwrap();
        assert_eq!(output(&mut s), r#"<?xml version="1.0"?>"#);
    }

    #[test]
    fn test_end_document_closes_open_elements() {
        let mut s = serializer();
        s.write_start_element("a").unwrap();
        s.write_start_element("b").unwrap();
        s.write_end_document().unwrap();
        assert_eq!(output(&mut s), "<a><b></b></a>");
        assert_eq!(s.depth(), 0);
    }

    #[test]
    fn test_misuse_is_reported() {
        let mut s = serializer();
        assert!(matches!(s.write_end_element(), Err(Error::Stream(_))));
        assert!(matches!(
            s.write_attribute("", "", "x", "1"),
            Err(Error::Stream(_))
        ));
        s.write_start_element("a").unwrap();
        s.write_characters("t").unwrap();
        assert!(s.write_namespace("p", "urn:p").is_err());
    }

    #[test]
    fn test_drain_into_trims_front() {
        let mut s = serializer();
        s.write_start_element("abc").unwrap();
        s.write_end_element().unwrap();
        let mut dst = ['\0'; 3];
        assert_eq!(s.drain_into(&mut dst), 3);
        assert_eq!(dst.iter().collect::<String>(), "<ab");
        assert_eq!(s.len(), "c></abc>".len());
        assert_eq!(output(&mut s), "c></abc>");
        assert!(s.is_empty());
    }

    #[test]
    fn test_write_chunk_to() {
        let mut s = EventSerializer::new(ByteEncoder::default());
        s.write_start_element("a").unwrap();
        s.write_end_element().unwrap();
        let mut out = Vec::new();
        s.write_chunk_to(&mut out).unwrap();
        assert_eq!(out, b"<a></a>");
        assert!(s.is_empty());
    }
}
