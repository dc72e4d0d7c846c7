//! Streaming cursor backed by quick-xml.
//!
//! The cursor reads the underlying source one quick-xml event at a time and
//! translates it into structural events. Adjacent text runs and entity
//! references are coalesced into a single characters event. DOCTYPE
//! declarations are rejected and only the predefined entities and character
//! references are expanded.
//!
//! Byte sources in encodings other than UTF-8 are transcoded before parsing
//! (see [`Utf8Source`]). Once a pull fails, every later pull fails with the
//! same error.

use std::collections::VecDeque;
use std::io::BufRead;

use log::debug;
use quick_xml::escape::{resolve_predefined_entity, unescape};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;

use super::decode::Utf8Source;
use super::namespace::{split_qname, NamespaceContext};
use super::{exhausted, EventCursor};
use crate::constants::XMLNS;
use crate::error::{Error, Result};
use crate::event::{Attribute, EventType, Namespace, XmlEvent};
use crate::factory::ParserFeatures;

/// A namespace-aware pull cursor over an XML byte source.
pub struct XmlStreamCursor<R> {
    reader: Reader<Utf8Source<R>>,
    buf: Vec<u8>,
    features: ParserFeatures,
    namespaces: NamespaceContext,
    current: XmlEvent,
    /// Events read ahead while coalescing text.
    pending: VecDeque<XmlEvent>,
    depth: usize,
    seen_root: bool,
    failure: Option<Error>,
}

impl<R: BufRead> XmlStreamCursor<R> {
    /// Creates a cursor with default parser features.
    pub fn new(source: R) -> Self {
        Self::with_features(source, ParserFeatures::empty())
    }

    /// Creates a cursor with the given parser features. The document
    /// encoding is detected from a byte order mark or the XML declaration.
    pub fn with_features(source: R, features: ParserFeatures) -> Self {
        Self::over(Utf8Source::new(source), features)
    }

    /// Creates a cursor over a source that is known to hold UTF-8, such as
    /// the bytes of a `&str`. An `encoding` in the XML declaration is ignored.
    pub fn utf8_with_features(source: R, features: ParserFeatures) -> Self {
        Self::over(Utf8Source::utf8(source), features)
    }

    fn over(source: Utf8Source<R>, features: ParserFeatures) -> Self {
        let mut reader = Reader::from_reader(source);
        reader.config_mut().expand_empty_elements = true;

        XmlStreamCursor {
            reader,
            buf: Vec::new(),
            features,
            namespaces: NamespaceContext::new(),
            current: XmlEvent::StartDocument,
            pending: VecDeque::new(),
            depth: 0,
            seen_root: false,
            failure: None,
        }
    }

    /// Returns the parser features this cursor was created with.
    pub fn features(&self) -> ParserFeatures {
        self.features
    }

    /// Returns the position of the reader in the UTF-8 form of the source.
    pub fn position(&self) -> u64 {
        self.reader.buffer_position()
    }

    /// Returns the underlying source.
    pub fn into_inner(self) -> R {
        self.reader.into_inner().into_inner()
    }

    /// Reads quick-xml events until one structural event is available.
    fn read_event(&mut self) -> Result<XmlEvent> {
        let mut text: Option<String> = None;

        loop {
            self.buf.clear();
            let event = self.reader.read_event_into(&mut self.buf)?.into_owned();
            // Pending text belongs to the element open before this event.
            let depth = self.depth;

            let structural = match event {
                Event::Text(e) => {
                    let raw = utf8(e.as_ref())?;
                    let unescaped = unescape(raw).map_err(|e| Error::Parse(e.to_string()))?;
                    push_text(&mut text, &unescaped);
                    continue;
                }
                Event::GeneralRef(e) => {
                    let name = utf8(e.as_ref())?;
                    let resolved = resolve_reference(name)?;
                    push_text(&mut text, &resolved);
                    continue;
                }
                Event::CData(e) => {
                    let content = utf8(e.as_ref())?.to_string();
                    if self.features.contains(ParserFeatures::COALESCING) {
                        push_text(&mut text, &content);
                        continue;
                    }
                    XmlEvent::CData(content)
                }
                Event::Start(ref e) => self.start_element(e)?,
                Event::End(ref e) => self.end_element(e)?,
                Event::Empty(ref e) => {
                    // Only reachable if empty-element expansion is disabled.
                    let start = self.start_element(e)?;
                    let end = self.end_element(&e.to_end())?;
                    self.pending.push_back(end);
                    start
                }
                Event::Comment(e) => {
                    if self.features.contains(ParserFeatures::IGNORE_COMMENTS) {
                        continue;
                    }
                    XmlEvent::Comment(utf8(e.as_ref())?.to_string())
                }
                Event::Decl(_) | Event::PI(_) => continue,
                Event::DocType(_) => {
                    return Err(Error::Security(
                        "DOCTYPE declarations are not allowed".to_string(),
                    ));
                }
                Event::Eof => {
                    if self.depth > 0 {
                        return Err(Error::Parse(format!(
                            "unexpected end of document with {} unclosed element(s)",
                            self.depth
                        )));
                    }
                    if !self.seen_root {
                        return Err(Error::Parse("document has no root element".to_string()));
                    }
                    XmlEvent::EndDocument
                }
            };

            return Ok(match self.take_text(text.take(), depth)? {
                Some(characters) => {
                    self.pending.push_front(structural);
                    characters
                }
                None => structural,
            });
        }
    }

    /// Turns accumulated text into a characters event. Whitespace between
    /// top-level constructs is dropped; other text there is an error.
    fn take_text(&self, text: Option<String>, depth: usize) -> Result<Option<XmlEvent>> {
        let Some(mut text) = text else {
            return Ok(None);
        };
        if depth > 0 {
            if self.features.contains(ParserFeatures::TRIM_TEXT) {
                let trimmed = text.trim();
                if trimmed.is_empty() {
                    return Ok(None);
                }
                if trimmed.len() != text.len() {
                    text = trimmed.to_string();
                }
            }
            return Ok(Some(XmlEvent::Characters(text)));
        }
        if text.trim().is_empty() {
            return Ok(None);
        }
        Err(Error::Parse(
            "character content is not allowed outside the root element".to_string(),
        ))
    }

    fn start_element(&mut self, e: &BytesStart) -> Result<XmlEvent> {
        if self.depth == 0 {
            if self.seen_root {
                return Err(Error::Parse("document has more than one root element".to_string()));
            }
            self.seen_root = true;
        }

        let name = utf8(e.name().as_ref())?.to_string();
        let mut namespaces = Vec::new();
        let mut raw_attributes = Vec::new();

        for attr_result in e.attributes() {
            let attr = attr_result.map_err(|e| Error::Parse(format!("Attribute error: {}", e)))?;
            let key = utf8(attr.key.as_ref())?.to_string();
            let value = attr
                .unescape_value()
                .map_err(|e| Error::Parse(e.to_string()))?
                .into_owned();

            if key == XMLNS {
                namespaces.push(Namespace::default_namespace(value));
            } else if let Some(prefix) = key.strip_prefix("xmlns:") {
                namespaces.push(Namespace::new(prefix, value));
            } else {
                raw_attributes.push((key, value));
            }
        }

        self.namespaces.push_scope();
        for ns in &namespaces {
            self.namespaces.bind(&ns.prefix, &ns.uri);
        }
        self.depth += 1;

        let (prefix, _) = split_qname(&name);
        if !prefix.is_empty() {
            self.resolve_prefix(prefix)?;
        }

        let mut attributes = Vec::with_capacity(raw_attributes.len());
        for (key, value) in raw_attributes {
            let (prefix, local) = split_qname(&key);
            let namespace_uri = if prefix.is_empty() {
                String::new()
            } else {
                self.resolve_prefix(prefix)?.to_string()
            };
            attributes.push(Attribute::qualified(prefix, namespace_uri, local, value));
        }

        Ok(XmlEvent::StartElement {
            name,
            attributes,
            namespaces,
        })
    }

    fn end_element(&mut self, e: &BytesEnd) -> Result<XmlEvent> {
        let name = utf8(e.name().as_ref())?.to_string();
        self.namespaces.pop_scope();
        self.depth = self.depth.saturating_sub(1);
        Ok(XmlEvent::EndElement { name })
    }

    fn resolve_prefix(&self, prefix: &str) -> Result<&str> {
        self.namespaces
            .resolve(prefix)
            .ok_or_else(|| Error::Parse(format!("unbound namespace prefix '{}'", prefix)))
    }
}

impl<R: BufRead> EventCursor for XmlStreamCursor<R> {
    fn current(&self) -> &XmlEvent {
        &self.current
    }

    fn has_next(&self) -> bool {
        !matches!(self.current, XmlEvent::EndDocument)
    }

    fn next(&mut self) -> Result<EventType> {
        if let Some(failure) = &self.failure {
            return Err(failure.repeat());
        }
        if !self.has_next() {
            return Err(exhausted());
        }
        let event = match self.pending.pop_front() {
            Some(event) => event,
            None => match self.read_event() {
                Ok(event) => event,
                Err(err) => {
                    debug!("cursor failed at byte {}: {}", self.position(), err);
                    self.failure = Some(err.repeat());
                    return Err(err);
                }
            },
        };
        if matches!(event, XmlEvent::EndDocument) {
            debug!("reached end of document at byte {}", self.position());
        }
        self.current = event;
        Ok(self.current.event_type())
    }
}

fn utf8(bytes: &[u8]) -> Result<&str> {
    std::str::from_utf8(bytes).map_err(|e| Error::Parse(e.to_string()))
}

fn push_text(text: &mut Option<String>, more: &str) {
    match text {
        Some(existing) => existing.push_str(more),
        None => *text = Some(more.to_string()),
    }
}

/// Resolves a general entity reference. Anything other than a character
/// reference or one of the five predefined entities would need a DTD.
fn resolve_reference(name: &str) -> Result<String> {
    if let Some(number) = name.strip_prefix('#') {
        let code = match number.strip_prefix('x') {
            Some(hex) => u32::from_str_radix(hex, 16),
            None => number.parse::<u32>(),
        }
        .map_err(|_| Error::Parse(format!("invalid character reference '&{};'", name)))?;
        return char::from_u32(code)
            .map(String::from)
            .ok_or_else(|| Error::Parse(format!("invalid character reference '&{};'", name)));
    }
    resolve_predefined_entity(name)
        .map(str::to_string)
        .ok_or_else(|| Error::Security(format!("reference to undeclared entity '&{};'", name)))
}
