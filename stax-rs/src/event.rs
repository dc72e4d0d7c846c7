//! Structural XML events.
//!
//! An [`XmlEvent`] is one node-level unit of a document's linear traversal.
//! Cursors produce them lazily in document order and event writers consume
//! them one at a time.

use std::fmt;

/// Discriminant of an [`XmlEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventType {
    StartDocument,
    StartElement,
    EndElement,
    Characters,
    CData,
    Comment,
    EndDocument,
}

/// An attribute of a start element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    /// Prefix of the qualified name (empty for unprefixed attributes).
    pub prefix: String,
    /// Namespace URI bound to the prefix (empty when unprefixed).
    pub namespace_uri: String,
    /// Local part of the name.
    pub local_name: String,
    /// Unescaped value.
    pub value: String,
}

impl Attribute {
    /// Creates an attribute with no namespace.
    pub fn new(local_name: impl Into<String>, value: impl Into<String>) -> Self {
        Attribute {
            prefix: String::new(),
            namespace_uri: String::new(),
            local_name: local_name.into(),
            value: value.into(),
        }
    }

    /// Creates a namespace-qualified attribute.
    pub fn qualified(
        prefix: impl Into<String>,
        namespace_uri: impl Into<String>,
        local_name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Attribute {
            prefix: prefix.into(),
            namespace_uri: namespace_uri.into(),
            local_name: local_name.into(),
            value: value.into(),
        }
    }

    /// Returns the qualified name as written in the document.
    pub fn qname(&self) -> String {
        if self.prefix.is_empty() {
            self.local_name.clone()
        } else {
            format!("{}:{}", self.prefix, self.local_name)
        }
    }
}

/// A namespace declaration on a start element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Namespace {
    /// Declared prefix; empty for the default namespace.
    pub prefix: String,
    /// Namespace URI.
    pub uri: String,
}

impl Namespace {
    pub fn new(prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        Namespace {
            prefix: prefix.into(),
            uri: uri.into(),
        }
    }

    /// Declares the default namespace.
    pub fn default_namespace(uri: impl Into<String>) -> Self {
        Self::new("", uri)
    }

    pub fn is_default(&self) -> bool {
        self.prefix.is_empty()
    }
}

/// A structural XML event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartDocument,
    StartElement {
        /// Qualified element name.
        name: String,
        /// Attributes in document order.
        attributes: Vec<Attribute>,
        /// Namespace declarations in document order.
        namespaces: Vec<Namespace>,
    },
    EndElement {
        /// Qualified element name.
        name: String,
    },
    Characters(String),
    CData(String),
    Comment(String),
    EndDocument,
}

impl XmlEvent {
    /// Creates a start element event with no attributes or namespaces.
    pub fn start_element(name: impl Into<String>) -> Self {
        XmlEvent::StartElement {
            name: name.into(),
            attributes: Vec::new(),
            namespaces: Vec::new(),
        }
    }

    pub fn end_element(name: impl Into<String>) -> Self {
        XmlEvent::EndElement { name: name.into() }
    }

    pub fn characters(text: impl Into<String>) -> Self {
        XmlEvent::Characters(text.into())
    }

    /// Returns the discriminant of this event.
    pub fn event_type(&self) -> EventType {
        match self {
            XmlEvent::StartDocument => EventType::StartDocument,
            XmlEvent::StartElement { .. } => EventType::StartElement,
            XmlEvent::EndElement { .. } => EventType::EndElement,
            XmlEvent::Characters(_) => EventType::Characters,
            XmlEvent::CData(_) => EventType::CData,
            XmlEvent::Comment(_) => EventType::Comment,
            XmlEvent::EndDocument => EventType::EndDocument,
        }
    }

    /// Returns the element name for start and end element events.
    pub fn name(&self) -> Option<&str> {
        match self {
            XmlEvent::StartElement { name, .. } | XmlEvent::EndElement { name } => Some(name),
            _ => None,
        }
    }

    /// Returns the text of character, CDATA and comment events.
    pub fn text(&self) -> Option<&str> {
        match self {
            XmlEvent::Characters(t) | XmlEvent::CData(t) | XmlEvent::Comment(t) => Some(t),
            _ => None,
        }
    }

    /// Returns the attributes of a start element, or an empty slice.
    pub fn attributes(&self) -> &[Attribute] {
        match self {
            XmlEvent::StartElement { attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns the namespace declarations of a start element, or an empty slice.
    pub fn namespaces(&self) -> &[Namespace] {
        match self {
            XmlEvent::StartElement { namespaces, .. } => namespaces,
            _ => &[],
        }
    }
}

impl fmt::Display for XmlEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            XmlEvent::StartDocument => write!(f, "START_DOCUMENT"),
            XmlEvent::StartElement {
                name,
                attributes,
                namespaces,
            } => {
                write!(f, "START_ELEMENT {}", name)?;
                for ns in namespaces {
                    if ns.is_default() {
                        write!(f, " xmlns={:?}", ns.uri)?;
                    } else {
                        write!(f, " xmlns:{}={:?}", ns.prefix, ns.uri)?;
                    }
                }
                for attr in attributes {
                    write!(f, " {}={:?}", attr.qname(), attr.value)?;
                }
                Ok(())
            }
            XmlEvent::EndElement { name } => write!(f, "END_ELEMENT {}", name),
            XmlEvent::Characters(t) => write!(f, "CHARACTERS {:?}", t),
            XmlEvent::CData(t) => write!(f, "CDATA {:?}", t),
            XmlEvent::Comment(t) => write!(f, "COMMENT {:?}", t),
            XmlEvent::EndDocument => write!(f, "END_DOCUMENT"),
        }
    }
}
