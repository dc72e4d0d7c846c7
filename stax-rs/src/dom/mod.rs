//! Parsed XML document trees.
//!
//! A [`Document`] owns an optional root [`Element`] plus the comments that
//! surround it. Trees are built from any [`EventCursor`](crate::cursor::EventCursor)
//! with [`Document::from_cursor`] and turned back into events with
//! [`TreeCursor`](crate::cursor::TreeCursor).

mod builder;

use crate::event::{Attribute, Namespace};

/// A child of an element, or a top-level node of a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    CData(String),
    Comment(String),
}

impl Node {
    /// Returns true if this is an element node.
    pub fn is_element(&self) -> bool {
        matches!(self, Node::Element(_))
    }

    /// Returns true if this is a text or CDATA node.
    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_) | Node::CData(_))
    }

    /// Returns a reference to the element, if this is an element node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns a mutable reference to the element, if this is an element node.
    pub fn as_element_mut(&mut self) -> Option<&mut Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }

    /// Returns the character data of a text or CDATA node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Node::Text(t) | Node::CData(t) => Some(t),
            _ => None,
        }
    }
}

/// An XML element with its namespace declarations, attributes and children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// The qualified name of the element (e.g., "div", "ns:element").
    name: String,
    /// Namespace declarations in document order.
    namespaces: Vec<Namespace>,
    /// Attributes in document order.
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element with no attributes or children.
    pub fn new(name: impl Into<String>) -> Self {
        Element {
            name: name.into(),
            namespaces: Vec::new(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Creates an element from the parts of a start element event.
    pub fn with_parts(name: String, namespaces: Vec<Namespace>, attributes: Vec<Attribute>) -> Self {
        Element {
            name,
            namespaces,
            attributes,
            children: Vec::new(),
        }
    }

    pub fn with_attribute(mut self, attribute: Attribute) -> Self {
        self.attributes.push(attribute);
        self
    }

    pub fn with_namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the local part of the element name.
    pub fn local_name(&self) -> &str {
        self.name.split_once(':').map_or(&self.name, |(_, local)| local)
    }

    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Looks up an attribute value by qualified name.
    pub fn attribute(&self, qname: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.qname() == qname)
            .map(|a| a.value.as_str())
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn children_mut(&mut self) -> &mut Vec<Node> {
        &mut self.children
    }

    pub fn push_child(&mut self, child: Node) {
        self.children.push(child);
    }

    /// Iterates over the child elements, skipping text and comments.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// Concatenates the character data of all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                Node::Text(t) | Node::CData(t) => out.push_str(t),
                Node::Element(e) => e.collect_text(out),
                Node::Comment(_) => {}
            }
        }
    }

    /// Splits the element into name, namespaces, attributes and children.
    pub fn into_parts(self) -> (String, Vec<Namespace>, Vec<Attribute>, Vec<Node>) {
        (self.name, self.namespaces, self.attributes, self.children)
    }
}

/// A parsed document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Comments before the root element.
    prolog: Vec<Node>,
    root: Option<Element>,
    /// Comments after the root element.
    epilog: Vec<Node>,
}

impl Document {
    /// Creates a document with the given root element.
    pub fn new(root: Element) -> Self {
        Document {
            prolog: Vec::new(),
            root: Some(root),
            epilog: Vec::new(),
        }
    }

    pub fn root(&self) -> Option<&Element> {
        self.root.as_ref()
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.root.as_mut()
    }

    pub fn into_root(self) -> Option<Element> {
        self.root
    }

    pub fn set_root(&mut self, root: Element) {
        self.root = Some(root);
    }

    pub fn prolog(&self) -> &[Node] {
        &self.prolog
    }

    pub fn epilog(&self) -> &[Node] {
        &self.epilog
    }

    pub fn push_prolog(&mut self, node: Node) {
        self.prolog.push(node);
    }

    pub fn push_epilog(&mut self, node: Node) {
        self.epilog.push(node);
    }

    /// Splits the document into prolog, root and epilog.
    pub fn into_parts(self) -> (Vec<Node>, Option<Element>, Vec<Node>) {
        (self.prolog, self.root, self.epilog)
    }
}

impl From<Element> for Document {
    fn from(root: Element) -> Self {
        Document::new(root)
    }
}
