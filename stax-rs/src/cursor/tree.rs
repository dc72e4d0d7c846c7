//! Cursor that walks a parsed document tree.

use super::{exhausted, EventCursor};
use crate::dom::{Document, Element, Node};
use crate::error::Result;
use crate::event::{EventType, XmlEvent};

/// Lazily emits the events of a [`Document`] or a detached [`Element`].
///
/// The tree is consumed as it is walked; only the chain of open elements is
/// kept on the stack.
#[derive(Debug)]
pub struct TreeCursor {
    current: XmlEvent,
    /// Top-level nodes still to be emitted (prolog, root, epilog).
    top: std::vec::IntoIter<Node>,
    /// Open elements with their remaining children.
    open: Vec<(String, std::vec::IntoIter<Node>)>,
}

impl TreeCursor {
    /// Creates a cursor over a whole document.
    pub fn new(document: Document) -> Self {
        let (prolog, root, epilog) = document.into_parts();
        let mut top = prolog;
        top.extend(root.map(Node::Element));
        top.extend(epilog);
        Self::from_nodes(top)
    }

    /// Creates a cursor over a single element, treated as the document root.
    pub fn from_element(element: Element) -> Self {
        Self::from_nodes(vec![Node::Element(element)])
    }

    fn from_nodes(nodes: Vec<Node>) -> Self {
        TreeCursor {
            current: XmlEvent::StartDocument,
            top: nodes.into_iter(),
            open: Vec::new(),
        }
    }

    /// Returns the number of currently open elements.
    pub fn depth(&self) -> usize {
        self.open.len()
    }
}

impl EventCursor for TreeCursor {
    fn current(&self) -> &XmlEvent {
        &self.current
    }

    fn has_next(&self) -> bool {
        !matches!(self.current, XmlEvent::EndDocument)
    }

    fn next(&mut self) -> Result<EventType> {
        if !self.has_next() {
            return Err(exhausted());
        }

        let node = match self.open.last_mut() {
            Some((_, children)) => children.next(),
            None => self.top.next(),
        };

        self.current = match node {
            Some(Node::Element(element)) => {
                let (name, namespaces, attributes, children) = element.into_parts();
                self.open.push((name.clone(), children.into_iter()));
                XmlEvent::StartElement {
                    name,
                    attributes,
                    namespaces,
                }
            }
            Some(Node::Text(text)) => XmlEvent::Characters(text),
            Some(Node::CData(text)) => XmlEvent::CData(text),
            Some(Node::Comment(text)) => XmlEvent::Comment(text),
            None => match self.open.pop() {
                Some((name, _)) => XmlEvent::EndElement { name },
                None => XmlEvent::EndDocument,
            },
        };

        Ok(self.current.event_type())
    }
}
