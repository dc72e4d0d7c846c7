//! Builds document trees from event cursors.

use super::{Document, Element, Node};
use crate::cursor::EventCursor;
use crate::error::{Error, Result};
use crate::event::XmlEvent;

impl Document {
    /// Builds a document from the events of a cursor, starting with the
    /// current one.
    ///
    /// A cursor positioned on a start element yields a document whose root is
    /// that element; reading stops once the element is closed.
    pub fn from_cursor<C: EventCursor + ?Sized>(cursor: &mut C) -> Result<Document> {
        let mut document = Document::default();
        let mut stack: Vec<Element> = Vec::new();
        let subtree = matches!(cursor.current(), XmlEvent::StartElement { .. });

        loop {
            match cursor.current() {
                XmlEvent::StartDocument => {}
                XmlEvent::StartElement {
                    name,
                    attributes,
                    namespaces,
                } => {
                    if stack.is_empty() && document.root.is_some() {
                        return Err(Error::Parse(
                            "document has more than one root element".to_string(),
                        ));
                    }
                    stack.push(Element::with_parts(
                        name.clone(),
                        namespaces.clone(),
                        attributes.clone(),
                    ));
                }
                XmlEvent::EndElement { name } => {
                    let element = stack.pop().ok_or_else(|| {
                        Error::Parse(format!("end element '{}' has no start element", name))
                    })?;
                    if element.name() != name.as_str() {
                        return Err(Error::Parse(format!(
                            "end element '{}' does not match start element '{}'",
                            name,
                            element.name()
                        )));
                    }
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(Node::Element(element)),
                        None => {
                            document.root = Some(element);
                            if subtree {
                                break;
                            }
                        }
                    }
                }
                XmlEvent::Characters(text) => match stack.last_mut() {
                    Some(parent) => match parent.children_mut().last_mut() {
                        // Cursors may split a text run; keep one node per run.
                        Some(Node::Text(existing)) => existing.push_str(text),
                        _ => parent.push_child(Node::Text(text.clone())),
                    },
                    None if text.trim().is_empty() => {}
                    None => {
                        return Err(Error::Parse(
                            "character content is not allowed outside the root element"
                                .to_string(),
                        ));
                    }
                },
                XmlEvent::CData(text) => match stack.last_mut() {
                    Some(parent) => parent.push_child(Node::CData(text.clone())),
                    None => {
                        return Err(Error::Parse(
                            "CDATA is not allowed outside the root element".to_string(),
                        ));
                    }
                },
                XmlEvent::Comment(text) => {
                    let node = Node::Comment(text.clone());
                    match stack.last_mut() {
                        Some(parent) => parent.push_child(node),
                        None if document.root.is_none() => document.push_prolog(node),
                        None => document.push_epilog(node),
                    }
                }
                XmlEvent::EndDocument => break,
            }

            if !cursor.has_next() {
                break;
            }
            cursor.next()?;
        }

        if let Some(open) = stack.last() {
            return Err(Error::Parse(format!(
                "unexpected end of events inside element '{}'",
                open.name()
            )));
        }
        if document.root.is_none() {
            return Err(Error::Parse("document has no root element".to_string()));
        }
        Ok(document)
    }
}
