//! Forward-only cursors over structural XML events.
//!
//! A cursor starts positioned on [`XmlEvent::StartDocument`] and is advanced
//! with [`EventCursor::next`] until it reaches [`XmlEvent::EndDocument`].
//! Three cursors ship with the crate:
//!
//! - [`XmlStreamCursor`] pulls events from a byte source through quick-xml.
//! - [`TreeCursor`] walks a parsed [`Document`](crate::dom::Document).
//! - [`EventListCursor`] replays an owned list of events.

mod decode;
mod list;
mod namespace;
mod stream;
mod tree;

pub use list::EventListCursor;
pub use namespace::NamespaceContext;
pub use stream::XmlStreamCursor;
pub use tree::TreeCursor;

pub(crate) use decode::decode_document;

use crate::error::{Error, Result};
use crate::event::{Attribute, EventType, Namespace, XmlEvent};

/// A forward-only cursor over structural events.
pub trait EventCursor {
    /// Returns the event the cursor is positioned on.
    fn current(&self) -> &XmlEvent;

    /// Returns true until the cursor is positioned on the end of the document.
    fn has_next(&self) -> bool;

    /// Advances to the next event and returns its type.
    ///
    /// Fails with [`Error::Stream`] when called after the end of the document.
    fn next(&mut self) -> Result<EventType>;

    /// Returns the type of the current event.
    fn event_type(&self) -> EventType {
        self.current().event_type()
    }

    /// Returns the qualified name of the current start or end element.
    fn name(&self) -> Option<&str> {
        self.current().name()
    }

    /// Returns the attributes of the current start element.
    fn attributes(&self) -> &[Attribute] {
        self.current().attributes()
    }

    /// Returns the namespace declarations of the current start element.
    fn namespaces(&self) -> &[Namespace] {
        self.current().namespaces()
    }

    /// Returns the text of the current character, CDATA or comment event.
    fn text(&self) -> Option<&str> {
        self.current().text()
    }
}

impl<C: EventCursor + ?Sized> EventCursor for Box<C> {
    fn current(&self) -> &XmlEvent {
        (**self).current()
    }

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<EventType> {
        (**self).next()
    }
}

impl<C: EventCursor + ?Sized> EventCursor for &mut C {
    fn current(&self) -> &XmlEvent {
        (**self).current()
    }

    fn has_next(&self) -> bool {
        (**self).has_next()
    }

    fn next(&mut self) -> Result<EventType> {
        (**self).next()
    }
}

/// Collects every remaining event, starting with the current one.
pub fn collect_events<C: EventCursor + ?Sized>(cursor: &mut C) -> Result<Vec<XmlEvent>> {
    let mut events = vec![cursor.current().clone()];
    while cursor.has_next() {
        cursor.next()?;
        events.push(cursor.current().clone());
    }
    Ok(events)
}

pub(crate) fn exhausted() -> Error {
    Error::Stream("cursor has no more events".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_events_through_box() {
        let cursor = EventListCursor::new(vec![
            XmlEvent::start_element("a"),
            XmlEvent::end_element("a"),
        ]);
        let mut boxed: Box<dyn EventCursor> = Box::new(cursor);
        let events = collect_events(&mut boxed).unwrap();
        assert_eq!(
            events,
            vec![
                XmlEvent::StartDocument,
                XmlEvent::start_element("a"),
                XmlEvent::end_element("a"),
                XmlEvent::EndDocument,
            ]
        );
        assert!(!boxed.has_next());
        assert!(boxed.next().is_err());
    }
}
