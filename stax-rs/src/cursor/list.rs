//! Cursor that replays a materialized list of events.

use super::{exhausted, EventCursor};
use crate::error::Result;
use crate::event::{EventType, XmlEvent};

/// Replays an owned sequence of events.
///
/// The sequence may omit the leading start-document and trailing
/// end-document events; the cursor supplies them.
#[derive(Debug)]
pub struct EventListCursor {
    current: XmlEvent,
    events: std::vec::IntoIter<XmlEvent>,
}

impl EventListCursor {
    pub fn new(events: Vec<XmlEvent>) -> Self {
        let mut events = events.into_iter();
        if events.as_slice().first() == Some(&XmlEvent::StartDocument) {
            events.next();
        }
        EventListCursor {
            current: XmlEvent::StartDocument,
            events,
        }
    }
}

impl EventCursor for EventListCursor {
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
        self.current = self.events.next().unwrap_or(XmlEvent::EndDocument);
        Ok(self.current.event_type())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::collect_events;

    #[test]
    fn test_supplies_document_boundaries() {
        let mut cursor = EventListCursor::new(vec![XmlEvent::start_element("a")]);
        assert_eq!(cursor.event_type(), EventType::StartDocument);
        assert_eq!(cursor.next().unwrap(), EventType::StartElement);
        assert_eq!(cursor.next().unwrap(), EventType::EndDocument);
        assert!(!cursor.has_next());
    }

    #[test]
    fn test_explicit_boundaries_are_not_duplicated() {
        let events = vec![
            XmlEvent::StartDocument,
            XmlEvent::start_element("a"),
            XmlEvent::end_element("a"),
            XmlEvent::EndDocument,
        ];
        let replayed = collect_events(&mut EventListCursor::new(events.clone())).unwrap();
        assert_eq!(replayed, events);
    }
}
