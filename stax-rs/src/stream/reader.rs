use std::io;

use super::adapter::ChunkedAdapter;
use super::CharRead;
use crate::constants::BUFFER_SIZE;
use crate::cursor::EventCursor;
use crate::writer::{CharEncoder, EventSerializer};

/// Character stream over the serialized events of a cursor.
pub struct XmlEventCharReader<C: EventCursor> {
    inner: ChunkedAdapter<C, CharEncoder>,
}

impl<C: EventCursor> XmlEventCharReader<C> {
    pub fn new(cursor: C) -> Self {
        Self::with_buffer_size(cursor, BUFFER_SIZE)
    }

    pub fn with_buffer_size(cursor: C, buffer_size: usize) -> Self {
        Self::with_serializer(cursor, EventSerializer::new(CharEncoder::new()), buffer_size)
    }

    pub fn with_serializer(
        cursor: C,
        serializer: EventSerializer<CharEncoder>,
        buffer_size: usize,
    ) -> Self {
        XmlEventCharReader {
            inner: ChunkedAdapter::new(cursor, serializer, buffer_size),
        }
    }

    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size()
    }

    pub fn into_cursor(self) -> C {
        self.inner.into_cursor()
    }
}

impl<C: EventCursor> CharRead for XmlEventCharReader<C> {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        self.inner.read_units(buf).map_err(io::Error::from)
    }
}
