use std::io::{self, Read};

use super::adapter::ChunkedAdapter;
use crate::constants::BUFFER_SIZE;
use crate::cursor::EventCursor;
use crate::writer::{ByteEncoder, Charset, EventSerializer};

/// Byte stream over the serialized events of a cursor.
///
/// Parse errors raised by the cursor while a read is being served surface as
/// [`io::ErrorKind::InvalidData`].
pub struct XmlEventInputStream<C: EventCursor> {
    inner: ChunkedAdapter<C, ByteEncoder>,
}

impl<C: EventCursor> XmlEventInputStream<C> {
    /// Creates a UTF-8 stream with the default staging buffer.
    pub fn new(cursor: C) -> Self {
        Self::with_charset(cursor, Charset::Utf8)
    }

    pub fn with_charset(cursor: C, charset: Charset) -> Self {
        Self::with_buffer_size(cursor, charset, BUFFER_SIZE)
    }

    pub fn with_buffer_size(cursor: C, charset: Charset, buffer_size: usize) -> Self {
        let serializer = EventSerializer::new(ByteEncoder::new(charset));
        Self::with_serializer(cursor, serializer, buffer_size)
    }

    /// Creates a stream that serializes through a preconfigured serializer.
    pub fn with_serializer(
        cursor: C,
        serializer: EventSerializer<ByteEncoder>,
        buffer_size: usize,
    ) -> Self {
        XmlEventInputStream {
            inner: ChunkedAdapter::new(cursor, serializer, buffer_size),
        }
    }

    /// Reads one byte; `None` at the end of the stream.
    pub fn read_byte(&mut self) -> io::Result<Option<u8>> {
        let mut one = [0u8];
        Ok(match self.read(&mut one)? {
            0 => None,
            _ => Some(one[0]),
        })
    }

    /// Capacity of the staging buffer.
    pub fn buffer_size(&self) -> usize {
        self.inner.buffer_size()
    }

    /// Returns the cursor, positioned after the last event serialized.
    pub fn into_cursor(self) -> C {
        self.inner.into_cursor()
    }
}

impl<C: EventCursor> Read for XmlEventInputStream<C> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read_units(buf).map_err(io::Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::XmlStreamCursor;

    #[test]
    fn test_read_to_end() {
        let cursor = XmlStreamCursor::new(r#"<a><b x="1">hi</b></a>"#.as_bytes());
        let mut stream = XmlEventInputStream::new(cursor);
        let mut out = String::new();
        stream.read_to_string(&mut out).unwrap();
        assert_eq!(out, r#"<a><b x="1">hi</b></a>"#);
    }

    #[test]
    fn test_read_byte() {
        let cursor = XmlStreamCursor::new("<a/>".as_bytes());
        let mut stream = XmlEventInputStream::with_buffer_size(cursor, Charset::Utf8, 2);
        let mut out = Vec::new();
        while let Some(b) = stream.read_byte().unwrap() {
            out.push(b);
        }
        assert_eq!(out, b"<a></a>");
        assert_eq!(stream.read_byte().unwrap(), None);
    }

    #[test]
    fn test_utf16_output() {
        let cursor = XmlStreamCursor::new("<a>é</a>".as_bytes());
        let mut stream = XmlEventInputStream::with_charset(cursor, Charset::Utf16Be);
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        let expected: Vec<u8> = "<a>é</a>".encode_utf16().flat_map(u16::to_be_bytes).collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn test_parse_error_is_invalid_data() {
        let cursor = XmlStreamCursor::new("<a><b></a>".as_bytes());
        let mut stream = XmlEventInputStream::new(cursor);
        let mut out = Vec::new();
        let err = stream.read_to_end(&mut out).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
