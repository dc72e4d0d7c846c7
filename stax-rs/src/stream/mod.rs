//! Byte and character streams over structural events.
//!
//! [`XmlEventInputStream`] implements [`std::io::Read`];
//! [`XmlEventCharReader`] implements [`CharRead`]. Both pull events from a
//! cursor only when a read needs more output, so memory use is bounded by
//! the staging buffer plus the serialization of a single event.

mod adapter;
mod input;
mod reader;

pub use input::XmlEventInputStream;
pub use reader::XmlEventCharReader;

use std::io;

/// Blocking read of Unicode scalar values.
pub trait CharRead {
    /// Reads characters into `buf` and returns how many were read. `Ok(0)`
    /// for a non-empty buffer means the end of the stream.
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize>;

    /// Reads a single character; `None` at the end of the stream.
    fn read_char(&mut self) -> io::Result<Option<char>> {
        let mut one = ['\0'];
        Ok(match self.read_chars(&mut one)? {
            0 => None,
            _ => Some(one[0]),
        })
    }

    /// Appends the rest of the stream to `out` and returns the number of
    /// characters read.
    fn read_to_string(&mut self, out: &mut String) -> io::Result<usize> {
        let mut buf = ['\0'; 1024];
        let mut total = 0;
        loop {
            let n = self.read_chars(&mut buf)?;
            if n == 0 {
                return Ok(total);
            }
            out.extend(&buf[..n]);
            total += n;
        }
    }
}

impl<R: CharRead + ?Sized> CharRead for Box<R> {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        (**self).read_chars(buf)
    }
}

/// A [`CharRead`] over an owned string.
#[derive(Debug, Clone)]
pub struct StrReader {
    text: String,
    pos: usize,
}

impl StrReader {
    pub fn new(text: impl Into<String>) -> Self {
        StrReader {
            text: text.into(),
            pos: 0,
        }
    }

    /// Returns the text not read yet.
    pub fn remaining(&self) -> &str {
        &self.text[self.pos..]
    }
}

impl CharRead for StrReader {
    fn read_chars(&mut self, buf: &mut [char]) -> io::Result<usize> {
        let mut n = 0;
        for (slot, c) in buf.iter_mut().zip(self.text[self.pos..].chars()) {
            *slot = c;
            self.pos += c.len_utf8();
            n += 1;
        }
        Ok(n)
    }
}
