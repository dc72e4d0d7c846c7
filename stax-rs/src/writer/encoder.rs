//! Encoding step of the event serializer.
//!
//! The serializer produces markup as `&str` fragments; a [`ChunkEncoder`]
//! appends each fragment to the chunk in its output unit. Byte output goes
//! through a [`Charset`], character output is stored as `char`s.

use std::collections::VecDeque;
use std::fmt;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, UTF_8};

use crate::error::{Error, Result};

/// Appends serialized markup to a chunk buffer.
pub trait ChunkEncoder {
    /// Unit of the produced stream (`u8` or `char`).
    type Unit: Copy + Default + fmt::Debug;

    /// Encodes `text` and appends it to `out`.
    fn encode(&mut self, text: &str, out: &mut VecDeque<Self::Unit>);

    /// Name written in the `encoding` pseudo-attribute of the XML
    /// declaration, if the stream has one.
    fn encoding_name(&self) -> Option<&str>;
}

/// Output charset of a byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Charset {
    #[default]
    Utf8,
    Utf16Le,
    Utf16Be,
    /// Any other encoding known to `encoding_rs`. Characters it cannot
    /// represent are written as numeric character references.
    Other(&'static Encoding),
}

impl Charset {
    /// Resolves a charset from an encoding label such as `UTF-8` or `latin1`.
    pub fn for_label(label: &str) -> Result<Charset> {
        let encoding = Encoding::for_label(label.trim().as_bytes())
            .ok_or_else(|| Error::Encoding(format!("unsupported charset '{}'", label)))?;
        Ok(if encoding == UTF_8 {
            Charset::Utf8
        } else if encoding == UTF_16LE {
            Charset::Utf16Le
        } else if encoding == UTF_16BE {
            Charset::Utf16Be
        } else {
            Charset::Other(encoding)
        })
    }

    /// Canonical name of the charset.
    pub fn name(&self) -> &'static str {
        match self {
            Charset::Utf8 => "UTF-8",
            Charset::Utf16Le => "UTF-16LE",
            Charset::Utf16Be => "UTF-16BE",
            Charset::Other(encoding) => encoding.name(),
        }
    }
}

impl fmt::Display for Charset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Encodes markup into bytes of a [`Charset`].
#[derive(Debug, Clone, Default)]
pub struct ByteEncoder {
    charset: Charset,
}

impl ByteEncoder {
    pub fn new(charset: Charset) -> Self {
        ByteEncoder { charset }
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }
}

impl ChunkEncoder for ByteEncoder {
    type Unit = u8;

    fn encode(&mut self, text: &str, out: &mut VecDeque<u8>) {
        match self.charset {
            Charset::Utf8 => out.extend(text.as_bytes()),
            Charset::Utf16Le => {
                for unit in text.encode_utf16() {
                    out.extend(unit.to_le_bytes());
                }
            }
            Charset::Utf16Be => {
                for unit in text.encode_utf16() {
                    out.extend(unit.to_be_bytes());
                }
            }
            Charset::Other(encoding) => {
                let (bytes, _, _) = encoding.encode(text);
                out.extend(bytes.iter());
            }
        }
    }

    fn encoding_name(&self) -> Option<&str> {
        Some(self.charset.name())
    }
}

/// Keeps markup as characters.
#[derive(Debug, Clone, Default)]
pub struct CharEncoder {
    /// Encoding announced in the XML declaration.
    declared: Option<String>,
}

impl CharEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Announces `label` as the document encoding in the XML declaration.
    pub fn declaring(label: impl Into<String>) -> Self {
        CharEncoder {
            declared: Some(label.into()),
        }
    }
}

impl ChunkEncoder for CharEncoder {
    type Unit = char;

    fn encode(&mut self, text: &str, out: &mut VecDeque<char>) {
        out.extend(text.chars());
    }

    fn encoding_name(&self) -> Option<&str> {
        self.declared.as_deref()
    }
}
