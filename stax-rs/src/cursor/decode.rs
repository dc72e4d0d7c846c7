//! Transcoding of document bytes to UTF-8 ahead of the parser.
//!
//! The document encoding is taken from a byte order mark, from the NUL
//! pattern of UTF-16 markup, or from the `encoding` pseudo-attribute of the
//! XML declaration, in that order. Anything else is read as UTF-8.

use std::io::{self, BufRead, Read};

use encoding_rs::{Decoder, DecoderResult, Encoding, UTF_16BE, UTF_16LE, UTF_8};

/// Longest prefix searched for the end of the XML declaration.
const DECLARATION_LIMIT: usize = 1024;

/// What the first bytes of a document say about its encoding.
enum Prefix {
    /// A byte order mark of the given length.
    Bom(usize, Option<&'static Encoding>),
    /// UTF-16 markup without a byte order mark.
    Utf16(&'static Encoding),
    /// An ASCII-compatible XML declaration.
    Declaration,
    Plain,
}

/// A [`BufRead`] that yields the UTF-8 form of an XML byte source.
pub(crate) struct Utf8Source<R> {
    inner: R,
    /// Bytes read while detecting the encoding, served before `inner`.
    head: Vec<u8>,
    head_pos: usize,
    detected: bool,
    /// `None` while the source is passed through unchanged.
    decoder: Option<Decoder>,
    out: Vec<u8>,
    out_pos: usize,
    finished: bool,
}

impl<R: BufRead> Utf8Source<R> {
    /// Detects the encoding of `inner` on first read.
    pub(crate) fn new(inner: R) -> Self {
        Utf8Source {
            inner,
            head: Vec::new(),
            head_pos: 0,
            detected: false,
            decoder: None,
            out: Vec::new(),
            out_pos: 0,
            finished: false,
        }
    }

    /// Passes `inner` through as UTF-8, whatever its declaration says.
    pub(crate) fn utf8(inner: R) -> Self {
        Utf8Source {
            detected: true,
            ..Self::new(inner)
        }
    }

    pub(crate) fn into_inner(self) -> R {
        self.inner
    }

    fn fill_head_until(&mut self, done: impl Fn(&[u8]) -> bool) -> io::Result<()> {
        while !done(self.head.as_slice()) {
            let available = self.inner.fill_buf()?;
            if available.is_empty() {
                break;
            }
            let n = available.len();
            self.head.extend_from_slice(available);
            self.inner.consume(n);
        }
        Ok(())
    }

    fn detect(&mut self) -> io::Result<()> {
        self.detected = true;
        self.fill_head_until(|head| head.len() >= 4)?;

        let encoding = match classify(&self.head) {
            Prefix::Bom(len, encoding) => {
                self.head_pos = len;
                encoding
            }
            Prefix::Utf16(encoding) => Some(encoding),
            Prefix::Declaration => {
                self.fill_head_until(|head| {
                    head.len() >= DECLARATION_LIMIT || find(head, b"?>").is_some()
                })?;
                declared_encoding(&self.head)?
            }
            Prefix::Plain => None,
        };

        self.decoder = encoding.map(Encoding::new_decoder_without_bom_handling);
        Ok(())
    }
}

/// Decodes a complete document to a string using its own encoding.
pub(crate) fn decode_document(bytes: &[u8]) -> io::Result<String> {
    let mut text = String::new();
    Utf8Source::new(bytes).read_to_string(&mut text)?;
    Ok(text)
}

impl<R: BufRead> Read for Utf8Source<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(buf.len());
        buf[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: BufRead> BufRead for Utf8Source<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if !self.detected {
            self.detect()?;
        }

        let Some(decoder) = self.decoder.as_mut() else {
            if self.head_pos < self.head.len() {
                return Ok(&self.head[self.head_pos..]);
            }
            return self.inner.fill_buf();
        };

        while self.out_pos == self.out.len() && !self.finished {
            let from_head = self.head_pos < self.head.len();
            let input: &[u8] = if from_head {
                &self.head[self.head_pos..]
            } else {
                self.inner.fill_buf()?
            };
            let last = input.is_empty();
            let capacity = decoder
                .max_utf8_buffer_length_without_replacement(input.len())
                .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidData, "input chunk too large"))?;

            self.out.clear();
            self.out.resize(capacity, 0);
            self.out_pos = 0;
            let (result, read, written) =
                decoder.decode_to_utf8_without_replacement(input, &mut self.out, last);
            self.out.truncate(written);

            if let DecoderResult::Malformed(_, _) = result {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("malformed {} input", decoder.encoding().name()),
                ));
            }
            if from_head {
                self.head_pos += read;
            } else {
                self.inner.consume(read);
            }
            self.finished = last;
        }
        Ok(&self.out[self.out_pos..])
    }

    fn consume(&mut self, amt: usize) {
        if self.decoder.is_some() {
            self.out_pos = (self.out_pos + amt).min(self.out.len());
        } else if self.head_pos < self.head.len() {
            self.head_pos = (self.head_pos + amt).min(self.head.len());
        } else {
            self.inner.consume(amt);
        }
    }
}

fn classify(head: &[u8]) -> Prefix {
    match head {
        [0xEF, 0xBB, 0xBF, ..] => Prefix::Bom(3, None),
        [0xFE, 0xFF, ..] => Prefix::Bom(2, Some(UTF_16BE)),
        [0xFF, 0xFE, ..] => Prefix::Bom(2, Some(UTF_16LE)),
        // Well-formed UTF-8 markup never contains NUL.
        [0, b, ..] if *b != 0 => Prefix::Utf16(UTF_16BE),
        [b, 0, ..] if *b != 0 => Prefix::Utf16(UTF_16LE),
        [b'<', b'?', b'x', b'm', ..] => Prefix::Declaration,
        _ => Prefix::Plain,
    }
}

/// Returns the decoder encoding named by the declaration at the start of
/// `head`, or `None` when the bytes can be read as UTF-8.
fn declared_encoding(head: &[u8]) -> io::Result<Option<&'static Encoding>> {
    let end = find(head, b"?>").unwrap_or(head.len());
    let Some(label) = encoding_label(&head[..end]) else {
        return Ok(None);
    };
    let encoding = Encoding::for_label(label).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("unsupported encoding '{}'", String::from_utf8_lossy(label)),
        )
    })?;
    // A UTF-16 label on ASCII-compatible bytes is read as UTF-8.
    if encoding == UTF_8 || encoding == UTF_16LE || encoding == UTF_16BE {
        return Ok(None);
    }
    Ok(Some(encoding))
}

fn encoding_label(declaration: &[u8]) -> Option<&[u8]> {
    let at = find(declaration, b"encoding")?;
    let rest = trim_start(&declaration[at + b"encoding".len()..]);
    let rest = trim_start(rest.strip_prefix(b"=")?);
    let (&quote, rest) = rest.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }
    let close = rest.iter().position(|&b| b == quote)?;
    Some(&rest[..close])
}

fn trim_start(bytes: &[u8]) -> &[u8] {
    let skip = bytes.iter().take_while(|b| b.is_ascii_whitespace()).count();
    &bytes[skip..]
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode(bytes: &[u8]) -> String {
        decode_document(bytes).unwrap()
    }

    fn utf16le(text: &str, bom: bool) -> Vec<u8> {
        let mut bytes = if bom { vec![0xFF, 0xFE] } else { Vec::new() };
        bytes.extend(text.encode_utf16().flat_map(u16::to_le_bytes));
        bytes
    }

    #[test]
    fn test_utf8_passes_through() {
        assert_eq!(decode("<a>é</a>".as_bytes()), "<a>é</a>");
        assert_eq!(decode(b"\xEF\xBB\xBF<a/>"), "<a/>");
    }

    #[test]
    fn test_declared_single_byte_encoding() {
        let bytes = b"<?xml version=\"1.0\" encoding='ISO-8859-1'?><a>\xE9</a>";
        assert_eq!(
            decode(bytes),
            "<?xml version=\"1.0\" encoding='ISO-8859-1'?><a>é</a>"
        );
    }

    #[test]
    fn test_utf16_with_and_without_bom() {
        assert_eq!(decode(&utf16le("<a>ü</a>", true)), "<a>ü</a>");
        assert_eq!(decode(&utf16le("<a>ü</a>", false)), "<a>ü</a>");
        let be: Vec<u8> = "<a>ü</a>".encode_utf16().flat_map(u16::to_be_bytes).collect();
        assert_eq!(decode(&be), "<a>ü</a>");
    }

    #[test]
    fn test_small_inner_buffer() {
        let text = format!("<a>{}</a>", "ß".repeat(3000));
        let bytes = utf16le(&text, true);
        let source = io::BufReader::with_capacity(3, bytes.as_slice());
        let mut out = String::new();
        Utf8Source::new(source).read_to_string(&mut out).unwrap();
        assert_eq!(out, text);
    }

    #[test]
    fn test_utf8_source_ignores_declaration() {
        let xml = "<?xml version=\"1.0\" encoding=\"windows-1252\"?><a>é</a>";
        let mut out = String::new();
        Utf8Source::utf8(xml.as_bytes()).read_to_string(&mut out).unwrap();
        assert_eq!(out, xml);
    }

    #[test]
    fn test_unknown_and_malformed_input() {
        let err = decode_document(b"<?xml version=\"1.0\" encoding=\"klingon\"?><a/>").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        let mut odd = utf16le("<a/>", true);
        odd.push(0x3C);
        assert!(decode_document(&odd).is_err());
    }
}
