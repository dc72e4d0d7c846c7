//! Error types for xml-stax.

use std::io;

use thiserror::Error;

/// Result type alias for xml-stax operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while parsing, serializing or converting XML.
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed or structurally invalid XML.
    #[error("XML parse error: {0}")]
    Parse(String),

    /// Input rejected by the parser security baseline (DTDs, external entities).
    #[error("Security violation: {0}")]
    Security(String),

    /// Misuse of a cursor or event writer, e.g. an end tag with no open element.
    #[error("Stream error: {0}")]
    Stream(String),

    /// Unknown charset or text that cannot be encoded.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// XML error from quick-xml.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Configuration document could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Rebuilds this error so that a failed cursor or stream can report it
    /// again on every later call.
    pub(crate) fn repeat(&self) -> Error {
        match self {
            Error::Parse(msg) => Error::Parse(msg.clone()),
            Error::Security(msg) => Error::Security(msg.clone()),
            Error::Stream(msg) => Error::Stream(msg.clone()),
            Error::Encoding(msg) => Error::Encoding(msg.clone()),
            Error::Config(msg) => Error::Config(msg.clone()),
            Error::Io(e) => Error::Io(io::Error::new(e.kind(), e.to_string())),
            Error::Xml(e) => Error::Parse(e.to_string()),
            Error::Json(e) => Error::Config(e.to_string()),
        }
    }
}

/// Stream adapters only surface I/O-shaped failures to their callers.
impl From<Error> for io::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Io(e) => e,
            Error::Parse(_) | Error::Security(_) | Error::Xml(_) | Error::Encoding(_) => {
                io::Error::new(io::ErrorKind::InvalidData, err)
            }
            other => io::Error::other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_becomes_invalid_data() {
        let err: io::Error = Error::Parse("unclosed element".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
        assert!(err.to_string().contains("unclosed element"));
    }

    #[test]
    fn test_io_error_is_unwrapped() {
        let inner = io::Error::new(io::ErrorKind::BrokenPipe, "gone");
        let err: io::Error = Error::Io(inner).into();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
    }

    #[test]
    fn test_repeat_keeps_kind_and_message() {
        let security = Error::Security("DOCTYPE".into()).repeat();
        assert!(matches!(security, Error::Security(ref m) if m == "DOCTYPE"));

        let io = Error::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "short")).repeat();
        let io: io::Error = io.into();
        assert_eq!(io.kind(), io::ErrorKind::UnexpectedEof);
        assert!(io.to_string().contains("short"));
    }

    #[test]
    fn test_stream_error_becomes_other() {
        let err: io::Error = Error::Stream("no open element".into()).into();
        assert_eq!(err.kind(), io::ErrorKind::Other);
    }
}
