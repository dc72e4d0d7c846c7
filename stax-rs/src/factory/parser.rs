//! Parser factory: cursor construction and parser features.

use std::io::{BufRead, BufReader, Read};

use bitflags::bitflags;
use log::{debug, info, warn};

use crate::cursor::XmlStreamCursor;

bitflags! {
    /// Optional parser behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ParserFeatures: u8 {
        /// Merge CDATA sections into the surrounding character data.
        const COALESCING = 1;
        /// Drop comments instead of reporting them.
        const IGNORE_COMMENTS = 1 << 1;
        /// Trim whitespace at both ends of each text run.
        const TRIM_TEXT = 1 << 2;
    }
}

pub const FEATURE_COALESCING: &str = "coalescing";
pub const FEATURE_IGNORE_COMMENTS: &str = "ignore-comments";
pub const FEATURE_TRIM_TEXT: &str = "trim-text";

/// Features that would relax the security baseline. The parser only ever
/// runs with them off.
const SECURITY_FEATURES: [&str; 3] = ["support-dtd", "external-entities", "external-resources"];

impl ParserFeatures {
    /// Looks up a feature by its configuration name.
    pub fn from_feature_name(name: &str) -> Option<ParserFeatures> {
        match name {
            FEATURE_COALESCING => Some(ParserFeatures::COALESCING),
            FEATURE_IGNORE_COMMENTS => Some(ParserFeatures::IGNORE_COMMENTS),
            FEATURE_TRIM_TEXT => Some(ParserFeatures::TRIM_TEXT),
            _ => None,
        }
    }
}

/// Creates pull cursors with a fixed set of parser features.
///
/// DOCTYPE declarations are always rejected and only predefined entities and
/// character references are expanded, whatever features are set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserFactory {
    features: ParserFeatures,
}

impl ParserFactory {
    pub fn new() -> Self {
        debug!("Created parser factory");
        Self::default()
    }

    pub fn with_features(features: ParserFeatures) -> Self {
        ParserFactory { features }
    }

    pub fn features(&self) -> ParserFeatures {
        self.features
    }

    /// Sets a named feature. Returns whether the feature was applied; unknown
    /// features and attempts to enable a security-relevant feature are logged
    /// and ignored.
    pub fn set_feature(&mut self, name: &str, value: bool) -> bool {
        if let Some(flag) = ParserFeatures::from_feature_name(name) {
            self.features.set(flag, value);
            info!("Parser factory has been set with feature {} value {}", name, value);
            return true;
        }
        if SECURITY_FEATURES.contains(&name) {
            if value {
                warn!(
                    "Parser factory refuses feature {} with value {}; DTDs and external entities stay disabled",
                    name, value
                );
            }
            return false;
        }
        warn!("Parser factory doesn't support the feature {} with value {}", name, value);
        false
    }

    /// Creates a cursor over document bytes in any supported encoding.
    pub fn create_cursor<R: BufRead>(&self, source: R) -> XmlStreamCursor<R> {
        XmlStreamCursor::with_features(source, self.features)
    }

    /// Creates a cursor over text that is already decoded to UTF-8.
    pub fn create_text_cursor<R: BufRead>(&self, source: R) -> XmlStreamCursor<R> {
        XmlStreamCursor::utf8_with_features(source, self.features)
    }

    pub fn create_cursor_from_str<'a>(&self, xml: &'a str) -> XmlStreamCursor<&'a [u8]> {
        self.create_text_cursor(xml.as_bytes())
    }

    pub fn create_cursor_from_bytes<'a>(&self, xml: &'a [u8]) -> XmlStreamCursor<&'a [u8]> {
        self.create_cursor(xml)
    }

    /// Creates a cursor over an unbuffered reader.
    pub fn create_cursor_from_read<R: Read>(&self, source: R) -> XmlStreamCursor<BufReader<R>> {
        self.create_cursor(BufReader::new(source))
    }
}
