//! Output properties and the writer factory.

use std::io::Write;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CHARSET;
use crate::error::{Error, Result};
use crate::writer::{ByteEncoder, CharEncoder, Charset, EventSerializer, StreamEventWriter};

pub const PROPERTY_ENCODING: &str = "encoding";
pub const PROPERTY_OMIT_XML_DECLARATION: &str = "omit-xml-declaration";

/// Serialization settings. By default output is UTF-8 without an XML
/// declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputProperties {
    pub encoding: String,
    pub omit_xml_declaration: bool,
}

impl Default for OutputProperties {
    fn default() -> Self {
        OutputProperties {
            encoding: DEFAULT_CHARSET.to_string(),
            omit_xml_declaration: true,
        }
    }
}

impl OutputProperties {
    /// Resolves the configured encoding.
    pub fn charset(&self) -> Result<Charset> {
        Charset::for_label(&self.encoding)
    }

    /// Sets a property by name. Returns `Ok(false)` for unknown names, which
    /// are logged and ignored.
    pub fn set(&mut self, key: &str, value: &str) -> Result<bool> {
        match key {
            PROPERTY_ENCODING => {
                Charset::for_label(value)?;
                self.encoding = value.trim().to_string();
            }
            PROPERTY_OMIT_XML_DECLARATION => {
                self.omit_xml_declaration = parse_flag(value).ok_or_else(|| {
                    Error::Config(format!("invalid value '{}' for {}", value, key))
                })?;
            }
            _ => {
                warn!("Unsupported output property {} with value {}", key, value);
                return Ok(false);
            }
        }
        Ok(true)
    }
}

/// Accepts `true`/`false` and `yes`/`no`, ignoring case.
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" => Some(true),
        "false" | "no" => Some(false),
        _ => None,
    }
}

/// Creates event serializers configured from [`OutputProperties`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterFactory {
    properties: OutputProperties,
}

impl WriterFactory {
    pub fn new() -> Self {
        debug!("Created writer factory");
        Self::default()
    }

    pub fn with_properties(properties: OutputProperties) -> Self {
        WriterFactory { properties }
    }

    pub fn properties(&self) -> &OutputProperties {
        &self.properties
    }

    pub fn create_byte_serializer(&self) -> Result<EventSerializer<ByteEncoder>> {
        let encoder = ByteEncoder::new(self.properties.charset()?);
        Ok(EventSerializer::new(encoder).with_declaration(!self.properties.omit_xml_declaration))
    }

    /// Creates a character serializer. The configured encoding is only used
    /// for the XML declaration.
    pub fn create_char_serializer(&self) -> EventSerializer<CharEncoder> {
        EventSerializer::new(CharEncoder::declaring(self.properties.encoding.clone()))
            .with_declaration(!self.properties.omit_xml_declaration)
    }

    pub fn create_event_writer<W: Write>(&self, out: W) -> Result<StreamEventWriter<W>> {
        Ok(StreamEventWriter::new(out, self.create_byte_serializer()?))
    }
}
