//! Converter configuration.
//!
//! Configuration is read either from a JSON document or from flat
//! `key = value` properties:
//!
//! ```text
//! xmlstax.pool.capacity = 32
//! xmlstax.buffer-size = 8192
//! xmlstax.output.encoding = ISO-8859-1
//! xmlstax.output.omit-xml-declaration = false
//! xmlstax.parser.feature:coalescing = true
//! ```

use log::warn;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BUFFER_SIZE, BUFFER_SIZE_KEY, OUTPUT_PROPERTIES_PREFIX, PARSER_FEATURE_PREFIX,
    POOL_CAPACITY_KEY,
};
use crate::error::{Error, Result};
use crate::factory::{parse_flag, OutputProperties, ParserFactory, ParserFeatures};
use crate::pool::default_pool_capacity;

/// Parser features as plain switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ParserSettings {
    pub coalescing: bool,
    pub ignore_comments: bool,
    pub trim_text: bool,
}

impl ParserSettings {
    pub fn features(&self) -> ParserFeatures {
        let mut features = ParserFeatures::empty();
        features.set(ParserFeatures::COALESCING, self.coalescing);
        features.set(ParserFeatures::IGNORE_COMMENTS, self.ignore_comments);
        features.set(ParserFeatures::TRIM_TEXT, self.trim_text);
        features
    }
}

impl From<ParserFeatures> for ParserSettings {
    fn from(features: ParserFeatures) -> Self {
        ParserSettings {
            coalescing: features.contains(ParserFeatures::COALESCING),
            ignore_comments: features.contains(ParserFeatures::IGNORE_COMMENTS),
            trim_text: features.contains(ParserFeatures::TRIM_TEXT),
        }
    }
}

/// Settings of an [`XmlConverter`](crate::converter::XmlConverter) and its
/// [`StaxConverter`](crate::stax::StaxConverter).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ConverterConfig {
    /// Capacity of each factory pool; the default depends on the CPU count.
    pub pool_capacity: Option<usize>,
    /// Staging buffer size of the stream adapters.
    pub buffer_size: usize,
    pub output: OutputProperties,
    pub parser: ParserSettings,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        ConverterConfig {
            pool_capacity: None,
            buffer_size: BUFFER_SIZE,
            output: OutputProperties::default(),
            parser: ParserSettings::default(),
        }
    }
}

impl ConverterConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: ConverterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Builds a configuration from flat properties. Keys outside the
    /// `xmlstax.` namespace are skipped; unknown keys inside it are logged.
    pub fn from_properties<I, K, V>(properties: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = ConverterConfig::default();
        let mut parser = ParserFactory::with_features(config.parser.features());

        for (key, value) in properties {
            let (key, value) = (key.as_ref(), value.as_ref());
            if let Some(name) = key.strip_prefix(OUTPUT_PROPERTIES_PREFIX) {
                config.output.set(name, value)?;
            } else if let Some(name) = key.strip_prefix(PARSER_FEATURE_PREFIX) {
                let enabled = parse_flag(value).ok_or_else(|| {
                    Error::Config(format!("invalid value '{}' for {}", value, key))
                })?;
                parser.set_feature(name, enabled);
            } else if key == POOL_CAPACITY_KEY {
                config.pool_capacity = Some(parse_size(key, value)?);
            } else if key == BUFFER_SIZE_KEY {
                config.buffer_size = parse_size(key, value)?;
            } else if key.starts_with("xmlstax.") {
                warn!("Ignoring unknown configuration key {}", key);
            }
        }

        config.parser = parser.features().into();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::Config("buffer-size must be positive".to_string()));
        }
        if self.pool_capacity == Some(0) {
            return Err(Error::Config("pool-capacity must be positive".to_string()));
        }
        self.output.charset()?;
        Ok(())
    }

    pub fn pool_capacity(&self) -> usize {
        self.pool_capacity.unwrap_or_else(default_pool_capacity)
    }
}

fn parse_size(key: &str, value: &str) -> Result<usize> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("invalid value '{}' for {}", value, key)))
}
