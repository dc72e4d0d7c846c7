//! Factories for cursors, serializers, document builders and transformers.
//!
//! Factories are cheap to clone and carry only configuration. The
//! [`pool`](crate::pool) module shares default-configured instances between
//! conversions.

mod document;
mod parser;
mod transformer;
mod writer;

pub use document::{DocumentBuilder, DocumentBuilderFactory};
pub use parser::{
    ParserFactory, ParserFeatures, FEATURE_COALESCING, FEATURE_IGNORE_COMMENTS, FEATURE_TRIM_TEXT,
};
pub use transformer::Transformer;
pub use writer::{OutputProperties, WriterFactory, PROPERTY_ENCODING, PROPERTY_OMIT_XML_DECLARATION};

pub(crate) use writer::parse_flag;
