//! xml-stax - lazy XML event streams and format conversion
//!
//! This library exposes the output of a pull parser (a forward-only cursor
//! over structural XML events) as an ordinary byte or character stream,
//! without materializing the document, and converts XML between its common
//! representations.
//!
//! # Overview
//!
//! A cursor yields events one at a time. The stream adapters pull only as
//! many events as a read needs, serialize them into a chunk buffer and serve
//! the read from a fixed-size staging buffer. Memory use is therefore bounded
//! by the staging buffer plus the serialization of a single event, whatever
//! the size of the document.
//!
//! # Key Features
//!
//! - `std::io::Read` over any [`EventCursor`] ([`XmlEventInputStream`])
//! - Character streams over the same events ([`XmlEventCharReader`])
//! - UTF-8, UTF-16 and every other `encoding_rs` charset on output
//! - Bounded, lock-free pools of reusable factories ([`FactoryPool`])
//! - Conversions between text, bytes, trees, event lists, cursors and
//!   streams ([`XmlConverter`])
//! - DTDs and external entities are always rejected
//!
//! # Example Use Case
//!
//! A message body arrives as a pull cursor and has to be forwarded to a
//! consumer that reads bytes. Wrapping the cursor in an
//! [`XmlEventInputStream`] lets the consumer read the document in small
//! chunks while the parser advances only as far as each read requires.

pub mod config;
pub mod constants;
pub mod converter;
pub mod cursor;
pub mod dom;
pub mod error;
pub mod event;
pub mod factory;
pub mod pool;
pub mod stax;
pub mod stream;
pub mod writer;

// Re-export commonly used types
pub use config::{ConverterConfig, ParserSettings};
pub use constants::*;
pub use error::{Error, Result};
pub use event::{Attribute, EventType, Namespace, XmlEvent};
pub use pool::{default_pool_capacity, FactoryPool, Lease};
pub use stax::StaxConverter;

pub use cursor::{collect_events, EventCursor, EventListCursor, TreeCursor, XmlStreamCursor};
pub use dom::{Document, Element, Node};
pub use stream::{CharRead, StrReader, XmlEventCharReader, XmlEventInputStream};
pub use writer::{
    copy_events, write_event, ByteEncoder, CharEncoder, Charset, ChunkEncoder, EventSerializer,
    EventWriter, StreamEventWriter,
};

// Re-export factory types
pub use factory::{
    DocumentBuilder, DocumentBuilderFactory, OutputProperties, ParserFactory, ParserFeatures,
    Transformer, WriterFactory,
};

// Re-export conversion types
pub use converter::{
    ConversionContext, ConverterEntry, EventSource, Payload, PayloadKind, StaxSource,
    StreamSource, XmlConverter,
};
