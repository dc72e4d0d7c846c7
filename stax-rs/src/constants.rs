//! Constants used throughout xml-stax.

/// Capacity of the staging buffer used by the chunked stream adapters.
pub const BUFFER_SIZE: usize = 4096;

/// Charset used when none is configured.
pub const DEFAULT_CHARSET: &str = "UTF-8";

/// Lower bound for the default factory pool capacity.
pub const MIN_POOL_CAPACITY: usize = 20;

/// Namespace bound to the `xml` prefix in every document.
pub const XML_NAMESPACE_URI: &str = "http://www.w3.org/XML/1998/namespace";

/// Attribute name (and prefix) used for namespace declarations.
pub const XMLNS: &str = "xmlns";

/// Prefix of flat configuration keys that set output properties.
pub const OUTPUT_PROPERTIES_PREFIX: &str = "xmlstax.output.";

/// Prefix of flat configuration keys that set parser features.
/// The feature name follows the colon, e.g. `xmlstax.parser.feature:coalescing`.
pub const PARSER_FEATURE_PREFIX: &str = "xmlstax.parser.feature:";

/// Flat configuration key for the factory pool capacity.
pub const POOL_CAPACITY_KEY: &str = "xmlstax.pool.capacity";

/// Flat configuration key for the adapter staging buffer size.
pub const BUFFER_SIZE_KEY: &str = "xmlstax.buffer-size";
