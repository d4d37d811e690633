//! Structured model of MIME Content-Type header values.
//!
//! This crate parses raw Content-Type header text (RFC 2045) into a
//! type/subtype pair plus an ordered set of named parameters, tracks whether
//! the structured form has been mutated since it was last serialized, and
//! re-serializes it into wire-safe text. Parameter values that cannot be
//! carried in a 7-bit header fall back to RFC 2047 encoded words.
//!
//! ```
//! use content_type_rs::ContentType;
//!
//! let mut value = ContentType::parse("multipart/mixed; boundary=abc").unwrap();
//! assert_eq!(value.boundary(), Some("abc"));
//!
//! value.set_charset("utf-8");
//! assert_eq!(value.header_value(), "multipart/mixed; boundary=abc; charset=utf-8");
//! ```

pub mod content_type;
pub mod encode;
pub mod encoded_word;
pub mod error;
pub mod grammar;
pub mod params;

// Re-export commonly used types
pub use content_type::{ContentType, HeaderStore, CONTENT_TYPE, DEFAULT_MEDIA_TYPE};
pub use encode::format_content_type;
pub use error::{Error, Result};
pub use params::ParameterStore;
