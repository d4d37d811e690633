//! Error types for the content-type crate.

use thiserror::Error;

/// The main error type for Content-Type parsing and mutation.
///
/// Grammar failures are all reported as [`Error::InvalidFormat`]; callers are
/// told the value is malformed but not which rule failed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Raw text was empty where a header value or media type is required.
    /// Raised before grammar parsing begins.
    #[error("content type value must not be empty")]
    EmptyInput,

    /// Malformed Content-Type grammar: missing slash, empty token,
    /// unterminated quoted string, missing `=`, missing parameter value, or
    /// trailing input after a type-only assignment.
    #[error("invalid content type format")]
    InvalidFormat,
}

/// Specialized Result type for content-type operations.
pub type Result<T> = std::result::Result<T, Error>;
