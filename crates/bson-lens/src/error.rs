//! BSON decode error type.

use thiserror::Error;

/// Error type for BSON decoding and field access.
///
/// Every variant carries the context a caller needs to log an actionable
/// diagnostic: byte offsets, the offending lengths or type bytes, and the
/// field name where one is known. A single format error fails the whole
/// call; no partial result accompanies an error.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum BsonError {
    /// A read ran past the end of the input slice.
    #[error(transparent)]
    Underflow(#[from] bson_lens_buffers::Underflow),

    /// A cstring scan reached the end of the slice without a `0x00`.
    #[error("unterminated cstring starting at offset {offset}")]
    MalformedCString { offset: usize },

    /// A string length prefix was not positive, or the string's terminator
    /// byte was nonzero.
    #[error("malformed string (length {length}) at offset {offset}")]
    MalformedString { length: i32, offset: usize },

    /// A document, array, or length-prefixed value disagrees with its parsed
    /// extent.
    #[error("declared length {declared} does not match measured extent {measured}")]
    MalformedLength { declared: i32, measured: usize },

    /// A byte outside the known type set appeared where a type was expected.
    #[error("invalid BSON type byte 0x{type_byte:02x} at offset {offset}")]
    InvalidType { type_byte: u8, offset: usize },

    /// A typed getter was invoked on a field of an incompatible type.
    #[error("requested {requested} but field holds {actual}")]
    TypeMismatch {
        requested: &'static str,
        actual: &'static str,
    },

    /// A typed getter without a default was invoked on an absent field.
    #[error("field `{field}` not found")]
    FieldNotFound { field: String },

    /// The operation is deliberately not offered for the value's type.
    #[error("operation unsupported for {type_name}")]
    Unsupported { type_name: &'static str },
}
