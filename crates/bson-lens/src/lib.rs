//! Read-optimized BSON decoding.
//!
//! A decode-only engine for the MongoDB 3.4 BSON wire format, built for the
//! common case where a caller wants only some of a document's fields. Three
//! access modes share one dispatch surface:
//!
//! - **Eager** — [`decode_document`] materializes every field into an owned
//!   `HashMap<String, BsonValue>` that may outlive the input slice.
//! - **Partial** — [`decode_partial`] walks the document once, decoding the
//!   fields of a [`FieldMatcher`] and skipping everything else in O(1) per
//!   value (nested subtrees are jumped over via their length prefix, not
//!   walked). With early exit the walk stops as soon as the target set is
//!   complete.
//! - **Indexed** — [`index_document`] builds a zero-copy
//!   [`IndexedDocument`]: one O(n) scan records every field's extent, then
//!   reads are a binary search plus a lazily cached decode.
//!
//! The engine never writes BSON, never copies the input wholesale, and
//! never recovers from a format error: the first inconsistency fails the
//! whole call with a [`BsonError`] carrying the offending offset.
//!
//! # Example
//!
//! ```
//! use bson_lens::{decode_partial, index_document, FieldMatcher};
//!
//! // { "age": 42 }
//! let bytes = [
//!     0x0e, 0x00, 0x00, 0x00, 0x10, b'a', b'g', b'e', 0x00, 0x2a, 0x00,
//!     0x00, 0x00, 0x00,
//! ];
//!
//! let doc = index_document(&bytes).unwrap();
//! assert_eq!(doc.get_int32("age"), Ok(42));
//!
//! let matcher = FieldMatcher::new(["age"]);
//! let partial = decode_partial(&bytes, &matcher, true).unwrap();
//! assert_eq!(partial.len(), 1);
//! ```

mod capacity;
mod decode;
mod error;
mod indexed;
mod partial;
mod skip;
mod values;

pub mod constants;

pub use capacity::{CapacityEstimator, InvalidEstimatorConfig};
pub use decode::DocumentDecoder;
pub use error::BsonError;
pub use indexed::{IndexedArray, IndexedDocument};
pub use partial::{FieldMatcher, PartialDecoder};
pub use skip::{skip_value, value_size};
pub use values::{
    BsonBinary, BsonCodeWithScope, BsonDbPointer, BsonDocument, BsonRegex, BsonTimestamp,
    BsonValue,
};

/// Decodes a whole document eagerly with default sizing.
pub fn decode_document(bytes: &[u8]) -> Result<BsonDocument, BsonError> {
    DocumentDecoder::new().decode(bytes)
}

/// Decodes only the fields of `matcher` out of one document.
pub fn decode_partial(
    bytes: &[u8],
    matcher: &FieldMatcher,
    early_exit: bool,
) -> Result<BsonDocument, BsonError> {
    PartialDecoder::new().decode(bytes, matcher, early_exit)
}

/// Builds a zero-copy indexed view over one document.
pub fn index_document(bytes: &[u8]) -> Result<IndexedDocument<'_>, BsonError> {
    IndexedDocument::parse(bytes)
}

/// Selects how [`parse`] materializes a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Decode everything into an owned mapping; nested values are eager.
    Eager,
    /// Index without decoding; nested values are indexed views.
    Indexed,
}

/// A parsed document in the representation `ParseMode` selected.
pub enum Parsed<'a> {
    Eager(BsonDocument),
    Indexed(IndexedDocument<'a>),
}

/// Parses a document in the chosen mode.
pub fn parse(bytes: &[u8], mode: ParseMode) -> Result<Parsed<'_>, BsonError> {
    match mode {
        ParseMode::Eager => Ok(Parsed::Eager(decode_document(bytes)?)),
        ParseMode::Indexed => Ok(Parsed::Indexed(index_document(bytes)?)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_mode_switch() {
        let bytes = [
            0x0e, 0x00, 0x00, 0x00, 0x10, b'a', b'g', b'e', 0x00, 0x2a, 0x00, 0x00, 0x00, 0x00,
        ];
        match parse(&bytes, ParseMode::Eager).unwrap() {
            Parsed::Eager(doc) => assert_eq!(doc["age"], BsonValue::Int32(42)),
            Parsed::Indexed(_) => panic!("expected eager"),
        }
        match parse(&bytes, ParseMode::Indexed).unwrap() {
            Parsed::Indexed(doc) => assert_eq!(doc.get_int32("age"), Ok(42)),
            Parsed::Eager(_) => panic!("expected indexed"),
        }
    }
}
