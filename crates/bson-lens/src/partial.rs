//! Partial decoding: extract a target field set in one pass, skipping
//! everything else, with optional early termination.

use std::collections::{HashMap, HashSet};

use bson_lens_buffers::Reader;

use crate::capacity::CapacityEstimator;
use crate::constants::is_valid_type;
use crate::decode::{decode_value, read_header, read_name};
use crate::error::BsonError;
use crate::skip::skip_value;
use crate::values::BsonDocument;

/// Above this target-set size, membership switches from a linear scan to a
/// hash lookup. Both strategies are behaviorally identical.
const HASH_LOOKUP_THRESHOLD: usize = 10;

/// A fixed target field set for partial decoding.
///
/// Names are canonicalized once at construction; matching compares raw wire
/// bytes against the canonical names, and a hit returns the canonical
/// string so the result map reuses it.
pub struct FieldMatcher {
    names: Vec<String>,
    set: Option<HashSet<String>>,
}

impl FieldMatcher {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut names: Vec<String> = names.into_iter().map(Into::into).collect();
        names.sort();
        names.dedup();
        let set = if names.len() >= HASH_LOOKUP_THRESHOLD {
            Some(names.iter().cloned().collect())
        } else {
            None
        };
        Self { names, set }
    }

    /// Number of distinct target fields.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Returns the canonical name when `raw` is in the target set.
    fn find(&self, raw: &[u8]) -> Option<&str> {
        match &self.set {
            Some(set) => {
                let name = std::str::from_utf8(raw).ok()?;
                set.get(name).map(String::as_str)
            }
            None => self
                .names
                .iter()
                .find(|name| name.as_bytes() == raw)
                .map(String::as_str),
        }
    }
}

/// Single-pass partial decoder.
///
/// Matched fields are decoded through the regular dispatch; everything else
/// is advanced past without decoding. Holds no state across calls.
pub struct PartialDecoder {
    estimator: CapacityEstimator,
}

impl Default for PartialDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialDecoder {
    pub fn new() -> Self {
        Self {
            estimator: CapacityEstimator::default(),
        }
    }

    pub fn with_estimator(estimator: CapacityEstimator) -> Self {
        Self { estimator }
    }

    /// Decodes the fields of `matcher` out of one document.
    ///
    /// With `early_exit` the walk returns the moment every target field has
    /// been found; the tail of the document is then never examined, not
    /// even for well-formedness. Errors from the portion that is walked
    /// propagate; no partial map accompanies an error.
    pub fn decode(
        &self,
        bytes: &[u8],
        matcher: &FieldMatcher,
        early_exit: bool,
    ) -> Result<BsonDocument, BsonError> {
        let mut r = Reader::new(bytes);
        let (start, declared, end) = read_header(&mut r)?;
        let mut result: BsonDocument = HashMap::with_capacity(matcher.len());
        let mut found = 0;
        if early_exit && found == matcher.len() {
            return Ok(result);
        }
        loop {
            let type_offset = r.pos();
            if type_offset >= end {
                return Err(BsonError::MalformedLength {
                    declared,
                    measured: type_offset - start,
                });
            }
            let type_byte = r.u8()?;
            if type_byte == 0x00 {
                break;
            }
            if !is_valid_type(type_byte) {
                return Err(BsonError::InvalidType {
                    type_byte,
                    offset: type_offset,
                });
            }
            let raw_name = read_name(&mut r)?;
            if let Some(canonical) = matcher.find(raw_name) {
                let value = decode_value(&mut r, type_byte, &self.estimator)?;
                result.insert(canonical.to_owned(), value);
                found += 1;
                if early_exit && found == matcher.len() {
                    return Ok(result);
                }
            } else {
                skip_value(&mut r, type_byte)?;
            }
        }
        if r.pos() != end {
            return Err(BsonError::MalformedLength {
                declared,
                measured: r.pos() - start,
            });
        }
        Ok(result)
    }
}
