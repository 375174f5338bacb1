//! Container sizing heuristics for materialized documents.

use thiserror::Error;

/// A capacity estimator option was outside its valid range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("capacity estimator option `{option}` out of range")]
pub struct InvalidEstimatorConfig {
    pub option: &'static str,
}

/// Pre-sizing heuristic for the containers the eager decoder materializes.
///
/// A document of `n` bytes is assumed to hold about `n /
/// document_bytes_per_field` fields, and an array about `n /
/// array_bytes_per_element` elements, never less than `min_capacity`. The
/// load factor is the hash-container headroom divisor and does not apply to
/// positional containers.
#[derive(Debug, Clone, PartialEq)]
pub struct CapacityEstimator {
    document_bytes_per_field: usize,
    array_bytes_per_element: usize,
    min_capacity: usize,
    load_factor: f64,
}

impl Default for CapacityEstimator {
    fn default() -> Self {
        Self {
            document_bytes_per_field: 20,
            array_bytes_per_element: 15,
            min_capacity: 4,
            load_factor: 0.75,
        }
    }
}

impl CapacityEstimator {
    /// Creates an estimator, rejecting out-of-range options.
    ///
    /// The byte-per-unit divisors and `min_capacity` must be positive;
    /// `load_factor` must lie in `(0, 1]`.
    pub fn new(
        document_bytes_per_field: usize,
        array_bytes_per_element: usize,
        min_capacity: usize,
        load_factor: f64,
    ) -> Result<Self, InvalidEstimatorConfig> {
        if document_bytes_per_field == 0 {
            return Err(InvalidEstimatorConfig {
                option: "document_bytes_per_field",
            });
        }
        if array_bytes_per_element == 0 {
            return Err(InvalidEstimatorConfig {
                option: "array_bytes_per_element",
            });
        }
        if min_capacity == 0 {
            return Err(InvalidEstimatorConfig {
                option: "min_capacity",
            });
        }
        if !(load_factor > 0.0 && load_factor <= 1.0) {
            return Err(InvalidEstimatorConfig {
                option: "load_factor",
            });
        }
        Ok(Self {
            document_bytes_per_field,
            array_bytes_per_element,
            min_capacity,
            load_factor,
        })
    }

    /// Initial capacity for a document mapping of the given byte length.
    pub fn document_capacity(&self, byte_len: usize) -> usize {
        let estimate = (byte_len / self.document_bytes_per_field).max(self.min_capacity);
        (estimate as f64 / self.load_factor).ceil() as usize
    }

    /// Initial capacity for an array of the given byte length.
    pub fn array_capacity(&self, byte_len: usize) -> usize {
        (byte_len / self.array_bytes_per_element).max(self.min_capacity)
    }
}
