//! Bounds-checked binary buffer reading for bson-lens.
//!
//! BSON is little-endian throughout, so the [`Reader`] exposes little-endian
//! primitive reads only. Every read validates the remaining length before
//! touching the buffer and fails with [`Underflow`] instead of panicking.
//!
//! # Example
//!
//! ```
//! use bson_lens_buffers::Reader;
//!
//! let data = [0x2a, 0x00, 0x00, 0x00, 0x01];
//! let mut reader = Reader::new(&data);
//!
//! assert_eq!(reader.i32_le(), Ok(42));
//! assert_eq!(reader.u8(), Ok(0x01));
//! assert!(reader.u8().is_err());
//! ```

mod reader;

pub use reader::Reader;

/// Attempted to read past the end of the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Underflow {
    /// Bytes the read required.
    pub needed: usize,
    /// Bytes that were left.
    pub remaining: usize,
}

impl std::fmt::Display for Underflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "read of {} bytes past end of buffer ({} remaining)",
            self.needed, self.remaining
        )
    }
}

impl std::error::Error for Underflow {}
