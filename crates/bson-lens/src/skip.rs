//! Skipping and on-wire value sizing.
//!
//! Both operations advance past exactly one value without decoding it.
//! Nested documents, arrays, and code-with-scope carry their own total
//! length, so entire subtrees are skipped with one int32 read and one jump
//! instead of a recursive field walk.

use bson_lens_buffers::Reader;

use crate::constants::{
    fixed_value_size, TYPE_ARRAY, TYPE_BINARY, TYPE_DB_POINTER, TYPE_DOCUMENT, TYPE_JAVASCRIPT,
    TYPE_JAVASCRIPT_WITH_SCOPE, TYPE_REGEX, TYPE_STRING, TYPE_SYMBOL,
};
use crate::error::BsonError;

/// Advances the reader past one value of the given type.
///
/// On success the cursor lands exactly one value past where it started. On
/// error the cursor position is unspecified; the slice is never mutated.
pub fn skip_value(r: &mut Reader<'_>, type_byte: u8) -> Result<(), BsonError> {
    if let Some(n) = fixed_value_size(type_byte) {
        r.skip(n)?;
        return Ok(());
    }
    match type_byte {
        TYPE_STRING | TYPE_JAVASCRIPT | TYPE_SYMBOL => {
            let offset = r.pos();
            let length = r.i32_le()?;
            if length <= 0 {
                return Err(BsonError::MalformedString { length, offset });
            }
            r.skip(length as usize)?;
            Ok(())
        }
        TYPE_BINARY => {
            let offset = r.pos();
            let length = r.i32_le()?;
            if length < 0 {
                return Err(BsonError::MalformedString { length, offset });
            }
            r.skip(1 + length as usize)?;
            Ok(())
        }
        TYPE_DOCUMENT | TYPE_ARRAY | TYPE_JAVASCRIPT_WITH_SCOPE => {
            let length = r.i32_le()?;
            if length < 5 {
                return Err(BsonError::MalformedLength {
                    declared: length,
                    measured: 4,
                });
            }
            // The length prefix counts itself and was just consumed.
            r.skip(length as usize - 4)?;
            Ok(())
        }
        TYPE_REGEX => {
            for _ in 0..2 {
                let offset = r.pos();
                if r.take_until_nul().is_none() {
                    return Err(BsonError::MalformedCString { offset });
                }
            }
            Ok(())
        }
        TYPE_DB_POINTER => {
            let offset = r.pos();
            let length = r.i32_le()?;
            if length <= 0 {
                return Err(BsonError::MalformedString { length, offset });
            }
            r.skip(length as usize + 12)?;
            Ok(())
        }
        other => Err(BsonError::InvalidType {
            type_byte: other,
            offset: r.pos(),
        }),
    }
}

/// Computes the on-wire byte size of one value of the given type at
/// `offset`, reading only the length prefix where one exists.
///
/// This is what the indexed-document builder uses to record value extents
/// without decoding anything. It agrees with [`skip_value`] and with the
/// decoder on extent for every type.
pub fn value_size(bytes: &[u8], offset: usize, type_byte: u8) -> Result<usize, BsonError> {
    if let Some(n) = fixed_value_size(type_byte) {
        return Ok(n);
    }
    let mut r = Reader::from_slice(bytes, offset, bytes.len());
    match type_byte {
        TYPE_STRING | TYPE_JAVASCRIPT | TYPE_SYMBOL => {
            let length = r.i32_le()?;
            if length <= 0 {
                return Err(BsonError::MalformedString { length, offset });
            }
            Ok(4 + length as usize)
        }
        TYPE_BINARY => {
            let length = r.i32_le()?;
            if length < 0 {
                return Err(BsonError::MalformedString { length, offset });
            }
            Ok(4 + 1 + length as usize)
        }
        TYPE_DOCUMENT | TYPE_ARRAY | TYPE_JAVASCRIPT_WITH_SCOPE => {
            let length = r.i32_le()?;
            if length < 5 {
                return Err(BsonError::MalformedLength {
                    declared: length,
                    measured: 4,
                });
            }
            Ok(length as usize)
        }
        TYPE_REGEX => {
            for _ in 0..2 {
                let at = r.pos();
                if r.take_until_nul().is_none() {
                    return Err(BsonError::MalformedCString { offset: at });
                }
            }
            Ok(r.pos() - offset)
        }
        TYPE_DB_POINTER => {
            let length = r.i32_le()?;
            if length <= 0 {
                return Err(BsonError::MalformedString { length, offset });
            }
            Ok(4 + length as usize + 12)
        }
        other => Err(BsonError::InvalidType {
            type_byte: other,
            offset,
        }),
    }
}
