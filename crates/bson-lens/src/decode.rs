//! Type-dispatched value decoding and the eager document/array decoder.

use std::collections::HashMap;

use bson_lens_buffers::Reader;

use crate::capacity::CapacityEstimator;
use crate::constants::{
    is_valid_type, MIN_DOCUMENT_LEN, TYPE_ARRAY, TYPE_BINARY, TYPE_BOOLEAN,
    TYPE_DATETIME, TYPE_DB_POINTER, TYPE_DECIMAL128, TYPE_DOCUMENT, TYPE_DOUBLE, TYPE_INT32,
    TYPE_INT64, TYPE_JAVASCRIPT, TYPE_JAVASCRIPT_WITH_SCOPE, TYPE_MAX_KEY, TYPE_MIN_KEY,
    TYPE_NULL, TYPE_OBJECT_ID, TYPE_REGEX, TYPE_STRING, TYPE_SYMBOL, TYPE_TIMESTAMP,
    TYPE_UNDEFINED,
};
use crate::error::BsonError;
use crate::values::{
    BsonBinary, BsonCodeWithScope, BsonDbPointer, BsonDocument, BsonRegex, BsonTimestamp,
    BsonValue,
};

/// Eager decoder: materializes a whole document into an owned mapping.
///
/// Nested documents and arrays decode eagerly as well. The output owns all
/// of its data and may outlive the input slice.
pub struct DocumentDecoder {
    estimator: CapacityEstimator,
}

impl Default for DocumentDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentDecoder {
    pub fn new() -> Self {
        Self {
            estimator: CapacityEstimator::default(),
        }
    }

    /// Creates a decoder with a custom container-sizing heuristic.
    pub fn with_estimator(estimator: CapacityEstimator) -> Self {
        Self { estimator }
    }

    /// Decodes one document from the start of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<BsonDocument, BsonError> {
        let mut r = Reader::new(bytes);
        decode_document_body(&mut r, &self.estimator)
    }
}

/// Reads a field name up to its `0x00` terminator, as a borrowed view.
pub(crate) fn read_name<'a>(r: &mut Reader<'a>) -> Result<&'a [u8], BsonError> {
    let offset = r.pos();
    r.take_until_nul()
        .ok_or(BsonError::MalformedCString { offset })
}

/// Best-effort UTF-8 decode; malformed sequences are replaced, never
/// rejected.
pub(crate) fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

/// Validates a document header and returns `(start, declared, end)`.
pub(crate) fn read_header(r: &mut Reader<'_>) -> Result<(usize, i32, usize), BsonError> {
    let start = r.pos();
    let declared = r.i32_le()?;
    if declared < MIN_DOCUMENT_LEN {
        return Err(BsonError::MalformedLength {
            declared,
            measured: 4,
        });
    }
    let body = declared as usize - 4;
    if body > r.remaining() {
        return Err(bson_lens_buffers::Underflow {
            needed: body,
            remaining: r.remaining(),
        }
        .into());
    }
    Ok((start, declared, start + declared as usize))
}

fn read_string(r: &mut Reader<'_>) -> Result<String, BsonError> {
    let offset = r.pos();
    let length = r.i32_le()?;
    if length <= 0 {
        return Err(BsonError::MalformedString { length, offset });
    }
    let bytes = r.bytes(length as usize)?;
    if bytes[length as usize - 1] != 0 {
        return Err(BsonError::MalformedString { length, offset });
    }
    Ok(lossy(&bytes[..length as usize - 1]))
}

fn read_object_id(r: &mut Reader<'_>) -> Result<String, BsonError> {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let bytes = r.bytes(12)?;
    let mut hex = String::with_capacity(24);
    for &b in bytes {
        hex.push(HEX[(b >> 4) as usize] as char);
        hex.push(HEX[(b & 0x0f) as usize] as char);
    }
    Ok(hex)
}

/// Decodes one value of the given type from the reader's position.
///
/// The single dispatch surface: the eager decoder, the partial decoder, and
/// the indexed document's lazy reads all come through here, so all three
/// agree on value extents and representations.
pub(crate) fn decode_value(
    r: &mut Reader<'_>,
    type_byte: u8,
    est: &CapacityEstimator,
) -> Result<BsonValue, BsonError> {
    match type_byte {
        TYPE_DOUBLE => Ok(BsonValue::Double(r.f64_le()?)),
        TYPE_STRING => Ok(BsonValue::Str(read_string(r)?)),
        TYPE_DOCUMENT => Ok(BsonValue::Document(decode_document_body(r, est)?)),
        TYPE_ARRAY => Ok(BsonValue::Array(decode_array_body(r, est)?)),
        TYPE_BINARY => {
            let offset = r.pos();
            let length = r.i32_le()?;
            if length < 0 {
                return Err(BsonError::MalformedString { length, offset });
            }
            let subtype = r.u8()?;
            let data = r.bytes(length as usize)?.to_vec();
            Ok(BsonValue::Binary(BsonBinary { subtype, data }))
        }
        TYPE_UNDEFINED => Ok(BsonValue::Null),
        TYPE_OBJECT_ID => Ok(BsonValue::ObjectId(read_object_id(r)?)),
        TYPE_BOOLEAN => Ok(BsonValue::Boolean(r.u8()? != 0)),
        TYPE_DATETIME => Ok(BsonValue::DateTime(r.i64_le()?)),
        TYPE_NULL => Ok(BsonValue::Null),
        TYPE_REGEX => {
            let pattern = lossy(read_name(r)?);
            let options = lossy(read_name(r)?);
            Ok(BsonValue::Regex(BsonRegex { pattern, options }))
        }
        TYPE_DB_POINTER => {
            let namespace = read_string(r)?;
            let id = read_object_id(r)?;
            Ok(BsonValue::DbPointer(BsonDbPointer { namespace, id }))
        }
        TYPE_JAVASCRIPT => Ok(BsonValue::Str(read_string(r)?)),
        TYPE_SYMBOL => Ok(BsonValue::Str(read_string(r)?)),
        TYPE_JAVASCRIPT_WITH_SCOPE => {
            let start = r.pos();
            let declared = r.i32_le()?;
            // Minimum: the prefix itself, an empty string, an empty scope.
            if declared < 14 {
                return Err(BsonError::MalformedLength {
                    declared,
                    measured: 4,
                });
            }
            let code = read_string(r)?;
            let scope = decode_document_body(r, est)?;
            let measured = r.pos() - start;
            if measured != declared as usize {
                return Err(BsonError::MalformedLength { declared, measured });
            }
            Ok(BsonValue::CodeWithScope(BsonCodeWithScope { code, scope }))
        }
        TYPE_INT32 => Ok(BsonValue::Int32(r.i32_le()?)),
        TYPE_TIMESTAMP => {
            let raw = r.i64_le()? as u64;
            Ok(BsonValue::Timestamp(BsonTimestamp {
                seconds: (raw >> 32) as u32,
                increment: raw as u32,
            }))
        }
        TYPE_INT64 => Ok(BsonValue::Int64(r.i64_le()?)),
        TYPE_DECIMAL128 => {
            let bytes = r.bytes(16)?;
            let mut data = [0u8; 16];
            data.copy_from_slice(bytes);
            Ok(BsonValue::Decimal128(data))
        }
        TYPE_MIN_KEY => Ok(BsonValue::MinKey),
        TYPE_MAX_KEY => Ok(BsonValue::MaxKey),
        other => Err(BsonError::InvalidType {
            type_byte: other,
            offset: r.pos(),
        }),
    }
}

/// Walks one document, materializing every field.
pub(crate) fn decode_document_body(
    r: &mut Reader<'_>,
    est: &CapacityEstimator,
) -> Result<BsonDocument, BsonError> {
    let (start, declared, end) = read_header(r)?;
    let mut fields: BsonDocument =
        HashMap::with_capacity(est.document_capacity(declared as usize));
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
        let name = read_name(r)?;
        let value = decode_value(r, type_byte, est)?;
        fields.insert(lossy(name), value);
    }
    if r.pos() != end {
        return Err(BsonError::MalformedLength {
            declared,
            measured: r.pos() - start,
        });
    }
    Ok(fields)
}

/// Walks one array document, materializing elements in wire order.
///
/// The decimal index names are read and discarded: elements keep the order
/// they appear in on the wire, and gaps are never filled.
pub(crate) fn decode_array_body(
    r: &mut Reader<'_>,
    est: &CapacityEstimator,
) -> Result<Vec<BsonValue>, BsonError> {
    let (start, declared, end) = read_header(r)?;
    let mut items = Vec::with_capacity(est.array_capacity(declared as usize));
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
        read_name(r)?;
        items.push(decode_value(r, type_byte, est)?);
    }
    if r.pos() != end {
        return Err(BsonError::MalformedLength {
            declared,
            measured: r.pos() - start,
        });
    }
    Ok(items)
}
