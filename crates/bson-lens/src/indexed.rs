//! Zero-copy indexed document views with lazy, cached field access.
//!
//! Construction scans the document once, recording for every field its
//! name hash, name extent, value extent, and type byte, and decodes
//! nothing. Lookups binary-search the hash-sorted index and resolve hash
//! collisions by byte comparison. Values decode on first read and land in a
//! sparse [`OnceLock`] slot array: concurrent readers race to publish, the
//! first fully constructed value wins, and no reader ever observes a torn
//! value.

use std::borrow::Cow;
use std::sync::OnceLock;

use bson_lens_buffers::{Reader, Underflow};
use serde_json::Value as JsonValue;

use crate::capacity::CapacityEstimator;
use crate::constants::{is_valid_type, type_name, MIN_DOCUMENT_LEN, TYPE_ARRAY, TYPE_DOCUMENT};
use crate::decode::decode_value;
use crate::error::BsonError;
use crate::skip::value_size;
use crate::values::BsonValue;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// 64-bit FNV-1a over the raw name bytes.
fn name_hash(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET;
    for &b in bytes {
        hash ^= b as u64;
        hash = hash.wrapping_mul(FNV_PRIME);
    }
    hash
}

/// One field's location within the backing slice.
#[derive(Debug, Clone, Copy)]
struct FieldEntry {
    name_hash: u64,
    name_start: usize,
    name_len: usize,
    value_offset: usize,
    value_size: usize,
    type_byte: u8,
}

/// Scans the document at `bytes[offset..offset + length]` into field
/// entries, in wire order, without decoding any value.
fn scan_entries(bytes: &[u8], offset: usize, length: usize) -> Result<Vec<FieldEntry>, BsonError> {
    let remaining = bytes.len().saturating_sub(offset);
    if length > remaining {
        return Err(Underflow {
            needed: length,
            remaining,
        }
        .into());
    }
    let end = offset + length;
    let mut r = Reader::from_slice(bytes, offset, end);
    let declared = r.i32_le()?;
    if declared < MIN_DOCUMENT_LEN || declared as usize != length {
        return Err(BsonError::MalformedLength {
            declared,
            measured: length,
        });
    }
    let mut fields = Vec::new();
    loop {
        let type_offset = r.pos();
        if type_offset >= end {
            return Err(BsonError::MalformedLength {
                declared,
                measured: type_offset - offset,
            });
        }
        let type_byte = r.u8()?;
        if type_byte == 0x00 {
            if r.pos() != end {
                return Err(BsonError::MalformedLength {
                    declared,
                    measured: r.pos() - offset,
                });
            }
            break;
        }
        if !is_valid_type(type_byte) {
            return Err(BsonError::InvalidType {
                type_byte,
                offset: type_offset,
            });
        }
        let name_start = r.pos();
        let name = r
            .take_until_nul()
            .ok_or(BsonError::MalformedCString { offset: name_start })?;
        let value_offset = r.pos();
        let value_size = value_size(bytes, value_offset, type_byte)?;
        // The value must end before the document terminator.
        if value_offset + value_size > end - 1 {
            return Err(BsonError::MalformedLength {
                declared,
                measured: value_offset + value_size - offset,
            });
        }
        fields.push(FieldEntry {
            name_hash: name_hash(name),
            name_start,
            name_len: name.len(),
            value_offset,
            value_size,
            type_byte,
        });
        r.skip(value_size)?;
    }
    Ok(fields)
}

/// A zero-copy document view over a borrowed byte slice.
///
/// Construction is O(n) in the field count and decodes no values. Field
/// access is a binary search over the hash-sorted index plus, on first
/// touch only, the decode cost of that one value. The view borrows the
/// input slice and cannot outlive it.
pub struct IndexedDocument<'a> {
    bytes: &'a [u8],
    offset: usize,
    length: usize,
    fields: Vec<FieldEntry>,
    cache: Vec<OnceLock<BsonValue>>,
}

impl<'a> IndexedDocument<'a> {
    /// Indexes a document spanning the whole slice.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, BsonError> {
        Self::from_slice(bytes, 0, bytes.len())
    }

    /// Indexes the document at `bytes[offset..offset + length]`.
    ///
    /// The document's own length prefix must equal `length` exactly.
    pub fn from_slice(bytes: &'a [u8], offset: usize, length: usize) -> Result<Self, BsonError> {
        let mut fields = scan_entries(bytes, offset, length)?;
        fields.sort_by_key(|entry| entry.name_hash);
        let cache = (0..fields.len()).map(|_| OnceLock::new()).collect();
        Ok(Self {
            bytes,
            offset,
            length,
            fields,
            cache,
        })
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The document's full wire bytes, length prefix and terminator
    /// included.
    pub fn as_bytes(&self) -> &'a [u8] {
        &self.bytes[self.offset..self.offset + self.length]
    }

    fn name_bytes(&self, entry: &FieldEntry) -> &'a [u8] {
        &self.bytes[entry.name_start..entry.name_start + entry.name_len]
    }

    /// Binary search over the hash-sorted index; ties resolved by byte
    /// comparison.
    fn locate(&self, name: &str) -> Option<usize> {
        let hash = name_hash(name.as_bytes());
        let mut i = self.fields.partition_point(|entry| entry.name_hash < hash);
        while i < self.fields.len() && self.fields[i].name_hash == hash {
            if self.name_bytes(&self.fields[i]) == name.as_bytes() {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    pub fn contains(&self, name: &str) -> bool {
        self.locate(name).is_some()
    }

    /// The stored type byte of a field, or `None` when absent.
    pub fn get_type(&self, name: &str) -> Option<u8> {
        self.locate(name).map(|i| self.fields[i].type_byte)
    }

    /// Field names in index order, decoded best-effort.
    pub fn field_names(&self) -> impl Iterator<Item = Cow<'a, str>> + '_ {
        self.fields
            .iter()
            .map(|entry| String::from_utf8_lossy(self.name_bytes(entry)))
    }

    /// The raw wire bytes of a field's value. Slice-lifetime-bound; no
    /// decoding happens.
    pub fn raw(&self, name: &str) -> Result<&'a [u8], BsonError> {
        let i = self.index_of(name)?;
        let entry = &self.fields[i];
        Ok(&self.bytes[entry.value_offset..entry.value_offset + entry.value_size])
    }

    fn index_of(&self, name: &str) -> Result<usize, BsonError> {
        self.locate(name).ok_or_else(|| BsonError::FieldNotFound {
            field: name.to_owned(),
        })
    }

    /// Decodes the value in slot `i`, filling the cache on first touch.
    ///
    /// Index construction already validated the value extent, so the decode
    /// reads a pre-validated window.
    fn value_at(&self, i: usize) -> Result<&BsonValue, BsonError> {
        if let Some(value) = self.cache[i].get() {
            return Ok(value);
        }
        let entry = &self.fields[i];
        let mut r = Reader::from_slice(
            self.bytes,
            entry.value_offset,
            entry.value_offset + entry.value_size,
        );
        let value = decode_value(&mut r, entry.type_byte, &CapacityEstimator::default())?;
        // Race-to-publish: the first fully constructed value wins.
        Ok(self.cache[i].get_or_init(|| value))
    }

    /// The decoded value of a field, cached across calls.
    ///
    /// Document- and array-typed fields materialize eagerly here; use
    /// [`IndexedDocument::get_document`] / [`IndexedDocument::get_array`]
    /// for zero-copy nested views instead.
    pub fn value(&self, name: &str) -> Result<&BsonValue, BsonError> {
        let i = self.index_of(name)?;
        self.value_at(i)
    }

    fn mismatch(requested: &'static str, actual: &BsonValue) -> BsonError {
        BsonError::TypeMismatch {
            requested,
            actual: actual.type_name(),
        }
    }

    pub fn get_int32(&self, name: &str) -> Result<i32, BsonError> {
        match self.value(name)? {
            BsonValue::Int32(v) => Ok(*v),
            other => Err(Self::mismatch("int32", other)),
        }
    }

    /// Returns an int64, widening int32 transparently.
    pub fn get_int64(&self, name: &str) -> Result<i64, BsonError> {
        match self.value(name)? {
            BsonValue::Int64(v) => Ok(*v),
            BsonValue::Int32(v) => Ok(i64::from(*v)),
            other => Err(Self::mismatch("int64", other)),
        }
    }

    pub fn get_double(&self, name: &str) -> Result<f64, BsonError> {
        match self.value(name)? {
            BsonValue::Double(v) => Ok(*v),
            other => Err(Self::mismatch("double", other)),
        }
    }

    pub fn get_boolean(&self, name: &str) -> Result<bool, BsonError> {
        match self.value(name)? {
            BsonValue::Boolean(v) => Ok(*v),
            other => Err(Self::mismatch("boolean", other)),
        }
    }

    /// Milliseconds since the epoch.
    pub fn get_datetime(&self, name: &str) -> Result<i64, BsonError> {
        match self.value(name)? {
            BsonValue::DateTime(v) => Ok(*v),
            other => Err(Self::mismatch("datetime", other)),
        }
    }

    pub fn get_string(&self, name: &str) -> Result<String, BsonError> {
        match self.value(name)? {
            BsonValue::Str(v) => Ok(v.clone()),
            other => Err(Self::mismatch("string", other)),
        }
    }

    /// A zero-copy view of a nested document.
    ///
    /// The nested index is built on this call, not at parent construction;
    /// nothing in the subtree is decoded.
    pub fn get_document(&self, name: &str) -> Result<IndexedDocument<'a>, BsonError> {
        let i = self.index_of(name)?;
        let entry = &self.fields[i];
        if entry.type_byte != TYPE_DOCUMENT {
            return Err(BsonError::TypeMismatch {
                requested: "document",
                actual: type_name(entry.type_byte),
            });
        }
        IndexedDocument::from_slice(self.bytes, entry.value_offset, entry.value_size)
    }

    /// A zero-copy view of a nested array.
    pub fn get_array(&self, name: &str) -> Result<IndexedArray<'a>, BsonError> {
        let i = self.index_of(name)?;
        let entry = &self.fields[i];
        if entry.type_byte != TYPE_ARRAY {
            return Err(BsonError::TypeMismatch {
                requested: "array",
                actual: type_name(entry.type_byte),
            });
        }
        IndexedArray::from_slice(self.bytes, entry.value_offset, entry.value_size)
    }

    pub fn get_int32_or(&self, name: &str, default: i32) -> Result<i32, BsonError> {
        absent_to_default(self.get_int32(name), default)
    }

    pub fn get_int64_or(&self, name: &str, default: i64) -> Result<i64, BsonError> {
        absent_to_default(self.get_int64(name), default)
    }

    pub fn get_double_or(&self, name: &str, default: f64) -> Result<f64, BsonError> {
        absent_to_default(self.get_double(name), default)
    }

    pub fn get_boolean_or(&self, name: &str, default: bool) -> Result<bool, BsonError> {
        absent_to_default(self.get_boolean(name), default)
    }

    pub fn get_datetime_or(&self, name: &str, default: i64) -> Result<i64, BsonError> {
        absent_to_default(self.get_datetime(name), default)
    }

    pub fn get_string_or(&self, name: &str, default: &str) -> Result<String, BsonError> {
        absent_to_default(self.get_string(name), default.to_owned())
    }

    /// Serializes the document to JSON, simple types only.
    ///
    /// Fields appear in index order. A field of an unsupported type fails
    /// the whole call with [`BsonError::Unsupported`].
    pub fn to_json(&self) -> Result<String, BsonError> {
        let mut map = serde_json::Map::with_capacity(self.fields.len());
        for i in 0..self.fields.len() {
            let name = String::from_utf8_lossy(self.name_bytes(&self.fields[i])).into_owned();
            map.insert(name, self.value_at(i)?.to_json_value()?);
        }
        Ok(JsonValue::Object(map).to_string())
    }
}

/// A zero-copy array view: the positional sibling of [`IndexedDocument`].
///
/// Entries are indexed in wire order; the decimal index names on the wire
/// are ignored, and gaps are never filled.
pub struct IndexedArray<'a> {
    bytes: &'a [u8],
    items: Vec<FieldEntry>,
    cache: Vec<OnceLock<BsonValue>>,
}

impl<'a> IndexedArray<'a> {
    /// Indexes an array spanning the whole slice.
    pub fn parse(bytes: &'a [u8]) -> Result<Self, BsonError> {
        Self::from_slice(bytes, 0, bytes.len())
    }

    /// Indexes the array at `bytes[offset..offset + length]`.
    pub fn from_slice(bytes: &'a [u8], offset: usize, length: usize) -> Result<Self, BsonError> {
        let items = scan_entries(bytes, offset, length)?;
        let cache = (0..items.len()).map(|_| OnceLock::new()).collect();
        Ok(Self {
            bytes,
            items,
            cache,
        })
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// The stored type byte of an element, or `None` past the end.
    pub fn get_type(&self, index: usize) -> Option<u8> {
        self.items.get(index).map(|entry| entry.type_byte)
    }

    fn entry(&self, index: usize) -> Result<&FieldEntry, BsonError> {
        self.items.get(index).ok_or_else(|| BsonError::FieldNotFound {
            field: index.to_string(),
        })
    }

    /// The raw wire bytes of an element's value.
    pub fn raw(&self, index: usize) -> Result<&'a [u8], BsonError> {
        let entry = self.entry(index)?;
        Ok(&self.bytes[entry.value_offset..entry.value_offset + entry.value_size])
    }

    /// The decoded value of an element, cached across calls.
    pub fn value(&self, index: usize) -> Result<&BsonValue, BsonError> {
        let entry = *self.entry(index)?;
        if let Some(value) = self.cache[index].get() {
            return Ok(value);
        }
        let mut r = Reader::from_slice(
            self.bytes,
            entry.value_offset,
            entry.value_offset + entry.value_size,
        );
        let value = decode_value(&mut r, entry.type_byte, &CapacityEstimator::default())?;
        Ok(self.cache[index].get_or_init(|| value))
    }

    fn mismatch(requested: &'static str, actual: &BsonValue) -> BsonError {
        BsonError::TypeMismatch {
            requested,
            actual: actual.type_name(),
        }
    }

    pub fn get_int32(&self, index: usize) -> Result<i32, BsonError> {
        match self.value(index)? {
            BsonValue::Int32(v) => Ok(*v),
            other => Err(Self::mismatch("int32", other)),
        }
    }

    pub fn get_int64(&self, index: usize) -> Result<i64, BsonError> {
        match self.value(index)? {
            BsonValue::Int64(v) => Ok(*v),
            BsonValue::Int32(v) => Ok(i64::from(*v)),
            other => Err(Self::mismatch("int64", other)),
        }
    }

    pub fn get_double(&self, index: usize) -> Result<f64, BsonError> {
        match self.value(index)? {
            BsonValue::Double(v) => Ok(*v),
            other => Err(Self::mismatch("double", other)),
        }
    }

    pub fn get_boolean(&self, index: usize) -> Result<bool, BsonError> {
        match self.value(index)? {
            BsonValue::Boolean(v) => Ok(*v),
            other => Err(Self::mismatch("boolean", other)),
        }
    }

    pub fn get_string(&self, index: usize) -> Result<String, BsonError> {
        match self.value(index)? {
            BsonValue::Str(v) => Ok(v.clone()),
            other => Err(Self::mismatch("string", other)),
        }
    }

    /// A zero-copy view of a nested document element.
    pub fn get_document(&self, index: usize) -> Result<IndexedDocument<'a>, BsonError> {
        let entry = self.entry(index)?;
        if entry.type_byte != TYPE_DOCUMENT {
            return Err(BsonError::TypeMismatch {
                requested: "document",
                actual: type_name(entry.type_byte),
            });
        }
        IndexedDocument::from_slice(self.bytes, entry.value_offset, entry.value_size)
    }

    /// A zero-copy view of a nested array element.
    pub fn get_array(&self, index: usize) -> Result<IndexedArray<'a>, BsonError> {
        let entry = self.entry(index)?;
        if entry.type_byte != TYPE_ARRAY {
            return Err(BsonError::TypeMismatch {
                requested: "array",
                actual: type_name(entry.type_byte),
            });
        }
        IndexedArray::from_slice(self.bytes, entry.value_offset, entry.value_size)
    }

    /// Serializes the array to JSON, simple types only.
    pub fn to_json(&self) -> Result<String, BsonError> {
        let mut out = Vec::with_capacity(self.items.len());
        for i in 0..self.items.len() {
            out.push(self.value(i)?.to_json_value()?);
        }
        Ok(JsonValue::Array(out).to_string())
    }
}

fn absent_to_default<T>(result: Result<T, BsonError>, default: T) -> Result<T, BsonError> {
    match result {
        Err(BsonError::FieldNotFound { .. }) => Ok(default),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fnv1a_reference_values() {
        // Standard FNV-1a test vectors.
        assert_eq!(name_hash(b""), 0xcbf2_9ce4_8422_2325);
        assert_eq!(name_hash(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn empty_document_indexes_to_zero_fields() {
        let bytes = [0x05, 0x00, 0x00, 0x00, 0x00];
        let doc = IndexedDocument::parse(&bytes).unwrap();
        assert_eq!(doc.len(), 0);
        assert!(doc.is_empty());
        assert!(!doc.contains("x"));
        assert_eq!(doc.get_type("x"), None);
        assert_eq!(doc.to_json().unwrap(), "{}");
    }

    #[test]
    fn length_prefix_must_match_extent() {
        // Declared 6, but handed a 5-byte extent.
        let bytes = [0x06, 0x00, 0x00, 0x00, 0x00];
        assert!(matches!(
            IndexedDocument::parse(&bytes),
            Err(BsonError::MalformedLength {
                declared: 6,
                measured: 5
            })
        ));
    }
}
