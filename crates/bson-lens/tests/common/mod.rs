//! Test fixture builder.
//!
//! A minimal length-patching BSON writer used only to produce decode
//! inputs; the engine under test is decode-only. `raw_element` is the
//! escape hatch for deliberately malformed payloads.

#![allow(dead_code)]

use bson_lens::constants::{
    TYPE_ARRAY, TYPE_BINARY, TYPE_BOOLEAN, TYPE_DATETIME, TYPE_DB_POINTER, TYPE_DECIMAL128,
    TYPE_DOCUMENT, TYPE_DOUBLE, TYPE_INT32, TYPE_INT64, TYPE_JAVASCRIPT,
    TYPE_JAVASCRIPT_WITH_SCOPE, TYPE_MAX_KEY, TYPE_MIN_KEY, TYPE_NULL, TYPE_OBJECT_ID,
    TYPE_REGEX, TYPE_STRING, TYPE_SYMBOL, TYPE_TIMESTAMP, TYPE_UNDEFINED,
};

/// Chainable BSON document builder; `finish` patches the length prefix and
/// appends the terminator.
pub struct DocBuilder {
    buf: Vec<u8>,
}

impl Default for DocBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl DocBuilder {
    pub fn new() -> Self {
        Self {
            buf: vec![0, 0, 0, 0],
        }
    }

    fn header(&mut self, type_byte: u8, name: &str) {
        self.buf.push(type_byte);
        self.buf.extend_from_slice(name.as_bytes());
        self.buf.push(0);
    }

    fn put_string(&mut self, v: &str) {
        self.buf
            .extend_from_slice(&(v.len() as i32 + 1).to_le_bytes());
        self.buf.extend_from_slice(v.as_bytes());
        self.buf.push(0);
    }

    pub fn double(mut self, name: &str, v: f64) -> Self {
        self.header(TYPE_DOUBLE, name);
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn string(mut self, name: &str, v: &str) -> Self {
        self.header(TYPE_STRING, name);
        self.put_string(v);
        self
    }

    pub fn document(mut self, name: &str, doc: Vec<u8>) -> Self {
        self.header(TYPE_DOCUMENT, name);
        self.buf.extend_from_slice(&doc);
        self
    }

    pub fn array(mut self, name: &str, arr: Vec<u8>) -> Self {
        self.header(TYPE_ARRAY, name);
        self.buf.extend_from_slice(&arr);
        self
    }

    pub fn binary(mut self, name: &str, subtype: u8, data: &[u8]) -> Self {
        self.header(TYPE_BINARY, name);
        self.buf.extend_from_slice(&(data.len() as i32).to_le_bytes());
        self.buf.push(subtype);
        self.buf.extend_from_slice(data);
        self
    }

    pub fn undefined(mut self, name: &str) -> Self {
        self.header(TYPE_UNDEFINED, name);
        self
    }

    pub fn object_id(mut self, name: &str, id: &[u8; 12]) -> Self {
        self.header(TYPE_OBJECT_ID, name);
        self.buf.extend_from_slice(id);
        self
    }

    pub fn boolean(mut self, name: &str, v: bool) -> Self {
        self.header(TYPE_BOOLEAN, name);
        self.buf.push(v as u8);
        self
    }

    pub fn datetime(mut self, name: &str, ms: i64) -> Self {
        self.header(TYPE_DATETIME, name);
        self.buf.extend_from_slice(&ms.to_le_bytes());
        self
    }

    pub fn null(mut self, name: &str) -> Self {
        self.header(TYPE_NULL, name);
        self
    }

    pub fn regex(mut self, name: &str, pattern: &str, options: &str) -> Self {
        self.header(TYPE_REGEX, name);
        self.buf.extend_from_slice(pattern.as_bytes());
        self.buf.push(0);
        self.buf.extend_from_slice(options.as_bytes());
        self.buf.push(0);
        self
    }

    pub fn db_pointer(mut self, name: &str, namespace: &str, id: &[u8; 12]) -> Self {
        self.header(TYPE_DB_POINTER, name);
        self.put_string(namespace);
        self.buf.extend_from_slice(id);
        self
    }

    pub fn javascript(mut self, name: &str, code: &str) -> Self {
        self.header(TYPE_JAVASCRIPT, name);
        self.put_string(code);
        self
    }

    pub fn symbol(mut self, name: &str, v: &str) -> Self {
        self.header(TYPE_SYMBOL, name);
        self.put_string(v);
        self
    }

    pub fn code_with_scope(mut self, name: &str, code: &str, scope: Vec<u8>) -> Self {
        self.header(TYPE_JAVASCRIPT_WITH_SCOPE, name);
        let total = 4 + 4 + code.len() as i32 + 1 + scope.len() as i32;
        self.buf.extend_from_slice(&total.to_le_bytes());
        self.put_string(code);
        self.buf.extend_from_slice(&scope);
        self
    }

    pub fn int32(mut self, name: &str, v: i32) -> Self {
        self.header(TYPE_INT32, name);
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    /// Wire order: increment first, then seconds.
    pub fn timestamp(mut self, name: &str, seconds: u32, increment: u32) -> Self {
        self.header(TYPE_TIMESTAMP, name);
        self.buf.extend_from_slice(&increment.to_le_bytes());
        self.buf.extend_from_slice(&seconds.to_le_bytes());
        self
    }

    pub fn int64(mut self, name: &str, v: i64) -> Self {
        self.header(TYPE_INT64, name);
        self.buf.extend_from_slice(&v.to_le_bytes());
        self
    }

    pub fn decimal128(mut self, name: &str, payload: &[u8; 16]) -> Self {
        self.header(TYPE_DECIMAL128, name);
        self.buf.extend_from_slice(payload);
        self
    }

    pub fn min_key(mut self, name: &str) -> Self {
        self.header(TYPE_MIN_KEY, name);
        self
    }

    pub fn max_key(mut self, name: &str) -> Self {
        self.header(TYPE_MAX_KEY, name);
        self
    }

    /// Appends an element with an arbitrary type byte and payload, for
    /// malformed-input fixtures.
    pub fn raw_element(mut self, type_byte: u8, name: &str, payload: &[u8]) -> Self {
        self.header(type_byte, name);
        self.buf.extend_from_slice(payload);
        self
    }

    /// Appends an element whose name is raw bytes (not necessarily UTF-8).
    pub fn raw_name_element(mut self, type_byte: u8, name: &[u8], payload: &[u8]) -> Self {
        self.buf.push(type_byte);
        self.buf.extend_from_slice(name);
        self.buf.push(0);
        self.buf.extend_from_slice(payload);
        self
    }

    pub fn finish(mut self) -> Vec<u8> {
        self.buf.push(0);
        let len = self.buf.len() as i32;
        self.buf[0..4].copy_from_slice(&len.to_le_bytes());
        self.buf
    }
}

/// Builds an array document with the conventional "0", "1", … index names.
pub fn array_of(values: Vec<(u8, Vec<u8>)>) -> Vec<u8> {
    let mut b = DocBuilder::new();
    for (i, (type_byte, payload)) in values.into_iter().enumerate() {
        b = b.raw_element(type_byte, &i.to_string(), &payload);
    }
    b.finish()
}

/// Payload helpers for `array_of`.
pub fn int32_payload(v: i32) -> (u8, Vec<u8>) {
    (TYPE_INT32, v.to_le_bytes().to_vec())
}

pub fn string_payload(v: &str) -> (u8, Vec<u8>) {
    let mut p = (v.len() as i32 + 1).to_le_bytes().to_vec();
    p.extend_from_slice(v.as_bytes());
    p.push(0);
    (TYPE_STRING, p)
}
