//! Decoded BSON value types.
//!
//! Every decoded value owns its data, so an eagerly decoded document may
//! outlive the input slice. Deprecated wire types collapse on decode:
//! `undefined` becomes [`BsonValue::Null`], while `symbol` and plain
//! `javascript` become [`BsonValue::Str`].

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::error::BsonError;

/// An eagerly decoded document: an unordered field-name mapping.
pub type BsonDocument = HashMap<String, BsonValue>;

/// BSON binary data (subtype byte + owned bytes).
///
/// The payload is an owned copy of the wire bytes. Zero-copy access to a
/// binary value's raw bytes goes through `IndexedDocument::raw` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonBinary {
    pub subtype: u8,
    pub data: Vec<u8>,
}

/// BSON regular expression (pattern + option flags).
#[derive(Debug, Clone, PartialEq)]
pub struct BsonRegex {
    pub pattern: String,
    pub options: String,
}

/// Deprecated BSON DBPointer: a namespace string and an ObjectId in hex.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonDbPointer {
    pub namespace: String,
    pub id: String,
}

/// BSON JavaScript code with its scope document.
#[derive(Debug, Clone, PartialEq)]
pub struct BsonCodeWithScope {
    pub code: String,
    pub scope: BsonDocument,
}

/// MongoDB internal replication timestamp.
///
/// The wire int64 carries the increment in its low 32 bits and the seconds
/// in its high 32 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BsonTimestamp {
    pub seconds: u32,
    pub increment: u32,
}

/// A decoded BSON value.
#[derive(Debug, Clone, PartialEq)]
pub enum BsonValue {
    /// Null; also the decoded form of the deprecated `undefined` type.
    Null,
    /// Boolean (0x08).
    Boolean(bool),
    /// 32-bit integer (0x10).
    Int32(i32),
    /// 64-bit integer (0x12).
    Int64(i64),
    /// 64-bit double (0x01).
    Double(f64),
    /// UTC datetime as int64 milliseconds since the epoch (0x09).
    DateTime(i64),
    /// UTF-8 string (0x02); also the decoded form of `symbol` and plain
    /// `javascript`.
    Str(String),
    /// Binary data (0x05).
    Binary(BsonBinary),
    /// ObjectId as a 24-character lowercase hex string (0x07).
    ObjectId(String),
    /// Replication timestamp (0x11).
    Timestamp(BsonTimestamp),
    /// Raw 16-byte little-endian decimal128 payload (0x13).
    Decimal128([u8; 16]),
    /// Regular expression (0x0B).
    Regex(BsonRegex),
    /// Deprecated DBPointer (0x0C).
    DbPointer(BsonDbPointer),
    /// JavaScript code with scope (0x0F).
    CodeWithScope(BsonCodeWithScope),
    /// MinKey sentinel (0xFF).
    MinKey,
    /// MaxKey sentinel (0x7F).
    MaxKey,
    /// Embedded document (0x03).
    Document(BsonDocument),
    /// Array in wire order (0x04).
    Array(Vec<BsonValue>),
}

impl BsonValue {
    /// Human-readable name of the decoded variant, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            BsonValue::Null => "null",
            BsonValue::Boolean(_) => "boolean",
            BsonValue::Int32(_) => "int32",
            BsonValue::Int64(_) => "int64",
            BsonValue::Double(_) => "double",
            BsonValue::DateTime(_) => "datetime",
            BsonValue::Str(_) => "string",
            BsonValue::Binary(_) => "binary",
            BsonValue::ObjectId(_) => "objectId",
            BsonValue::Timestamp(_) => "timestamp",
            BsonValue::Decimal128(_) => "decimal128",
            BsonValue::Regex(_) => "regex",
            BsonValue::DbPointer(_) => "dbPointer",
            BsonValue::CodeWithScope(_) => "javascriptWithScope",
            BsonValue::MinKey => "minKey",
            BsonValue::MaxKey => "maxKey",
            BsonValue::Document(_) => "document",
            BsonValue::Array(_) => "array",
        }
    }

    /// Converts the value to a [`serde_json::Value`].
    ///
    /// Simple types serialize: null, boolean, int32, int64, double, string,
    /// datetime (as a number), ObjectId (as its hex string), and documents
    /// or arrays of those. Everything else fails with
    /// [`BsonError::Unsupported`]. Non-finite doubles become JSON null.
    pub fn to_json_value(&self) -> Result<JsonValue, BsonError> {
        match self {
            BsonValue::Null => Ok(JsonValue::Null),
            BsonValue::Boolean(b) => Ok(JsonValue::Bool(*b)),
            BsonValue::Int32(n) => Ok(JsonValue::from(*n)),
            BsonValue::Int64(n) => Ok(JsonValue::from(*n)),
            BsonValue::DateTime(ms) => Ok(JsonValue::from(*ms)),
            BsonValue::Double(f) => Ok(serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null)),
            BsonValue::Str(s) => Ok(JsonValue::String(s.clone())),
            BsonValue::ObjectId(hex) => Ok(JsonValue::String(hex.clone())),
            BsonValue::Document(fields) => {
                let mut map = serde_json::Map::with_capacity(fields.len());
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json_value()?);
                }
                Ok(JsonValue::Object(map))
            }
            BsonValue::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(item.to_json_value()?);
                }
                Ok(JsonValue::Array(out))
            }
            other => Err(BsonError::Unsupported {
                type_name: other.type_name(),
            }),
        }
    }
}
