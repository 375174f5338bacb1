//! BSON type registry: the MongoDB 3.4 type codes and the fixed-size table.
//!
//! The type codes are part of the ABI and must match the wire format
//! bit-exactly. The fixed-size table is built at compile time and never
//! mutated; a value size of `-1` marks a variable-size type and `-2` a byte
//! that is not a BSON type at all.

/// 64-bit IEEE-754 double.
pub const TYPE_DOUBLE: u8 = 0x01;
/// Length-prefixed UTF-8 string.
pub const TYPE_STRING: u8 = 0x02;
/// Embedded document.
pub const TYPE_DOCUMENT: u8 = 0x03;
/// Array (a document with decimal-string index names).
pub const TYPE_ARRAY: u8 = 0x04;
/// Binary blob with a subtype byte.
pub const TYPE_BINARY: u8 = 0x05;
/// Deprecated undefined value.
pub const TYPE_UNDEFINED: u8 = 0x06;
/// 12-byte ObjectId.
pub const TYPE_OBJECT_ID: u8 = 0x07;
/// Single-byte boolean.
pub const TYPE_BOOLEAN: u8 = 0x08;
/// UTC datetime, int64 milliseconds since the epoch.
pub const TYPE_DATETIME: u8 = 0x09;
/// Null.
pub const TYPE_NULL: u8 = 0x0a;
/// Regular expression: two consecutive cstrings (pattern, options).
pub const TYPE_REGEX: u8 = 0x0b;
/// Deprecated DBPointer: string namespace + 12-byte ObjectId.
pub const TYPE_DB_POINTER: u8 = 0x0c;
/// JavaScript code.
pub const TYPE_JAVASCRIPT: u8 = 0x0d;
/// Deprecated symbol.
pub const TYPE_SYMBOL: u8 = 0x0e;
/// JavaScript code with a scope document.
pub const TYPE_JAVASCRIPT_WITH_SCOPE: u8 = 0x0f;
/// 32-bit integer.
pub const TYPE_INT32: u8 = 0x10;
/// MongoDB internal timestamp.
pub const TYPE_TIMESTAMP: u8 = 0x11;
/// 64-bit integer.
pub const TYPE_INT64: u8 = 0x12;
/// 128-bit decimal floating point, raw 16-byte payload.
pub const TYPE_DECIMAL128: u8 = 0x13;
/// MinKey sentinel.
pub const TYPE_MIN_KEY: u8 = 0xff;
/// MaxKey sentinel.
pub const TYPE_MAX_KEY: u8 = 0x7f;

/// Smallest well-formed document: length prefix + terminator.
pub const MIN_DOCUMENT_LEN: i32 = 5;

const VARIABLE: i16 = -1;
const INVALID: i16 = -2;

static FIXED_SIZES: [i16; 256] = build_fixed_sizes();

const fn build_fixed_sizes() -> [i16; 256] {
    let mut t = [INVALID; 256];
    t[TYPE_DOUBLE as usize] = 8;
    t[TYPE_STRING as usize] = VARIABLE;
    t[TYPE_DOCUMENT as usize] = VARIABLE;
    t[TYPE_ARRAY as usize] = VARIABLE;
    t[TYPE_BINARY as usize] = VARIABLE;
    t[TYPE_UNDEFINED as usize] = 0;
    t[TYPE_OBJECT_ID as usize] = 12;
    t[TYPE_BOOLEAN as usize] = 1;
    t[TYPE_DATETIME as usize] = 8;
    t[TYPE_NULL as usize] = 0;
    t[TYPE_REGEX as usize] = VARIABLE;
    t[TYPE_DB_POINTER as usize] = VARIABLE;
    t[TYPE_JAVASCRIPT as usize] = VARIABLE;
    t[TYPE_SYMBOL as usize] = VARIABLE;
    t[TYPE_JAVASCRIPT_WITH_SCOPE as usize] = VARIABLE;
    t[TYPE_INT32 as usize] = 4;
    t[TYPE_TIMESTAMP as usize] = 8;
    t[TYPE_INT64 as usize] = 8;
    t[TYPE_DECIMAL128 as usize] = 16;
    t[TYPE_MIN_KEY as usize] = 0;
    t[TYPE_MAX_KEY as usize] = 0;
    t
}

/// Whether the byte is one of the 21 known type codes.
#[inline]
pub fn is_valid_type(type_byte: u8) -> bool {
    FIXED_SIZES[type_byte as usize] != INVALID
}

/// On-wire value size of a fixed-size type; `None` for variable-size types
/// and for bytes that are not BSON types.
#[inline]
pub fn fixed_value_size(type_byte: u8) -> Option<usize> {
    match FIXED_SIZES[type_byte as usize] {
        n if n >= 0 => Some(n as usize),
        _ => None,
    }
}

/// Human-readable type name for diagnostics.
pub fn type_name(type_byte: u8) -> &'static str {
    match type_byte {
        TYPE_DOUBLE => "double",
        TYPE_STRING => "string",
        TYPE_DOCUMENT => "document",
        TYPE_ARRAY => "array",
        TYPE_BINARY => "binary",
        TYPE_UNDEFINED => "undefined",
        TYPE_OBJECT_ID => "objectId",
        TYPE_BOOLEAN => "boolean",
        TYPE_DATETIME => "datetime",
        TYPE_NULL => "null",
        TYPE_REGEX => "regex",
        TYPE_DB_POINTER => "dbPointer",
        TYPE_JAVASCRIPT => "javascript",
        TYPE_SYMBOL => "symbol",
        TYPE_JAVASCRIPT_WITH_SCOPE => "javascriptWithScope",
        TYPE_INT32 => "int32",
        TYPE_TIMESTAMP => "timestamp",
        TYPE_INT64 => "int64",
        TYPE_DECIMAL128 => "decimal128",
        TYPE_MIN_KEY => "minKey",
        TYPE_MAX_KEY => "maxKey",
        _ => "unknown",
    }
}
