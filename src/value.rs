//! Runtime values for encoding/decoding.

use std::collections::{BTreeMap, HashMap};

/// Field name → value, for one struct.
pub type FieldMap = HashMap<String, Value>;

/// Raw bytes of exactly one struct body (no begin/end markers).
///
/// Produced by [`Codec::encode_nested`](crate::Codec::encode_nested) for embedding, and by
/// decode when a nested struct has no known sub-schema; decode it later against the right one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NestedPayload(Vec<u8>);

impl NestedPayload {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        NestedPayload(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A single value (field, container entry, or nested struct).
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    /// Integer input wider than `i64`; encoding fails if it does not fit `int64`.
    Wide(i128),
    Float(f32),
    Double(f64),
    Text(String),
    /// Text bytes kept as-is (raw string mode).
    RawText(Vec<u8>),
    /// Opaque byte blob (`simple_list` on the wire).
    Bytes(Vec<u8>),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
    /// Nested struct decoded against (or to be encoded with) a declared sub-schema.
    Struct(FieldMap),
    /// Nested struct body kept as raw bytes.
    Nested(NestedPayload),
    /// Omitted; encodes to nothing.
    Absent,
}

impl Value {
    /// Short category name for error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Int(_) => "int",
            Value::Wide(_) => "wide int",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Text(_) => "text",
            Value::RawText(_) => "raw text",
            Value::Bytes(_) => "bytes",
            Value::List(_) => "list",
            Value::Map(_) => "map",
            Value::Struct(_) => "struct",
            Value::Nested(_) => "nested payload",
            Value::Absent => "absent",
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Int(x) => Some(*x),
            Value::Wide(x) => i64::try_from(*x).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(x) => Some(*x),
            Value::Float(x) => Some(*x as f64),
            Value::Int(x) => Some(*x as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            Value::Bytes(b) | Value::RawText(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&FieldMap> {
        match self {
            Value::Struct(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_nested(&self) -> Option<&NestedPayload> {
        match self {
            Value::Nested(p) => Some(p),
            _ => None,
        }
    }

    /// Text form used when a decoded value becomes a map key.
    pub fn to_key_string(&self) -> String {
        match self {
            Value::Int(x) => x.to_string(),
            Value::Wide(x) => x.to_string(),
            Value::Float(x) => x.to_string(),
            Value::Double(x) => x.to_string(),
            Value::Text(s) => s.clone(),
            Value::RawText(b) | Value::Bytes(b) => String::from_utf8_lossy(b).into_owned(),
            Value::Nested(p) => String::from_utf8_lossy(p.as_bytes()).into_owned(),
            Value::List(items) => items
                .iter()
                .map(Value::to_key_string)
                .collect::<Vec<_>>()
                .join(","),
            other => format!("{:?}", other),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v as i64)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        match i64::try_from(v) {
            Ok(x) => Value::Int(x),
            Err(_) => Value::Wide(v as i128),
        }
    }
}

impl From<i128> for Value {
    fn from(v: i128) -> Self {
        Value::Wide(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<Value>> for Value {
    fn from(v: Vec<Value>) -> Self {
        Value::List(v)
    }
}

impl From<BTreeMap<String, Value>> for Value {
    fn from(v: BTreeMap<String, Value>) -> Self {
        Value::Map(v)
    }
}

impl From<NestedPayload> for Value {
    fn from(v: NestedPayload) -> Self {
        Value::Nested(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Absent)
    }
}
