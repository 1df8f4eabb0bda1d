//! Encode/decode structs against a [`Schema`].
//!
//! Encode walks the schema in declaration order and writes each present field as a
//! header followed by a body whose wire type is inferred from the [`Value`]. Decode reads
//! elements until the buffer ends or a `struct_end` appears, maps tags back to names, and
//! steps over unknown tags with the [skipper](crate::skip) so newer peers stay readable.

use crate::encoding::{CodecConfig, StringEncoding};
use crate::reader::Reader;
use crate::schema::Schema;
use crate::skip::Skipper;
use crate::value::{FieldMap, NestedPayload, Value};
use crate::wire::*;
use byteorder::{BigEndian, WriteBytesExt};
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO: {0}")]
    Io(#[from] std::io::Error),
    #[error("Tag out of range: {0} (max 255)")]
    TagOutOfRange(u32),
    #[error("Unsupported value type: {0}")]
    UnsupportedValueType(&'static str),
    #[error("Integer out of int64 range: {0}")]
    IntegerOutOfRange(i128),
    #[error("Unknown wire type: {0}")]
    UnknownWireType(u8),
    #[error("Buffer underflow: needed {needed} bytes, {remaining} remaining")]
    BufferUnderflow { needed: usize, remaining: usize },
    #[error("Unknown field: {0}")]
    UnknownField(String),
    #[error("Nesting depth limit exceeded: {0}")]
    DepthLimit(usize),
    #[error("Unexpected struct end")]
    UnexpectedStructEnd,
    #[error("Schema: {0}")]
    Schema(String),
    #[error("Unknown string encoding: {0}")]
    UnknownEncoding(String),
}

/// One decoded element, as seen without a schema.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: u8,
    pub wire_type: WireType,
    pub value: Value,
}

#[derive(Debug, Clone, Default)]
pub struct Codec {
    config: CodecConfig,
}

/// Wire type the encoder picks for `value`; `None` for [`Value::Absent`].
///
/// Zero is elided, integers take the narrowest signed width, other floats are always
/// `double`, and text switches to a four-byte length above 255 encoded bytes.
pub fn infer_wire_type(value: &Value, encoding: StringEncoding) -> Result<Option<WireType>, CodecError> {
    Ok(Some(match value {
        Value::Absent => return Ok(None),
        Value::Int(x) => int_wire_type(*x as i128)?,
        Value::Wide(x) => int_wire_type(*x)?,
        Value::Float(x) if *x == 0.0 => WireType::Zero,
        Value::Double(x) if *x == 0.0 => WireType::Zero,
        Value::Float(_) | Value::Double(_) => WireType::Double,
        Value::Text(s) => string_wire_type(encoding.encoded_len(s)?),
        Value::RawText(b) => string_wire_type(b.len()),
        Value::Bytes(_) => WireType::SimpleList,
        Value::List(_) => WireType::List,
        Value::Map(_) => WireType::Map,
        Value::Struct(_) | Value::Nested(_) => WireType::StructBegin,
    }))
}

fn int_wire_type(x: i128) -> Result<WireType, CodecError> {
    Ok(if x == 0 {
        WireType::Zero
    } else if i8::try_from(x).is_ok() {
        WireType::Int8
    } else if i16::try_from(x).is_ok() {
        WireType::Int16
    } else if i32::try_from(x).is_ok() {
        WireType::Int32
    } else if i64::try_from(x).is_ok() {
        WireType::Int64
    } else {
        return Err(CodecError::IntegerOutOfRange(x));
    })
}

fn string_wire_type(len: usize) -> WireType {
    if len <= SHORT_STRING_MAX {
        WireType::String1
    } else {
        WireType::String4
    }
}

fn count_u32(n: usize) -> Result<u32, CodecError> {
    u32::try_from(n).map_err(|_| CodecError::UnsupportedValueType("container or payload longer than u32::MAX"))
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Codec { config }
    }

    pub fn with_encoding(encoding: StringEncoding) -> Self {
        Codec::new(CodecConfig {
            encoding,
            ..CodecConfig::default()
        })
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn string_encoding(&self) -> StringEncoding {
        self.config.encoding
    }

    /// Affects calls made after this one; nothing else shares the setting.
    pub fn set_string_encoding(&mut self, encoding: StringEncoding) {
        self.config.encoding = encoding;
    }

    /// Encode `values` as a top-level struct. Fields are emitted in schema order;
    /// names the schema does not declare are rejected.
    pub fn encode(&self, values: &FieldMap, schema: &Schema) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        self.encode_struct(&mut out, values, schema, 0)?;
        Ok(out)
    }

    /// Encode `values` as one struct body, for embedding as a nested field.
    pub fn encode_nested(&self, values: &FieldMap, schema: &Schema) -> Result<NestedPayload, CodecError> {
        self.encode(values, schema).map(NestedPayload::from_bytes)
    }

    /// Decode a struct. Unknown tags are dropped; nested structs without a sub-schema
    /// come back as [`Value::Nested`] for a follow-up `decode` with the right schema.
    pub fn decode(&self, bytes: &[u8], schema: &Schema) -> Result<FieldMap, CodecError> {
        let mut r = Reader::new(bytes);
        self.decode_struct(&mut r, schema, 0)
    }

    /// Decode every top-level element without a schema (nested structs stay raw).
    pub fn decode_elements(&self, bytes: &[u8]) -> Result<Vec<Element>, CodecError> {
        let mut r = Reader::new(bytes);
        let mut out = Vec::new();
        while !r.is_empty() {
            let h = read_header(&mut r)?;
            if h.wire_type == WireType::StructEnd {
                break;
            }
            let value = self.decode_body(&mut r, h, None, 0)?;
            out.push(Element {
                tag: h.tag,
                wire_type: h.wire_type,
                value,
            });
        }
        Ok(out)
    }

    fn encode_struct(
        &self,
        w: &mut Vec<u8>,
        values: &FieldMap,
        schema: &Schema,
        depth: usize,
    ) -> Result<(), CodecError> {
        if let Some(name) = values.keys().find(|k| schema.get(k).is_none()) {
            return Err(CodecError::UnknownField(name.clone()));
        }
        for f in schema.fields() {
            if let Some(v) = values.get(&f.name) {
                self.encode_value(w, f.tag as u32, v, f.nested.as_deref(), depth)?;
            }
        }
        Ok(())
    }

    fn encode_value(
        &self,
        w: &mut Vec<u8>,
        tag: u32,
        value: &Value,
        nested: Option<&Schema>,
        depth: usize,
    ) -> Result<(), CodecError> {
        let encoding = self.config.encoding;
        let wire_type = match infer_wire_type(value, encoding)? {
            Some(t) => t,
            None => return Ok(()),
        };
        write_header(w, wire_type, tag)?;
        match value {
            Value::Int(x) => self.write_int(w, wire_type, *x as i128)?,
            Value::Wide(x) => self.write_int(w, wire_type, *x)?,
            Value::Float(x) => self.write_double(w, wire_type, *x as f64)?,
            Value::Double(x) => self.write_double(w, wire_type, *x)?,
            Value::Text(s) => self.write_string_body(w, wire_type, &encoding.encode_str(s)?)?,
            Value::RawText(b) => self.write_string_body(w, wire_type, b)?,
            Value::Bytes(b) => {
                write_header(w, WireType::Int8, TAG_BYTES as u32)?;
                w.write_u32::<BigEndian>(count_u32(b.len())?)?;
                w.extend_from_slice(b);
            }
            Value::List(items) => {
                self.enter(depth)?;
                w.write_u32::<BigEndian>(count_u32(items.len())?)?;
                for item in items {
                    self.encode_entry(w, TAG_LIST_ELEMENT, item, depth + 1)?;
                }
            }
            Value::Map(m) => {
                self.enter(depth)?;
                w.write_u32::<BigEndian>(count_u32(m.len())?)?;
                for (k, v) in m {
                    let key = encoding.encode_str(k)?;
                    write_header(w, string_wire_type(key.len()), TAG_MAP_KEY as u32)?;
                    self.write_string_body(w, string_wire_type(key.len()), &key)?;
                    self.encode_entry(w, TAG_MAP_VALUE, v, depth + 1)?;
                }
            }
            Value::Struct(fields) => {
                let sub = nested.ok_or(CodecError::UnsupportedValueType(
                    "struct value without a declared sub-schema",
                ))?;
                self.enter(depth)?;
                self.encode_struct(w, fields, sub, depth + 1)?;
                write_header(w, WireType::StructEnd, TAG_STRUCT_END as u32)?;
            }
            Value::Nested(payload) => {
                w.extend_from_slice(payload.as_bytes());
                write_header(w, WireType::StructEnd, TAG_STRUCT_END as u32)?;
            }
            Value::Absent => {}
        }
        Ok(())
    }

    fn encode_entry(&self, w: &mut Vec<u8>, tag: u8, value: &Value, depth: usize) -> Result<(), CodecError> {
        if let Value::Absent = value {
            return Err(CodecError::UnsupportedValueType("absent value inside a map or list"));
        }
        self.encode_value(w, tag as u32, value, None, depth)
    }

    fn write_int(&self, w: &mut Vec<u8>, wire_type: WireType, x: i128) -> Result<(), CodecError> {
        match wire_type {
            WireType::Int8 => w.write_i8(x as i8)?,
            WireType::Int16 => w.write_i16::<BigEndian>(x as i16)?,
            WireType::Int32 => w.write_i32::<BigEndian>(x as i32)?,
            WireType::Int64 => w.write_i64::<BigEndian>(x as i64)?,
            _ => {}
        }
        Ok(())
    }

    fn write_double(&self, w: &mut Vec<u8>, wire_type: WireType, x: f64) -> Result<(), CodecError> {
        if wire_type == WireType::Double {
            w.write_f64::<BigEndian>(x)?;
        }
        Ok(())
    }

    fn write_string_body(&self, w: &mut Vec<u8>, wire_type: WireType, bytes: &[u8]) -> Result<(), CodecError> {
        if wire_type == WireType::String1 {
            w.write_u8(bytes.len() as u8)?;
        } else {
            w.write_u32::<BigEndian>(count_u32(bytes.len())?)?;
        }
        w.extend_from_slice(bytes);
        Ok(())
    }

    fn decode_struct(&self, r: &mut Reader<'_>, schema: &Schema, depth: usize) -> Result<FieldMap, CodecError> {
        let mut out = FieldMap::new();
        while !r.is_empty() {
            let h = read_header(r)?;
            if h.wire_type == WireType::StructEnd {
                break;
            }
            match schema.by_tag(h.tag) {
                Some(f) => {
                    let v = self.decode_body(r, h, f.nested.as_deref(), depth)?;
                    out.insert(f.name.clone(), v);
                }
                None => {
                    trace!(tag = h.tag, wire_type = %h.wire_type, "dropping element with unmapped tag");
                    Skipper::new(r, self.config.max_depth).skip_body(h.wire_type, depth)?;
                }
            }
        }
        Ok(out)
    }

    fn decode_body(
        &self,
        r: &mut Reader<'_>,
        h: Header,
        nested: Option<&Schema>,
        depth: usize,
    ) -> Result<Value, CodecError> {
        Ok(match h.wire_type {
            WireType::Int8 => Value::Int(r.read_i8()? as i64),
            WireType::Int16 => Value::Int(r.read_i16()? as i64),
            WireType::Int32 => Value::Int(r.read_i32()? as i64),
            WireType::Int64 => Value::Int(r.read_i64()?),
            WireType::Float => Value::Float(r.read_f32()?),
            WireType::Double => Value::Double(r.read_f64()?),
            WireType::String1 => {
                let n = r.read_u8()? as usize;
                self.config.encoding.decode_bytes(r.take(n)?)
            }
            WireType::String4 => {
                let n = r.read_u32()? as usize;
                self.config.encoding.decode_bytes(r.take(n)?)
            }
            WireType::Map => {
                self.enter(depth)?;
                let n = r.read_u32()?;
                let mut map = BTreeMap::new();
                for _ in 0..n {
                    let k = self.decode_entry(r, depth + 1)?;
                    let v = self.decode_entry(r, depth + 1)?;
                    map.insert(k.to_key_string(), v);
                }
                Value::Map(map)
            }
            WireType::List => {
                self.enter(depth)?;
                let n = r.read_u32()? as usize;
                // every entry takes at least one byte
                let mut list = Vec::with_capacity(n.min(r.remaining()));
                for _ in 0..n {
                    list.push(self.decode_entry(r, depth + 1)?);
                }
                Value::List(list)
            }
            WireType::StructBegin => match nested {
                Some(sub) => {
                    self.enter(depth)?;
                    Value::Struct(self.decode_struct(r, sub, depth + 1)?)
                }
                None => {
                    let span = Skipper::new(r, self.config.max_depth).skip_struct(depth)?;
                    debug!(tag = h.tag, len = span.body.len(), "nested struct kept raw (no sub-schema)");
                    Value::Nested(NestedPayload::from_bytes(r.data()[span.body].to_vec()))
                }
            },
            WireType::StructEnd => return Err(CodecError::UnexpectedStructEnd),
            WireType::Zero => Value::Int(0),
            WireType::SimpleList => {
                skip_header(r)?;
                let n = r.read_u32()? as usize;
                Value::Bytes(r.take(n)?.to_vec())
            }
        })
    }

    fn decode_entry(&self, r: &mut Reader<'_>, depth: usize) -> Result<Value, CodecError> {
        let h = read_header(r)?;
        if h.wire_type == WireType::StructEnd {
            return Err(CodecError::UnexpectedStructEnd);
        }
        self.decode_body(r, h, None, depth)
    }

    fn enter(&self, depth: usize) -> Result<(), CodecError> {
        if depth >= self.config.max_depth {
            return Err(CodecError::DepthLimit(self.config.max_depth));
        }
        Ok(())
    }
}

/// [`Codec::encode`] with the default configuration (UTF-8 text).
pub fn encode(values: &FieldMap, schema: &Schema) -> Result<Vec<u8>, CodecError> {
    Codec::default().encode(values, schema)
}

/// [`Codec::encode_nested`] with the default configuration.
pub fn encode_nested(values: &FieldMap, schema: &Schema) -> Result<NestedPayload, CodecError> {
    Codec::default().encode_nested(values, schema)
}

/// [`Codec::decode`] with the default configuration.
pub fn decode(bytes: &[u8], schema: &Schema) -> Result<FieldMap, CodecError> {
    Codec::default().decode(bytes, schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_boundaries() {
        let enc = StringEncoding::Utf8;
        let wt = |x: i128| infer_wire_type(&Value::Wide(x), enc).unwrap();
        assert_eq!(wt(0), Some(WireType::Zero));
        assert_eq!(wt(127), Some(WireType::Int8));
        assert_eq!(wt(128), Some(WireType::Int16));
        assert_eq!(wt(-128), Some(WireType::Int8));
        assert_eq!(wt(-129), Some(WireType::Int16));
        assert_eq!(wt(32767), Some(WireType::Int16));
        assert_eq!(wt(32768), Some(WireType::Int32));
        assert_eq!(wt((1 << 31) - 1), Some(WireType::Int32));
        assert_eq!(wt(1 << 31), Some(WireType::Int64));
        assert_eq!(wt(i64::MIN as i128), Some(WireType::Int64));
        assert!(matches!(
            infer_wire_type(&Value::Wide(i64::MAX as i128 + 1), enc),
            Err(CodecError::IntegerOutOfRange(_))
        ));
    }

    #[test]
    fn floats_are_double_unless_zero() {
        let enc = StringEncoding::Utf8;
        assert_eq!(infer_wire_type(&Value::Double(0.0), enc).unwrap(), Some(WireType::Zero));
        assert_eq!(infer_wire_type(&Value::Double(2.0), enc).unwrap(), Some(WireType::Double));
        assert_eq!(infer_wire_type(&Value::Float(1.5), enc).unwrap(), Some(WireType::Double));
        assert_eq!(infer_wire_type(&Value::Absent, enc).unwrap(), None);
    }

    #[test]
    fn string_width_by_encoded_length() {
        let enc = StringEncoding::Utf8;
        let s255 = "a".repeat(255);
        let s256 = "a".repeat(256);
        assert_eq!(infer_wire_type(&Value::Text(s255), enc).unwrap(), Some(WireType::String1));
        assert_eq!(infer_wire_type(&Value::Text(s256), enc).unwrap(), Some(WireType::String4));
        // 128 two-byte chars: 128 chars but 256 encoded bytes
        let wide = "é".repeat(128);
        assert_eq!(infer_wire_type(&Value::Text(wide.clone()), enc).unwrap(), Some(WireType::String4));
        assert_eq!(
            infer_wire_type(&Value::Text(wide), StringEncoding::Latin1).unwrap(),
            Some(WireType::String1)
        );
    }

    #[test]
    fn decode_elements_lists_tags() {
        let bytes = [0x0C, 0x16, 0x01, b'x', 0x0B, 0x2C];
        let elems = Codec::default().decode_elements(&bytes).unwrap();
        assert_eq!(
            elems,
            vec![
                Element { tag: 0, wire_type: WireType::Zero, value: Value::Int(0) },
                Element { tag: 1, wire_type: WireType::String1, value: Value::Text("x".into()) },
            ]
        );
    }

    #[test]
    fn float_wire_type_decodes() {
        let schema = Schema::from_tags([("f", 2)]).unwrap();
        let mut bytes = vec![0x24];
        bytes.extend_from_slice(&1.5f32.to_be_bytes());
        let out = decode(&bytes, &schema).unwrap();
        assert_eq!(out.get("f"), Some(&Value::Float(1.5)));
    }
}
