//! # jcepack — JCE tag/value binary codec
//!
//! Encodes a field map into the JCE wire format and back, driven by a [`Schema`]
//! that maps field names to tags (0–255), optionally with nested sub-schemas.
//!
//! ## Wire format
//!
//! Every element is a header followed by a body:
//!
//! - **Header**: one byte, high nibble = tag, low nibble = wire type. Tags 15–255 use
//!   `0xF` in the high nibble and a second byte with the full tag.
//! - **Bodies** (big-endian): `int8`/`int16`/`int32`/`int64`, `float`/`double`,
//!   `string1` (u8 length), `string4` (u32 length), `map`/`list` (u32 count, then
//!   entries with tags 0/1 or 0), `struct_begin` … `struct_end`, `zero` (no body),
//!   `simple_list` (inner header, u32 length, raw bytes).
//!
//! The encoder picks the wire type from the [`Value`]: zero is elided, integers use
//! the narrowest width, floats use `double`, text longer than 255 bytes uses `string4`.
//!
//! ## Forward compatibility
//!
//! Decoding never fails because of tags the schema does not know: their bodies are
//! skipped with the same width rules ([`skip`]). A nested struct without a sub-schema
//! is captured raw as a [`NestedPayload`] so it can be decoded later.
//!
//! ## Example
//!
//! ```
//! use jcepack::{decode, encode, FieldMap, Schema, Value};
//!
//! let schema = Schema::from_tags([("a", 0), ("b", 1)]).unwrap();
//! let mut values = FieldMap::new();
//! values.insert("a".into(), Value::Int(0));
//! values.insert("b".into(), Value::from("x"));
//!
//! let bytes = encode(&values, &schema).unwrap();
//! assert_eq!(bytes, [0x0C, 0x16, 0x01, b'x']);
//! assert_eq!(decode(&bytes, &schema).unwrap(), values);
//! ```

pub mod ast;
pub mod codec;
pub mod encoding;
pub mod parser;
pub mod reader;
pub mod schema;
pub mod skip;
pub mod value;
pub mod wire;

pub use ast::{SchemaDoc, SchemaSet};
pub use codec::{decode, encode, encode_nested, infer_wire_type, Codec, CodecError, Element};
pub use encoding::{CodecConfig, StringEncoding};
pub use parser::{parse, parse_schemas};
pub use schema::{Schema, SchemaBuilder, SchemaField};
pub use skip::{element_extent, struct_extent};
pub use value::{FieldMap, NestedPayload, Value};
pub use wire::WireType;
