//! Wire types and the tag header.
//!
//! A header is one byte: high nibble = tag, low nibble = wire type. Tags 15..=255
//! set the high nibble to `0xF` and carry the full tag in a second byte.

use crate::codec::CodecError;
use crate::reader::Reader;
use byteorder::WriteBytesExt;
use std::fmt;

/// High-nibble value announcing a second tag byte.
pub const TAG_ESCAPE: u8 = 0x0F;

/// Largest tag a header can carry.
pub const MAX_TAG: u32 = 255;

/// Fixed tags used inside containers and struct framing.
pub const TAG_MAP_KEY: u8 = 0;
pub const TAG_MAP_VALUE: u8 = 1;
pub const TAG_LIST_ELEMENT: u8 = 0;
pub const TAG_BYTES: u8 = 0;
pub const TAG_STRUCT_END: u8 = 0;

/// Largest payload written with a one-byte length prefix.
pub const SHORT_STRING_MAX: usize = 0xFF;

/// Body layout selector (4 bits on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Int8 = 0,
    Int16 = 1,
    Int32 = 2,
    Int64 = 3,
    Float = 4,
    Double = 5,
    String1 = 6,
    String4 = 7,
    Map = 8,
    List = 9,
    StructBegin = 10,
    StructEnd = 11,
    Zero = 12,
    SimpleList = 13,
}

impl WireType {
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Body size when it does not depend on the body contents.
    pub fn fixed_body_len(self) -> Option<usize> {
        match self {
            WireType::Int8 => Some(1),
            WireType::Int16 => Some(2),
            WireType::Int32 | WireType::Float => Some(4),
            WireType::Int64 | WireType::Double => Some(8),
            WireType::StructEnd | WireType::Zero => Some(0),
            _ => None,
        }
    }
}

impl TryFrom<u8> for WireType {
    type Error = CodecError;

    fn try_from(v: u8) -> Result<Self, CodecError> {
        Ok(match v {
            0 => WireType::Int8,
            1 => WireType::Int16,
            2 => WireType::Int32,
            3 => WireType::Int64,
            4 => WireType::Float,
            5 => WireType::Double,
            6 => WireType::String1,
            7 => WireType::String4,
            8 => WireType::Map,
            9 => WireType::List,
            10 => WireType::StructBegin,
            11 => WireType::StructEnd,
            12 => WireType::Zero,
            13 => WireType::SimpleList,
            other => return Err(CodecError::UnknownWireType(other)),
        })
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WireType::Int8 => "int8",
            WireType::Int16 => "int16",
            WireType::Int32 => "int32",
            WireType::Int64 => "int64",
            WireType::Float => "float",
            WireType::Double => "double",
            WireType::String1 => "string1",
            WireType::String4 => "string4",
            WireType::Map => "map",
            WireType::List => "list",
            WireType::StructBegin => "struct_begin",
            WireType::StructEnd => "struct_end",
            WireType::Zero => "zero",
            WireType::SimpleList => "simple_list",
        };
        f.write_str(s)
    }
}

/// Decoded header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub tag: u8,
    pub wire_type: WireType,
}

/// Number of bytes the header for `tag` occupies.
pub fn header_len(tag: u8) -> usize {
    if tag < TAG_ESCAPE {
        1
    } else {
        2
    }
}

/// Append the header for (`wire_type`, `tag`). Tags above 255 fail with `TagOutOfRange`.
pub fn write_header(w: &mut Vec<u8>, wire_type: WireType, tag: u32) -> Result<(), CodecError> {
    if tag > MAX_TAG {
        return Err(CodecError::TagOutOfRange(tag));
    }
    let ty = wire_type.as_u8();
    if tag < TAG_ESCAPE as u32 {
        w.write_u8(((tag as u8) << 4) | ty)?;
    } else {
        w.write_u8((TAG_ESCAPE << 4) | ty)?;
        w.write_u8(tag as u8)?;
    }
    Ok(())
}

pub fn read_header(r: &mut Reader<'_>) -> Result<Header, CodecError> {
    let b = r.read_u8()?;
    let wire_type = WireType::try_from(b & 0x0F)?;
    let mut tag = b >> 4;
    if tag == TAG_ESCAPE {
        tag = r.read_u8()?;
    }
    Ok(Header { tag, wire_type })
}

/// Consume a header without interpreting it (the inner header of a `simple_list`).
///
/// The type nibble is not validated; only the escape decides whether a tag byte follows.
pub fn skip_header(r: &mut Reader<'_>) -> Result<(), CodecError> {
    let b = r.read_u8()?;
    if b >> 4 == TAG_ESCAPE {
        r.skip(1)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header_bytes(wire_type: WireType, tag: u32) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::new();
        write_header(&mut out, wire_type, tag)?;
        Ok(out)
    }

    #[test]
    fn small_tags_use_one_byte() {
        assert_eq!(header_bytes(WireType::Zero, 0).unwrap(), vec![0x0C]);
        assert_eq!(header_bytes(WireType::String1, 1).unwrap(), vec![0x16]);
        assert_eq!(header_bytes(WireType::Int8, 14).unwrap(), vec![0xE0]);
    }

    #[test]
    fn escaped_tags_use_two_bytes() {
        assert_eq!(header_bytes(WireType::Int8, 15).unwrap(), vec![0xF0, 0x0F]);
        assert_eq!(header_bytes(WireType::StructBegin, 255).unwrap(), vec![0xFA, 0xFF]);
        assert_eq!(header_len(14), 1);
        assert_eq!(header_len(15), 2);
    }

    #[test]
    fn tag_256_rejected() {
        assert!(matches!(
            header_bytes(WireType::Int8, 256),
            Err(CodecError::TagOutOfRange(256))
        ));
    }

    #[test]
    fn read_escaped_header() {
        let data = [0xF3, 200];
        let mut r = Reader::new(&data);
        let h = read_header(&mut r).unwrap();
        assert_eq!(h, Header { tag: 200, wire_type: WireType::Int64 });
        assert!(r.is_empty());
    }

    #[test]
    fn escaped_header_without_tag_byte_underflows() {
        let data = [0xF0];
        let mut r = Reader::new(&data);
        assert!(matches!(read_header(&mut r), Err(CodecError::BufferUnderflow { .. })));
    }

    #[test]
    fn skip_header_ignores_type_nibble() {
        let data = [0x0E, 0xFF, 7, 0xF0];
        let mut r = Reader::new(&data);
        skip_header(&mut r).unwrap();
        assert_eq!(r.position(), 1);
        skip_header(&mut r).unwrap();
        assert_eq!(r.position(), 3);
        assert!(matches!(skip_header(&mut r), Err(CodecError::BufferUnderflow { .. })));
    }

    #[test]
    fn wire_type_out_of_range() {
        let data = [0x0E];
        let mut r = Reader::new(&data);
        assert!(matches!(read_header(&mut r), Err(CodecError::UnknownWireType(14))));
        assert!(matches!(WireType::try_from(15), Err(CodecError::UnknownWireType(15))));
    }
}
