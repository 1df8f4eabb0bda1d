//! String encoding mode and codec configuration.

use crate::codec::CodecError;
use crate::value::Value;
use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use std::fmt;
use std::str::FromStr;

/// Default nesting limit for structs, maps and lists.
pub const DEFAULT_MAX_DEPTH: usize = 100;

/// How `string1`/`string4` bodies are turned into values and back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StringEncoding {
    #[default]
    Utf8,
    /// One byte per char, U+0000..=U+00FF.
    Latin1,
    /// 7-bit; the high bit of each byte is dropped on decode.
    Ascii,
    /// Two bytes per UTF-16 code unit, little-endian.
    Utf16Le,
    /// Bodies are returned untouched as [`Value::RawText`].
    Raw,
}

impl StringEncoding {
    /// Bytes to put on the wire for `s`.
    pub fn encode_str(self, s: &str) -> Result<Vec<u8>, CodecError> {
        match self {
            StringEncoding::Utf8 | StringEncoding::Raw => Ok(s.as_bytes().to_vec()),
            StringEncoding::Latin1 => s
                .chars()
                .map(|c| {
                    u8::try_from(u32::from(c))
                        .map_err(|_| CodecError::UnsupportedValueType("text not representable in latin1"))
                })
                .collect(),
            StringEncoding::Ascii => {
                check_ascii(s)?;
                Ok(s.as_bytes().to_vec())
            }
            StringEncoding::Utf16Le => {
                let mut out = Vec::with_capacity(s.len() * 2);
                for unit in s.encode_utf16() {
                    out.write_u16::<LittleEndian>(unit)?;
                }
                Ok(out)
            }
        }
    }

    /// Length of `s` once encoded, without allocating.
    pub fn encoded_len(self, s: &str) -> Result<usize, CodecError> {
        match self {
            StringEncoding::Utf8 | StringEncoding::Raw => Ok(s.len()),
            StringEncoding::Latin1 => {
                if s.chars().any(|c| u32::from(c) > 0xFF) {
                    return Err(CodecError::UnsupportedValueType("text not representable in latin1"));
                }
                Ok(s.chars().count())
            }
            StringEncoding::Ascii => {
                check_ascii(s)?;
                Ok(s.len())
            }
            StringEncoding::Utf16Le => Ok(s.encode_utf16().count() * 2),
        }
    }

    /// Value for a string body read from the wire.
    pub fn decode_bytes(self, bytes: &[u8]) -> Value {
        match self {
            StringEncoding::Utf8 => Value::Text(String::from_utf8_lossy(bytes).into_owned()),
            StringEncoding::Latin1 => Value::Text(bytes.iter().map(|&b| char::from(b)).collect()),
            StringEncoding::Ascii => Value::Text(bytes.iter().map(|&b| char::from(b & 0x7F)).collect()),
            StringEncoding::Utf16Le => {
                // a trailing odd byte is dropped
                let units = bytes.chunks_exact(2).map(LittleEndian::read_u16);
                Value::Text(
                    char::decode_utf16(units)
                        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                        .collect(),
                )
            }
            StringEncoding::Raw => Value::RawText(bytes.to_vec()),
        }
    }
}

fn check_ascii(s: &str) -> Result<(), CodecError> {
    if !s.is_ascii() {
        return Err(CodecError::UnsupportedValueType("text not representable in ascii"));
    }
    Ok(())
}

impl FromStr for StringEncoding {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, CodecError> {
        match s.to_ascii_lowercase().as_str() {
            "utf8" | "utf-8" => Ok(StringEncoding::Utf8),
            "latin1" | "binary" => Ok(StringEncoding::Latin1),
            "ascii" => Ok(StringEncoding::Ascii),
            "utf16le" | "utf-16le" | "ucs2" | "ucs-2" => Ok(StringEncoding::Utf16Le),
            "raw" => Ok(StringEncoding::Raw),
            _ => Err(CodecError::UnknownEncoding(s.to_string())),
        }
    }
}

impl fmt::Display for StringEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StringEncoding::Utf8 => "utf8",
            StringEncoding::Latin1 => "latin1",
            StringEncoding::Ascii => "ascii",
            StringEncoding::Utf16Le => "utf16le",
            StringEncoding::Raw => "raw",
        })
    }
}

/// Per-codec settings, passed explicitly instead of living in process-wide state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodecConfig {
    pub encoding: StringEncoding,
    pub max_depth: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        CodecConfig {
            encoding: StringEncoding::default(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!("utf8".parse::<StringEncoding>().unwrap(), StringEncoding::Utf8);
        assert_eq!("UTF-8".parse::<StringEncoding>().unwrap(), StringEncoding::Utf8);
        assert_eq!("binary".parse::<StringEncoding>().unwrap(), StringEncoding::Latin1);
        assert_eq!("raw".parse::<StringEncoding>().unwrap(), StringEncoding::Raw);
        assert!(matches!(
            "ebcdic".parse::<StringEncoding>(),
            Err(CodecError::UnknownEncoding(_))
        ));
    }

    #[test]
    fn latin1_is_one_byte_per_char() {
        let bytes = StringEncoding::Latin1.encode_str("é").unwrap();
        assert_eq!(bytes, vec![0xE9]);
        assert_eq!(StringEncoding::Latin1.decode_bytes(&bytes), Value::Text("é".to_string()));
        assert!(StringEncoding::Latin1.encode_str("€").is_err());
    }

    #[test]
    fn utf8_decode_is_lossy() {
        assert_eq!(
            StringEncoding::Utf8.decode_bytes(&[b'a', 0xFF]),
            Value::Text("a\u{FFFD}".to_string())
        );
    }

    #[test]
    fn ascii_rejects_wide_chars_and_masks_high_bit() {
        assert_eq!(StringEncoding::Ascii.encode_str("ok").unwrap(), b"ok".to_vec());
        assert!(StringEncoding::Ascii.encode_str("é").is_err());
        assert!(StringEncoding::Ascii.encoded_len("é").is_err());
        assert_eq!(StringEncoding::Ascii.decode_bytes(&[0xE1, b'b']), Value::Text("ab".to_string()));
        assert_eq!("ASCII".parse::<StringEncoding>().unwrap(), StringEncoding::Ascii);
    }

    #[test]
    fn utf16le_units() {
        let bytes = StringEncoding::Utf16Le.encode_str("a\u{1F600}").unwrap();
        assert_eq!(bytes, vec![0x61, 0x00, 0x3D, 0xD8, 0x00, 0xDE]);
        assert_eq!(StringEncoding::Utf16Le.encoded_len("a\u{1F600}").unwrap(), 6);
        assert_eq!(
            StringEncoding::Utf16Le.decode_bytes(&bytes),
            Value::Text("a\u{1F600}".to_string())
        );
        // lone surrogate and odd trailing byte
        assert_eq!(
            StringEncoding::Utf16Le.decode_bytes(&[0x00, 0xD8, 0x62, 0x00, 0x01]),
            Value::Text("\u{FFFD}b".to_string())
        );
        assert_eq!("ucs-2".parse::<StringEncoding>().unwrap(), StringEncoding::Utf16Le);
        assert_eq!(StringEncoding::Utf16Le.to_string(), "utf16le");
    }

    #[test]
    fn raw_keeps_bytes() {
        assert_eq!(StringEncoding::Raw.decode_bytes(&[0xFF]), Value::RawText(vec![0xFF]));
    }
}
