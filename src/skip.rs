//! Structure-only traversal: consume elements without building values.
//!
//! The skipper follows the same header and body-width rules as the [codec](crate::codec)
//! but never interprets a body beyond the lengths and counts it needs. Decode uses it to
//! step over fields whose tag the schema does not know, and to capture the raw body of a
//! nested struct that has no sub-schema.
//!
//! Nested struct framing is tracked with an unsigned depth counter: every `struct_begin`
//! increments it, every `struct_end` decrements it, and the `struct_end` seen at depth 0
//! closes the struct being skipped. Map and list bodies are walked by count.
//!
//! ```
//! use jcepack::skip::struct_extent;
//!
//! // body: {tag 0: zero}, then struct_end
//! let bytes = [0x0C, 0x0B];
//! assert_eq!(struct_extent(&bytes, 0, 100).unwrap(), 2);
//! ```

use crate::codec::CodecError;
use crate::reader::Reader;
use crate::wire::{read_header, skip_header, Header, WireType};
use std::ops::Range;

/// Location of a skipped nested struct.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructSpan {
    /// Body bytes, excluding the begin and end markers.
    pub body: Range<usize>,
    /// Position just past the closing `struct_end` (or the buffer end if it was missing).
    pub end: usize,
}

/// Skips over elements of a borrowed [`Reader`].
pub struct Skipper<'r, 'a> {
    r: &'r mut Reader<'a>,
    max_depth: usize,
}

impl<'r, 'a> Skipper<'r, 'a> {
    pub fn new(r: &'r mut Reader<'a>, max_depth: usize) -> Self {
        Skipper { r, max_depth }
    }

    pub fn position(&self) -> usize {
        self.r.position()
    }

    /// Consume one full element (header and body).
    pub fn skip_element(&mut self, depth: usize) -> Result<Header, CodecError> {
        let h = read_header(self.r)?;
        self.skip_body(h.wire_type, depth)?;
        Ok(h)
    }

    /// Consume the body of an element whose header was already read.
    ///
    /// For `struct_begin` this runs to the matching `struct_end`.
    pub fn skip_body(&mut self, wire_type: WireType, depth: usize) -> Result<(), CodecError> {
        if let Some(n) = wire_type.fixed_body_len() {
            return self.r.skip(n);
        }
        match wire_type {
            WireType::String1 => {
                let n = self.r.read_u8()? as usize;
                self.r.skip(n)
            }
            WireType::String4 => {
                let n = self.r.read_u32()? as usize;
                self.r.skip(n)
            }
            WireType::Map => {
                let n = self.r.read_u32()? as u64;
                self.skip_entries(n * 2, depth)
            }
            WireType::List => {
                let n = self.r.read_u32()? as u64;
                self.skip_entries(n, depth)
            }
            WireType::StructBegin => self.skip_struct(depth).map(|_| ()),
            WireType::SimpleList => {
                skip_header(self.r)?;
                let n = self.r.read_u32()? as usize;
                self.r.skip(n)
            }
            // fixed-width types returned above
            _ => Ok(()),
        }
    }

    /// Consume a nested struct body up to and including its `struct_end`.
    ///
    /// Running out of bytes before the closing marker ends the struct, the same way
    /// the buffer end terminates a top-level struct.
    pub fn skip_struct(&mut self, depth: usize) -> Result<StructSpan, CodecError> {
        self.enter(depth)?;
        let start = self.r.position();
        let mut open: usize = 0;
        loop {
            if self.r.is_empty() {
                let end = self.r.position();
                return Ok(StructSpan { body: start..end, end });
            }
            let before = self.r.position();
            let h = read_header(self.r)?;
            match h.wire_type {
                WireType::StructBegin => {
                    open += 1;
                    self.enter(depth + open)?;
                }
                WireType::StructEnd => match open.checked_sub(1) {
                    Some(n) => open = n,
                    None => {
                        return Ok(StructSpan {
                            body: start..before,
                            end: self.r.position(),
                        })
                    }
                },
                other => self.skip_body(other, depth + open)?,
            }
        }
    }

    fn skip_entries(&mut self, n: u64, depth: usize) -> Result<(), CodecError> {
        self.enter(depth)?;
        for _ in 0..n {
            let h = read_header(self.r)?;
            if h.wire_type == WireType::StructEnd {
                return Err(CodecError::UnexpectedStructEnd);
            }
            self.skip_body(h.wire_type, depth + 1)?;
        }
        Ok(())
    }

    fn enter(&self, depth: usize) -> Result<(), CodecError> {
        if depth >= self.max_depth {
            return Err(CodecError::DepthLimit(self.max_depth));
        }
        Ok(())
    }
}

/// Number of bytes the element starting at `pos` occupies.
pub fn element_extent(data: &[u8], pos: usize, max_depth: usize) -> Result<usize, CodecError> {
    let mut r = Reader::at(data, pos)?;
    Skipper::new(&mut r, max_depth).skip_element(0)?;
    Ok(r.position() - pos)
}

/// Number of bytes a nested struct body starting at `pos` occupies, including its `struct_end`.
pub fn struct_extent(data: &[u8], pos: usize, max_depth: usize) -> Result<usize, CodecError> {
    let mut r = Reader::at(data, pos)?;
    let span = Skipper::new(&mut r, max_depth).skip_struct(0)?;
    Ok(span.end - pos)
}
