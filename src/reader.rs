//! Forward-only read head over a borrowed byte slice.
//!
//! Every read checks the remaining length first, so a truncated or lying length
//! field surfaces as [`CodecError::BufferUnderflow`] instead of a panic.

use crate::codec::CodecError;
use byteorder::{BigEndian, ByteOrder};

/// Sequential reader; multi-byte fields are big-endian.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Reader { data, pos: 0 }
    }

    /// Reader starting at `pos`; a start past the end of `data` is an underflow.
    pub fn at(data: &'a [u8], pos: usize) -> Result<Self, CodecError> {
        if pos > data.len() {
            return Err(CodecError::BufferUnderflow {
                needed: pos,
                remaining: data.len(),
            });
        }
        Ok(Reader { data, pos })
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The underlying buffer, from the start.
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    /// Take the next `n` bytes without copying.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::BufferUnderflow {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let data: &'a [u8] = self.data;
        let out = &data[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<(), CodecError> {
        self.take(n).map(|_| ())
    }

    pub fn read_u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8, CodecError> {
        Ok(self.read_u8()? as i8)
    }

    pub fn read_i16(&mut self) -> Result<i16, CodecError> {
        Ok(BigEndian::read_i16(self.take(2)?))
    }

    pub fn read_i32(&mut self) -> Result<i32, CodecError> {
        Ok(BigEndian::read_i32(self.take(4)?))
    }

    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(BigEndian::read_u32(self.take(4)?))
    }

    pub fn read_i64(&mut self) -> Result<i64, CodecError> {
        Ok(BigEndian::read_i64(self.take(8)?))
    }

    pub fn read_f32(&mut self) -> Result<f32, CodecError> {
        Ok(BigEndian::read_f32(self.take(4)?))
    }

    pub fn read_f64(&mut self) -> Result<f64, CodecError> {
        Ok(BigEndian::read_f64(self.take(8)?))
    }
}
