//! Low-level field codec.
//!
//! Every field starts with a varint tag `field << 3 | wire_type`.  Two wire
//! types are used:
//!
//! | Wire type | Payload                                                     |
//! |-----------|-------------------------------------------------------------|
//! | 0         | varint; signed values are zigzag-mapped first               |
//! | 2         | strings: varint byte length + UTF-8                         |
//! |           | messages: 4-byte big-endian length + body                   |
//!
//! Message lengths are fixed-width so a writer can reserve them, stream the
//! body, and patch the length in place once the message closes.

use std::io::{self, Write};

use crate::{BinaryError, BinaryResult};

pub const WIRE_VARINT: u8 = 0;
pub const WIRE_LEN: u8 = 2;

/// Byte width of a message length prefix.
pub const MESSAGE_LEN_BYTES: usize = 4;

#[inline]
pub fn zigzag_encode(n: i64) -> u64 {
    ((n << 1) ^ (n >> 63)) as u64
}

#[inline]
pub fn zigzag_decode(n: u64) -> i64 {
    ((n >> 1) as i64) ^ -((n & 1) as i64)
}

// ── Encoding ──────────────────────────────────────────────────────────────────

pub fn write_varint<W: Write>(out: &mut W, mut value: u64) -> io::Result<()> {
    let mut buf = [0u8; 10];
    let mut n = 0;
    loop {
        if value < 0x80 {
            buf[n] = value as u8;
            n += 1;
            break;
        }
        buf[n] = (value as u8) | 0x80;
        value >>= 7;
        n += 1;
    }
    out.write_all(&buf[..n])
}

#[inline]
pub fn write_tag<W: Write>(out: &mut W, field: u32, wire_type: u8) -> io::Result<()> {
    write_varint(out, u64::from(field) << 3 | u64::from(wire_type))
}

pub fn write_uint_field<W: Write>(out: &mut W, field: u32, value: u64) -> io::Result<()> {
    write_tag(out, field, WIRE_VARINT)?;
    write_varint(out, value)
}

pub fn write_sint_field<W: Write>(out: &mut W, field: u32, value: i64) -> io::Result<()> {
    write_tag(out, field, WIRE_VARINT)?;
    write_varint(out, zigzag_encode(value))
}

pub fn write_string_field<W: Write>(out: &mut W, field: u32, value: &str) -> io::Result<()> {
    write_tag(out, field, WIRE_LEN)?;
    write_varint(out, value.len() as u64)?;
    out.write_all(value.as_bytes())
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Cursor over one message body.
///
/// Offsets in decode errors are absolute positions in the outermost buffer.
#[derive(Clone, Copy)]
pub struct WireReader<'a> {
    buf:  &'a [u8],
    pos:  usize,
    base: usize,
}

impl<'a> WireReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, base: 0 }
    }

    pub fn is_empty(&self) -> bool {
        self.pos >= self.buf.len()
    }

    pub fn error(&self, reason: impl Into<String>) -> BinaryError {
        BinaryError::Decode { offset: self.base + self.pos, reason: reason.into() }
    }

    fn take(&mut self, n: usize) -> BinaryResult<&'a [u8]> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|&end| end <= self.buf.len())
            .ok_or_else(|| self.error(format!("truncated: need {n} bytes")))?;
        let bytes = &self.buf[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }

    pub fn read_varint(&mut self) -> BinaryResult<u64> {
        let mut result = 0u64;
        let mut shift = 0;
        loop {
            if shift >= 64 {
                return Err(self.error("varint overflow"));
            }
            let byte = self.take(1)?[0];
            result |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(result);
            }
            shift += 7;
        }
    }

    pub fn read_sint(&mut self) -> BinaryResult<i64> {
        self.read_varint().map(zigzag_decode)
    }

    /// Next `(field, wire_type)` pair.
    pub fn read_tag(&mut self) -> BinaryResult<(u32, u8)> {
        let tag = self.read_varint()?;
        let field = u32::try_from(tag >> 3).map_err(|_| self.error("field number overflow"))?;
        Ok((field, (tag & 0x7) as u8))
    }

    pub fn read_string(&mut self) -> BinaryResult<&'a str> {
        let len = self.read_varint()?;
        let len = usize::try_from(len).map_err(|_| self.error("string length overflow"))?;
        let offset = self.base + self.pos;
        let bytes = self.take(len)?;
        std::str::from_utf8(bytes)
            .map_err(|e| BinaryError::Decode { offset, reason: format!("invalid UTF-8: {e}") })
    }

    /// Body of a nested message as its own reader.
    pub fn read_message(&mut self) -> BinaryResult<WireReader<'a>> {
        let prefix = self.take(MESSAGE_LEN_BYTES)?;
        let len = u32::from_be_bytes([prefix[0], prefix[1], prefix[2], prefix[3]]) as usize;
        let base = self.base + self.pos;
        let body = self.take(len)?;
        Ok(WireReader { buf: body, pos: 0, base })
    }

    /// Fail unless `wire_type` matches what field `field` must carry.
    pub fn expect(&self, field: u32, wire_type: u8, expected: u8) -> BinaryResult<()> {
        if wire_type != expected {
            return Err(self.error(format!(
                "field {field}: wire type {wire_type}, expected {expected}"
            )));
        }
        Ok(())
    }

    pub fn unknown_field(&self, message: &str, field: u32) -> BinaryError {
        self.error(format!("unknown field {field} in {message}"))
    }
}
