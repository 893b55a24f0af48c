//! Wire primitives for the objrpc encoding
//!
//! The protocol is little-endian. Sizes use a compact encoding: values
//! below 255 take a single byte, larger values are written as the marker
//! byte `0xFF` followed by a `u32`.

use crate::types::{ObjRpcError, Result};
use bytes::{Buf, BufMut};

/// Marker byte introducing a four-byte size
const SIZE_MARKER: u8 = 0xFF;

/// Encode a size
pub fn write_size<B: BufMut>(buf: &mut B, size: usize) {
    if size < SIZE_MARKER as usize {
        buf.put_u8(size as u8);
    } else {
        buf.put_u8(SIZE_MARKER);
        buf.put_u32_le(size as u32);
    }
}

/// Decode a size
pub fn read_size<B: Buf>(buf: &mut B) -> Result<usize> {
    if buf.remaining() < 1 {
        return Err(ObjRpcError::BufferUnderflow {
            needed: 1,
            have: 0,
        });
    }
    let b = buf.get_u8();
    if b != SIZE_MARKER {
        return Ok(b as usize);
    }
    if buf.remaining() < 4 {
        return Err(ObjRpcError::BufferUnderflow {
            needed: 4,
            have: buf.remaining(),
        });
    }
    Ok(buf.get_u32_le() as usize)
}

/// Encode a bool as a single byte
pub fn write_bool<B: BufMut>(buf: &mut B, value: bool) {
    buf.put_u8(value as u8);
}

/// Decode a bool (any non-zero byte is true)
pub fn read_bool<B: Buf>(buf: &mut B) -> Result<bool> {
    if buf.remaining() < 1 {
        return Err(ObjRpcError::BufferUnderflow {
            needed: 1,
            have: 0,
        });
    }
    Ok(buf.get_u8() != 0)
}

/// Encode a string as size-prefixed UTF-8 bytes
pub fn write_string<B: BufMut>(buf: &mut B, s: &str) {
    write_size(buf, s.len());
    buf.put_slice(s.as_bytes());
}

/// Decode a size-prefixed UTF-8 string
pub fn read_string<B: Buf>(buf: &mut B) -> Result<String> {
    let len = read_size(buf)?;
    if buf.remaining() < len {
        return Err(ObjRpcError::BufferUnderflow {
            needed: len,
            have: buf.remaining(),
        });
    }
    let bytes = buf.copy_to_bytes(len);
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ObjRpcError::InvalidString(e.to_string()))
}

/// Encode a string sequence as a size-prefixed list
pub fn write_string_seq<B: BufMut>(buf: &mut B, seq: &[String]) {
    write_size(buf, seq.len());
    for s in seq {
        write_string(buf, s);
    }
}

/// Decode a size-prefixed string sequence
pub fn read_string_seq<B: Buf>(buf: &mut B) -> Result<Vec<String>> {
    let count = read_size(buf)?;
    let mut seq = Vec::with_capacity(count.min(64));
    for _ in 0..count {
        seq.push(read_string(buf)?);
    }
    Ok(seq)
}
