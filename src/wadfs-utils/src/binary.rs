//! Utilities for reading and writing structured binary data.

use std::{
    borrow::Cow,
    io::{self, Read, Write},
};

/// Reads a fixed-size byte array off the data stream.
#[inline]
pub fn array<R: Read, const N: usize>(data: &mut R) -> io::Result<[u8; N]> {
    let mut v = [0; N];
    data.read_exact(&mut v)?;
    Ok(v)
}

/// Parses a [`u32`] value off the data stream.
#[inline]
pub fn uint32<R: Read>(data: &mut R) -> io::Result<u32> {
    array(data).map(u32::from_le_bytes)
}

/// Writes a [`u32`] value to the data stream.
#[inline]
pub fn write_uint32<W: Write>(out: &mut W, v: u32) -> io::Result<()> {
    out.write_all(&v.to_le_bytes())
}

/// Encodes a string into a NUL-padded fixed-width field.
///
/// Returns [`None`] when the string does not fit in `N` bytes. A string
/// of exactly `N` bytes fills the field with no terminator.
#[inline]
pub fn padded<const N: usize>(s: &str) -> Option<[u8; N]> {
    let bytes = s.as_bytes();
    if bytes.len() > N {
        return None;
    }

    let mut out = [0; N];
    out[..bytes.len()].copy_from_slice(bytes);
    Some(out)
}

/// Decodes a NUL-padded fixed-width field, stopping at the first NUL.
///
/// Invalid UTF-8 is replaced rather than rejected.
#[inline]
pub fn unpad(raw: &[u8]) -> Cow<'_, str> {
    let len = raw.iter().position(|&b| b == 0).unwrap_or(raw.len());
    String::from_utf8_lossy(&raw[..len])
}
