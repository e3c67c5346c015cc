//! Common types and structures in the WAD format.

use std::{
    borrow::Cow,
    io::{self, Read, Write},
};

use wadfs_utils::binary;

/// Byte size of the fixed archive header.
pub const HEADER_SIZE: usize = 12;

/// Byte size of a single lump descriptor.
pub const DESCRIPTOR_SIZE: usize = 16;

// A map marker directory owns exactly the ten descriptors behind it.
pub(crate) const MAP_LUMP_COUNT: u32 = 10;

/// The header of a WAD archive.
#[derive(Clone, Copy, Debug)]
pub struct Header {
    /// The archive magic, typically `IWAD` or `PWAD`. Not validated.
    pub magic: [u8; 4],
    /// The total number of descriptors in the archive.
    pub count: u32,
    /// The byte offset at which the descriptor table begins.
    pub offset: u32,
}

impl Header {
    /// Parses the header from the given [`Read`]er.
    pub fn parse<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            magic: binary::array(reader)?,
            count: binary::uint32(reader)?,
            offset: binary::uint32(reader)?,
        })
    }

    /// Writes the header to the given [`Write`]r.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(&self.magic)?;
        binary::write_uint32(writer, self.count)?;
        binary::write_uint32(writer, self.offset)
    }
}

/// Metadata for a single lump stored in an archive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Descriptor {
    /// The starting offset of the lump data inside the archive.
    pub offset: u32,
    /// The length of the lump data in bytes.
    pub length: u32,
    /// The lump name, NUL-padded to 8 bytes.
    ///
    /// A name of exactly 8 characters fills the field with no
    /// terminator.
    pub name: [u8; 8],
}

impl Descriptor {
    /// Creates a zero-offset, zero-length descriptor for `name`.
    ///
    /// This is the shape of every marker and of a freshly created
    /// lump. Returns [`None`] when the name does not fit the 8-byte
    /// field.
    pub fn empty(name: &str) -> Option<Self> {
        binary::padded(name).map(|name| Self {
            offset: 0,
            length: 0,
            name,
        })
    }

    /// Parses a descriptor from the given [`Read`]er.
    pub fn parse<R: Read>(reader: &mut R) -> io::Result<Self> {
        Ok(Self {
            offset: binary::uint32(reader)?,
            length: binary::uint32(reader)?,
            name: binary::array(reader)?,
        })
    }

    /// Writes the descriptor to the given [`Write`]r.
    pub fn write<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        binary::write_uint32(writer, self.offset)?;
        binary::write_uint32(writer, self.length)?;
        writer.write_all(&self.name)
    }

    /// The lump name with NUL padding removed.
    pub fn name(&self) -> Cow<'_, str> {
        binary::unpad(&self.name)
    }

    pub(crate) fn to_bytes(&self) -> [u8; DESCRIPTOR_SIZE] {
        let mut out = [0; DESCRIPTOR_SIZE];
        out[..4].copy_from_slice(&self.offset.to_le_bytes());
        out[4..8].copy_from_slice(&self.length.to_le_bytes());
        out[8..].copy_from_slice(&self.name);
        out
    }
}

/// How a descriptor name participates in the implicit directory
/// structure of the descriptor table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Marker<'a> {
    /// An `E<digit>M<digit>` map marker, opening a directory that owns
    /// the ten descriptors behind it.
    Map,
    /// A `<name>_START` marker, opening a namespace directory.
    NamespaceStart(&'a str),
    /// A `<name>_END` marker, closing the current namespace directory.
    NamespaceEnd,
    /// A plain lump.
    Lump,
}

impl<'a> Marker<'a> {
    /// Classifies a descriptor name.
    ///
    /// The order of checks matters: a map marker is never treated as a
    /// namespace, and `_START` wins over `_END` for names carrying
    /// both suffixes.
    pub fn classify(name: &'a str) -> Self {
        if is_map_marker(name) {
            return Self::Map;
        }
        if let Some(prefix) = name.strip_suffix("_START") {
            return Self::NamespaceStart(prefix);
        }
        if name.ends_with("_END") {
            return Self::NamespaceEnd;
        }

        Self::Lump
    }
}

/// Whether `name` is a map marker of the form `E<digit>M<digit>`.
pub fn is_map_marker(name: &str) -> bool {
    let b = name.as_bytes();
    b.len() == 4 && b[0] == b'E' && b[1].is_ascii_digit() && b[2] == b'M' && b[3].is_ascii_digit()
}
