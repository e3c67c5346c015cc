use std::io::{self, Write};

use wadfs_utils::thiserror::{self, Error};

use crate::types::{Descriptor, Header, DESCRIPTOR_SIZE, HEADER_SIZE};

/// Errors that may occur when assembling WAD archives.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// An I/O error occurred while serializing the archive.
    #[error("{0}")]
    Io(#[from] io::Error),

    /// More data was added to the archive than its u32 fields can
    /// address.
    #[error("archive too large to represent")]
    TooLarge,

    /// A lump or marker name is empty or does not fit the 8-byte name
    /// field.
    #[error("name does not fit a descriptor: {0:?}")]
    Name(String),
}

#[inline(always)]
fn checked_u32(x: usize) -> Result<u32, BuilderError> {
    u32::try_from(x).or(Err(BuilderError::TooLarge))
}

/// A builder for programmatically creating WAD archives.
///
/// Lumps and markers are appended in order; `build` serializes the
/// canonical layout of header, payload region, and descriptor table.
/// Payload offsets are final at append time because the payload region
/// starts directly behind the fixed-size header.
pub struct ArchiveBuilder {
    magic: [u8; 4],
    payload: Vec<u8>,
    descriptors: Vec<Descriptor>,
}

impl ArchiveBuilder {
    /// Creates an empty `PWAD` archive builder.
    pub fn new() -> Self {
        Self {
            magic: *b"PWAD",
            payload: Vec::new(),
            descriptors: Vec::new(),
        }
    }

    /// Overrides the archive magic, e.g. with `IWAD`.
    pub fn with_magic(mut self, magic: [u8; 4]) -> Self {
        self.magic = magic;
        self
    }

    /// Appends a payload-bearing lump.
    pub fn lump(&mut self, name: &str, contents: &[u8]) -> Result<(), BuilderError> {
        let offset = checked_u32(HEADER_SIZE + self.payload.len())?;
        let length = checked_u32(contents.len())?;

        self.record(name, offset, length)?;
        self.payload.extend_from_slice(contents);

        Ok(())
    }

    /// Appends a zero-offset, zero-length marker descriptor
    /// (`_START`/`_END` namespace markers and `ExMy` map markers).
    pub fn marker(&mut self, name: &str) -> Result<(), BuilderError> {
        self.record(name, 0, 0)
    }

    fn record(&mut self, name: &str, offset: u32, length: u32) -> Result<(), BuilderError> {
        if name.is_empty() {
            return Err(BuilderError::Name(name.to_owned()));
        }
        let mut desc =
            Descriptor::empty(name).ok_or_else(|| BuilderError::Name(name.to_owned()))?;
        desc.offset = offset;
        desc.length = length;

        checked_u32(self.descriptors.len() + 1)?;
        self.descriptors.push(desc);

        Ok(())
    }

    /// Serializes the archive data to the given [`Write`]r.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> Result<(), BuilderError> {
        let header = Header {
            magic: self.magic,
            count: checked_u32(self.descriptors.len())?,
            offset: checked_u32(HEADER_SIZE + self.payload.len())?,
        };

        header.write(writer)?;
        writer.write_all(&self.payload)?;
        for desc in &self.descriptors {
            desc.write(writer)?;
        }

        Ok(())
    }

    /// Serializes the archive into a byte vector.
    pub fn build(self) -> Result<Vec<u8>, BuilderError> {
        let mut out = Vec::with_capacity(
            HEADER_SIZE + self.payload.len() + self.descriptors.len() * DESCRIPTOR_SIZE,
        );
        self.write_to(&mut out)?;

        Ok(out)
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}
