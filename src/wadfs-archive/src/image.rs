use std::{
    fs,
    io::{self, Read},
};

use memmap2::{Mmap, MmapOptions};

/// The raw bytes of an archive, either heap-allocated or memory-mapped.
///
/// Mapped images are read-only; the first mutable access copies the
/// contents to the heap and releases the mapping together with its
/// file handle.
pub(crate) enum Image {
    Mapped {
        // Internally kept memory mapping of the archive file contents.
        //
        // By guaranteed drop order, this will be unmapped before the
        // file below is closed.
        mapping: Mmap,

        // The backing file of the above mapping.
        //
        // Owned by this structure so the mapping never becomes
        // invalid. Closed when this structure is dropped or when the
        // image is moved to the heap.
        #[allow(unused)]
        file: fs::File,
    },
    Heap(Vec<u8>),
}

impl Image {
    /// Creates an image by mapping the open file into memory.
    pub fn map(file: fs::File) -> io::Result<Self> {
        // SAFETY: We own the file and keep it around until the mapping
        // is closed; see comments in `Image` above.
        //
        // Archive files are treated as read-only by this engine and
        // most other applications, so external modification of the
        // mapped file is not a supported case.
        let mapping = unsafe { MmapOptions::new().populate().map(&file)? };
        Ok(Self::Mapped { mapping, file })
    }

    /// Creates an image by reading the open file into heap memory.
    ///
    /// The file handle plays no further role afterwards.
    pub fn read(mut file: fs::File) -> io::Result<Self> {
        let mut buf = {
            let size = file.metadata().map(|m| m.len() as usize).unwrap_or(0);
            Vec::with_capacity(size)
        };
        file.read_to_end(&mut buf)?;

        Ok(Self::Heap(buf))
    }

    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Mapped { mapping, .. } => mapping,
            Self::Heap(data) => data,
        }
    }

    // Grants mutable access, moving a mapped image to the heap first.
    fn make_mut(&mut self) -> &mut Vec<u8> {
        if let Self::Mapped { mapping, .. } = self {
            let copy = mapping.to_vec();
            *self = Self::Heap(copy);
        }

        match self {
            Self::Heap(data) => data,
            Self::Mapped { .. } => unreachable!(),
        }
    }

    /// Splices `bytes` into the image at byte offset `at`, shifting
    /// everything behind it back.
    ///
    /// `at` is clamped to the image end so that descriptor offsets from
    /// a malformed table cannot push the splice out of range.
    pub fn splice(&mut self, at: usize, bytes: &[u8]) {
        let data = self.make_mut();
        let at = at.min(data.len());
        data.splice(at..at, bytes.iter().copied());
    }

    /// Overwrites existing image bytes at `at`.
    ///
    /// Writes that would land past the image end are dropped.
    pub fn write_at(&mut self, at: usize, bytes: &[u8]) {
        let data = self.make_mut();
        let Some(end) = at.checked_add(bytes.len()) else {
            return;
        };
        if let Some(dst) = data.get_mut(at..end) {
            dst.copy_from_slice(bytes);
        }
    }
}
