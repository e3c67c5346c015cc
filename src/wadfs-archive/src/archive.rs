use std::{
    fs,
    io::{self, Cursor},
    path::Path,
};

use wadfs_utils::thiserror::{self, Error};

use crate::{
    glob,
    image::Image,
    tree::{normalize, Tree},
    types::{Descriptor, Header, HEADER_SIZE},
};

/// Errors that may occur when loading WAD archives.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// An I/O operation when reading or mapping a file failed, or the
    /// descriptor table ends mid-record.
    #[error("failed to open archive: {0}")]
    Io(#[from] io::Error),

    /// The input ends before the 12-byte archive header.
    #[error("archive shorter than its fixed header")]
    Truncated,
}

/// Representation of a WAD archive loaded into memory.
///
/// The archive keeps four views coherent at all times: the raw byte
/// image, the header mirror, the descriptor table mirror, and the
/// directory tree reconstructed from the marker conventions in the
/// table. Queries read the tree and the image; mutations grow all
/// four in lockstep.
///
/// It supports two modes of holding the underlying file: read or
/// mmap. Mutations always happen on the heap; the first one moves a
/// mapped image there. The file on disk is never written back.
pub struct Archive {
    pub(crate) image: Image,
    pub(crate) header: Header,
    pub(crate) descriptors: Vec<Descriptor>,
    pub(crate) tree: Tree,
}

impl Archive {
    /// Creates an archive from an open file in heap-allocated memory.
    ///
    /// See [`Archive::open_heap`] for further details.
    pub fn heap(file: fs::File) -> Result<Self, ArchiveError> {
        Image::read(file).map_err(ArchiveError::Io).and_then(Self::load)
    }

    /// Creates an archive on the heap from a pre-allocated buffer
    /// holding the archive contents.
    pub fn from_vec(buf: Vec<u8>) -> Result<Self, ArchiveError> {
        Self::load(Image::Heap(buf))
    }

    /// Opens a file at the given `path` and operates on it from
    /// heap-allocated memory.
    ///
    /// The file handle will be closed immediately after reading.
    ///
    /// This is the preferred option of working with relatively small
    /// files but it's always best to profile.
    pub fn open_heap<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = fs::File::open(path)?;
        Self::heap(file)
    }

    /// Creates an archive by mapping the open file into memory.
    ///
    /// See [`Archive::open_mmap`] for further details.
    pub fn mmap(file: fs::File) -> Result<Self, ArchiveError> {
        Image::map(file).map_err(ArchiveError::Io).and_then(Self::load)
    }

    /// Opens a file at the given `path` and operates on it from a
    /// memory mapping.
    ///
    /// The file handle will be kept open until the first mutation
    /// moves the image to the heap, or until the [`Archive`] object
    /// is dropped.
    ///
    /// This is the preferred option of working with relatively large
    /// files but it's always best to profile.
    pub fn open_mmap<P: AsRef<Path>>(path: P) -> Result<Self, ArchiveError> {
        let file = fs::File::open(path)?;
        Self::mmap(file)
    }

    fn load(image: Image) -> Result<Self, ArchiveError> {
        let data = image.as_slice();
        if data.len() < HEADER_SIZE {
            return Err(ArchiveError::Truncated);
        }

        let header = Header::parse(&mut Cursor::new(&data[..HEADER_SIZE]))?;

        // The table offset is taken at face value; a table that runs
        // past the end of the image fails with an I/O error when a
        // record comes up short.
        let table = data.get(header.offset as usize..).unwrap_or(&[]);
        let mut table = Cursor::new(table);
        let mut descriptors = Vec::new();
        for _ in 0..header.count {
            descriptors.push(Descriptor::parse(&mut table)?);
        }

        let tree = Tree::rebuild(&descriptors);

        Ok(Self {
            image,
            header,
            descriptors,
            tree,
        })
    }

    /// Returns the four magic bytes of the header, decoded lossily.
    ///
    /// Typically `IWAD` or `PWAD`; the loader does not validate it.
    pub fn magic(&self) -> String {
        String::from_utf8_lossy(&self.header.magic).into_owned()
    }

    /// Read-only view of the header mirror.
    #[inline]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Read-only view of the descriptor table mirror.
    #[inline]
    pub fn descriptors(&self) -> &[Descriptor] {
        &self.descriptors
    }

    /// The raw bytes of the whole archive image.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        self.image.as_slice()
    }

    /// Gets the number of descriptors in the archive.
    #[inline]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Whether the archive holds no descriptors at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Whether `path` resolves to a lump.
    pub fn is_content(&self, path: &str) -> bool {
        let path = normalize(path);
        if path.is_empty() {
            return false;
        }

        self.tree
            .resolve(path)
            .is_some_and(|id| !self.tree.node(id).is_dir)
    }

    /// Whether `path` resolves to a directory.
    pub fn is_directory(&self, path: &str) -> bool {
        let path = normalize(path);
        if path.is_empty() {
            return false;
        }

        self.tree
            .resolve(path)
            .is_some_and(|id| self.tree.node(id).is_dir)
    }

    /// The byte length of the lump at `path`, or -1 when the path does
    /// not resolve to a lump.
    pub fn size(&self, path: &str) -> i64 {
        let path = normalize(path);
        if path.is_empty() {
            return -1;
        }

        match self.tree.resolve(path) {
            Some(id) if !self.tree.node(id).is_dir => i64::from(self.tree.node(id).length),
            _ => -1,
        }
    }

    /// The whole payload slice of the lump at `path`.
    ///
    /// `None` for directories, unresolved paths, and lumps whose
    /// descriptor points outside the image.
    pub fn contents(&self, path: &str) -> Option<&[u8]> {
        let path = normalize(path);
        if path.is_empty() {
            return None;
        }

        let id = self.tree.resolve(path)?;
        let node = self.tree.node(id);
        if node.is_dir {
            return None;
        }

        let start = node.offset as usize;
        self.as_bytes().get(start..start + node.length as usize)
    }

    /// Copies lump bytes starting at `offset` into `buf`.
    ///
    /// Returns the number of bytes copied, 0 when `offset` is at or
    /// past the end of the lump, and -1 when `buf` is empty or `path`
    /// does not resolve to a lump.
    pub fn read_at(&self, path: &str, buf: &mut [u8], offset: usize) -> i64 {
        if buf.is_empty() {
            return -1;
        }
        let Some(lump) = self.contents(path) else {
            return -1;
        };
        if offset >= lump.len() {
            return 0;
        }

        let n = buf.len().min(lump.len() - offset);
        buf[..n].copy_from_slice(&lump[offset..offset + n]);

        n as i64
    }

    /// Replaces `out` with the names of the immediate children of the
    /// directory at `path`, in descriptor order.
    ///
    /// Returns the number of children, or -1 when `path` does not
    /// resolve to a directory (the sink is still cleared).
    pub fn read_dir(&self, path: &str, out: &mut Vec<String>) -> i64 {
        out.clear();

        let path = normalize(path);
        if path.is_empty() {
            return -1;
        }
        let Some(id) = self.tree.resolve(path) else {
            return -1;
        };
        let node = self.tree.node(id);
        if !node.is_dir {
            return -1;
        }

        out.extend(node.children.iter().map(|&c| self.tree.node(c).name.clone()));
        out.len() as i64
    }

    /// Builds an iterator over `(path, descriptor)` pairs in the
    /// archive where the full lump path satisfies the given UNIX glob
    /// pattern.
    #[inline]
    pub fn iter_glob(&self, pattern: &str) -> Result<glob::GlobIter<'_>, glob::GlobError> {
        glob::GlobIter::new(self, pattern)
    }
}
