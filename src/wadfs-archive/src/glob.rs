//! Utilities for iterating over a subset of archive lumps chosen by a
//! UNIX glob pattern.

pub use globset::Error as GlobError;

use globset::{GlobBuilder, GlobMatcher};

use crate::{tree::NodeId, types::Descriptor, Archive};

/// A glob matcher for checking archive lump paths.
pub struct Matcher {
    inner: GlobMatcher,
}

impl Matcher {
    /// Creates a new glob matcher over the given pattern.
    ///
    /// `*` and `?` stop at `/`, so `/F1/*` names direct children only;
    /// `**` crosses directories.
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        let inner = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(Self { inner })
    }

    /// Checks if a given path is a match to the glob pattern.
    #[inline]
    pub fn is_match(&self, path: &str) -> bool {
        self.inner.is_match(path)
    }
}

/// An iterator that only yields archive lumps whose full slash-joined
/// path matches a specified UNIX glob pattern.
///
/// WAD paths are implicit in the marker structure, so they are
/// materialized once at construction; iteration order is depth-first
/// in descriptor order and stable across calls.
pub struct GlobIter<'a> {
    archive: &'a Archive,
    paths: std::vec::IntoIter<(String, NodeId)>,
    matcher: Matcher,
}

impl<'a> GlobIter<'a> {
    /// Creates a new glob iterator that yields `(path, descriptor)`
    /// pairs matching the given pattern.
    ///
    /// Errors on failure to compile the provided glob pattern.
    pub fn new(archive: &'a Archive, pattern: &str) -> Result<Self, GlobError> {
        Matcher::new(pattern).map(move |matcher| Self {
            archive,
            paths: archive.tree.lump_paths().into_iter(),
            matcher,
        })
    }
}

impl<'a> Iterator for GlobIter<'a> {
    type Item = (String, &'a Descriptor);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (path, id) = self.paths.next()?;
            if self.matcher.is_match(&path) {
                let index = self.archive.tree.node(id).desc_index;
                break Some((path, &self.archive.descriptors[index]));
            }
        }
    }
}
