//! Library for interacting with DOOM WAD archives.
//!
//! A WAD is a flat catalog of named lumps; marker descriptors
//! (`_START`/`_END` pairs and `ExMy` map markers) encode a shallow
//! directory tree on top of it. This crate reconstructs that tree,
//! serves path-based queries and byte-range reads over it, and grows
//! the archive in place when directories and lumps are created — the
//! image, the header and descriptor mirrors, and the tree stay
//! coherent through every mutation.

#![deny(
    rust_2018_idioms,
    rustdoc::broken_intra_doc_links,
    unsafe_op_in_unsafe_fn
)]

mod archive;
pub use archive::*;

mod builder;
pub use builder::*;

pub mod glob;

mod image;

mod mutate;

mod tree;

pub mod types;
