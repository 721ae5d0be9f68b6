//! Foundation types for vtree.
//!
//! vtree keeps a hierarchical, path-addressed namespace of folders and
//! versioned files on top of a flat document store and a flat blob store.
//! This crate defines the records both stores hold and the pure path
//! arithmetic every other crate relies on.
//!
//! # Key Types
//!
//! - [`Folder`] — a folder document; identified by its absolute `path`
//! - [`FileRecord`] — one version of a file; many records may share a path
//! - [`FolderId`], [`FileId`], [`BlobId`] — UUID v7 identifiers
//! - [`Metadata`] — caller-owned key/value bag attached to folders and files
//!
//! # Paths
//!
//! Paths are `/`-joined strings rooted at the configured root name, e.g.
//! `root/docs/readme.txt`. There is no leading separator. The root folder
//! has no backing document; it exists by name only.

pub mod error;
pub mod ids;
pub mod path;
pub mod record;

pub use error::TypeError;
pub use ids::{BlobId, FileId, FolderId};
pub use record::{FileRecord, Folder, Metadata, RESERVED_KEYS};
