//! Hierarchical archives for vtree.
//!
//! A folder subtree is exported as one self-contained artifact: a list of
//! relative paths with their content. Directories are implicit in the
//! entry paths.
//!
//! # Architecture
//!
//! - [`ArchiveWriter`]: the contract an archive encoder fulfils
//! - [`PackArchiveWriter`]: the built-in format, zstd-compressed entries
//!   with CRC32 per entry and a BLAKE3 trailer
//! - [`ArchiveReader`]: validating reader for the built-in format
//! - [`OutputEncoding`] / [`ArchiveOutput`]: raw bytes, base64 or hex text

pub mod encoding;
pub mod error;
pub mod reader;
pub mod writer;

pub use encoding::{ArchiveOutput, OutputEncoding};
pub use error::{ArchiveError, ArchiveResult};
pub use reader::{ArchiveEntry, ArchiveReader};
pub use writer::{ArchiveWriter, PackArchiveWriter};
