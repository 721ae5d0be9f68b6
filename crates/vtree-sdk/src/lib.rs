//! High-level SDK for vtree.
//!
//! [`FileTree`] is the entry point for applications: it owns the current
//! working directory and routes calls to the namespace and archive layers.

pub mod archive;
pub mod config;
pub mod error;
pub mod tree;

pub use archive::ArchiveBuilder;
pub use config::{ConfigError, TreeConfig};
pub use error::{SdkError, SdkResult};
pub use tree::FileTree;

// Re-export key types
pub use vtree_archive::{ArchiveOutput, ArchiveReader, OutputEncoding};
pub use vtree_namespace::{ContentSource, Listing, NamespaceError};
pub use vtree_types::{FileId, FileRecord, Folder, FolderId, Metadata};
