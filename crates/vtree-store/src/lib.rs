//! Storage contracts for vtree.
//!
//! vtree never talks to a concrete database. It consumes two flat
//! collaborators and layers the namespace on top of them:
//!
//! - [`NamespaceStore`] — a document store holding [`Folder`] documents and
//!   [`FileRecord`] version records, queryable by path with the
//!   separator-bounded subtree rule
//! - [`BlobStore`] — an opaque content store keyed by [`BlobId`]
//!
//! Neither contract offers multi-document transactions. Every update is an
//! idempotent point write, so a cascade interrupted half way can simply be
//! retried.
//!
//! # Backends
//!
//! - [`InMemoryNamespaceStore`] / [`InMemoryBlobStore`] — `RwLock`-guarded
//!   maps for tests and embedding
//!
//! [`Folder`]: vtree_types::Folder
//! [`FileRecord`]: vtree_types::FileRecord
//! [`BlobId`]: vtree_types::BlobId

pub mod error;
pub mod memory;
pub mod query;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use memory::{InMemoryBlobStore, InMemoryNamespaceStore};
pub use query::{FileQuery, FileUpdate, FolderQuery, FolderUpdate, PathSelector};
pub use traits::{BlobStore, NamespaceStore};
