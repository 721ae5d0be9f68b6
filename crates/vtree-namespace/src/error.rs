//! Error types for namespace operations.

use thiserror::Error;
use vtree_store::StoreError;
use vtree_types::{BlobId, FileId};

/// Structural fields that the metadata surface refuses to touch.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ReservedField {
    #[error("cannot change path")]
    ChangePath,

    #[error("cannot delete path")]
    DeletePath,

    #[error("cannot change parentDirectory")]
    ChangeParentDirectory,

    #[error("cannot delete parentDirectory")]
    DeleteParentDirectory,

    #[error("cannot delete isLatest")]
    DeleteIsLatest,

    #[error("cannot change the type of isLatest")]
    ChangeIsLatestType,

    /// A boolean `isLatest` write; the flag is owned by the version chain.
    #[error("cannot set isLatest directly")]
    SetIsLatest,
}

/// Errors that can occur during namespace operations.
#[derive(Debug, Error)]
pub enum NamespaceError {
    /// The input is not usable (unreadable content, bad option, empty name).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A name contains a forbidden character. `ch` is the first one found.
    #[error("invalid character {ch:?} in name {name:?}")]
    InvalidCharacter { name: String, ch: char },

    /// A folder already occupies the target path.
    #[error("folder already exists: {path}")]
    AlreadyExists { path: String },

    /// A file already occupies the target path.
    #[error("file already exists: {path}")]
    FileAlreadyExists { path: String },

    #[error("folder not found: {path}")]
    FolderNotFound { path: String },

    #[error("file not found: {path}")]
    FileNotFound { path: String },

    #[error("version {id} not found for file {path}")]
    VersionNotFound { path: String, id: FileId },

    /// A file record points at a blob the blob store no longer has.
    #[error("content {blob} missing for file {path}")]
    ContentMissing { path: String, blob: BlobId },

    #[error(transparent)]
    Reserved(#[from] ReservedField),

    #[error("cannot rename the root folder")]
    CannotRenameRoot,

    #[error("cannot delete {path}: it contains the current working directory")]
    CannotDeleteCwd { path: String },

    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

impl NamespaceError {
    /// Returns `true` for either not-found variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::FolderNotFound { .. } | Self::FileNotFound { .. } | Self::VersionNotFound { .. }
        )
    }
}

/// Convenience type alias for namespace operations.
pub type NamespaceResult<T> = std::result::Result<T, NamespaceError>;
