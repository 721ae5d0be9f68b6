use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{BlobId, FileId, FolderId};
use crate::path;

/// Caller-owned metadata attached to folders and file versions.
///
/// Values are restricted to the JSON value set.
pub type Metadata = BTreeMap<String, serde_json::Value>;

/// Keys that name structural fields and can never be written through the
/// metadata surface.
pub const RESERVED_KEYS: [&str; 3] = ["path", "parentDirectory", "isLatest"];

/// A folder document.
///
/// Invariant: `path == parent_directory + "/" + name`. The root folder is
/// never stored, so every `Folder` has a parent.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    pub path: String,
    pub parent_directory: String,
    #[serde(default)]
    pub custom_metadata: Metadata,
}

impl Folder {
    /// Create a folder named `name` inside `parent_directory`.
    pub fn new(parent_directory: impl Into<String>, name: impl Into<String>) -> Self {
        let parent_directory = parent_directory.into();
        let name = name.into();
        Self {
            id: FolderId::new(),
            path: path::join(&parent_directory, &name),
            name,
            parent_directory,
            custom_metadata: Metadata::new(),
        }
    }

    /// Attach custom metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.custom_metadata = metadata;
        self
    }
}

/// One stored version of a file.
///
/// Several records may share a `path`; together they form the file's
/// version chain. At most one of them has `is_latest` set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub id: FileId,
    pub filename: String,
    pub path: String,
    pub parent_directory: String,
    pub is_latest: bool,
    #[serde(default)]
    pub custom_metadata: Metadata,
    /// The blob holding this version's content.
    pub blob: BlobId,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Create a new latest record for `filename` inside `parent_directory`.
    pub fn new_latest(
        parent_directory: impl Into<String>,
        filename: impl Into<String>,
        blob: BlobId,
        size: u64,
    ) -> Self {
        let parent_directory = parent_directory.into();
        let filename = filename.into();
        Self {
            id: FileId::new(),
            path: path::join(&parent_directory, &filename),
            filename,
            parent_directory,
            is_latest: true,
            custom_metadata: Metadata::new(),
            blob,
            size,
            uploaded_at: Utc::now(),
        }
    }

    /// Attach custom metadata.
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.custom_metadata = metadata;
        self
    }
}
