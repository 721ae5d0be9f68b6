//! Version chains for files.
//!
//! Every upload to a path appends a new [`FileRecord`] and marks it latest;
//! the previous latest is demoted first. Renames and deletes act on the
//! whole chain, never on a single version.

use std::sync::Arc;

use tracing::{debug, info, warn};
use vtree_store::{BlobStore, FileQuery, FileUpdate, NamespaceStore};
use vtree_types::{path, FileId, FileRecord, Metadata};

use crate::content::ContentSource;
use crate::error::{NamespaceError, NamespaceResult, ReservedField};
use crate::names::validate_name;

/// Reject metadata writes that would touch structural fields.
pub(crate) fn check_upsert(upsert: &Metadata) -> Result<(), ReservedField> {
    if upsert.contains_key("path") {
        return Err(ReservedField::ChangePath);
    }
    if upsert.contains_key("parentDirectory") {
        return Err(ReservedField::ChangeParentDirectory);
    }
    match upsert.get("isLatest") {
        Some(serde_json::Value::Bool(_)) => Err(ReservedField::SetIsLatest),
        Some(_) => Err(ReservedField::ChangeIsLatestType),
        None => Ok(()),
    }
}

/// Reject metadata removals that would touch structural fields.
pub(crate) fn check_removals(keys: &[String]) -> Result<(), ReservedField> {
    for key in keys {
        match key.as_str() {
            "path" => return Err(ReservedField::DeletePath),
            "parentDirectory" => return Err(ReservedField::DeleteParentDirectory),
            "isLatest" => return Err(ReservedField::DeleteIsLatest),
            _ => {}
        }
    }
    Ok(())
}

/// Manages file versions and the single-latest invariant.
#[derive(Clone)]
pub struct VersionChain {
    store: Arc<dyn NamespaceStore>,
    blobs: Arc<dyn BlobStore>,
    root: String,
}

impl VersionChain {
    /// Create a chain manager over the given stores for the namespace
    /// rooted at `root`.
    pub fn new(
        store: Arc<dyn NamespaceStore>,
        blobs: Arc<dyn BlobStore>,
        root: impl Into<String>,
    ) -> Self {
        Self {
            store,
            blobs,
            root: root.into(),
        }
    }

    // ---------------------------------------------------------------
    // Writes
    // ---------------------------------------------------------------

    /// Upload a new version of the file at `path`.
    ///
    /// The containing folder must exist. The content is stored first, then
    /// the current latest record is demoted and the new record inserted as
    /// latest. If demotion or insertion fails the stored content is removed
    /// again and the error returned.
    pub fn upload(
        &self,
        file_path: &str,
        content: ContentSource,
        metadata: Metadata,
    ) -> NamespaceResult<FileId> {
        let (parent, filename) = file_path.rsplit_once(path::SEPARATOR).ok_or_else(|| {
            NamespaceError::InvalidArgument(format!(
                "file path {file_path:?} has no containing folder"
            ))
        })?;
        validate_name(filename)?;
        check_upsert(&metadata)?;
        if parent != self.root && self.store.find_folder(parent)?.is_none() {
            return Err(NamespaceError::FolderNotFound {
                path: parent.to_string(),
            });
        }

        let data = content.read()?;
        let blob = self.blobs.put(&data, &metadata)?;
        let record =
            FileRecord::new_latest(parent, filename, blob, data.len() as u64).with_metadata(metadata);

        let committed = self.demote_latest(file_path).and_then(|_| {
            self.store
                .insert_file(&record)
                .map_err(NamespaceError::from)
        });
        if let Err(e) = committed {
            if let Err(cleanup) = self.blobs.delete(&blob) {
                warn!(path = file_path, %blob, error = %cleanup, "failed to remove orphaned blob");
            }
            return Err(e);
        }

        info!(path = file_path, version = %record.id, size = record.size, "file uploaded");
        Ok(record.id)
    }

    /// Rename the file at `file_path` to `new_name` inside the same folder.
    ///
    /// Every version is moved, not just the latest.
    pub fn change_name(&self, new_name: &str, file_path: &str) -> NamespaceResult<()> {
        let versions = self.versions(file_path)?;
        validate_name(new_name)?;

        let parent = versions[0].parent_directory.clone();
        let new_path = path::join(&parent, new_name);
        if new_path == file_path {
            return Ok(());
        }
        if !self.store.find_files(&FileQuery::versions(&new_path))?.is_empty() {
            return Err(NamespaceError::FileAlreadyExists { path: new_path });
        }

        let update = FileUpdate {
            filename: Some(new_name.to_string()),
            path: Some(new_path.clone()),
            ..Default::default()
        };
        for version in &versions {
            self.store.update_file(&version.id, &update)?;
        }

        info!(from = file_path, to = %new_path, versions = versions.len(), "file renamed");
        Ok(())
    }

    /// Set and remove custom metadata keys on the latest version, or on
    /// every version when `all_versions` is set.
    pub fn change_metadata(
        &self,
        file_path: &str,
        upsert: &Metadata,
        delete_keys: &[String],
        all_versions: bool,
    ) -> NamespaceResult<()> {
        check_upsert(upsert)?;
        check_removals(delete_keys)?;

        let query = if all_versions {
            FileQuery::versions(file_path)
        } else {
            FileQuery::latest(file_path)
        };
        let targets = self.store.find_files(&query)?;
        if targets.is_empty() {
            return Err(NamespaceError::FileNotFound {
                path: file_path.to_string(),
            });
        }

        let update = FileUpdate {
            set_metadata: upsert.clone(),
            unset_metadata: delete_keys.to_vec(),
            ..Default::default()
        };
        for target in &targets {
            self.store.update_file(&target.id, &update)?;
        }
        debug!(path = file_path, records = targets.len(), "file metadata changed");
        Ok(())
    }

    /// Delete every version of the file at `file_path` and its content.
    pub fn delete(&self, file_path: &str) -> NamespaceResult<()> {
        let versions = self.versions(file_path)?;
        for version in &versions {
            // Content first: a retry after a failure here still finds the record.
            self.blobs.delete(&version.blob)?;
            self.store.delete_file(&version.id)?;
        }
        info!(path = file_path, versions = versions.len(), "file deleted");
        Ok(())
    }

    /// Recompute the latest pointer for `file_path`.
    ///
    /// The most recently inserted version becomes latest and every other
    /// version is demoted. Returns the id of the latest version.
    pub fn repair_latest(&self, file_path: &str) -> NamespaceResult<FileId> {
        let versions = self.versions(file_path)?;
        let flagged = versions.iter().filter(|v| v.is_latest).count();
        if flagged > 1 {
            warn!(path = file_path, flagged, "multiple latest versions found");
        }

        let (newest, older) = versions
            .split_last()
            .ok_or_else(|| NamespaceError::FileNotFound {
                path: file_path.to_string(),
            })?;
        for version in older.iter().filter(|v| v.is_latest) {
            self.store.update_file(&version.id, &FileUpdate::latest(false))?;
        }
        if !newest.is_latest {
            self.store.update_file(&newest.id, &FileUpdate::latest(true))?;
        }
        Ok(newest.id)
    }

    fn demote_latest(&self, file_path: &str) -> NamespaceResult<usize> {
        let current = self.store.find_files(&FileQuery::latest(file_path))?;
        for record in &current {
            self.store.update_file(&record.id, &FileUpdate::latest(false))?;
        }
        Ok(current.len())
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    /// Every version at `file_path`, oldest first.
    pub fn history(&self, file_path: &str) -> NamespaceResult<Vec<FileRecord>> {
        self.versions(file_path)
    }

    /// The latest version at `file_path`, if any.
    pub fn latest(&self, file_path: &str) -> NamespaceResult<Option<FileRecord>> {
        Ok(self
            .store
            .find_files(&FileQuery::latest(file_path))?
            .pop())
    }

    /// Content of the latest version at `file_path`.
    pub fn read_latest(&self, file_path: &str) -> NamespaceResult<Vec<u8>> {
        let record = self
            .latest(file_path)?
            .ok_or_else(|| NamespaceError::FileNotFound {
                path: file_path.to_string(),
            })?;
        self.read_record(&record)
    }

    /// Content of a specific version at `file_path`.
    pub fn read_version(&self, file_path: &str, id: &FileId) -> NamespaceResult<Vec<u8>> {
        let versions = self.versions(file_path)?;
        let record = versions
            .iter()
            .find(|v| v.id == *id)
            .ok_or_else(|| NamespaceError::VersionNotFound {
                path: file_path.to_string(),
                id: *id,
            })?;
        self.read_record(record)
    }

    /// Content referenced by `record`.
    pub fn read_record(&self, record: &FileRecord) -> NamespaceResult<Vec<u8>> {
        self.blobs
            .get(&record.blob)?
            .ok_or_else(|| NamespaceError::ContentMissing {
                path: record.path.clone(),
                blob: record.blob,
            })
    }

    fn versions(&self, file_path: &str) -> NamespaceResult<Vec<FileRecord>> {
        let versions = self.store.find_files(&FileQuery::versions(file_path))?;
        if versions.is_empty() {
            return Err(NamespaceError::FileNotFound {
                path: file_path.to_string(),
            });
        }
        Ok(versions)
    }
}

impl std::fmt::Debug for VersionChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VersionChain")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
