//! Folder operations: create, change directory, cascading rename and
//! cascading delete.
//!
//! None of these hold working-directory state. The caller passes its
//! current working directory in and stores whatever comes back, so any
//! number of independent sessions can share one namespace.
//!
//! Cascades run in two phases: the affected records are enumerated into
//! an in-memory change set, then applied as point updates. The folder the
//! operation was aimed at is touched last, which keeps a retried call
//! addressable by its original path until everything below it is done.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};
use vtree_store::{FileQuery, FileUpdate, FolderQuery, FolderUpdate, NamespaceStore};
use vtree_types::{path, FileId, FileRecord, Folder, FolderId, Metadata};

use crate::error::{NamespaceError, NamespaceResult};
use crate::names::validate_name;
use crate::subtree::SubtreeEnumerator;
use crate::version::{check_upsert, VersionChain};

/// Immediate children of a folder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Listing {
    pub folders: Vec<Folder>,
    /// Latest versions only.
    pub files: Vec<FileRecord>,
}

/// Structural folder operations over a [`NamespaceStore`].
#[derive(Clone)]
pub struct DirectoryOperations {
    store: Arc<dyn NamespaceStore>,
    subtree: SubtreeEnumerator,
    versions: VersionChain,
    root: String,
}

impl DirectoryOperations {
    pub fn new(
        store: Arc<dyn NamespaceStore>,
        versions: VersionChain,
        root: impl Into<String>,
    ) -> Self {
        Self {
            subtree: SubtreeEnumerator::new(store.clone()),
            store,
            versions,
            root: root.into(),
        }
    }

    /// The namespace root path.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Returns `true` if `path` is the root or a stored folder.
    pub fn folder_exists(&self, path: &str) -> NamespaceResult<bool> {
        if path == self.root {
            return Ok(true);
        }
        Ok(self.store.find_folder(path)?.is_some())
    }

    /// Create folder `name` inside `cwd`.
    pub fn create_folder(
        &self,
        cwd: &str,
        name: &str,
        metadata: Option<Metadata>,
    ) -> NamespaceResult<FolderId> {
        let target = path::join(cwd, name);
        if self.store.find_folder(&target)?.is_some() {
            return Err(NamespaceError::AlreadyExists { path: target });
        }
        validate_name(name)?;
        let metadata = metadata.unwrap_or_default();
        check_upsert(&metadata)?;
        if !self.folder_exists(cwd)? {
            return Err(NamespaceError::FolderNotFound {
                path: cwd.to_string(),
            });
        }

        let folder = Folder::new(cwd, name).with_metadata(metadata);
        self.store.insert_folder(&folder)?;
        info!(path = %folder.path, id = %folder.id, "folder created");
        Ok(folder.id)
    }

    /// Resolve `target` and check that it names a folder.
    ///
    /// With `relative` set, `target` is taken relative to `cwd`. Returns the
    /// absolute path the caller should adopt as its working directory.
    pub fn change_directory(
        &self,
        cwd: &str,
        target: &str,
        relative: bool,
    ) -> NamespaceResult<String> {
        let target = target.trim_end_matches(path::SEPARATOR);
        let absolute = if relative {
            path::join(cwd, target)
        } else {
            target.to_string()
        };
        if !self.folder_exists(&absolute)? {
            return Err(NamespaceError::FolderNotFound { path: absolute });
        }
        debug!(from = cwd, to = %absolute, "working directory changed");
        Ok(absolute)
    }

    /// Rename the folder at `folder_path` to `new_name`, moving every
    /// descendant folder and every file version with it.
    pub fn rename_folder(&self, new_name: &str, folder_path: &str) -> NamespaceResult<()> {
        if folder_path == self.root {
            return Err(NamespaceError::CannotRenameRoot);
        }
        let top = self
            .store
            .find_folder(folder_path)?
            .ok_or_else(|| NamespaceError::FolderNotFound {
                path: folder_path.to_string(),
            })?;
        let new_path = path::join(&top.parent_directory, new_name);
        if self.store.find_folder(&new_path)?.is_some() {
            return Err(NamespaceError::AlreadyExists { path: new_path });
        }
        validate_name(new_name)?;

        // Phase 1: compute the change set.
        let folder_moves: Vec<(FolderId, FolderUpdate)> = self
            .store
            .find_folders(&FolderQuery::under(folder_path))?
            .into_iter()
            .filter_map(|f| {
                let moved = path::rebase(&f.path, folder_path, &new_path)?;
                let parent = path::rebase(&f.parent_directory, folder_path, &new_path)?;
                let update = FolderUpdate {
                    name: Some(path::last_segment(&moved).to_string()),
                    path: Some(moved),
                    parent_directory: Some(parent),
                };
                Some((f.id, update))
            })
            .collect();
        let file_moves: Vec<(FileId, FileUpdate)> = self
            .subtree
            .file_versions(folder_path)?
            .into_iter()
            .filter_map(|r| {
                let update = FileUpdate {
                    path: Some(path::rebase(&r.path, folder_path, &new_path)?),
                    parent_directory: Some(path::rebase(
                        &r.parent_directory,
                        folder_path,
                        &new_path,
                    )?),
                    ..Default::default()
                };
                Some((r.id, update))
            })
            .collect();

        // Phase 2: apply, descendants before the folder itself.
        for (id, update) in &folder_moves {
            self.store.update_folder(id, update)?;
        }
        for (id, update) in &file_moves {
            self.store.update_file(id, update)?;
        }
        self.store.update_folder(
            &top.id,
            &FolderUpdate {
                name: Some(new_name.to_string()),
                path: Some(new_path.clone()),
                parent_directory: None,
            },
        )?;

        info!(
            from = folder_path,
            to = %new_path,
            folders = folder_moves.len(),
            files = file_moves.len(),
            "folder renamed"
        );
        Ok(())
    }

    /// Delete the folder at `folder_path` with everything below it.
    ///
    /// Deleting the root empties the namespace but leaves the root itself.
    pub fn delete_folder(&self, cwd: &str, folder_path: &str) -> NamespaceResult<()> {
        let is_root = folder_path == self.root;
        if !is_root && path::is_within(cwd, folder_path) {
            return Err(NamespaceError::CannotDeleteCwd {
                path: folder_path.to_string(),
            });
        }
        let top = if is_root {
            None
        } else {
            Some(self.store.find_folder(folder_path)?.ok_or_else(|| {
                NamespaceError::FolderNotFound {
                    path: folder_path.to_string(),
                }
            })?)
        };

        let subtree = self.subtree.enumerate(folder_path)?;

        // Latest files carry their whole chain with them. Chains that lost
        // their latest flag are swept up from the full version listing.
        let mut file_paths: BTreeSet<String> =
            subtree.files.iter().map(|f| f.path.clone()).collect();
        file_paths.extend(
            self.subtree
                .file_versions(folder_path)?
                .into_iter()
                .map(|r| r.path),
        );
        for file_path in &file_paths {
            match self.versions.delete(file_path) {
                Ok(()) => {}
                Err(NamespaceError::FileNotFound { .. }) => {
                    debug!(path = %file_path, "file already gone");
                }
                Err(e) => return Err(e),
            }
        }

        for folder in subtree.folders.iter().rev() {
            self.store.delete_folder(&folder.id)?;
        }
        if let Some(top) = &top {
            self.store.delete_folder(&top.id)?;
        }

        info!(
            path = folder_path,
            folders = subtree.folders.len() + usize::from(top.is_some()),
            files = file_paths.len(),
            "folder deleted"
        );
        Ok(())
    }

    /// Immediate child folders and latest files of `folder_path`.
    pub fn list(&self, folder_path: &str) -> NamespaceResult<Listing> {
        if !self.folder_exists(folder_path)? {
            return Err(NamespaceError::FolderNotFound {
                path: folder_path.to_string(),
            });
        }
        let folders = self.store.find_folders(&FolderQuery::children_of(folder_path))?;
        let mut files = self.store.find_files(&FileQuery::children_of(folder_path))?;
        files.sort_by(|a, b| a.filename.cmp(&b.filename));
        Ok(Listing { folders, files })
    }
}

impl std::fmt::Debug for DirectoryOperations {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectoryOperations")
            .field("root", &self.root)
            .finish_non_exhaustive()
    }
}
