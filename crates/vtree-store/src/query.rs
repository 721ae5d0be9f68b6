//! Query and update descriptions understood by every [`NamespaceStore`].
//!
//! [`NamespaceStore`]: crate::traits::NamespaceStore

use vtree_types::{path, FileRecord, Folder, Metadata};

/// Selects records by their location.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PathSelector {
    /// The record whose own `path` equals the value.
    Path(String),
    /// Records whose `parentDirectory` equals the value.
    ChildrenOf(String),
    /// Records whose `parentDirectory` is the value or lies below it,
    /// compared on whole path segments.
    Under(String),
}

impl PathSelector {
    /// Whether a record with the given `path` and `parentDirectory` matches.
    pub fn matches(&self, record_path: &str, parent_directory: &str) -> bool {
        match self {
            Self::Path(p) => record_path == p,
            Self::ChildrenOf(p) => parent_directory == p,
            Self::Under(p) => path::is_within(parent_directory, p),
        }
    }
}

/// Folder lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FolderQuery {
    pub selector: PathSelector,
}

impl FolderQuery {
    pub fn path(path: impl Into<String>) -> Self {
        Self { selector: PathSelector::Path(path.into()) }
    }

    pub fn children_of(path: impl Into<String>) -> Self {
        Self { selector: PathSelector::ChildrenOf(path.into()) }
    }

    pub fn under(path: impl Into<String>) -> Self {
        Self { selector: PathSelector::Under(path.into()) }
    }

    pub fn matches(&self, folder: &Folder) -> bool {
        self.selector.matches(&folder.path, &folder.parent_directory)
    }
}

/// File version lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileQuery {
    pub selector: PathSelector,
    /// Restrict the result to records with `is_latest` set.
    pub latest_only: bool,
}

impl FileQuery {
    /// Every version stored at `path`.
    pub fn versions(path: impl Into<String>) -> Self {
        Self { selector: PathSelector::Path(path.into()), latest_only: false }
    }

    /// The latest version stored at `path`.
    pub fn latest(path: impl Into<String>) -> Self {
        Self { selector: PathSelector::Path(path.into()), latest_only: true }
    }

    /// Latest versions directly inside folder `path`.
    pub fn children_of(path: impl Into<String>) -> Self {
        Self { selector: PathSelector::ChildrenOf(path.into()), latest_only: true }
    }

    /// Versions anywhere below folder `path`.
    pub fn under(path: impl Into<String>, latest_only: bool) -> Self {
        Self { selector: PathSelector::Under(path.into()), latest_only }
    }

    pub fn matches(&self, record: &FileRecord) -> bool {
        (!self.latest_only || record.is_latest)
            && self.selector.matches(&record.path, &record.parent_directory)
    }
}

/// Field writes applied to one folder document. `None` leaves a field as is.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FolderUpdate {
    pub name: Option<String>,
    pub path: Option<String>,
    pub parent_directory: Option<String>,
}

impl FolderUpdate {
    pub fn apply(&self, folder: &mut Folder) {
        if let Some(name) = &self.name {
            folder.name = name.clone();
        }
        if let Some(path) = &self.path {
            folder.path = path.clone();
        }
        if let Some(parent) = &self.parent_directory {
            folder.parent_directory = parent.clone();
        }
    }
}

/// Field writes applied to one file version record.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FileUpdate {
    pub filename: Option<String>,
    pub path: Option<String>,
    pub parent_directory: Option<String>,
    pub is_latest: Option<bool>,
    /// Custom metadata keys to set.
    pub set_metadata: Metadata,
    /// Custom metadata keys to remove.
    pub unset_metadata: Vec<String>,
}

impl FileUpdate {
    /// An update that only changes the latest flag.
    pub fn latest(is_latest: bool) -> Self {
        Self { is_latest: Some(is_latest), ..Default::default() }
    }

    pub fn apply(&self, record: &mut FileRecord) {
        if let Some(filename) = &self.filename {
            record.filename = filename.clone();
        }
        if let Some(path) = &self.path {
            record.path = path.clone();
        }
        if let Some(parent) = &self.parent_directory {
            record.parent_directory = parent.clone();
        }
        if let Some(is_latest) = self.is_latest {
            record.is_latest = is_latest;
        }
        for (key, value) in &self.set_metadata {
            record.custom_metadata.insert(key.clone(), value.clone());
        }
        for key in &self.unset_metadata {
            record.custom_metadata.remove(key);
        }
    }
}
