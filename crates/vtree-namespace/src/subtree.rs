use std::sync::Arc;

use tracing::debug;
use vtree_store::{FileQuery, FolderQuery, NamespaceStore};
use vtree_types::{FileRecord, Folder};

use crate::error::NamespaceResult;

/// The closed set of folders and latest files below a folder.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Subtree {
    /// The folder the subtree is rooted at.
    pub root: String,
    /// Descendant folders, sorted by path. Excludes `root` itself.
    pub folders: Vec<Folder>,
    /// Latest file records anywhere below `root`, sorted by path.
    pub files: Vec<FileRecord>,
}

impl Subtree {
    /// Returns `true` if the subtree holds no folders and no files.
    pub fn is_empty(&self) -> bool {
        self.folders.is_empty() && self.files.is_empty()
    }
}

/// Resolves subtrees with the separator-bounded prefix rule.
///
/// A record is "under" `P` when its `parentDirectory` is `P` or starts with
/// `P/`. A sibling such as `P2` never matches.
#[derive(Clone)]
pub struct SubtreeEnumerator {
    store: Arc<dyn NamespaceStore>,
}

impl SubtreeEnumerator {
    pub fn new(store: Arc<dyn NamespaceStore>) -> Self {
        Self { store }
    }

    /// Enumerate the folders and latest files below `path`.
    ///
    /// Read-only. Folders are read before files; the backing store offers
    /// no snapshot, so a concurrent writer can land between the two reads.
    pub fn enumerate(&self, path: &str) -> NamespaceResult<Subtree> {
        let folders = self.store.find_folders(&FolderQuery::under(path))?;
        let mut files = self.store.find_files(&FileQuery::under(path, true))?;
        files.sort_by(|a, b| a.path.cmp(&b.path));

        debug!(
            root = path,
            folders = folders.len(),
            files = files.len(),
            "subtree enumerated"
        );

        Ok(Subtree {
            root: path.to_string(),
            folders,
            files,
        })
    }

    /// Every file version below `path`, history included, in insertion order.
    pub fn file_versions(&self, path: &str) -> NamespaceResult<Vec<FileRecord>> {
        Ok(self.store.find_files(&FileQuery::under(path, false))?)
    }
}

impl std::fmt::Debug for SubtreeEnumerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubtreeEnumerator").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtree_store::{FileUpdate, InMemoryNamespaceStore};
    use vtree_types::BlobId;

    fn seeded() -> Arc<InMemoryNamespaceStore> {
        let store = Arc::new(InMemoryNamespaceStore::new());
        for (parent, name) in [
            ("root", "A"),
            ("root/A", "B"),
            ("root/A/B", "C"),
            ("root/A", "B-other"),
            ("root", "A2"),
        ] {
            store.insert_folder(&Folder::new(parent, name)).unwrap();
        }
        for (parent, name) in [
            ("root/A", "a.txt"),
            ("root/A/B", "b.txt"),
            ("root/A/B/C", "c.txt"),
            ("root/A/B-other", "o.txt"),
            ("root/A2", "x.txt"),
            ("root", "top.txt"),
        ] {
            store
                .insert_file(&FileRecord::new_latest(parent, name, BlobId::new(), 1))
                .unwrap();
        }
        store
    }

    fn paths_of<T>(items: &[T], f: impl Fn(&T) -> &str) -> Vec<String> {
        items.iter().map(|i| f(i).to_string()).collect()
    }

    #[test]
    fn enumerates_descendants_only() {
        let enumerator = SubtreeEnumerator::new(seeded());
        let sub = enumerator.enumerate("root/A/B").unwrap();
        assert_eq!(paths_of(&sub.folders, |f| &f.path), vec!["root/A/B/C"]);
        assert_eq!(
            paths_of(&sub.files, |f| &f.path),
            vec!["root/A/B/C/c.txt", "root/A/B/b.txt"]
        );
    }

    #[test]
    fn prefix_sibling_is_excluded() {
        let enumerator = SubtreeEnumerator::new(seeded());
        let sub = enumerator.enumerate("root/A").unwrap();
        let folders = paths_of(&sub.folders, |f| &f.path);
        assert!(!folders.iter().any(|p| p.starts_with("root/A2")));
        assert_eq!(folders, vec!["root/A/B", "root/A/B-other", "root/A/B/C"]);
        assert!(!sub.files.iter().any(|f| f.path == "root/A2/x.txt"));
        assert_eq!(sub.files.len(), 4);
    }

    #[test]
    fn root_enumeration_sees_everything() {
        let enumerator = SubtreeEnumerator::new(seeded());
        let sub = enumerator.enumerate("root").unwrap();
        assert_eq!(sub.folders.len(), 5);
        assert_eq!(sub.files.len(), 6);
    }

    #[test]
    fn history_is_excluded_but_listed_by_file_versions() {
        let store = seeded();
        let old = FileRecord::new_latest("root/A", "a.txt", BlobId::new(), 1);
        store.insert_file(&old).unwrap();
        store.update_file(&old.id, &FileUpdate::latest(false)).unwrap();

        let enumerator = SubtreeEnumerator::new(store);
        let sub = enumerator.enumerate("root/A").unwrap();
        assert_eq!(sub.files.iter().filter(|f| f.path == "root/A/a.txt").count(), 1);
        let all = enumerator.file_versions("root/A").unwrap();
        assert_eq!(all.iter().filter(|f| f.path == "root/A/a.txt").count(), 2);
    }

    #[test]
    fn empty_folder_yields_empty_subtree() {
        let enumerator = SubtreeEnumerator::new(seeded());
        let sub = enumerator.enumerate("root/A/B/C/missing").unwrap();
        assert!(sub.is_empty());
        assert_eq!(sub.root, "root/A/B/C/missing");
    }

    #[test]
    fn enumeration_is_deterministic() {
        let enumerator = SubtreeEnumerator::new(seeded());
        let first = enumerator.enumerate("root").unwrap();
        let second = enumerator.enumerate("root").unwrap();
        assert_eq!(first, second);
    }
}
