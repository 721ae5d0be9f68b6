use std::sync::Arc;

use tracing::info;
use vtree_archive::{ArchiveOutput, OutputEncoding};
use vtree_namespace::{
    validate_name, ContentSource, DirectoryOperations, Listing, NamespaceError, VersionChain,
};
use vtree_store::{BlobStore, InMemoryBlobStore, InMemoryNamespaceStore, NamespaceStore};
use vtree_types::{path, FileId, FileRecord, FolderId, Metadata};

use crate::archive::ArchiveBuilder;
use crate::config::TreeConfig;
use crate::error::SdkResult;

/// A session on one namespace.
///
/// The facade owns the current working directory. It starts at the root
/// and is only changed by this instance; callers sharing a `FileTree`
/// across threads must serialize access themselves.
pub struct FileTree {
    config: TreeConfig,
    directories: DirectoryOperations,
    versions: VersionChain,
    archives: ArchiveBuilder,
    cwd: String,
}

impl FileTree {
    /// Open a session over the given stores.
    pub fn open(
        config: TreeConfig,
        store: Arc<dyn NamespaceStore>,
        blobs: Arc<dyn BlobStore>,
    ) -> SdkResult<Self> {
        config.validate()?;
        let root = config.root_name.clone();
        let versions = VersionChain::new(store.clone(), blobs, root.as_str());
        let directories = DirectoryOperations::new(store.clone(), versions.clone(), root.as_str());
        let archives =
            ArchiveBuilder::new(store, versions.clone(), root.as_str(), config.compression_level);

        info!(
            root = %root,
            bucket = %config.bucket,
            collection = %config.folder_collection,
            "file tree opened"
        );
        Ok(Self {
            config,
            directories,
            versions,
            archives,
            cwd: root,
        })
    }

    /// Open a session over fresh in-memory stores.
    pub fn in_memory(config: TreeConfig) -> SdkResult<Self> {
        Self::open(
            config,
            Arc::new(InMemoryNamespaceStore::new()),
            Arc::new(InMemoryBlobStore::new()),
        )
    }

    pub fn config(&self) -> &TreeConfig {
        &self.config
    }

    /// The current working directory.
    pub fn cwd(&self) -> &str {
        &self.cwd
    }

    /// The namespace root path.
    pub fn root(&self) -> &str {
        self.directories.root()
    }

    // ---- Folder operations ----

    /// Create folder `name` in the current working directory.
    pub fn create_folder(&self, name: &str, metadata: Option<Metadata>) -> SdkResult<FolderId> {
        Ok(self.directories.create_folder(&self.cwd, name, metadata)?)
    }

    /// Move the working directory to `target`, taken relative to the
    /// current one when `relative` is set.
    pub fn change_directory(&mut self, target: &str, relative: bool) -> SdkResult<()> {
        self.cwd = self
            .directories
            .change_directory(&self.cwd, target, relative)?;
        Ok(())
    }

    /// Rename the folder at `folder_path`. A working directory inside it
    /// follows the rename.
    pub fn rename_folder(&mut self, new_name: &str, folder_path: &str) -> SdkResult<()> {
        self.directories.rename_folder(new_name, folder_path)?;
        if let Some(parent) = path::parent_of(folder_path) {
            let new_path = path::join(parent, new_name);
            if let Some(moved) = path::rebase(&self.cwd, folder_path, &new_path) {
                self.cwd = moved;
            }
        }
        Ok(())
    }

    /// Delete the folder at `folder_path` and everything below it.
    ///
    /// Deleting the root empties the namespace and returns the working
    /// directory to the root.
    pub fn delete_folder(&mut self, folder_path: &str) -> SdkResult<()> {
        self.directories.delete_folder(&self.cwd, folder_path)?;
        if folder_path == self.root() {
            self.cwd = self.root().to_string();
        }
        Ok(())
    }

    /// Immediate child folders and latest files of `folder_path`.
    pub fn list(&self, folder_path: &str) -> SdkResult<Listing> {
        Ok(self.directories.list(folder_path)?)
    }

    // ---- File operations ----

    /// Upload a new version of `filename` in the current working directory.
    ///
    /// `filename` is a single name; a separator in it is a forbidden
    /// character, not a way to reach a subfolder.
    pub fn upload_file(
        &self,
        filename: &str,
        content: impl Into<ContentSource>,
        metadata: Metadata,
    ) -> SdkResult<FileId> {
        validate_name(filename)?;
        let file_path = path::join(&self.cwd, filename);
        self.upload_file_at(&file_path, content, metadata)
    }

    /// Upload a new version of the file at the absolute `file_path`.
    pub fn upload_file_at(
        &self,
        file_path: &str,
        content: impl Into<ContentSource>,
        metadata: Metadata,
    ) -> SdkResult<FileId> {
        Ok(self.versions.upload(file_path, content.into(), metadata)?)
    }

    pub fn change_file_name(&self, new_name: &str, file_path: &str) -> SdkResult<()> {
        Ok(self.versions.change_name(new_name, file_path)?)
    }

    pub fn change_file_metadata(
        &self,
        file_path: &str,
        upsert: &Metadata,
        delete_keys: &[String],
        all_versions: bool,
    ) -> SdkResult<()> {
        Ok(self
            .versions
            .change_metadata(file_path, upsert, delete_keys, all_versions)?)
    }

    pub fn delete_file(&self, file_path: &str) -> SdkResult<()> {
        Ok(self.versions.delete(file_path)?)
    }

    /// Content of the latest version at `file_path`.
    pub fn read_file(&self, file_path: &str) -> SdkResult<Vec<u8>> {
        Ok(self.versions.read_latest(file_path)?)
    }

    /// Content of a specific version at `file_path`.
    pub fn read_file_version(&self, file_path: &str, id: &FileId) -> SdkResult<Vec<u8>> {
        Ok(self.versions.read_version(file_path, id)?)
    }

    /// Every version at `file_path`, oldest first.
    pub fn file_history(&self, file_path: &str) -> SdkResult<Vec<FileRecord>> {
        Ok(self.versions.history(file_path)?)
    }

    pub fn repair_latest(&self, file_path: &str) -> SdkResult<FileId> {
        Ok(self.versions.repair_latest(file_path)?)
    }

    // ---- Archives ----

    /// Archive the folder at `folder_path`.
    ///
    /// Fails with not-found for a missing folder before the encoding is
    /// looked at. `encoding` must then name a supported output encoding
    /// (`bytes`, `base64` or `hex`); anything else is an invalid argument.
    pub fn download_folder(&self, folder_path: &str, encoding: &str) -> SdkResult<ArchiveOutput> {
        let folder_path = folder_path.trim_end_matches(path::SEPARATOR);
        if !self.directories.folder_exists(folder_path)? {
            return Err(NamespaceError::FolderNotFound {
                path: folder_path.to_string(),
            }
            .into());
        }
        let encoding: OutputEncoding = encoding
            .parse()
            .map_err(|e: vtree_archive::ArchiveError| NamespaceError::InvalidArgument(e.to_string()))?;
        self.archives.build(folder_path, encoding)
    }

    /// Archive the folder at `folder_path` in the configured encoding.
    pub fn download_folder_default(&self, folder_path: &str) -> SdkResult<ArchiveOutput> {
        self.archives.build(folder_path, self.config.default_encoding)
    }
}

impl std::fmt::Debug for FileTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileTree")
            .field("root", &self.config.root_name)
            .field("cwd", &self.cwd)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vtree_archive::ArchiveReader;

    use crate::error::SdkError;

    fn tree() -> FileTree {
        FileTree::in_memory(TreeConfig::default()).unwrap()
    }

    fn no_meta() -> Metadata {
        Metadata::new()
    }

    #[test]
    fn session_starts_at_root() {
        let t = tree();
        assert_eq!(t.cwd(), "root");
        assert_eq!(t.root(), "root");
    }

    #[test]
    fn open_rejects_bad_root_name() {
        let config = TreeConfig {
            root_name: "bad name".into(),
            ..TreeConfig::default()
        };
        let err = FileTree::in_memory(config).unwrap_err();
        assert!(matches!(err, SdkError::Config(_)));
    }

    #[test]
    fn folder_lifecycle_scenario() {
        let mut t = tree();
        t.create_folder("x", None).unwrap();
        let listing = t.list("root").unwrap();
        assert_eq!(listing.folders.len(), 1);
        assert_eq!(listing.folders[0].path, "root/x");

        let err = t.create_folder("x", None).unwrap_err();
        assert_eq!(err.to_string(), "folder already exists: root/x");

        let first = t.upload_file_at("root/x/a.txt", "hello", no_meta()).unwrap();
        let second = t.upload_file_at("root/x/a.txt", "hello", no_meta()).unwrap();
        let history = t.file_history("root/x/a.txt").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].id, first);
        assert!(!history[0].is_latest);
        assert_eq!(history[1].id, second);
        assert!(history[1].is_latest);

        t.change_directory("root/x", false).unwrap();
        let err = t.delete_folder("root/x").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot delete root/x: it contains the current working directory"
        );

        t.change_directory("root", false).unwrap();
        t.delete_folder("root/x").unwrap();
        assert!(t.list("root").unwrap().folders.is_empty());
        let err = t.file_history("root/x/a.txt").unwrap_err();
        assert_eq!(err.to_string(), "file not found: root/x/a.txt");
    }

    #[test]
    fn create_then_enter_relative() {
        let mut t = tree();
        for name in ["a", "b-1", "c_d.e"] {
            let before = t.cwd().to_string();
            t.create_folder(name, None).unwrap();
            t.change_directory(name, true).unwrap();
            assert_eq!(t.cwd(), format!("{before}/{name}"));
        }
    }

    #[test]
    fn failed_change_directory_keeps_cwd() {
        let mut t = tree();
        let err = t.change_directory("nope", true).unwrap_err();
        assert_eq!(err.to_string(), "folder not found: root/nope");
        assert_eq!(t.cwd(), "root");
    }

    #[test]
    fn upload_into_cwd() {
        let mut t = tree();
        t.create_folder("docs", None).unwrap();
        t.change_directory("docs", true).unwrap();
        t.upload_file("note.txt", "hi", no_meta()).unwrap();
        assert_eq!(t.read_file("root/docs/note.txt").unwrap(), b"hi");
    }

    #[test]
    fn upload_from_local_file() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("src.bin");
        std::fs::write(&local, [1u8, 2, 3]).unwrap();

        let t = tree();
        t.upload_file("src.bin", local, no_meta()).unwrap();
        assert_eq!(t.read_file("root/src.bin").unwrap(), vec![1, 2, 3]);

        let err = t
            .upload_file("gone.bin", dir.path().join("missing"), no_meta())
            .unwrap_err();
        assert!(err.to_string().starts_with("invalid argument: cannot read content source"));
    }

    #[test]
    fn rename_carries_cwd_along() {
        let mut t = tree();
        t.create_folder("a", None).unwrap();
        t.change_directory("a", true).unwrap();
        t.create_folder("b", None).unwrap();
        t.change_directory("b", true).unwrap();

        t.rename_folder("z", "root/a").unwrap();
        assert_eq!(t.cwd(), "root/z/b");
        t.create_folder("c", None).unwrap();
        assert_eq!(t.list("root/z/b").unwrap().folders[0].path, "root/z/b/c");
    }

    #[test]
    fn rename_elsewhere_leaves_cwd() {
        let mut t = tree();
        t.create_folder("a", None).unwrap();
        t.create_folder("ab", None).unwrap();
        t.change_directory("ab", true).unwrap();
        t.rename_folder("q", "root/a").unwrap();
        assert_eq!(t.cwd(), "root/ab");
    }

    #[test]
    fn deleting_root_resets_cwd() {
        let mut t = tree();
        t.create_folder("a", None).unwrap();
        t.change_directory("a", true).unwrap();
        t.upload_file("f.txt", "x", no_meta()).unwrap();

        t.delete_folder("root").unwrap();
        assert_eq!(t.cwd(), "root");
        let listing = t.list("root").unwrap();
        assert!(listing.folders.is_empty() && listing.files.is_empty());
    }

    #[test]
    fn file_rename_metadata_and_delete() {
        let t = tree();
        t.upload_file("a.txt", "1", no_meta()).unwrap();
        t.change_file_name("b.txt", "root/a.txt").unwrap();
        assert_eq!(t.read_file("root/b.txt").unwrap(), b"1");

        let mut upsert = Metadata::new();
        upsert.insert("owner".into(), serde_json::json!("ana"));
        t.change_file_metadata("root/b.txt", &upsert, &[], false).unwrap();
        let latest = t.file_history("root/b.txt").unwrap().pop().unwrap();
        assert_eq!(latest.custom_metadata.get("owner"), Some(&serde_json::json!("ana")));

        let mut reserved = Metadata::new();
        reserved.insert("path".into(), serde_json::json!("elsewhere"));
        let err = t
            .change_file_metadata("root/b.txt", &reserved, &[], false)
            .unwrap_err();
        assert_eq!(err.to_string(), "cannot change path");

        t.delete_file("root/b.txt").unwrap();
        assert!(t.read_file("root/b.txt").unwrap_err().as_namespace().unwrap().is_not_found());
    }

    #[test]
    fn read_specific_version() {
        let t = tree();
        let v1 = t.upload_file("a.txt", "one", no_meta()).unwrap();
        t.upload_file("a.txt", "two", no_meta()).unwrap();
        assert_eq!(t.read_file_version("root/a.txt", &v1).unwrap(), b"one");
        assert_eq!(t.read_file("root/a.txt").unwrap(), b"two");
    }

    #[test]
    fn repair_latest_through_facade() {
        let t = tree();
        t.upload_file("a.txt", "one", no_meta()).unwrap();
        let last = t.upload_file("a.txt", "two", no_meta()).unwrap();
        assert_eq!(t.repair_latest("root/a.txt").unwrap(), last);
    }

    #[test]
    fn download_round_trip() {
        let mut t = tree();
        t.create_folder("proj", None).unwrap();
        t.upload_file_at("root/proj/readme.md", "# proj", no_meta()).unwrap();
        t.upload_file_at("root/proj/readme.md", "# proj v2", no_meta()).unwrap();
        t.change_directory("proj", true).unwrap();
        t.create_folder("src", None).unwrap();
        t.upload_file_at("root/proj/src/main.rs", "fn main() {}", no_meta()).unwrap();

        for encoding in ["bytes", "base64", "HEX"] {
            let output = t.download_folder("root/proj", encoding).unwrap();
            let reader = ArchiveReader::from_bytes(&output.decode().unwrap()).unwrap();
            assert_eq!(reader.paths(), vec!["readme.md", "src/main.rs"]);
            for entry in reader.entries() {
                let original = t.read_file(&format!("root/proj/{}", entry.path)).unwrap();
                assert_eq!(entry.data, original);
            }
        }
    }

    #[test]
    fn download_rejects_unknown_encoding() {
        let t = tree();
        let err = t.download_folder("root", "zip").unwrap_err();
        assert!(matches!(
            err.as_namespace(),
            Some(NamespaceError::InvalidArgument(_))
        ));
        assert_eq!(
            err.to_string(),
            "invalid argument: unsupported archive encoding: zip"
        );
    }

    #[test]
    fn download_missing_folder() {
        let t = tree();
        let err = t.download_folder("root/none", "bytes").unwrap_err();
        assert_eq!(err.to_string(), "folder not found: root/none");
    }

    #[test]
    fn download_reports_missing_folder_before_bad_encoding() {
        let t = tree();
        let err = t.download_folder("root/none", "zip").unwrap_err();
        assert_eq!(err.to_string(), "folder not found: root/none");
    }

    // ---- Name validation through the facade ----

    fn invalid_char(err: &SdkError) -> Option<char> {
        match err.as_namespace() {
            Some(NamespaceError::InvalidCharacter { ch, .. }) => Some(*ch),
            _ => None,
        }
    }

    #[test]
    fn upload_rejects_separator_in_filename() {
        let t = tree();
        t.create_folder("sub", None).unwrap();

        let err = t.upload_file("sub/a.txt", "x", no_meta()).unwrap_err();
        assert_eq!(invalid_char(&err), Some('/'));
        assert_eq!(
            err.to_string(),
            "invalid character '/' in name \"sub/a.txt\""
        );
        assert!(t.list("root/sub").unwrap().files.is_empty());

        let err = t.upload_file("a$b/c.txt", "x", no_meta()).unwrap_err();
        assert_eq!(invalid_char(&err), Some('$'));
    }

    #[test]
    fn every_forbidden_char_is_reported_first() {
        let mut t = tree();
        t.create_folder("target", None).unwrap();

        for &ch in vtree_namespace::names::FORBIDDEN_CHARS {
            // A second forbidden character later in the name must not win.
            let trailing = if ch == '#' { '%' } else { '#' };
            let name = format!("ok{ch}x{trailing}y");

            let err = t.create_folder(&name, None).unwrap_err();
            assert_eq!(invalid_char(&err), Some(ch), "create_folder {name:?}");

            let err = t.upload_file(&name, "x", no_meta()).unwrap_err();
            assert_eq!(invalid_char(&err), Some(ch), "upload_file {name:?}");

            let err = t.rename_folder(&name, "root/target").unwrap_err();
            assert_eq!(invalid_char(&err), Some(ch), "rename_folder {name:?}");
        }

        let listing = t.list("root").unwrap();
        assert_eq!(listing.folders.len(), 1);
        assert_eq!(listing.folders[0].path, "root/target");
        assert!(listing.files.is_empty());
    }

    #[test]
    fn download_uses_configured_encoding() {
        let config = TreeConfig {
            default_encoding: OutputEncoding::Base64,
            ..TreeConfig::default()
        };
        let t = FileTree::in_memory(config).unwrap();
        t.upload_file("a.txt", "a", no_meta()).unwrap();
        let output = t.download_folder_default("root").unwrap();
        assert_eq!(output.encoding(), OutputEncoding::Base64);
    }
}
