use vtree_types::{BlobId, FileId, FileRecord, Folder, FolderId, Metadata};

use crate::error::StoreResult;
use crate::query::{FileQuery, FileUpdate, FolderQuery, FolderUpdate};

/// Document store holding folder documents and file version records.
///
/// All implementations must satisfy these invariants:
/// - Every method is a single-document read or write. There are no
///   transactions spanning documents.
/// - Updates and deletes are idempotent: repeating one after it succeeded
///   changes nothing and reports `false`.
/// - Query results are deterministic: folders come back sorted by path,
///   file records in insertion order.
/// - All backend errors are propagated, never silently ignored.
pub trait NamespaceStore: Send + Sync {
    /// Store a new folder document.
    fn insert_folder(&self, folder: &Folder) -> StoreResult<()>;

    /// All folders matching `query`, sorted by path.
    fn find_folders(&self, query: &FolderQuery) -> StoreResult<Vec<Folder>>;

    /// Apply `update` to the folder `id`. Returns `true` if it existed.
    fn update_folder(&self, id: &FolderId, update: &FolderUpdate) -> StoreResult<bool>;

    /// Delete the folder `id`. Returns `true` if it existed.
    fn delete_folder(&self, id: &FolderId) -> StoreResult<bool>;

    /// Store a new file version record.
    fn insert_file(&self, record: &FileRecord) -> StoreResult<()>;

    /// All file records matching `query`, in insertion order.
    fn find_files(&self, query: &FileQuery) -> StoreResult<Vec<FileRecord>>;

    /// Apply `update` to the record `id`. Returns `true` if it existed.
    fn update_file(&self, id: &FileId, update: &FileUpdate) -> StoreResult<bool>;

    /// Delete the record `id`. Returns `true` if it existed.
    fn delete_file(&self, id: &FileId) -> StoreResult<bool>;

    /// The folder stored at exactly `path`, if any.
    fn find_folder(&self, path: &str) -> StoreResult<Option<Folder>> {
        Ok(self.find_folders(&FolderQuery::path(path))?.into_iter().next())
    }
}

/// Opaque content store for file bytes.
pub trait BlobStore: Send + Sync {
    /// Store `data` under a freshly generated identifier.
    fn put(&self, data: &[u8], metadata: &Metadata) -> StoreResult<BlobId>;

    /// Read a blob. Returns `Ok(None)` if it does not exist.
    fn get(&self, id: &BlobId) -> StoreResult<Option<Vec<u8>>>;

    /// Delete a blob. Returns `true` if it existed.
    fn delete(&self, id: &BlobId) -> StoreResult<bool>;

    /// Check whether a blob exists.
    fn exists(&self, id: &BlobId) -> StoreResult<bool> {
        Ok(self.get(id)?.is_some())
    }
}
