use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use vtree_types::{BlobId, FileId, FileRecord, Folder, FolderId, Metadata};

use crate::error::{StoreError, StoreResult};
use crate::query::{FileQuery, FileUpdate, FolderQuery, FolderUpdate};
use crate::traits::{BlobStore, NamespaceStore};

fn poisoned<E: std::fmt::Display>(e: E) -> StoreError {
    StoreError::LockPoisoned(e.to_string())
}

// ---------------------------------------------------------------------------
// InMemoryNamespaceStore
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FileTable {
    next_seq: u64,
    by_seq: BTreeMap<u64, FileRecord>,
    seq_of: HashMap<FileId, u64>,
}

/// In-memory document store for folders and file records.
///
/// Intended for tests and embedding. File records are kept in insertion
/// order so version history comes back oldest first.
pub struct InMemoryNamespaceStore {
    folders: RwLock<HashMap<FolderId, Folder>>,
    files: RwLock<FileTable>,
}

impl InMemoryNamespaceStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            folders: RwLock::new(HashMap::new()),
            files: RwLock::new(FileTable::default()),
        }
    }

    /// Number of folder documents.
    pub fn folder_count(&self) -> usize {
        self.folders.read().map(|f| f.len()).unwrap_or(0)
    }

    /// Number of file version records.
    pub fn file_count(&self) -> usize {
        self.files.read().map(|f| f.by_seq.len()).unwrap_or(0)
    }

    /// Returns `true` if no folders or files are stored.
    pub fn is_empty(&self) -> bool {
        self.folder_count() == 0 && self.file_count() == 0
    }
}

impl Default for InMemoryNamespaceStore {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceStore for InMemoryNamespaceStore {
    fn insert_folder(&self, folder: &Folder) -> StoreResult<()> {
        let mut folders = self.folders.write().map_err(poisoned)?;
        if folders.contains_key(&folder.id) {
            return Err(StoreError::DuplicateId(folder.id.to_string()));
        }
        folders.insert(folder.id, folder.clone());
        Ok(())
    }

    fn find_folders(&self, query: &FolderQuery) -> StoreResult<Vec<Folder>> {
        let folders = self.folders.read().map_err(poisoned)?;
        let mut found: Vec<Folder> = folders
            .values()
            .filter(|f| query.matches(f))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(found)
    }

    fn update_folder(&self, id: &FolderId, update: &FolderUpdate) -> StoreResult<bool> {
        let mut folders = self.folders.write().map_err(poisoned)?;
        match folders.get_mut(id) {
            Some(folder) => {
                update.apply(folder);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_folder(&self, id: &FolderId) -> StoreResult<bool> {
        let mut folders = self.folders.write().map_err(poisoned)?;
        Ok(folders.remove(id).is_some())
    }

    fn insert_file(&self, record: &FileRecord) -> StoreResult<()> {
        let mut files = self.files.write().map_err(poisoned)?;
        if files.seq_of.contains_key(&record.id) {
            return Err(StoreError::DuplicateId(record.id.to_string()));
        }
        let seq = files.next_seq;
        files.next_seq += 1;
        files.seq_of.insert(record.id, seq);
        files.by_seq.insert(seq, record.clone());
        Ok(())
    }

    fn find_files(&self, query: &FileQuery) -> StoreResult<Vec<FileRecord>> {
        let files = self.files.read().map_err(poisoned)?;
        Ok(files
            .by_seq
            .values()
            .filter(|r| query.matches(r))
            .cloned()
            .collect())
    }

    fn update_file(&self, id: &FileId, update: &FileUpdate) -> StoreResult<bool> {
        let mut files = self.files.write().map_err(poisoned)?;
        let Some(seq) = files.seq_of.get(id).copied() else {
            return Ok(false);
        };
        match files.by_seq.get_mut(&seq) {
            Some(record) => {
                update.apply(record);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn delete_file(&self, id: &FileId) -> StoreResult<bool> {
        let mut files = self.files.write().map_err(poisoned)?;
        match files.seq_of.remove(id) {
            Some(seq) => Ok(files.by_seq.remove(&seq).is_some()),
            None => Ok(false),
        }
    }
}

impl std::fmt::Debug for InMemoryNamespaceStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryNamespaceStore")
            .field("folder_count", &self.folder_count())
            .field("file_count", &self.file_count())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// InMemoryBlobStore
// ---------------------------------------------------------------------------

struct StoredBlob {
    data: Vec<u8>,
    metadata: Metadata,
}

/// In-memory blob store.
///
/// Blobs are cloned on read and write.
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<BlobId, StoredBlob>>,
}

impl InMemoryBlobStore {
    /// Create a new empty blob store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
        }
    }

    /// Number of blobs currently stored.
    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total bytes across all stored blobs.
    pub fn total_bytes(&self) -> u64 {
        self.blobs
            .read()
            .map(|b| b.values().map(|blob| blob.data.len() as u64).sum())
            .unwrap_or(0)
    }

    /// Metadata attached to a blob at upload time.
    pub fn metadata(&self, id: &BlobId) -> StoreResult<Option<Metadata>> {
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.get(id).map(|b| b.metadata.clone()))
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobStore for InMemoryBlobStore {
    fn put(&self, data: &[u8], metadata: &Metadata) -> StoreResult<BlobId> {
        let id = BlobId::new();
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        blobs.insert(
            id,
            StoredBlob {
                data: data.to_vec(),
                metadata: metadata.clone(),
            },
        );
        Ok(id)
    }

    fn get(&self, id: &BlobId) -> StoreResult<Option<Vec<u8>>> {
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.get(id).map(|b| b.data.clone()))
    }

    fn delete(&self, id: &BlobId) -> StoreResult<bool> {
        let mut blobs = self.blobs.write().map_err(poisoned)?;
        Ok(blobs.remove(id).is_some())
    }

    fn exists(&self, id: &BlobId) -> StoreResult<bool> {
        let blobs = self.blobs.read().map_err(poisoned)?;
        Ok(blobs.contains_key(id))
    }
}

impl std::fmt::Debug for InMemoryBlobStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBlobStore")
            .field("blob_count", &self.len())
            .finish()
    }
}
