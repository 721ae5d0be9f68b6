/// Errors from document or blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A record with this identifier is already stored.
    #[error("duplicate id: {0}")]
    DuplicateId(String),

    /// A lock guarding backend state was poisoned by a panicking writer.
    #[error("store lock poisoned: {0}")]
    LockPoisoned(String),

    /// Failure reported by a backend outside this crate, such as a remote
    /// document database or object store.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
