use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("invalid archive magic: expected {expected}, got {actual}")]
    InvalidMagic { expected: String, actual: String },

    #[error("unsupported archive version: {0}")]
    UnsupportedVersion(u32),

    #[error("archive checksum mismatch")]
    ChecksumMismatch,

    #[error("corrupt archive entry at offset {offset}: {reason}")]
    CorruptEntry { offset: u64, reason: String },

    #[error("CRC32 mismatch for entry {path}")]
    CrcMismatch { path: String },

    #[error("invalid entry path {path:?}: {reason}")]
    InvalidEntryPath { path: String, reason: String },

    #[error("duplicate entry path: {0}")]
    DuplicateEntry(String),

    #[error("unsupported archive encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("cannot decode {encoding} archive text: {reason}")]
    Decode { encoding: String, reason: String },

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    #[error("compression failed: {0}")]
    CompressionFailed(String),
}

pub type ArchiveResult<T> = Result<T, ArchiveError>;
