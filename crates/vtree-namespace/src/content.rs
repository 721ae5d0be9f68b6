use std::path::PathBuf;

use crate::error::{NamespaceError, NamespaceResult};

/// Where the bytes of an upload come from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentSource {
    /// Content already in memory.
    Bytes(Vec<u8>),
    /// A file on the local filesystem, read at upload time.
    File(PathBuf),
}

impl ContentSource {
    /// Read the full content.
    ///
    /// A file that cannot be read is an invalid argument, not an I/O fault
    /// of the namespace.
    pub fn read(self) -> NamespaceResult<Vec<u8>> {
        match self {
            Self::Bytes(data) => Ok(data),
            Self::File(path) => std::fs::read(&path).map_err(|e| {
                NamespaceError::InvalidArgument(format!(
                    "cannot read content source {}: {e}",
                    path.display()
                ))
            }),
        }
    }
}

impl From<Vec<u8>> for ContentSource {
    fn from(data: Vec<u8>) -> Self {
        Self::Bytes(data)
    }
}

impl From<&[u8]> for ContentSource {
    fn from(data: &[u8]) -> Self {
        Self::Bytes(data.to_vec())
    }
}

impl From<&str> for ContentSource {
    fn from(text: &str) -> Self {
        Self::Bytes(text.as_bytes().to_vec())
    }
}

impl From<PathBuf> for ContentSource {
    fn from(path: PathBuf) -> Self {
        Self::File(path)
    }
}
