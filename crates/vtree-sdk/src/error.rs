use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error(transparent)]
    Namespace(#[from] vtree_namespace::NamespaceError),

    #[error("archive error: {0}")]
    Archive(#[from] vtree_archive::ArchiveError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),
}

impl SdkError {
    /// The namespace error behind this failure, if any.
    pub fn as_namespace(&self) -> Option<&vtree_namespace::NamespaceError> {
        match self {
            Self::Namespace(e) => Some(e),
            _ => None,
        }
    }
}

impl From<vtree_store::StoreError> for SdkError {
    fn from(e: vtree_store::StoreError) -> Self {
        Self::Namespace(e.into())
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
