use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use vtree_archive::OutputEncoding;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid root name {name:?}: {reason}")]
    InvalidRootName { name: String, reason: String },
}

/// Settings for one namespace.
///
/// `bucket` and `folder_collection` name the backing blob bucket and
/// folder document collection; together with `root_name` they identify
/// the namespace.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub root_name: String,
    pub bucket: String,
    pub folder_collection: String,
    pub default_encoding: OutputEncoding,
    pub compression_level: i32,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            root_name: "root".into(),
            bucket: "vtree".into(),
            folder_collection: "folders".into(),
            default_encoding: OutputEncoding::Bytes,
            compression_level: 3,
        }
    }
}

impl TreeConfig {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Check that the root name is a usable single path segment.
    pub fn validate(&self) -> Result<(), ConfigError> {
        vtree_namespace::validate_name(&self.root_name).map_err(|e| {
            ConfigError::InvalidRootName {
                name: self.root_name.clone(),
                reason: e.to_string(),
            }
        })
    }
}
