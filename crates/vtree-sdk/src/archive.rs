use std::sync::Arc;

use tracing::{debug, info};
use vtree_archive::{ArchiveOutput, ArchiveWriter, OutputEncoding, PackArchiveWriter};
use vtree_namespace::{NamespaceError, SubtreeEnumerator, VersionChain};
use vtree_store::NamespaceStore;
use vtree_types::path;

use crate::error::SdkResult;

/// Packs a folder subtree into a single archive.
///
/// Only latest file versions are included. Entry paths are relative to the
/// archived folder; directories are implied by the entry paths, so empty
/// folders do not appear in the archive.
#[derive(Clone)]
pub struct ArchiveBuilder {
    store: Arc<dyn NamespaceStore>,
    subtree: SubtreeEnumerator,
    versions: VersionChain,
    root: String,
    compression_level: i32,
}

impl ArchiveBuilder {
    pub fn new(
        store: Arc<dyn NamespaceStore>,
        versions: VersionChain,
        root: impl Into<String>,
        compression_level: i32,
    ) -> Self {
        Self {
            subtree: SubtreeEnumerator::new(store.clone()),
            store,
            versions,
            root: root.into(),
            compression_level,
        }
    }

    /// Archive the subtree at `root_path` in the built-in format.
    pub fn build(&self, root_path: &str, encoding: OutputEncoding) -> SdkResult<ArchiveOutput> {
        self.build_with(
            PackArchiveWriter::with_level(self.compression_level),
            root_path,
            encoding,
        )
    }

    /// Archive the subtree at `root_path` through the given writer.
    pub fn build_with<W: ArchiveWriter>(
        &self,
        mut writer: W,
        root_path: &str,
        encoding: OutputEncoding,
    ) -> SdkResult<ArchiveOutput> {
        let root_path = root_path.trim_end_matches(path::SEPARATOR);
        if root_path != self.root && self.store.find_folder(root_path)?.is_none() {
            return Err(NamespaceError::FolderNotFound {
                path: root_path.to_string(),
            }
            .into());
        }

        let subtree = self.subtree.enumerate(root_path)?;
        for file in &subtree.files {
            let Some(entry_path) = path::relative_to(&file.path, root_path) else {
                debug!(path = %file.path, root = root_path, "skipping file outside archive root");
                continue;
            };
            let data = self.versions.read_record(file)?;
            writer.add_entry(entry_path, &data)?;
        }

        let entries = writer.entry_count();
        let bytes = writer.finish()?;
        info!(
            path = root_path,
            entries,
            bytes = bytes.len(),
            %encoding,
            "archive built"
        );
        Ok(ArchiveOutput::encode(bytes, encoding))
    }
}

impl std::fmt::Debug for ArchiveBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveBuilder")
            .field("root", &self.root)
            .field("compression_level", &self.compression_level)
            .finish_non_exhaustive()
    }
}
