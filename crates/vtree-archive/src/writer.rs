use std::collections::BTreeSet;

use crate::error::{ArchiveError, ArchiveResult};

pub(crate) const MAGIC: &[u8; 4] = b"VTAR";
pub(crate) const VERSION: u32 = 1;
pub(crate) const HEADER_LEN: usize = 12;
pub(crate) const CHECKSUM_LEN: usize = 32;

/// Default zstd level.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Encoder for a hierarchical archive.
///
/// Entries are added as (relative path, content) pairs. Intermediate
/// directories are implied by the paths and never added explicitly.
pub trait ArchiveWriter {
    /// Append one file entry.
    fn add_entry(&mut self, path: &str, data: &[u8]) -> ArchiveResult<()>;

    /// Number of entries added so far.
    fn entry_count(&self) -> usize;

    /// Produce the encoded archive.
    fn finish(self) -> ArchiveResult<Vec<u8>>
    where
        Self: Sized;
}

/// Check that `path` is a usable relative entry path.
pub fn validate_entry_path(path: &str) -> ArchiveResult<()> {
    let invalid = |reason: &str| ArchiveError::InvalidEntryPath {
        path: path.to_string(),
        reason: reason.to_string(),
    };
    if path.is_empty() {
        return Err(invalid("path must not be empty"));
    }
    if path.starts_with('/') {
        return Err(invalid("path must be relative"));
    }
    for segment in path.split('/') {
        match segment {
            "" => return Err(invalid("path segments must not be empty")),
            "." | ".." => return Err(invalid("path must not contain '.' or '..' segments")),
            _ => {}
        }
    }
    Ok(())
}

struct PendingEntry {
    path: String,
    uncompressed_len: u64,
    compressed: Vec<u8>,
}

/// Writer for the built-in packed archive format.
///
/// Layout:
/// - header: `VTAR`, version (u32 BE), entry count (u32 BE)
/// - per entry: varint path length, path bytes, varint uncompressed size,
///   varint compressed size, CRC32 of the compressed bytes (u32 BE),
///   zstd-compressed content
/// - trailer: BLAKE3 hash of everything before it
///
/// Content is compressed as each entry is added, so only compressed bytes
/// are held until [`finish`](ArchiveWriter::finish).
pub struct PackArchiveWriter {
    level: i32,
    entries: Vec<PendingEntry>,
    seen: BTreeSet<String>,
}

impl PackArchiveWriter {
    /// Create a writer using the default compression level.
    pub fn new() -> Self {
        Self::with_level(DEFAULT_COMPRESSION_LEVEL)
    }

    /// Create a writer using a specific zstd compression level.
    pub fn with_level(level: i32) -> Self {
        Self {
            level,
            entries: Vec::new(),
            seen: BTreeSet::new(),
        }
    }

    /// Returns true if no entries were added.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PackArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter for PackArchiveWriter {
    fn add_entry(&mut self, path: &str, data: &[u8]) -> ArchiveResult<()> {
        validate_entry_path(path)?;
        if !self.seen.insert(path.to_string()) {
            return Err(ArchiveError::DuplicateEntry(path.to_string()));
        }
        let compressed = zstd::encode_all(data, self.level)
            .map_err(|e| ArchiveError::CompressionFailed(e.to_string()))?;
        self.entries.push(PendingEntry {
            path: path.to_string(),
            uncompressed_len: data.len() as u64,
            compressed,
        });
        Ok(())
    }

    fn entry_count(&self) -> usize {
        self.entries.len()
    }

    fn finish(self) -> ArchiveResult<Vec<u8>> {
        let count = u32::try_from(self.entries.len()).map_err(|_| ArchiveError::CorruptEntry {
            offset: 0,
            reason: "too many entries".into(),
        })?;

        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.extend_from_slice(&VERSION.to_be_bytes());
        out.extend_from_slice(&count.to_be_bytes());

        for entry in &self.entries {
            put_varint(&mut out, entry.path.len() as u64);
            out.extend_from_slice(entry.path.as_bytes());
            put_varint(&mut out, entry.uncompressed_len);
            put_varint(&mut out, entry.compressed.len() as u64);
            out.extend_from_slice(&crc32fast::hash(&entry.compressed).to_be_bytes());
            out.extend_from_slice(&entry.compressed);
        }

        let checksum = *blake3::hash(&out).as_bytes();
        out.extend_from_slice(&checksum);
        Ok(out)
    }
}

/// Append `value` as an LEB128 varint: seven bits per byte, low bits
/// first, high bit set on every byte but the last.
pub(crate) fn put_varint(out: &mut Vec<u8>, value: u64) {
    let mut rest = value;
    while rest >= 0x80 {
        out.push((rest as u8 & 0x7F) | 0x80);
        rest >>= 7;
    }
    out.push(rest as u8);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn varint_layout() {
        let mut buf = Vec::new();
        put_varint(&mut buf, 0);
        put_varint(&mut buf, 127);
        put_varint(&mut buf, 300);
        assert_eq!(buf, vec![0x00, 0x7F, 0xAC, 0x02]);

        let mut max = Vec::new();
        put_varint(&mut max, u64::MAX);
        assert_eq!(max.len(), 10);
        assert_eq!(max[9], 0x01);
    }

    #[test]
    fn entry_paths_are_validated() {
        for bad in ["", "/abs", "a//b", "a/../b", "./a", "a/"] {
            assert!(
                matches!(validate_entry_path(bad), Err(ArchiveError::InvalidEntryPath { .. })),
                "{bad:?} should be rejected"
            );
        }
        assert!(validate_entry_path("a/b/c.txt").is_ok());
    }

    #[test]
    fn duplicate_entries_rejected() {
        let mut writer = PackArchiveWriter::new();
        writer.add_entry("a.txt", b"1").unwrap();
        let err = writer.add_entry("a.txt", b"2").unwrap_err();
        assert!(matches!(err, ArchiveError::DuplicateEntry(p) if p == "a.txt"));
        assert_eq!(writer.entry_count(), 1);
    }

    #[test]
    fn header_layout() {
        let mut writer = PackArchiveWriter::with_level(1);
        writer.add_entry("a", b"x").unwrap();
        let bytes = writer.finish().unwrap();
        assert_eq!(&bytes[0..4], MAGIC);
        assert_eq!(u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]), VERSION);
        assert_eq!(u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]), 1);
    }
}
