use crate::error::{ArchiveError, ArchiveResult};
use crate::writer::{CHECKSUM_LEN, HEADER_LEN, MAGIC, VERSION};

/// One decoded archive entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub data: Vec<u8>,
}

/// Decodes and verifies an archive produced by
/// [`PackArchiveWriter`](crate::PackArchiveWriter).
#[derive(Debug)]
pub struct ArchiveReader {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveReader {
    /// Decode an archive, verifying checksum, per-entry CRC and sizes.
    pub fn from_bytes(data: &[u8]) -> ArchiveResult<Self> {
        if data.len() < HEADER_LEN + CHECKSUM_LEN {
            return Err(ArchiveError::CorruptEntry {
                offset: 0,
                reason: "archive data too short".into(),
            });
        }
        if &data[0..4] != MAGIC {
            return Err(ArchiveError::InvalidMagic {
                expected: String::from_utf8_lossy(MAGIC).into(),
                actual: String::from_utf8_lossy(&data[0..4]).into(),
            });
        }
        let version = read_u32(data, 4);
        if version != VERSION {
            return Err(ArchiveError::UnsupportedVersion(version));
        }

        let body_end = data.len() - CHECKSUM_LEN;
        if blake3::hash(&data[..body_end]).as_bytes() != &data[body_end..] {
            return Err(ArchiveError::ChecksumMismatch);
        }

        let count = read_u32(data, 8) as usize;
        let mut cursor = Cursor::new(&data[..body_end], HEADER_LEN);
        let mut entries = Vec::with_capacity(count.min(1024));

        for _ in 0..count {
            let start = cursor.pos;

            let path_len = cursor.varint()?;
            let path = std::str::from_utf8(cursor.take(path_len, "path")?)
                .map_err(|_| corrupt(start, "path is not valid UTF-8"))?
                .to_string();
            let uncompressed_size = cursor.varint()?;
            let compressed_size = cursor.varint()?;
            let expected_crc = cursor.u32()?;
            let compressed = cursor.take(compressed_size, "compressed data")?;

            if crc32fast::hash(compressed) != expected_crc {
                return Err(ArchiveError::CrcMismatch { path });
            }
            let content = zstd::decode_all(compressed)
                .map_err(|e| ArchiveError::DecompressionFailed(e.to_string()))?;
            if content.len() as u64 != uncompressed_size {
                return Err(corrupt(
                    start,
                    &format!(
                        "size mismatch: expected {uncompressed_size}, got {}",
                        content.len()
                    ),
                ));
            }

            entries.push(ArchiveEntry {
                path,
                data: content,
            });
        }

        if !cursor.is_at_end() {
            return Err(corrupt(cursor.pos, "trailing bytes after last entry"));
        }

        Ok(Self { entries })
    }

    /// All entries in archive order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Consume the reader, returning its entries.
    pub fn into_entries(self) -> Vec<ArchiveEntry> {
        self.entries
    }

    /// Content of the entry at `path`.
    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|e| e.path == path)
            .map(|e| e.data.as_slice())
    }

    /// Entry paths in archive order.
    pub fn paths(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.path.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn read_u32(data: &[u8], at: usize) -> u32 {
    u32::from_be_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
}

fn corrupt(offset: usize, reason: &str) -> ArchiveError {
    ArchiveError::CorruptEntry {
        offset: offset as u64,
        reason: reason.to_string(),
    }
}

/// Bounds-checked forward reader over the archive body.
struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(buf: &'a [u8], pos: usize) -> Self {
        Self { buf, pos }
    }

    fn is_at_end(&self) -> bool {
        self.pos == self.buf.len()
    }

    /// Read an LEB128 varint as written by `put_varint`.
    fn varint(&mut self) -> ArchiveResult<u64> {
        let start = self.pos;
        let mut value = 0u64;
        for shift in (0..64).step_by(7) {
            let byte = *self
                .buf
                .get(self.pos)
                .ok_or_else(|| corrupt(start, "truncated varint"))?;
            self.pos += 1;
            value |= u64::from(byte & 0x7F) << shift;
            if byte & 0x80 == 0 {
                return Ok(value);
            }
        }
        Err(corrupt(start, "varint longer than 64 bits"))
    }

    fn u32(&mut self) -> ArchiveResult<u32> {
        let bytes = self.take(4, "entry CRC")?;
        Ok(read_u32(bytes, 0))
    }

    /// The next `len` bytes. `what` names the field in the error.
    fn take(&mut self, len: u64, what: &str) -> ArchiveResult<&'a [u8]> {
        let end = usize::try_from(len)
            .ok()
            .and_then(|len| self.pos.checked_add(len))
            .filter(|end| *end <= self.buf.len())
            .ok_or_else(|| corrupt(self.pos, &format!("{what} extends beyond archive")))?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{ArchiveWriter, PackArchiveWriter};

    fn one_entry() -> Vec<u8> {
        let mut writer = PackArchiveWriter::new();
        writer.add_entry("dir/file.txt", b"content").unwrap();
        writer.finish().unwrap()
    }

    #[test]
    fn bad_magic() {
        let mut data = one_entry();
        data[0..4].copy_from_slice(b"BADM");
        let err = ArchiveReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, ArchiveError::InvalidMagic { .. }));
    }

    #[test]
    fn bad_version() {
        let mut data = one_entry();
        data[4..8].copy_from_slice(&99u32.to_be_bytes());
        let err = ArchiveReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, ArchiveError::UnsupportedVersion(99)));
    }

    #[test]
    fn too_short() {
        let err = ArchiveReader::from_bytes(&[1, 2, 3]).unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptEntry { .. }));
    }

    #[test]
    fn flipped_byte_fails_checksum() {
        let mut data = one_entry();
        let mid = HEADER_LEN + 3;
        data[mid] ^= 0xFF;
        let err = ArchiveReader::from_bytes(&data).unwrap_err();
        assert!(matches!(err, ArchiveError::ChecksumMismatch));
    }

    #[test]
    fn cursor_reads_varints() {
        let mut buf = Vec::new();
        for value in [0u64, 127, 128, 300, u64::MAX] {
            crate::writer::put_varint(&mut buf, value);
        }
        let mut cursor = Cursor::new(&buf, 0);
        for value in [0u64, 127, 128, 300, u64::MAX] {
            assert_eq!(cursor.varint().unwrap(), value);
        }
        assert!(cursor.is_at_end());
    }

    #[test]
    fn cursor_rejects_truncated_input() {
        let err = Cursor::new(&[0x80], 0).varint().unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptEntry { offset: 0, .. }));

        let err = Cursor::new(&[1, 2], 1).take(4, "path").unwrap_err();
        assert!(matches!(err, ArchiveError::CorruptEntry { offset: 1, .. }));

        let overlong = [0xFFu8; 11];
        assert!(Cursor::new(&overlong, 0).varint().is_err());
    }

    #[test]
    fn paths_in_archive_order() {
        let mut writer = PackArchiveWriter::new();
        writer.add_entry("b", b"2").unwrap();
        writer.add_entry("a", b"1").unwrap();
        let reader = ArchiveReader::from_bytes(&writer.finish().unwrap()).unwrap();
        assert_eq!(reader.paths(), vec!["b", "a"]);
        assert!(reader.get("c").is_none());
        let entries = reader.into_entries();
        assert_eq!(entries[1], ArchiveEntry { path: "a".into(), data: b"1".to_vec() });
    }
}
