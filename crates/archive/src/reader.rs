//! Archive reader
//!
//! Reads a packaged archive back into memory. Used to inspect and verify
//! archives; the packaging path never reads tar.

use runpack_core::{PackError, PackResult};
use std::collections::BTreeMap;
use std::io::Read;
use tar::Archive;

/// One member of a packaged archive as read back from tar bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveMember {
    /// Path inside the archive
    pub name: String,
    /// Permission bits from the header
    pub mode: u32,
    /// Member contents
    pub contents: Vec<u8>,
}

/// Reader for packaged archives.
pub struct ArchiveReader;

impl ArchiveReader {
    /// Read every member in archive order.
    pub fn members(data: &[u8]) -> PackResult<Vec<ArchiveMember>> {
        let mut archive = Archive::new(data);
        let mut members = Vec::new();

        for entry in archive
            .entries()
            .map_err(|e| PackError::malformed(e.to_string()))?
        {
            let mut entry = entry.map_err(|e| PackError::malformed(e.to_string()))?;
            let name = entry
                .path()
                .map_err(|e| PackError::malformed(e.to_string()))?
                .to_string_lossy()
                .to_string();
            let mode = entry
                .header()
                .mode()
                .map_err(|e| PackError::malformed(format!("mode of {}: {}", name, e)))?;

            let mut contents = Vec::new();
            entry
                .read_to_end(&mut contents)
                .map_err(|e| PackError::malformed(format!("read {}: {}", name, e)))?;

            members.push(ArchiveMember {
                name,
                mode,
                contents,
            });
        }

        Ok(members)
    }

    /// Names of all members in archive order.
    pub fn names(data: &[u8]) -> PackResult<Vec<String>> {
        Ok(Self::members(data)?.into_iter().map(|m| m.name).collect())
    }

    /// Contents of all members keyed by name.
    pub fn files(data: &[u8]) -> PackResult<BTreeMap<String, Vec<u8>>> {
        Ok(Self::members(data)?
            .into_iter()
            .map(|m| (m.name, m.contents))
            .collect())
    }

    /// Contents of a single member.
    pub fn read_file(data: &[u8], name: &str) -> PackResult<Vec<u8>> {
        Self::members(data)?
            .into_iter()
            .find(|m| m.name == name)
            .map(|m| m.contents)
            .ok_or_else(|| PackError::malformed(format!("no member named {:?}", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::ArchiveAssembler;
    use runpack_core::ArchiveEntry;

    fn sample_archive() -> Vec<u8> {
        ArchiveAssembler::new(vec![
            ArchiveEntry::new("app.runfiles/ws/b.txt", 0o644, b"bee".to_vec(), "/b", "b.txt"),
            ArchiveEntry::new("app", 0o755, b"exe".to_vec(), "/app", "app"),
        ])
        .unwrap()
        .to_bytes()
        .unwrap()
    }

    #[test]
    fn test_members_in_archive_order() {
        let members = ArchiveReader::members(&sample_archive()).unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].name, "app");
        assert_eq!(members[0].mode, 0o755);
        assert_eq!(members[1].contents, b"bee".to_vec());
    }

    #[test]
    fn test_names_and_files() {
        let data = sample_archive();
        assert_eq!(
            ArchiveReader::names(&data).unwrap(),
            vec!["app".to_string(), "app.runfiles/ws/b.txt".to_string()]
        );
        let files = ArchiveReader::files(&data).unwrap();
        assert_eq!(files.get("app").unwrap(), &b"exe".to_vec());
    }

    #[test]
    fn test_read_file_missing_member() {
        let err = ArchiveReader::read_file(&sample_archive(), "nope").unwrap_err();
        assert!(matches!(err, PackError::MalformedArchive(_)));
        assert_eq!(
            ArchiveReader::read_file(&sample_archive(), "app").unwrap(),
            b"exe".to_vec()
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let garbage = vec![0x5a; 700];
        assert!(ArchiveReader::members(&garbage).is_err());
    }
}
