//! Archive summaries

use crate::assembler::ArchiveAssembler;
use std::fmt;
use xxhash_rust::xxh3::xxh3_64;

/// Compute the XXH3-64 hash of `data` as a 16-digit lowercase hex string.
pub fn xxh3_hex(data: &[u8]) -> String {
    format!("{:016x}", xxh3_64(data))
}

/// What a packaging run produced.
///
/// The digest covers the full archive bytes, so two runs over the same
/// inputs report the same digest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSummary {
    /// Number of archive members
    pub entry_count: usize,
    /// Sum of member content sizes
    pub content_bytes: u64,
    /// Size of the tar stream
    pub archive_bytes: u64,
    /// XXH3-64 of the tar stream, hex encoded
    pub digest: String,
}

impl ArchiveSummary {
    /// Summarize an assembled archive and its bytes.
    pub fn new(assembler: &ArchiveAssembler, archive: &[u8]) -> Self {
        Self {
            entry_count: assembler.len(),
            content_bytes: assembler.content_bytes(),
            archive_bytes: archive.len() as u64,
            digest: xxh3_hex(archive),
        }
    }
}

impl fmt::Display for ArchiveSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} entries, {} content bytes, {} archive bytes, xxh3 {}",
            self.entry_count, self.content_bytes, self.archive_bytes, self.digest
        )
    }
}
