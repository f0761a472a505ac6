//! Resolved archive entries

use std::fmt;

/// One file as it will appear in the archive.
///
/// Entries are created once by the resolver and never mutated. The source
/// and short paths are kept for diagnostics only; they are not written to
/// the archive.
#[derive(Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    name: String,
    mode: u32,
    contents: Vec<u8>,
    source_path: String,
    short_path: String,
}

impl ArchiveEntry {
    /// Create an entry.
    pub fn new(
        name: impl Into<String>,
        mode: u32,
        contents: Vec<u8>,
        source_path: impl Into<String>,
        short_path: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            mode,
            contents,
            source_path: source_path.into(),
            short_path: short_path.into(),
        }
    }

    /// Archive-relative name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// POSIX permission bits
    pub fn mode(&self) -> u32 {
        self.mode
    }

    /// Content length in bytes
    pub fn size(&self) -> u64 {
        self.contents.len() as u64
    }

    /// File contents
    pub fn contents(&self) -> &[u8] {
        &self.contents
    }

    /// Path the contents were read from
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    /// Declared runfiles-relative path
    pub fn short_path(&self) -> &str {
        &self.short_path
    }
}

// Contents can be large; print their length instead.
impl fmt::Debug for ArchiveEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveEntry")
            .field("name", &self.name)
            .field("mode", &format_args!("{:#o}", self.mode))
            .field("size", &self.contents.len())
            .field("source_path", &self.source_path)
            .finish()
    }
}
