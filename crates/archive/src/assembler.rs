//! Archive assembler
//!
//! Orders resolved entries by name and writes them as a tar stream. Sorting
//! is the only thing that makes the output deterministic: entries arrive in
//! whatever order the resolver's workers finished.
//!
//! Every header field that could vary between machines is pinned:
//!
//! | Field | Value |
//! |-------|-------|
//! | format | GNU (long names use the GNU long-name extension) |
//! | type | regular file |
//! | mode | source permission bits |
//! | size | content length |
//! | mtime, uid, gid | 0 |
//! | uname, gname | empty |

use runpack_core::{ArchiveEntry, PackError, PackResult};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::Write;
use tar::{Builder, EntryType, Header};

/// Size of a tar block.
pub const BLOCK_SIZE: u64 = 512;

/// Sorted, collision-free set of entries ready to be written.
#[derive(Debug)]
pub struct ArchiveAssembler {
    entries: Vec<ArchiveEntry>,
}

impl ArchiveAssembler {
    /// Sort `entries` by name and check the layout with [`check_layout`].
    pub fn new(mut entries: Vec<ArchiveEntry>) -> PackResult<Self> {
        entries.sort_by(|a, b| {
            layout_order((a.name(), a.source_path()), (b.name(), b.source_path()))
        });
        check_layout(entries.iter().map(|e| (e.name(), e.source_path())))?;
        Ok(Self { entries })
    }

    /// Entries in emission order.
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total content bytes across all entries.
    pub fn content_bytes(&self) -> u64 {
        self.entries.iter().map(ArchiveEntry::size).sum()
    }

    /// Archive size for names that fit in a single header block.
    pub fn estimated_size(&self) -> u64 {
        let bodies: u64 = self
            .entries
            .iter()
            .map(|e| BLOCK_SIZE + (e.size() + BLOCK_SIZE - 1) / BLOCK_SIZE * BLOCK_SIZE)
            .sum();
        bodies + 2 * BLOCK_SIZE
    }

    /// Write the archive into `writer` and return it.
    ///
    /// Fails with [`PackError::Emit`] naming the entry whose header or body
    /// was rejected.
    pub fn write_to<W: Write>(&self, writer: W) -> PackResult<W> {
        let mut builder = Builder::new(writer);
        for entry in &self.entries {
            let mut header = entry_header(entry);
            builder
                .append_data(&mut header, entry.name(), entry.contents())
                .map_err(|e| PackError::emit(entry.name(), e))?;
        }
        builder
            .into_inner()
            .map_err(|e| PackError::emit("archive trailer", e))
    }

    /// Write the archive into memory.
    pub fn to_bytes(&self) -> PackResult<Vec<u8>> {
        let capacity = usize::try_from(self.estimated_size()).unwrap_or(0);
        self.write_to(Vec::with_capacity(capacity))
    }
}

/// Archive order: name byte-wise, then source path so that the reported
/// collision does not depend on resolution order.
pub(crate) fn layout_order(a: (&str, &str), b: (&str, &str)) -> Ordering {
    a.0.as_bytes()
        .cmp(b.0.as_bytes())
        .then_with(|| a.1.as_bytes().cmp(b.1.as_bytes()))
}

/// Check that a sorted list of `(name, source path)` pairs can be extracted.
///
/// Fails with [`PackError::NamingCollision`] if two entries share a name, or
/// if an entry's name is a leading directory of another entry's name (a
/// regular file `app.runfiles` next to `app.runfiles/ws/data.txt`).
pub fn check_layout<'a, I>(sorted: I) -> PackResult<()>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let sorted: Vec<(&str, &str)> = sorted.into_iter().collect();
    let mut owners: HashMap<&str, &str> = HashMap::with_capacity(sorted.len());

    for &(name, source) in &sorted {
        if let Some(first) = owners.insert(name, source) {
            return Err(collision(name, first, source));
        }
    }

    for &(name, source) in &sorted {
        for (slash, _) in name.match_indices('/') {
            let dir = &name[..slash];
            if let Some(first) = owners.get(dir) {
                return Err(collision(dir, first, source));
            }
        }
    }

    Ok(())
}

fn collision(name: &str, first: &str, second: &str) -> PackError {
    PackError::NamingCollision {
        name: name.to_string(),
        first: first.to_string(),
        second: second.to_string(),
    }
}

fn entry_header(entry: &ArchiveEntry) -> Header {
    let mut header = Header::new_gnu();
    header.set_entry_type(EntryType::Regular);
    header.set_mode(entry.mode());
    header.set_size(entry.size());
    header.set_mtime(0);
    header.set_uid(0);
    header.set_gid(0);
    header
}
