//! Entry resolver
//!
//! Turns runfile descriptors into [`ArchiveEntry`] values: reads the file,
//! reads its permission bits and names it with the naming chain.
//!
//! ## Concurrency
//!
//! [`EntryResolver::resolve_all`] fans out over a bounded set of scoped
//! threads. Workers claim input indices from a shared cursor and append
//! finished entries to a single mutex-protected vector; the lock is taken
//! once per entry and never held across I/O. The result is unordered; the
//! assembler imposes the final order.
//!
//! After a failure, workers stop claiming new indices while in-flight reads
//! run to completion. Indices are claimed in increasing order, so every
//! index below a failing one has been resolved, and the reported error (the
//! lowest failing index) is the same on every run.

use parking_lot::Mutex;
use runpack_core::{ArchiveEntry, File, NamingContext, PackError, PackResult};
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use tracing::debug;

/// Resolves runfiles into archive entries.
pub struct EntryResolver<'a> {
    naming: NamingContext<'a>,
    max_workers: usize,
}

impl<'a> EntryResolver<'a> {
    /// Create a resolver that uses at most `max_workers` threads.
    pub fn new(naming: NamingContext<'a>, max_workers: usize) -> Self {
        Self {
            naming,
            max_workers: max_workers.max(1),
        }
    }

    /// Naming context used for every entry.
    pub fn naming(&self) -> &NamingContext<'a> {
        &self.naming
    }

    /// Resolve a single file.
    ///
    /// Either every field of the entry is populated or an error is returned.
    pub fn resolve(&self, file: &File) -> PackResult<ArchiveEntry> {
        self.resolve_with(file, |path| fs::read(path), |path| {
            fs::metadata(path).map(|metadata| permission_bits(&metadata))
        })
    }

    /// Resolve `file` with the given content and mode readers.
    fn resolve_with<R, M>(&self, file: &File, read: R, mode_of: M) -> PackResult<ArchiveEntry>
    where
        R: FnOnce(&Path) -> io::Result<Vec<u8>>,
        M: FnOnce(&Path) -> io::Result<u32>,
    {
        let named = self.naming.checked_classify(file)?;
        let contents = read(file.source_path())
            .map_err(|e| PackError::read(&file.path, &file.short_path, e))?;
        let mode = mode_of(file.source_path())
            .map_err(|e| PackError::stat(&file.path, &file.short_path, e))?;

        debug!(
            "Resolved {} -> {} ({} rule, {} bytes, mode {:o})",
            file.path,
            named.name,
            named.rule,
            contents.len(),
            mode
        );

        Ok(ArchiveEntry::new(
            named.name,
            mode,
            contents,
            &file.path,
            &file.short_path,
        ))
    }

    /// Resolve all files concurrently.
    ///
    /// Returns entries in completion order. Fails with the error of the
    /// lowest-indexed failing file if any file fails.
    pub fn resolve_all(&self, files: &[&File]) -> PackResult<Vec<ArchiveEntry>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let workers = self.max_workers.min(files.len());
        let cursor = AtomicUsize::new(0);
        let failed = AtomicBool::new(false);
        let entries = Mutex::new(Vec::with_capacity(files.len()));
        let failures: Mutex<Vec<(usize, PackError)>> = Mutex::new(Vec::new());

        debug!("Resolving {} files with {} workers", files.len(), workers);

        thread::scope(|scope| {
            for _ in 0..workers {
                scope.spawn(|| loop {
                    if failed.load(Ordering::Acquire) {
                        break;
                    }
                    let index = cursor.fetch_add(1, Ordering::AcqRel);
                    let Some(file) = files.get(index) else {
                        break;
                    };
                    match self.resolve(file) {
                        Ok(entry) => entries.lock().push(entry),
                        Err(e) => {
                            failed.store(true, Ordering::Release);
                            failures.lock().push((index, e));
                        }
                    }
                });
            }
        });

        if let Some((_, err)) = failures
            .into_inner()
            .into_iter()
            .min_by_key(|(index, _)| *index)
        {
            return Err(err);
        }

        Ok(entries.into_inner())
    }
}

#[cfg(unix)]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    use std::os::unix::fs::PermissionsExt;
    metadata.permissions().mode() & 0o777
}

#[cfg(not(unix))]
fn permission_bits(metadata: &fs::Metadata) -> u32 {
    if metadata.permissions().readonly() {
        0o444
    } else {
        0o644
    }
}
