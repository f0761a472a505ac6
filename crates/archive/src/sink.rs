//! Archive sinks
//!
//! A sink receives the finished archive in one call. Archives are always
//! buffered in memory first, so a failed run never reaches the sink.

use runpack_core::{PackError, PackResult};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Destination for a finished archive.
pub trait ArchiveSink {
    /// Store the complete archive.
    ///
    /// Fails with [`PackError::Emit`] if the destination rejects the write.
    fn write_archive(&mut self, archive: &[u8]) -> PackResult<()>;
}

/// In-memory sink; the archive replaces any previous contents.
impl ArchiveSink for Vec<u8> {
    fn write_archive(&mut self, archive: &[u8]) -> PackResult<()> {
        self.clear();
        self.extend_from_slice(archive);
        Ok(())
    }
}

/// Sink that writes an archive file atomically.
///
/// The archive is written to a temporary file next to the destination and
/// renamed into place, so readers see either the old file, no file, or the
/// complete archive.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    /// Create a sink for `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Destination path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl ArchiveSink for FileSink {
    fn write_archive(&mut self, archive: &[u8]) -> PackResult<()> {
        let target = self.path.display().to_string();
        let dir = self.parent_dir();

        let mut tmp = NamedTempFile::new_in(dir).map_err(|e| PackError::emit(&target, e))?;
        tmp.write_all(archive)
            .map_err(|e| PackError::emit(&target, e))?;
        tmp.as_file()
            .sync_all()
            .map_err(|e| PackError::emit(&target, e))?;

        // Temp files are created 0600; archives are ordinary build outputs.
        set_output_permissions(tmp.path()).map_err(|e| PackError::emit(&target, e))?;

        tmp.persist(&self.path)
            .map_err(|e| PackError::emit(&target, e.error))?;

        debug!("Wrote {} bytes to {}", archive.len(), target);
        Ok(())
    }
}

#[cfg(unix)]
fn set_output_permissions(path: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn set_output_permissions(_path: &Path) -> std::io::Result<()> {
    Ok(())
}
