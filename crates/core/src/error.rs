//! Error types for runfiles packaging.
//!
//! Every failure in the pipeline is fatal for the current run: there is no
//! retry and no partial-success mode. An archive is either produced in full
//! or not at all.
//!
//! ## Taxonomy
//!
//! | Variant | Raised by | Meaning |
//! |---------|-----------|---------|
//! | `Read` | Entry resolver | Source file cannot be opened or read |
//! | `Stat` | Entry resolver | Source file metadata unavailable |
//! | `Emit` | Archive assembler / sink | Writer rejected a header, body, or the finished archive |
//! | `NamingCollision` | Layout check | Two distinct sources map to one archive name, or a file name is another entry's directory |
//! | `EscapingName` | Naming | A short path climbs out of the archive root |
//! | `InvalidSpec` | Description decoding | Description is malformed or incomplete |
//! | `MalformedArchive` | Archive reader | Bytes are not a readable tar stream |

use std::io;
use thiserror::Error;

/// Result type for packaging operations.
pub type PackResult<T> = std::result::Result<T, PackError>;

/// All packaging errors.
#[derive(Debug, Error)]
pub enum PackError {
    /// Source file could not be opened or read
    #[error("error reading {path:?} (short_path = {short_path:?}): {source}")]
    Read {
        /// Source path on disk
        path: String,
        /// Declared runfiles-relative path
        short_path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Source file metadata (mode, size) could not be obtained
    #[error("error reading metadata of {path:?} (short_path = {short_path:?}): {source}")]
    Stat {
        /// Source path on disk
        path: String,
        /// Declared runfiles-relative path
        short_path: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// The archive writer or sink rejected a write
    #[error("error writing {target}: {source}")]
    Emit {
        /// What was being written (entry name or sink description)
        target: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Two distinct source files resolved to the same archive name, or one
    /// file's name is a directory of another file's name
    #[error("archive name collision on {name:?}: {first:?} and {second:?}")]
    NamingCollision {
        /// The contested archive name
        name: String,
        /// Source path of the entry holding the name
        first: String,
        /// Source path of the conflicting entry
        second: String,
    },

    /// A file's archive name points at or above the archive root
    #[error("archive name {name:?} of {path:?} (short_path = {short_path:?}) escapes the archive root")]
    EscapingName {
        /// The offending archive name
        name: String,
        /// Source path on disk
        path: String,
        /// Declared runfiles-relative path
        short_path: String,
    },

    /// The input description is malformed
    #[error("invalid description: {0}")]
    InvalidSpec(String),

    /// An archive being read back could not be parsed
    #[error("malformed archive: {0}")]
    MalformedArchive(String),
}

impl PackError {
    /// Build a read failure for a source file.
    pub fn read(path: impl Into<String>, short_path: impl Into<String>, source: io::Error) -> Self {
        PackError::Read {
            path: path.into(),
            short_path: short_path.into(),
            source,
        }
    }

    /// Build a metadata failure for a source file.
    pub fn stat(path: impl Into<String>, short_path: impl Into<String>, source: io::Error) -> Self {
        PackError::Stat {
            path: path.into(),
            short_path: short_path.into(),
            source,
        }
    }

    /// Build an emit failure for an archive entry or sink.
    pub fn emit(target: impl Into<String>, source: io::Error) -> Self {
        PackError::Emit {
            target: target.into(),
            source,
        }
    }

    /// Build a malformed-archive error.
    pub fn malformed(msg: impl Into<String>) -> Self {
        PackError::MalformedArchive(msg.into())
    }

    /// Check if this is a source read failure.
    pub fn is_read_failure(&self) -> bool {
        matches!(self, PackError::Read { .. })
    }

    /// Check if this is a source metadata failure.
    pub fn is_stat_failure(&self) -> bool {
        matches!(self, PackError::Stat { .. })
    }

    /// Check if the archive writer or sink failed.
    pub fn is_emit_failure(&self) -> bool {
        matches!(self, PackError::Emit { .. })
    }

    /// Check if the error is caused by the input description rather than I/O.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            PackError::InvalidSpec(_)
                | PackError::NamingCollision { .. }
                | PackError::EscapingName { .. }
        )
    }

    /// Source path the error refers to, if any.
    pub fn source_path(&self) -> Option<&str> {
        match self {
            PackError::Read { path, .. }
            | PackError::Stat { path, .. }
            | PackError::EscapingName { path, .. } => Some(path.as_str()),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for PackError {
    fn from(e: serde_json::Error) -> Self {
        PackError::InvalidSpec(e.to_string())
    }
}
