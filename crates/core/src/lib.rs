//! Core types for runfiles packaging
//!
//! This crate holds everything that does not touch the filesystem:
//! - [`BinarySpec`]: the decoded description of an executable and its runfiles
//! - [`NamingContext`]: the naming chain that places each file in the archive
//! - [`ArchiveEntry`]: a resolved, immutable archive member
//! - [`PackError`]: the error type shared by all packaging crates

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod entry;
pub mod error;
pub mod naming;
pub mod spec;

pub use entry::ArchiveEntry;
pub use error::{PackError, PackResult};
pub use naming::{
    clean_path, escapes_root, join_path, NamedFile, NamingContext, NamingRule, EXTERNAL_REPO_PREFIX,
    REPO_MAPPING_FILE_NAME, RUNFILES_DIR_SUFFIX,
};
pub use spec::{BinarySpec, File, LabelString, Runfiles};
