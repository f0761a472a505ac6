//! # runpack
//!
//! Deterministic runfiles archives for build-system executables.
//!
//! Given the description of an executable and the files it needs at run
//! time, runpack lays the files out the way a runfiles library expects to
//! find them and writes a reproducible tar archive:
//!
//! ```text
//! app
//! app.runfiles/_repo_mapping
//! app.runfiles/<workspace>/<short path>
//! app.runfiles/<other repo>/<path>
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use runpack::prelude::*;
//!
//! let spec = BinarySpec::new("rooty", File::new("bazel-bin/app", "app"), "app")
//!     .with_runfile(File::new("bazel-bin/app", "app"))
//!     .with_runfile(File::new("data/message.txt", "data/message.txt"));
//!
//! let summary = Packager::new().package(&spec, &mut FileSink::new("app.tar"))?;
//! ```
//!
//! ## Pipeline
//!
//! 1. **Resolve** - every runfile is read and named concurrently
//! 2. **Assemble** - entries are sorted by name and written as tar
//! 3. **Sink** - the finished archive is handed over in one write
//!
//! Nothing is written unless every file was resolved.

#![warn(missing_docs)]

mod packager;

pub mod prelude;

// Re-export main entry points
pub use packager::{Packager, PackagerBuilder};

// Re-export errors
pub use runpack_core::{PackError, PackResult};

// Re-export description and naming types
pub use runpack_core::{
    ArchiveEntry, BinarySpec, File, LabelString, NamedFile, NamingContext, NamingRule, Runfiles,
    REPO_MAPPING_FILE_NAME, RUNFILES_DIR_SUFFIX,
};

// Re-export archive types
pub use runpack_archive::{
    xxh3_hex, ArchiveMember, ArchiveReader, ArchiveSink, ArchiveSummary, FileSink, PackOptions,
    PackedArchive, PlannedEntry,
};
