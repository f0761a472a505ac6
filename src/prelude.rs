//! Convenient imports for runpack.
//!
//! ```ignore
//! use runpack::prelude::*;
//!
//! let spec = BinarySpec::from_json_slice(&bytes)?;
//! Packager::new().package(&spec, &mut FileSink::new("out.tar"))?;
//! ```

// Main entry point
pub use crate::packager::{Packager, PackagerBuilder};

// Error handling
pub use runpack_core::{PackError, PackResult};

// Description types
pub use runpack_core::{BinarySpec, File, Runfiles};

// Output
pub use runpack_archive::{ArchiveSink, ArchiveSummary, FileSink, PackedArchive, PlannedEntry};
