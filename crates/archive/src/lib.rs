//! Runfiles archive construction
//!
//! This crate turns a [`BinarySpec`](runpack_core::BinarySpec) into a tar
//! archive in two strictly separated phases:
//! - [`EntryResolver`]: reads files concurrently and names them
//! - [`ArchiveAssembler`]: sorts entries by name and writes the tar stream
//!
//! Finished archives are handed to an [`ArchiveSink`] in a single call.
//!
//! ## Determinism
//!
//! The same description over the same file contents and modes produces the
//! same bytes, whatever the worker count or read completion order. The
//! [`ArchiveSummary`] digest makes that easy to check across runs.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod assembler;
pub mod options;
pub mod pipeline;
pub mod reader;
pub mod resolver;
pub mod sink;
pub mod summary;

pub use assembler::{check_layout, ArchiveAssembler};
pub use options::PackOptions;
pub use pipeline::{pack, plan, PackedArchive, PlannedEntry};
pub use reader::{ArchiveMember, ArchiveReader};
pub use resolver::EntryResolver;
pub use sink::{ArchiveSink, FileSink};
pub use summary::{xxh3_hex, ArchiveSummary};
