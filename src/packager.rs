//! Main packaging entry point.
//!
//! This module provides the `Packager` struct, the primary entry point for
//! turning a binary description into a runfiles archive.

use runpack_archive::{
    pack, plan, ArchiveSink, ArchiveSummary, PackOptions, PackedArchive, PlannedEntry,
};
use runpack_core::{BinarySpec, PackResult};
use tracing::info;

/// Packages executables and their runfiles into deterministic tar archives.
///
/// # Example
///
/// ```ignore
/// use runpack::prelude::*;
///
/// let spec = BinarySpec::from_json_slice(&std::fs::read("spec.json")?)?;
/// let mut sink = FileSink::new("layer.tar");
/// let summary = Packager::new().package(&spec, &mut sink)?;
/// println!("{}", summary);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Packager {
    options: PackOptions,
}

impl Packager {
    /// Create a packager with default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for packager configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let packager = Packager::builder()
    ///     .max_workers(4)
    ///     .build();
    /// ```
    pub fn builder() -> PackagerBuilder {
        PackagerBuilder::new()
    }

    /// Options in effect.
    pub fn options(&self) -> &PackOptions {
        &self.options
    }

    /// Compute the sorted archive layout without reading any file.
    pub fn plan(&self, spec: &BinarySpec) -> PackResult<Vec<PlannedEntry>> {
        plan(spec)
    }

    /// Read every runfile and assemble the archive in memory.
    pub fn assemble(&self, spec: &BinarySpec) -> PackResult<PackedArchive> {
        pack(spec, &self.options)
    }

    /// Assemble the archive and hand it to `sink`.
    ///
    /// The sink is called at most once, and only after the archive has been
    /// fully assembled; any resolution failure leaves the sink untouched.
    pub fn package<S: ArchiveSink + ?Sized>(
        &self,
        spec: &BinarySpec,
        sink: &mut S,
    ) -> PackResult<ArchiveSummary> {
        let packed = self.assemble(spec)?;
        sink.write_archive(packed.bytes())?;
        info!("Archive written: {}", packed.summary());
        Ok(packed.summary().clone())
    }
}

/// Builder for packager configuration.
#[derive(Debug, Clone, Default)]
pub struct PackagerBuilder {
    options: PackOptions,
}

impl PackagerBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit the number of files read concurrently.
    ///
    /// Defaults to the available parallelism. Zero is treated as one.
    pub fn max_workers(mut self, max_workers: usize) -> Self {
        self.options = self.options.with_max_workers(max_workers);
        self
    }

    /// Read files one at a time.
    pub fn sequential(self) -> Self {
        self.max_workers(1)
    }

    /// Build the packager.
    pub fn build(self) -> Packager {
        Packager {
            options: self.options,
        }
    }
}
