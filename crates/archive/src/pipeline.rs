//! Packaging pipeline
//!
//! ```text
//! BinarySpec ──resolution_inputs──▶ [&File] ──EntryResolver (parallel)──▶ [ArchiveEntry] (unordered)
//!                                                                             │
//!                        tar bytes ◀──ArchiveAssembler (sorted, single thread)┘
//! ```
//!
//! The two phases never overlap: assembly starts only after every read has
//! finished, and nothing reaches a sink unless both phases succeed.

use crate::assembler::{check_layout, layout_order, ArchiveAssembler};
use crate::options::PackOptions;
use crate::resolver::EntryResolver;
use crate::summary::ArchiveSummary;
use runpack_core::{BinarySpec, NamingContext, NamingRule, PackResult};
use tracing::{debug, info, warn};

/// A fully assembled archive held in memory.
#[derive(Debug, Clone)]
pub struct PackedArchive {
    bytes: Vec<u8>,
    summary: ArchiveSummary,
}

impl PackedArchive {
    /// Tar bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Summary of the archive.
    pub fn summary(&self) -> &ArchiveSummary {
        &self.summary
    }

    /// Take the tar bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

/// Where a file will land, computed without touching the filesystem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Archive-relative name
    pub name: String,
    /// Naming rule that produced the name
    pub rule: NamingRule,
    /// Source path on disk
    pub source_path: String,
    /// Declared runfiles-relative path
    pub short_path: String,
}

/// Compute the sorted archive layout of `spec`.
///
/// Applies the same name and layout checks as [`pack`], so a layout that
/// plans successfully fails to pack only on I/O.
pub fn plan(spec: &BinarySpec) -> PackResult<Vec<PlannedEntry>> {
    spec.validate()?;
    let naming = NamingContext::from_spec(spec);
    let mut planned = spec
        .resolution_inputs()
        .into_iter()
        .map(|file| {
            let named = naming.checked_classify(file)?;
            Ok(PlannedEntry {
                name: named.name,
                rule: named.rule,
                source_path: file.path.clone(),
                short_path: file.short_path.clone(),
            })
        })
        .collect::<PackResult<Vec<PlannedEntry>>>()?;
    planned.sort_by(|a, b| {
        layout_order(
            (a.name.as_str(), a.source_path.as_str()),
            (b.name.as_str(), b.source_path.as_str()),
        )
    });
    check_layout(
        planned
            .iter()
            .map(|p| (p.name.as_str(), p.source_path.as_str())),
    )?;
    Ok(planned)
}

/// Resolve every file of `spec` and assemble the archive in memory.
///
/// Description errors are reported before any file is read.
pub fn pack(spec: &BinarySpec, options: &PackOptions) -> PackResult<PackedArchive> {
    let planned = plan(spec)?;
    debug!("Planned {} archive entries", planned.len());

    let duplicates = spec.duplicate_runfile_count();
    if duplicates > 0 {
        warn!("Ignoring {} duplicate runfiles (same source path)", duplicates);
    }

    let inputs = spec.resolution_inputs();
    let resolver = EntryResolver::new(
        NamingContext::from_spec(spec),
        options.workers_for(inputs.len()),
    );
    let entries = resolver.resolve_all(&inputs)?;

    let assembler = ArchiveAssembler::new(entries)?;
    let bytes = assembler.to_bytes()?;
    let summary = ArchiveSummary::new(&assembler, &bytes);

    info!(
        "Packaged {} for workspace {}: {}",
        spec.executable_name_in_archive, spec.workspace_name, summary
    );

    Ok(PackedArchive { bytes, summary })
}
