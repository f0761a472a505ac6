//! Binary description types
//!
//! A [`BinarySpec`] is the already-decoded description a build rule hands to
//! the packager: the executable, its runfiles, an optional repository
//! mapping manifest, and the name the executable takes inside the archive.
//!
//! ## JSON shape
//!
//! ```json
//! {
//!   "workspace_name": "rooty",
//!   "binary_target_executable_file": {"path": "bazel-out/bin/app", "short_path": "app"},
//!   "binary_runfiles": {"files": [
//!     {"path": "data/message.txt", "short_path": "data/message.txt", "label": "//data:msg"}
//!   ]},
//!   "binary_target_outputs": [],
//!   "repo_mapping_manifest": {"path": "bazel-out/bin/app.repo_mapping", "short_path": "_repo_mapping"},
//!   "executable_name_in_archive": "app"
//! }
//! ```

use crate::error::{PackError, PackResult};
use crate::naming::{clean_path, escapes_root};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// Owning label of a file, e.g. `@other//pkg:target`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelString(pub String);

impl LabelString {
    /// Label as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabelString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for LabelString {
    fn from(s: &str) -> Self {
        LabelString(s.to_string())
    }
}

/// A build-system file: where it lives on disk and where it is declared to
/// live relative to the runfiles root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct File {
    /// Whether the file is a tree artifact
    #[serde(default)]
    pub is_directory: bool,
    /// Whether the file is a checked-in source rather than a build output
    #[serde(default)]
    pub is_source: bool,
    /// Path on disk, relative to the execution root or absolute
    pub path: String,
    /// Runfiles-relative path; `../<repo>/...` for other repositories
    pub short_path: String,
    /// Label of the target that owns the file
    #[serde(rename = "label", default)]
    pub owner: LabelString,
}

impl File {
    /// Create a file descriptor with default flags and no owner.
    pub fn new(path: impl Into<String>, short_path: impl Into<String>) -> Self {
        Self {
            is_directory: false,
            is_source: false,
            path: path.into(),
            short_path: short_path.into(),
            owner: LabelString::default(),
        }
    }

    /// Set the owning label.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = LabelString(owner.into());
        self
    }

    /// Source path as a filesystem path.
    pub fn source_path(&self) -> &Path {
        Path::new(&self.path)
    }
}

/// Runfiles of a binary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Runfiles {
    /// Files the binary needs at run time, in no particular order
    #[serde(default)]
    pub files: Vec<File>,
}

/// Description of an executable and everything it needs at run time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinarySpec {
    /// Name of the root workspace (repository)
    pub workspace_name: String,

    /// The executable; runfiles are laid out next to it
    pub binary_target_executable_file: File,

    /// Runtime dependencies of the executable
    #[serde(default)]
    pub binary_runfiles: Runfiles,

    /// All outputs of the executable target. Kept for diagnostics only;
    /// packaging is driven by `binary_runfiles`.
    #[serde(default)]
    pub binary_target_outputs: Vec<File>,

    /// Repository mapping manifest, placed at `<root>/_repo_mapping`
    #[serde(default)]
    pub repo_mapping_manifest: Option<File>,

    /// Name of the executable inside the archive
    pub executable_name_in_archive: String,
}

impl BinarySpec {
    /// Create a description with no runfiles.
    pub fn new(
        workspace_name: impl Into<String>,
        executable: File,
        executable_name_in_archive: impl Into<String>,
    ) -> Self {
        Self {
            workspace_name: workspace_name.into(),
            binary_target_executable_file: executable,
            binary_runfiles: Runfiles::default(),
            binary_target_outputs: Vec::new(),
            repo_mapping_manifest: None,
            executable_name_in_archive: executable_name_in_archive.into(),
        }
    }

    /// Add a runfile.
    pub fn with_runfile(mut self, file: File) -> Self {
        self.binary_runfiles.files.push(file);
        self
    }

    /// Set the repository mapping manifest.
    pub fn with_repo_mapping(mut self, file: File) -> Self {
        self.repo_mapping_manifest = Some(file);
        self
    }

    /// Decode and validate a JSON description.
    pub fn from_json_slice(bytes: &[u8]) -> PackResult<Self> {
        let spec: BinarySpec = serde_json::from_slice(bytes)?;
        spec.validate()?;
        Ok(spec)
    }

    /// Check the description for values no archive can be built from.
    pub fn validate(&self) -> PackResult<()> {
        let name = &self.executable_name_in_archive;
        if name.is_empty() {
            return Err(PackError::InvalidSpec(
                "executable_name_in_archive must not be empty".to_string(),
            ));
        }
        if name.starts_with('/') {
            return Err(PackError::InvalidSpec(format!(
                "executable_name_in_archive must be relative, got {:?}",
                name
            )));
        }
        if clean_path(name) != *name || escapes_root(name) {
            return Err(PackError::InvalidSpec(format!(
                "executable_name_in_archive must be a clean path inside the archive, got {:?}",
                name
            )));
        }
        if self.binary_target_executable_file.path.is_empty() {
            return Err(PackError::InvalidSpec(
                "binary_target_executable_file has an empty path".to_string(),
            ));
        }
        let runfiles = self.binary_runfiles.files.iter();
        for file in runfiles.chain(self.repo_mapping_manifest.iter()) {
            if file.path.is_empty() {
                return Err(PackError::InvalidSpec(format!(
                    "file with short_path {:?} has an empty path",
                    file.short_path
                )));
            }
        }
        Ok(())
    }

    /// Files that become archive entries, in input order.
    ///
    /// Runfiles are deduplicated by source path (first occurrence wins), and
    /// the repository mapping manifest is appended unless it is already one
    /// of the runfiles.
    pub fn resolution_inputs(&self) -> Vec<&File> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut inputs = Vec::with_capacity(self.binary_runfiles.files.len() + 1);
        for file in self
            .binary_runfiles
            .files
            .iter()
            .chain(self.repo_mapping_manifest.iter())
        {
            if seen.insert(file.path.as_str()) {
                inputs.push(file);
            }
        }
        inputs
    }

    /// Number of runfiles dropped by [`BinarySpec::resolution_inputs`] as duplicates.
    pub fn duplicate_runfile_count(&self) -> usize {
        let unique: HashSet<&str> = self
            .binary_runfiles
            .files
            .iter()
            .map(|f| f.path.as_str())
            .collect();
        self.binary_runfiles.files.len() - unique.len()
    }
}
