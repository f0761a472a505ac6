//! Runfiles naming convention
//!
//! Maps every packaged file to its path inside the archive. At run time the
//! runfiles library looks files up under
//! `<executable>.runfiles/<repository>/<path>`, so the archive mirrors that
//! tree:
//!
//! ```text
//! app                                     # the executable itself
//! app.runfiles/
//! ├── _repo_mapping                       # repository mapping manifest
//! ├── rooty/data1_from_rooty/message.txt  # file of the root workspace
//! └── otherrepo/lib.so                    # file of another repository (`../otherrepo/lib.so`)
//! ```
//!
//! The rules are an ordered chain. The first rule that yields a name wins;
//! [`NamingRule::Workspace`] always matches and terminates the chain.

use crate::error::{PackError, PackResult};
use crate::spec::{BinarySpec, File};
use std::fmt;

/// Suffix appended to the executable name to form the runfiles root.
pub const RUNFILES_DIR_SUFFIX: &str = ".runfiles";

/// Reserved name of the repository mapping manifest under the runfiles root.
pub const REPO_MAPPING_FILE_NAME: &str = "_repo_mapping";

/// Short-path prefix of files owned by a repository other than the root one.
pub const EXTERNAL_REPO_PREFIX: &str = "../";

/// A rule of the naming chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NamingRule {
    /// The executable sits at the archive root under its archive name
    Executable,
    /// The repository mapping manifest sits at `<root>/_repo_mapping`
    RepoMapping,
    /// `../<repo>/<path>` sits at `<root>/<repo>/<path>`
    ExternalRepository,
    /// `<path>` sits at `<root>/<workspace>/<path>`
    Workspace,
}

impl NamingRule {
    /// Rules in the order they are tried.
    ///
    /// `Executable` precedes `RepoMapping` so the executable is never moved
    /// into its own runfiles tree, and both precede the short-path rules.
    pub const PRECEDENCE: [NamingRule; 4] = [
        NamingRule::Executable,
        NamingRule::RepoMapping,
        NamingRule::ExternalRepository,
        NamingRule::Workspace,
    ];

    /// Stable lowercase name, used in logs and plans.
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingRule::Executable => "executable",
            NamingRule::RepoMapping => "repo-mapping",
            NamingRule::ExternalRepository => "external",
            NamingRule::Workspace => "workspace",
        }
    }

    /// Whether this rule claims `file`. [`NamingRule::Workspace`] claims
    /// every file.
    fn claims(self, ctx: &NamingContext<'_>, file: &File) -> bool {
        match self {
            NamingRule::Executable => file.path == ctx.executable.path,
            NamingRule::RepoMapping => ctx.repo_mapping.map_or(false, |rm| rm.path == file.path),
            NamingRule::ExternalRepository => file.short_path.starts_with(EXTERNAL_REPO_PREFIX),
            NamingRule::Workspace => true,
        }
    }

    /// Name `file` under this rule.
    fn name(self, ctx: &NamingContext<'_>, file: &File) -> String {
        let root = ctx.runfiles_root.as_str();
        match self {
            NamingRule::Executable => ctx.executable_name.to_string(),
            NamingRule::RepoMapping => join_path(&[root, REPO_MAPPING_FILE_NAME]),
            NamingRule::ExternalRepository => {
                let rest = file
                    .short_path
                    .strip_prefix(EXTERNAL_REPO_PREFIX)
                    .unwrap_or(file.short_path.as_str());
                join_path(&[root, rest])
            }
            NamingRule::Workspace => {
                join_path(&[root, ctx.workspace_name, file.short_path.as_str()])
            }
        }
    }
}

impl fmt::Display for NamingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An archive name together with the rule that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedFile {
    /// Rule that matched
    pub rule: NamingRule,
    /// Archive-relative name
    pub name: String,
}

/// Everything the naming chain needs besides the file itself.
#[derive(Debug, Clone)]
pub struct NamingContext<'a> {
    executable: &'a File,
    executable_name: &'a str,
    workspace_name: &'a str,
    repo_mapping: Option<&'a File>,
    runfiles_root: String,
}

impl<'a> NamingContext<'a> {
    /// Create a naming context.
    pub fn new(
        executable: &'a File,
        executable_name: &'a str,
        workspace_name: &'a str,
        repo_mapping: Option<&'a File>,
    ) -> Self {
        Self {
            executable,
            executable_name,
            workspace_name,
            repo_mapping,
            runfiles_root: format!("{}{}", executable_name, RUNFILES_DIR_SUFFIX),
        }
    }

    /// Create the naming context of a binary description.
    pub fn from_spec(spec: &'a BinarySpec) -> Self {
        Self::new(
            &spec.binary_target_executable_file,
            &spec.executable_name_in_archive,
            &spec.workspace_name,
            spec.repo_mapping_manifest.as_ref(),
        )
    }

    /// `<executable name>.runfiles`
    pub fn runfiles_root(&self) -> &str {
        &self.runfiles_root
    }

    /// Name `file` and report which rule matched.
    pub fn classify(&self, file: &File) -> NamedFile {
        let rule = NamingRule::PRECEDENCE
            .into_iter()
            .find(|rule| rule.claims(self, file))
            .unwrap_or(NamingRule::Workspace);
        NamedFile {
            rule,
            name: rule.name(self, file),
        }
    }

    /// Name `file`, rejecting names that leave the archive root.
    ///
    /// Lexical cleaning lets a short path such as `../../../etc/passwd`
    /// climb above the runfiles root and out of the archive.
    pub fn checked_classify(&self, file: &File) -> PackResult<NamedFile> {
        let named = self.classify(file);
        if escapes_root(&named.name) {
            return Err(PackError::EscapingName {
                name: named.name,
                path: file.path.clone(),
                short_path: file.short_path.clone(),
            });
        }
        Ok(named)
    }

    /// Archive-relative name of `file`.
    pub fn archive_name(&self, file: &File) -> String {
        self.classify(file).name
    }
}

/// Join slash-separated path elements and clean the result lexically.
///
/// Empty elements are ignored. The joined path is normalized: repeated
/// slashes collapse, `.` elements are dropped and `..` removes the preceding
/// element where one exists. Joining only empty elements yields `""`.
pub fn join_path(elements: &[&str]) -> String {
    let parts: Vec<&str> = elements.iter().copied().filter(|e| !e.is_empty()).collect();
    if parts.is_empty() {
        return String::new();
    }
    clean_path(&parts.join("/"))
}

/// Whether a cleaned relative name points at or above the archive root.
pub fn escapes_root(name: &str) -> bool {
    name == "." || name == ".." || name.starts_with("../")
}

/// Lexically normalize a slash-separated path.
pub fn clean_path(path: &str) -> String {
    if path.is_empty() {
        return ".".to_string();
    }
    let rooted = path.starts_with('/');
    let mut out: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if out.last().map_or(false, |last| *last != "..") {
                    out.pop();
                } else if !rooted {
                    out.push("..");
                }
            }
            other => out.push(other),
        }
    }
    let body = out.join("/");
    match (rooted, body.is_empty()) {
        (true, _) => format!("/{}", body),
        (false, true) => ".".to_string(),
        (false, false) => body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exe() -> File {
        File::new("/bin/app", "app")
    }

    fn ctx<'a>(exe: &'a File, rm: Option<&'a File>) -> NamingContext<'a> {
        NamingContext::new(exe, "app", "rooty", rm)
    }

    // ========================================================================
    // Rule chain
    // ========================================================================

    #[test]
    fn test_executable_named_at_archive_root() {
        let exe = exe();
        let named = ctx(&exe, None).classify(&File::new("/bin/app", "app"));
        assert_eq!(named.rule, NamingRule::Executable);
        assert_eq!(named.name, "app");
    }

    #[test]
    fn test_executable_matched_by_source_path_not_short_path() {
        let exe = exe();
        let c = ctx(&exe, None);
        // Same short path, different source: an ordinary workspace file
        assert_eq!(c.archive_name(&File::new("/other/app", "app")), "app.runfiles/rooty/app");
        // Same source, odd short path: still the executable
        assert_eq!(c.archive_name(&File::new("/bin/app", "../x/app")), "app");
    }

    #[test]
    fn test_executable_name_used_verbatim() {
        let exe = exe();
        let c = NamingContext::new(&exe, "usr/bin/server", "ws", None);
        assert_eq!(c.archive_name(&exe), "usr/bin/server");
        assert_eq!(c.runfiles_root(), "usr/bin/server.runfiles");
        assert_eq!(
            c.archive_name(&File::new("/d", "d.txt")),
            "usr/bin/server.runfiles/ws/d.txt"
        );
    }

    #[test]
    fn test_workspace_file() {
        let exe = exe();
        let named = ctx(&exe, None).classify(&File::new(
            "/data/msg.txt",
            "data1_from_rooty/message.txt",
        ));
        assert_eq!(named.rule, NamingRule::Workspace);
        assert_eq!(named.name, "app.runfiles/rooty/data1_from_rooty/message.txt");
    }

    #[test]
    fn test_external_repository_file() {
        let exe = exe();
        let named = ctx(&exe, None).classify(&File::new("/ext/lib.so", "../otherrepo/lib.so"));
        assert_eq!(named.rule, NamingRule::ExternalRepository);
        assert_eq!(named.name, "app.runfiles/otherrepo/lib.so");
    }

    #[test]
    fn test_external_prefix_stripped_once() {
        let exe = exe();
        // The second `../` is cleaned lexically against the runfiles root
        assert_eq!(
            ctx(&exe, None).archive_name(&File::new("/x", "../../x")),
            "x"
        );
    }

    #[test]
    fn test_bare_external_prefix_yields_runfiles_root() {
        let exe = exe();
        assert_eq!(ctx(&exe, None).archive_name(&File::new("/x", "../")), "app.runfiles");
    }

    #[test]
    fn test_dotdot_without_slash_is_workspace_path() {
        let exe = exe();
        assert_eq!(
            ctx(&exe, None).archive_name(&File::new("/x", "..foo/bar")),
            "app.runfiles/rooty/..foo/bar"
        );
    }

    #[test]
    fn test_repo_mapping_ignores_short_path() {
        let exe = exe();
        let rm = File::new("/bin/app.repo_mapping", "whatever");
        let named = ctx(&exe, Some(&rm)).classify(&rm);
        assert_eq!(named.rule, NamingRule::RepoMapping);
        assert_eq!(named.name, "app.runfiles/_repo_mapping");

        let external_looking = File::new("/bin/app.repo_mapping", "../elsewhere/_repo_mapping");
        assert_eq!(
            ctx(&exe, Some(&rm)).archive_name(&external_looking),
            "app.runfiles/_repo_mapping"
        );
    }

    #[test]
    fn test_repo_mapping_absent_falls_through() {
        let exe = exe();
        let file = File::new("/bin/app.repo_mapping", "_repo_mapping");
        assert_eq!(
            ctx(&exe, None).archive_name(&file),
            "app.runfiles/rooty/_repo_mapping"
        );
    }

    #[test]
    fn test_executable_wins_over_repo_mapping() {
        let exe = exe();
        let rm = exe.clone();
        let named = ctx(&exe, Some(&rm)).classify(&exe);
        assert_eq!(named.rule, NamingRule::Executable);
        assert_eq!(named.name, "app");
    }

    #[test]
    fn test_empty_workspace_name() {
        let exe = exe();
        let c = NamingContext::new(&exe, "app", "", None);
        assert_eq!(c.archive_name(&File::new("/d", "d.txt")), "app.runfiles/d.txt");
    }

    #[test]
    fn test_from_spec() {
        let spec = BinarySpec::new("rooty", exe(), "app")
            .with_repo_mapping(File::new("/rm", "whatever"));
        let c = NamingContext::from_spec(&spec);
        assert_eq!(c.archive_name(&File::new("/rm", "x")), "app.runfiles/_repo_mapping");
    }

    #[test]
    fn test_precedence_order() {
        assert_eq!(NamingRule::PRECEDENCE[0], NamingRule::Executable);
        assert_eq!(NamingRule::PRECEDENCE[1], NamingRule::RepoMapping);
        assert_eq!(NamingRule::PRECEDENCE[3], NamingRule::Workspace);
        assert_eq!(NamingRule::ExternalRepository.to_string(), "external");
    }

    #[test]
    fn test_checked_classify_rejects_escaping_names() {
        let exe = exe();
        let c = ctx(&exe, None);
        let err = c
            .checked_classify(&File::new("/src/e", "../../../e"))
            .unwrap_err();
        match &err {
            PackError::EscapingName { name, path, short_path } => {
                assert_eq!(name, "../e");
                assert_eq!(path, "/src/e");
                assert_eq!(short_path, "../../../e");
            }
            other => panic!("unexpected error: {}", other),
        }
        assert!(err.is_input_error());

        // `../../` cleans to the archive root itself
        assert!(c.checked_classify(&File::new("/src/r", "../../")).is_err());
        // Leaving the runfiles root without leaving the archive is allowed
        assert_eq!(c.checked_classify(&File::new("/x", "../../x")).unwrap().name, "x");
    }

    #[test]
    fn test_escapes_root() {
        assert!(escapes_root("."));
        assert!(escapes_root(".."));
        assert!(escapes_root("../a"));
        assert!(!escapes_root("..a"));
        assert!(!escapes_root("a/../b"));
        assert!(!escapes_root("app.runfiles"));
    }

    // ========================================================================
    // Path joining
    // ========================================================================

    #[test]
    fn test_join_path_skips_empty_elements() {
        assert_eq!(join_path(&["a", "", "b"]), "a/b");
        assert_eq!(join_path(&["", ""]), "");
        assert_eq!(join_path(&["a.runfiles", ""]), "a.runfiles");
    }

    #[test]
    fn test_join_path_cleans() {
        assert_eq!(join_path(&["a", "b//c/"]), "a/b/c");
        assert_eq!(join_path(&["a", "./b"]), "a/b");
        assert_eq!(join_path(&["a", "b/../c"]), "a/c");
    }

    #[test]
    fn test_clean_path() {
        assert_eq!(clean_path(""), ".");
        assert_eq!(clean_path("."), ".");
        assert_eq!(clean_path("a/.."), ".");
        assert_eq!(clean_path("../a"), "../a");
        assert_eq!(clean_path("a/../../b"), "../b");
        assert_eq!(clean_path("/../a"), "/a");
        assert_eq!(clean_path("/"), "/");
        assert_eq!(clean_path("//a//b/"), "/a/b");
    }
}
