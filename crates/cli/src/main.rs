//! runpack CLI: package an executable and its runfiles as a tar archive.
//!
//! ```text
//! runpack --spec app.spec.json --output app.tar
//! runpack --spec app.spec.json --dry-run
//! ```
//!
//! Exits 0 on success and 1 on any failure. No output file is created
//! unless the whole archive was assembled.

mod commands;

use std::fs;
use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::ArgMatches;
use runpack::{BinarySpec, FileSink, Packager, PlannedEntry};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::build_cli;

/// Environment variable holding a tracing filter directive.
const LOG_ENV: &str = "RUNPACK_LOG";

fn main() {
    let matches = build_cli().get_matches();

    let level = matches
        .get_one::<String>("log-level")
        .map(|s| s.as_str())
        .unwrap_or("warn");
    init_logging(level);

    match run(&matches) {
        Ok(Outcome::Planned(entries)) => {
            for entry in entries {
                println!("{}\t{}\t{}", entry.name, entry.rule, entry.source_path);
            }
        }
        Ok(Outcome::Written) => {}
        Err(e) => {
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(default_level: &str) {
    let filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// What a successful invocation did.
#[derive(Debug)]
enum Outcome {
    /// `--dry-run`: the layout that would be written
    Planned(Vec<PlannedEntry>),
    /// The archive was written to `--output`
    Written,
}

fn run(matches: &ArgMatches) -> Result<Outcome> {
    let spec_path = matches
        .get_one::<String>("spec")
        .context("must specify valid --spec path")?;
    let spec = load_spec(Path::new(spec_path))?;

    let mut builder = Packager::builder();
    if let Some(jobs) = matches.get_one::<usize>("jobs") {
        builder = builder.max_workers(*jobs);
    }
    let packager = builder.build();

    if matches.get_flag("dry-run") {
        let entries = packager
            .plan(&spec)
            .context("error computing archive layout")?;
        return Ok(Outcome::Planned(entries));
    }

    let output = matches
        .get_one::<String>("output")
        .context("must specify valid --output path")?;
    packager
        .package(&spec, &mut FileSink::new(output))
        .with_context(|| format!("error producing {}", output))?;
    Ok(Outcome::Written)
}

fn load_spec(path: &Path) -> Result<BinarySpec> {
    let bytes = fs::read(path).context("error reading input spec")?;
    let spec = BinarySpec::from_json_slice(&bytes)
        .with_context(|| format!("error parsing spec at {}", path.display()))?;
    debug!(
        "Loaded {} ({} runfiles, workspace {})",
        path.display(),
        spec.binary_runfiles.files.len(),
        spec.workspace_name
    );
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use runpack::ArchiveReader;
    use tempfile::TempDir;

    fn write_workspace(dir: &TempDir) -> String {
        let exe = dir.path().join("app");
        let data = dir.path().join("message.txt");
        fs::write(&exe, b"#!/bin/sh\n").unwrap();
        fs::write(&data, b"hello from rooty\n").unwrap();

        let spec = serde_json::json!({
            "workspace_name": "rooty",
            "binary_target_executable_file": {"path": exe, "short_path": "app"},
            "binary_runfiles": {"files": [
                {"path": exe, "short_path": "app"},
                {"path": data, "short_path": "data1_from_rooty/message.txt"}
            ]},
            "executable_name_in_archive": "app"
        });
        let spec_path = dir.path().join("spec.json");
        fs::write(&spec_path, serde_json::to_vec(&spec).unwrap()).unwrap();
        spec_path.to_string_lossy().into_owned()
    }

    fn matches(args: &[&str]) -> ArgMatches {
        build_cli()
            .try_get_matches_from(std::iter::once("runpack").chain(args.iter().copied()))
            .unwrap()
    }

    #[test]
    fn test_run_writes_archive() {
        let dir = TempDir::new().unwrap();
        let spec = write_workspace(&dir);
        let out = dir.path().join("app.tar");
        let out_str = out.to_string_lossy().into_owned();

        let outcome = run(&matches(&["--spec", &spec, "--output", &out_str, "-j", "2"])).unwrap();
        assert!(matches!(outcome, Outcome::Written));

        let names = ArchiveReader::names(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(
            names,
            vec!["app", "app.runfiles/rooty/data1_from_rooty/message.txt"]
        );
    }

    #[test]
    fn test_run_dry_run_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let spec = write_workspace(&dir);

        let outcome = run(&matches(&["--spec", &spec, "--dry-run"])).unwrap();
        match outcome {
            Outcome::Planned(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].name, "app");
            }
            Outcome::Written => panic!("dry run wrote output"),
        }
        assert!(!dir.path().join("app.tar").exists());
    }

    #[test]
    fn test_run_missing_spec_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.json").to_string_lossy().into_owned();
        let err = run(&matches(&["--spec", &missing, "--dry-run"])).unwrap_err();
        assert!(format!("{:#}", err).contains("error reading input spec"));
    }

    #[test]
    fn test_run_bad_json_names_spec_path() {
        let dir = TempDir::new().unwrap();
        let spec_path = dir.path().join("spec.json");
        fs::write(&spec_path, b"not json").unwrap();
        let spec = spec_path.to_string_lossy().into_owned();

        let err = run(&matches(&["--spec", &spec, "--dry-run"])).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("error parsing spec at"));
        assert!(msg.contains("invalid description"));
    }

    #[test]
    fn test_run_missing_runfile_leaves_no_output() {
        let dir = TempDir::new().unwrap();
        let spec = write_workspace(&dir);
        fs::remove_file(dir.path().join("message.txt")).unwrap();
        let out = dir.path().join("app.tar");
        let out_str = out.to_string_lossy().into_owned();

        let err = run(&matches(&["--spec", &spec, "--output", &out_str])).unwrap_err();
        assert!(format!("{:#}", err).contains("message.txt"));
        assert!(!out.exists());
    }
}
