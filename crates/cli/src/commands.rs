//! Command-line definition.

use clap::{value_parser, Arg, ArgAction, Command};

/// Build the clap command.
pub fn build_cli() -> Command {
    Command::new("runpack")
        .about("Package an executable and its runfiles into a deterministic tar archive")
        .arg(
            Arg::new("spec")
                .long("spec")
                .value_name("PATH")
                .required(true)
                .help("Path to the binary description (JSON)"),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .value_name("PATH")
                .required_unless_present("dry-run")
                .help("Path of the .tar to produce"),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Maximum number of files read concurrently [default: available cores]"),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .action(ArgAction::SetTrue)
                .help("Print the archive layout without reading files or writing output"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .value_name("LEVEL")
                .default_value("warn")
                .value_parser(["error", "warn", "info", "debug", "trace"])
                .help("Log level when RUNPACK_LOG is not set"),
        )
}
