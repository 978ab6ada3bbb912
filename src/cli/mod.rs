pub mod args;
pub mod commands;

pub use args::{CheckArgs, StructureArgs, ValidateArgs};
use crate::core::config::ValidatorConfig;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{name} {version}\n\
{about-with-newline}\n\
USAGE:\n    {usage}\n\
\nOPTIONS:\n{options}\n\
COMMANDS:\n{subcommands}\n";

#[derive(Parser, Debug)]
#[command(name = "ap-validator")]
#[command(version = crate::VERSION)]
#[command(about = "Check OGC EO Application Packages against the CWL best-practice requirements")]
#[command(help_template = HELP_TEMPLATE)]
#[command(
    after_long_help = "Exit status: 0 when the package is compliant, 1 when it is not, 2 when it could not be checked."
)]
pub struct Args {
    /// Config file (default: ./ap-validator.toml when present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    #[command(
        about = "Run every check and print a report",
        long_about = "Validate runs req-7 to req-11, the unsupported-construct scan and, unless skipped, the external structural validator.",
        after_help = "Example:\n    ap-validator validate app-water-bodies.cwl --entry-point water_bodies --format json"
    )]
    Validate(ValidateArgs),
    #[command(
        about = "Run a single rule",
        long_about = "Check runs one requirement rule, or the unsupported-construct scan, and prints its issues.",
        after_help = "Example:\n    ap-validator check req-8 https://example.org/app.cwl"
    )]
    Check(CheckArgs),
    #[command(
        about = "Run only the structural validator",
        long_about = "Structure hands the document to the configured validator (cwltool --validate by default) and relays its output verbatim.",
        after_help = "Example:\n    ap-validator structure app.cwl"
    )]
    Structure(StructureArgs),
}

/// Dispatch a parsed command line. Returns the process exit code.
pub fn run(command: Command, config: &ValidatorConfig) -> crate::Result<i32> {
    match command {
        Command::Validate(validate_args) => commands::validate(validate_args, config),
        Command::Check(check_args) => commands::check(check_args, config),
        Command::Structure(structure_args) => commands::structure(structure_args, config),
    }
}
