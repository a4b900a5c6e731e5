//! CLI argument definitions for `fablims`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "fablims",
    version,
    about = "Normalize fabrication-facility records",
    long_about = "Normalize fabrication-facility record trees.\n\n\
                  Computes elemental compositions from chemical formulas and\n\
                  materializes unit- and flag-dependent fields declared by the\n\
                  record-type catalog."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -vvv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Normalize a JSON record tree.
    Normalize(NormalizeArgs),

    /// List the registered record types.
    Types(TypesArgs),

    /// Show the elemental composition of a chemical formula.
    Formula(FormulaArgs),
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// JSON file holding the root record.
    #[arg(value_name = "RECORD")]
    pub input: PathBuf,

    /// Additional TOML declaration files, applied after the built-in catalog.
    #[arg(long = "schemas", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,

    /// Write the normalized tree here instead of stdout.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Exit with status 1 when the pass reports diagnostics.
    #[arg(long = "fail-on-diagnostics")]
    pub fail_on_diagnostics: bool,
}

#[derive(Parser)]
pub struct TypesArgs {
    /// Additional TOML declaration files, applied after the built-in catalog.
    #[arg(long = "schemas", value_name = "FILE")]
    pub schemas: Vec<PathBuf>,
}

#[derive(Parser)]
pub struct FormulaArgs {
    /// Formula such as SiO2 or C12H22O11.
    #[arg(value_name = "FORMULA")]
    pub formula: String,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
