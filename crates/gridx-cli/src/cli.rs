//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "gridx",
    version,
    about = "Exchange tabular records with an object store as CSV, XML, JSON, or text",
    long_about = "Exchange tabular records with an object store.\n\n\
                  Each table in the settings file names a bucket, a key, and a message type \
                  (CSV, XML, JSON, or OTHER).\n\
                  Document tables may carry a rule set that reshapes the document on the way \
                  out and on the way in."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags and RUST_LOG).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
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

    /// Allow field values in trace-level logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Export a JSON record-set dump through a table's adapter.
    Export(ExportArgs),

    /// Import a table and print its records.
    Import(ImportArgs),

    /// Print the export and import summary of every table.
    Summary(SummaryArgs),
}

#[derive(Args)]
pub struct ConfigArg {
    /// Settings file (TOML).
    #[arg(long = "config", short = 'c', value_name = "FILE", default_value = "gridx.toml")]
    pub config: PathBuf,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Table section to use.
    #[arg(long = "table", short = 't', value_name = "NAME")]
    pub table: String,

    /// Records to export, as `{"columns": [...], "records": [...]}`.
    #[arg(long = "input", short = 'i', value_name = "FILE")]
    pub input: PathBuf,
}

#[derive(Args)]
pub struct ImportArgs {
    #[command(flatten)]
    pub config: ConfigArg,

    /// Table section to use.
    #[arg(long = "table", short = 't', value_name = "NAME")]
    pub table: String,

    /// Print at most this many rows.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,
}

#[derive(Args)]
pub struct SummaryArgs {
    #[command(flatten)]
    pub config: ConfigArg,
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
