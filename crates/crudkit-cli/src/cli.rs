//! CLI argument definitions for `crudkit`.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use crudkit_model::Scope;

#[derive(Parser)]
#[command(
    name = "crudkit",
    version,
    about = "Inspect crudkit schemas and validate records",
    long_about = "Inspect crudkit schemas and validate records.\n\n\
                  Schemas are TOML (or JSON, by extension) declarations of a\n\
                  domain's fields, groups and actions."
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

    /// Engine settings file (TOML).
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

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
    /// Show form sections, table columns and actions of one scope.
    Inspect(InspectArgs),

    /// Validate a JSON record against a schema.
    Validate(ValidateArgs),
}

#[derive(Parser)]
pub struct InspectArgs {
    /// Schema declaration (.toml or .json).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Scope to resolve.
    #[arg(long = "scope", value_enum, default_value = "index")]
    pub scope: ScopeArg,

    /// Granted permission string (repeatable).
    #[arg(long = "permission", value_name = "PERMISSION")]
    pub permissions: Vec<String>,

    /// Grant every permission the schema declares.
    #[arg(long = "all-permissions", conflicts_with = "permissions")]
    pub all_permissions: bool,

    /// Report format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormatArg,
}

#[derive(Parser)]
pub struct ValidateArgs {
    /// Schema declaration (.toml or .json).
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// JSON file holding one record object.
    #[arg(value_name = "RECORD")]
    pub record: PathBuf,

    /// Scope whose fields are validated.
    #[arg(long = "scope", value_enum, default_value = "add")]
    pub scope: ScopeArg,

    /// Report format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: ReportFormatArg,
}

/// CLI scope choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum ScopeArg {
    Index,
    Add,
    View,
    Edit,
}

impl From<ScopeArg> for Scope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Index => Scope::Index,
            ScopeArg::Add => Scope::Add,
            ScopeArg::View => Scope::View,
            ScopeArg::Edit => Scope::Edit,
        }
    }
}

/// CLI report format choices.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormatArg {
    Table,
    Json,
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
