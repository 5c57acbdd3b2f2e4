//! CLI argument definitions for the registration URL builder.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "regurl",
    version,
    about = "Build shareable public registration URLs",
    long_about = "Build shareable public registration URLs for programs, courses and \
                  course sessions.\n\n\
                  Reference data is read from a JSON fixture standing in for the \
                  registration backend."
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
    /// Compose the registration URL for a record.
    Url(UrlArgs),

    /// Show the reference data behind each filter control.
    Options(OptionsArgs),
}

/// Where the record and its reference data come from.
#[derive(Args, Clone, Debug)]
pub struct SourceArgs {
    /// JSON fixture with base URL, reference datasets and records.
    #[arg(long = "fixture", value_name = "JSON")]
    pub fixture: PathBuf,

    /// Id of the record the URL is built for.
    #[arg(long = "record-id", value_name = "ID")]
    pub record_id: String,

    /// Object API name of the record (e.g. `TREX1__Course__c`).
    #[arg(long = "object", value_name = "API_NAME")]
    pub object: String,

    /// Builder configuration (TOML). Missing files fall back to defaults.
    #[arg(long = "config", value_name = "TOML")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Clone, Debug, Default)]
pub struct FilterArgs {
    #[arg(long = "location")]
    pub location: Option<String>,

    #[arg(long = "session")]
    pub session: Option<String>,

    /// First day of the date range (YYYY-MM-DD).
    #[arg(long = "start-date", value_name = "DATE")]
    pub start_date: Option<String>,

    /// Last day of the date range (YYYY-MM-DD).
    #[arg(long = "end-date", value_name = "DATE")]
    pub end_date: Option<String>,

    /// Start of the time range (HH:MM or HH:MM:SS).
    #[arg(long = "start-time", value_name = "TIME")]
    pub start_time: Option<String>,

    #[arg(long = "end-time", value_name = "TIME")]
    pub end_time: Option<String>,

    /// Day names, comma separated or repeated.
    #[arg(long = "day-of-week", value_name = "DAY", value_delimiter = ',')]
    pub day_of_week: Vec<String>,

    #[arg(long = "age")]
    pub age: Option<String>,

    /// Course option to preselect (course sessions only).
    #[arg(long = "course-option", value_name = "ID")]
    pub course_option: Option<String>,

    /// Include course options that are not currently available.
    #[arg(long = "show-unavailable")]
    pub show_unavailable: bool,

    #[arg(long = "instructor")]
    pub instructor: Option<String>,

    #[arg(long = "grade")]
    pub grade: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct UrlArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    #[command(flatten)]
    pub filters: FilterArgs,

    /// Open the URL in the default browser.
    #[arg(long = "open")]
    pub open: bool,

    /// Copy the URL to the system clipboard.
    #[arg(long = "copy")]
    pub copy: bool,
}

#[derive(Args, Clone, Debug)]
pub struct OptionsArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Include course options that are not currently available.
    #[arg(long = "show-unavailable")]
    pub show_unavailable: bool,
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
