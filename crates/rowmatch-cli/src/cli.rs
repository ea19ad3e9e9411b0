//! CLI argument definitions for the row matcher.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "rowmatch",
    version,
    about = "Fuzzy-match rows between two CSV files",
    long_about = "Match rows of a source CSV against a destination CSV by comparing one\n\
                  column of each with a string similarity score.\n\n\
                  Every pair scoring at or above the threshold is reported with the\n\
                  selected source and destination columns and its similarity."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v info, -vv debug, -vvv trace, -q errors only).
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

    /// Prefix log lines with a timestamp.
    #[arg(long = "log-timestamps", global = true)]
    pub log_timestamps: bool,

    /// Include cell values in log output (they are redacted otherwise).
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Match a source CSV against a destination CSV.
    Match(MatchArgs),

    /// List the available scoring models.
    Models,
}

#[derive(Parser)]
pub struct MatchArgs {
    /// Source CSV file.
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Destination CSV file.
    #[arg(value_name = "DESTINATION")]
    pub destination: PathBuf,

    /// Column of the source file to match on.
    #[arg(long = "source-column", short = 's', value_name = "COLUMN")]
    pub source_column: String,

    /// Column of the destination file to match on.
    #[arg(long = "destination-column", short = 'd', value_name = "COLUMN")]
    pub destination_column: String,

    /// JSON file with a match configuration; flags override its values.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Minimum similarity (0-100) for a pair to be reported [default: 80].
    #[arg(long = "threshold", short = 't', value_name = "SCORE")]
    pub threshold: Option<f64>,

    /// Scoring model: ratio, partial-ratio, token-sort-ratio or levenshtein [default: ratio].
    #[arg(long = "model", short = 'm', value_name = "MODEL")]
    pub model: Option<String>,

    /// Candidates kept per source value [default: 5].
    #[arg(long = "limit", short = 'l', value_name = "N", conflicts_with = "all")]
    pub limit: Option<usize>,

    /// Keep every candidate instead of the best few.
    #[arg(long = "all")]
    pub all: bool,

    /// Source columns to include in the result (comma separated, default all).
    #[arg(long = "source-columns", value_name = "COLUMNS", value_delimiter = ',')]
    pub source_columns: Vec<String>,

    /// Destination columns to include in the result (comma separated, default all).
    #[arg(
        long = "destination-columns",
        value_name = "COLUMNS",
        value_delimiter = ','
    )]
    pub destination_columns: Vec<String>,

    /// Preprocessing applied to values before scoring [default: raw].
    #[arg(long = "processor", value_enum)]
    pub processor: Option<ProcessorArg>,

    /// Report source values without any match as rows with an empty similarity.
    #[arg(long = "emit-unmatched")]
    pub emit_unmatched: bool,

    /// Score source values on all cores.
    #[arg(long = "parallel")]
    pub parallel: bool,

    /// Write results to this file.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Output format (default: from the output extension, else csv).
    #[arg(long = "format", value_enum)]
    pub format: Option<OutputFormatArg>,

    /// Result rows to print in the terminal preview.
    #[arg(long = "preview", value_name = "ROWS", default_value_t = 10)]
    pub preview: usize,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ProcessorArg {
    /// Compare values as they are.
    #[value(alias = "none")]
    Raw,
    /// Lowercase and strip punctuation first.
    #[value(alias = "default")]
    Normalize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormatArg {
    Csv,
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
