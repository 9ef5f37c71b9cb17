//! CLI argument definitions for the `linkage` binary.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use linkage_batch::AutoMatchStrategy;
use linkage_model::AlgorithmType;

#[derive(Parser)]
#[command(
    name = "linkage",
    version,
    about = "Record linkage - match demographic records across registries",
    long_about = "Score, rank and deduplicate demographic records.\n\n\
                  Records, pools and configurations are read from JSON files.\n\
                  Supports deterministic (weighted) and probabilistic\n\
                  (Fellegi-Sunter) scoring."
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

    /// Log output format (pretty for humans, json for machines).
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
    /// Rank a candidate pool against one source record.
    Search(SearchArgs),

    /// Match every source record against a target pool.
    Batch(BatchArgs),

    /// Find likely duplicates inside one pool.
    Duplicates(DuplicatesArgs),

    /// Print the built-in configurations as JSON.
    Presets,
}

/// Options shared by every scoring command.
#[derive(Args)]
pub struct MatchingArgs {
    /// Matching configuration (JSON). Defaults to the standard preset.
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Use the extended field preset when no config file is given.
    #[arg(long = "extended", conflicts_with = "config")]
    pub extended: bool,

    /// Override the configured scoring algorithm.
    #[arg(long = "algorithm", value_enum)]
    pub algorithm: Option<AlgorithmArg>,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Source record (JSON object).
    #[arg(value_name = "SOURCE")]
    pub source: PathBuf,

    /// Candidate pool (JSON array of records).
    #[arg(value_name = "POOL")]
    pub pool: PathBuf,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Minimum score to list (default: the configured low threshold).
    #[arg(long = "min-score", value_name = "SCORE")]
    pub min_score: Option<f64>,

    /// List at most this many candidates.
    #[arg(long = "limit", value_name = "N")]
    pub limit: Option<usize>,

    /// Skip the deterministic fallback when probabilistic search finds nothing.
    #[arg(long = "no-fallback")]
    pub no_fallback: bool,

    /// Print the outcome as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Args)]
pub struct BatchArgs {
    /// Source records (JSON array).
    #[arg(value_name = "SOURCES")]
    pub sources: PathBuf,

    /// Target pool (JSON array).
    #[arg(value_name = "TARGETS")]
    pub targets: PathBuf,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Batch policy (JSON). Defaults to the built-in policy.
    #[arg(long = "batch-config", value_name = "FILE")]
    pub batch_config: Option<PathBuf>,

    /// Override the auto-match strategy.
    #[arg(long = "strategy", value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Override the chunk size.
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Write the finished job (results and errors) as JSON.
    #[arg(long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Hide the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Args)]
pub struct DuplicatesArgs {
    /// Record pool (JSON array).
    #[arg(value_name = "POOL")]
    pub pool: PathBuf,

    #[command(flatten)]
    pub matching: MatchingArgs,

    /// Pair score at which records are grouped.
    #[arg(long = "threshold", value_name = "SCORE", default_value_t = linkage_match::DEFAULT_DUPLICATE_THRESHOLD)]
    pub threshold: f64,

    /// Print groups as JSON instead of a table.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum AlgorithmArg {
    Deterministic,
    Probabilistic,
}

impl From<AlgorithmArg> for AlgorithmType {
    fn from(arg: AlgorithmArg) -> Self {
        match arg {
            AlgorithmArg::Deterministic => Self::Deterministic,
            AlgorithmArg::Probabilistic => Self::Probabilistic,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StrategyArg {
    HighConfidenceOnly,
    ThresholdBased,
    ManualReviewAll,
    BestMatchOnly,
}

impl From<StrategyArg> for AutoMatchStrategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::HighConfidenceOnly => Self::HighConfidenceOnly,
            StrategyArg::ThresholdBased => Self::ThresholdBased,
            StrategyArg::ManualReviewAll => Self::ManualReviewAll,
            StrategyArg::BestMatchOnly => Self::BestMatchOnly,
        }
    }
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
