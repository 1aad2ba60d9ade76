//! Command line argument parsing for the redic CLI using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::database::Cursor;
use crate::lexicon::PartOfSpeech;

/// redic - a reverse dictionary
#[derive(Parser, Debug, Clone)]
#[command(name = "redic")]
#[command(about = "Look up definitions, or find the word for a description")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(long_about = None)]
pub struct RedicArgs {
    /// Configuration file (default: ~/.config/redic/config.toml)
    #[arg(long, global = true, env = "REDIC_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, global = true, env = "REDIC_DATABASE", value_name = "FILE")]
    pub database: Option<PathBuf>,

    /// Output format
    #[arg(short = 'o', long = "output", global = true, default_value = "plain")]
    pub output_format: OutputFormat,

    /// More log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Less log output (repeatable)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

impl RedicArgs {
    /// Net verbosity: positive is chattier, negative quieter.
    pub fn verbosity(&self) -> i8 {
        let verbose = i8::try_from(self.verbose).unwrap_or(i8::MAX);
        let quiet = i8::try_from(self.quiet).unwrap_or(i8::MAX);
        verbose.saturating_sub(quiet)
    }
}

/// Available CLI commands
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Create or upgrade the database tables
    Migrate,

    /// Load a directory of YAML source files
    Load(LoadArgs),

    /// Rebuild the full-text search index
    Reindex,

    /// Show the definitions of a word
    Define(DefineArgs),

    /// Find words matching a description
    Search(SearchArgs),

    /// Serve the HTTP API
    Serve(ServeArgs),
}

#[derive(Parser, Debug, Clone)]
pub struct LoadArgs {
    /// Source directory (default: ingestion.source_dir from the config)
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Skip rebuilding the search index afterwards
    #[arg(long)]
    pub no_reindex: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DefineArgs {
    #[arg(value_name = "WORD")]
    pub word: String,

    /// Part of speech: a, s, r, n, v, or a name such as "noun"
    #[arg(short = 'p', long = "pos")]
    pub part_of_speech: Option<PartOfSpeech>,

    /// Match the word exactly instead of trimmed and case-insensitive
    #[arg(long)]
    pub verbatim: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchArgs {
    /// Words describing what you are looking for
    #[arg(value_name = "TERMS", num_args = 0..)]
    pub terms: Vec<String>,

    /// Part of speech: a, s, r, n, v, or a name such as "noun"
    #[arg(short = 'p', long = "pos")]
    pub part_of_speech: Option<PartOfSpeech>,

    /// Continue after this cursor from a previous page
    #[arg(long)]
    pub cursor: Option<Cursor>,

    /// Include definitions flagged explicit
    #[arg(long)]
    pub include_explicit: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ServeArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    Plain,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}
