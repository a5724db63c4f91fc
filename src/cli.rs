//! Command-line interface definitions for rowdupe.
//!
//! # Example
//!
//! ```bash
//! # Report rows sharing Name and Email, as JSON
//! rowdupe check people.csv --columns "Name,Email"
//!
//! # Full-row deduplication with a readable summary
//! rowdupe check people.csv --output text
//!
//! # Run through the job boundary with a 30 second budget
//! rowdupe job people.csv -c Email --timeout 30
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Duplicate row detector for delimited text files.
///
/// rowdupe reports groups of rows that share identical values across a chosen
/// set of columns, in the order they first appear.
#[derive(Debug, Parser)]
#[command(name = "rowdupe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// Configuration file (TOML)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check a file for duplicate rows
    Check(CheckArgs),
    /// Run a check through the job boundary and print its response
    Job(JobArgs),
    /// Print the effective configuration as TOML
    Config,
}

/// Arguments for the check subcommand.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Delimited text file to check
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Comma-separated key columns; empty compares whole rows
    #[arg(short, long, value_name = "LIST", default_value = "")]
    pub columns: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub output: OutputFormat,

    /// Field delimiter (a single ASCII character, or "tab")
    #[arg(long, value_name = "CHAR", value_parser = parse_delimiter)]
    pub delimiter: Option<char>,

    /// Shards for the parallel pass (1 = sequential)
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub shards: Option<u64>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Show a progress spinner on stderr
    #[arg(long)]
    pub progress: bool,
}

/// Arguments for the job subcommand.
#[derive(Debug, Args)]
pub struct JobArgs {
    /// Delimited text file to check
    #[arg(value_name = "FILE")]
    pub path: PathBuf,

    /// Comma-separated key columns; empty compares whole rows
    #[arg(short, long, value_name = "LIST", default_value = "")]
    pub columns: String,

    /// Copy the file into a scoped temporary upload before checking
    #[arg(long)]
    pub upload: bool,

    /// Wall-clock budget in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

/// Output format for check results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Structured JSON document
    Json,
    /// One CSV line per duplicate row
    Csv,
    /// Human-readable summary
    Text,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
            OutputFormat::Text => write!(f, "text"),
        }
    }
}

/// Parse a delimiter argument.
///
/// # Examples
///
/// ```
/// use rowdupe::cli::parse_delimiter;
///
/// assert_eq!(parse_delimiter(";").unwrap(), ';');
/// assert_eq!(parse_delimiter("tab").unwrap(), '\t');
/// assert_eq!(parse_delimiter("\\t").unwrap(), '\t');
/// assert!(parse_delimiter("ab").is_err());
/// ```
///
/// # Errors
///
/// Returns an error unless the input is one ASCII character or a tab alias.
pub fn parse_delimiter(s: &str) -> Result<char, String> {
    if s == "tab" || s == "\\t" {
        return Ok('\t');
    }
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii() => Ok(c),
        (Some(c), None) => Err(format!("Delimiter must be ASCII, got '{c}'")),
        _ => Err(format!("Delimiter must be a single character, got '{s}'")),
    }
}
