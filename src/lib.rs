//! rowdupe - Duplicate Row Detector
//!
//! Reports groups of rows in a delimited text file that share identical
//! values across a chosen set of columns, as a JSON document a caller can
//! consume without knowing how the table was read.

pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod job;
pub mod logging;
pub mod output;
pub mod progress;
pub mod reader;
pub mod signal;

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::cli::{CheckArgs, Cli, Commands, JobArgs, OutputFormat};
use crate::config::Config;
use crate::duplicates::DuplicateFinder;
use crate::error::{ExitCode, StructuredError};
use crate::job::{JobRequest, JobResponse, JobRunner};
use crate::output::json::write_failure;
use crate::output::{CsvOutput, JsonOutput, TextOutput};
use crate::progress::Progress;

/// Run the application for parsed CLI arguments, writing results to stdout.
///
/// # Errors
///
/// Returns an error if configuration is invalid or the check fails. In JSON
/// mode the failure document has already been written to stdout.
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    run_with_output(cli, io::stdout().lock())
}

/// Run the application, writing the result document to `out`.
///
/// Logs, progress and the interrupt notice still go to stderr.
///
/// # Arguments
///
/// * `cli` - Parsed command-line arguments
/// * `out` - Destination for the JSON, CSV, text or TOML output
///
/// # Errors
///
/// Same as [`run_app`]. In JSON mode a failed check has already written its
/// failure document to `out` when the error is returned.
///
/// # Example
///
/// ```no_run
/// use clap::Parser;
/// use rowdupe::cli::Cli;
///
/// let cli = Cli::parse_from(["rowdupe", "check", "people.csv", "-c", "Email"]);
/// let mut out = Vec::new();
/// let code = rowdupe::run_with_output(cli, &mut out).unwrap();
/// println!("{} -> {}", code.as_i32(), String::from_utf8_lossy(&out));
/// ```
pub fn run_with_output<W: Write>(cli: Cli, mut out: W) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);
    if cli.no_color {
        yansi::disable();
    }

    let config = Config::load(cli.config.as_deref())?;
    log::debug!("Effective configuration: {:?}", config);

    match cli.command {
        Commands::Check(args) => handle_check(args, config, cli.quiet, out),
        Commands::Job(args) => handle_job(args, config, out),
        Commands::Config => {
            write!(out, "{}", config.to_toml()?)?;
            out.flush()?;
            Ok(ExitCode::Success)
        }
    }
}

fn handle_check<W: Write>(
    args: CheckArgs,
    mut config: Config,
    quiet: bool,
    mut out: W,
) -> Result<ExitCode> {
    if let Some(delimiter) = args.delimiter {
        config.delimiter = delimiter;
    }
    if let Some(shards) = args.shards {
        config.shards = usize::try_from(shards).unwrap_or(usize::MAX);
    }
    config.pretty |= args.pretty;
    config.progress |= args.progress;
    config.validate()?;

    let handler = signal::install_handler()?;
    let mut finder_config = config.finder_config()?.with_shutdown_flag(handler.get_flag());
    if config.progress {
        finder_config = finder_config.with_progress_callback(Arc::new(Progress::new(quiet)));
    }

    let finder = DuplicateFinder::new(finder_config);
    let report = match finder.find_duplicates(&args.path, &args.columns) {
        Ok(report) => report,
        Err(e) => {
            if args.output == OutputFormat::Json {
                let failure = StructuredError::from_finder_error(&e);
                write_failure(&failure, &mut out, config.pretty)?;
            }
            return Err(e.into());
        }
    };

    log::info!(
        "Checked {} rows in {:.2?}: {} duplicate group(s)",
        report.summary.rows_scanned,
        report.summary.scan_duration,
        report.summary.duplicate_groups
    );

    match args.output {
        OutputFormat::Json => JsonOutput::new(&report).write_to(out, config.pretty)?,
        OutputFormat::Csv => CsvOutput::new(&report).write_to(out)?,
        OutputFormat::Text => TextOutput::new(&report).write_to(out)?,
    }

    Ok(ExitCode::for_result(
        report.groups.len(),
        report.diagnostics.len(),
    ))
}

fn handle_job<W: Write>(args: JobArgs, mut config: Config, mut out: W) -> Result<ExitCode> {
    if let Some(timeout) = args.timeout {
        config.job_timeout_secs = timeout;
    }
    let runner = JobRunner::new(config.finder_config()?, config.job_timeout());

    let request = if args.upload {
        let bytes = std::fs::read(&args.path)
            .with_context(|| format!("Failed to read {}", args.path.display()))?;
        JobRequest::upload(bytes, args.columns)
    } else {
        JobRequest::path(args.path, args.columns)
    };

    let response = runner.run(request);
    let code = match &response {
        JobResponse::Success {
            duplicates,
            diagnostics,
        } => ExitCode::for_result(duplicates.len(), diagnostics.len()),
        JobResponse::Failure(f) => {
            log::error!("Job failed: {}", f.error);
            ExitCode::GeneralError
        }
    };

    if config.pretty {
        serde_json::to_writer_pretty(&mut out, &response)?;
    } else {
        serde_json::to_writer(&mut out, &response)?;
    }
    writeln!(out)?;
    out.flush()?;
    Ok(code)
}
