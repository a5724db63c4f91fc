//! Invocation boundary for running a duplicate check as a job.
//!
//! # Overview
//!
//! A [`JobRunner`] takes a [`JobRequest`] (a source plus the caller's raw
//! column list) and always returns one [`JobResponse`]:
//!
//! 1. **Stage** - uploaded bytes go to a [`NamedTempFile`] owned by the
//!    runner; it is removed when the run ends, on every path
//! 2. **Run** - the engine runs on a worker thread and writes its JSON
//!    document into a buffer
//! 3. **Wait** - the runner waits up to its wall-clock budget; on expiry it
//!    raises the worker's shutdown flag and reports a timeout
//! 4. **Parse** - the buffer is parsed back; anything that is not a valid
//!    success or failure document is itself reported as a failure
//!
//! Nothing is retried. A timed-out or crashed engine is a failure.
//!
//! # Example
//!
//! ```
//! use rowdupe::job::{JobRequest, JobResponse, JobRunner};
//!
//! let runner = JobRunner::with_defaults();
//! let upload = b"Name,Email\nAlice,a@x.com\nAlice,a@x.com\n".to_vec();
//! match runner.run(JobRequest::upload(upload, "Email")) {
//!     JobResponse::Success { duplicates, .. } => assert_eq!(duplicates.len(), 1),
//!     JobResponse::Failure(f) => panic!("{}", f.error),
//! }
//! ```

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;

use crate::duplicates::{DuplicateFinder, FinderConfig};
use crate::error::StructuredError;
use crate::output::json::{write_failure, JsonOutput};
use crate::reader::RowDiagnostic;

/// Default wall-clock budget for one job.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a cancelled worker gets to observe its shutdown flag.
const CANCEL_GRACE: Duration = Duration::from_secs(2);

/// Where the job reads its table from.
#[derive(Debug, Clone)]
pub enum JobSource {
    /// A file the caller owns; the runner only reads it.
    Path(PathBuf),
    /// Uploaded bytes; the runner stages them in a scoped temporary file.
    Bytes(Vec<u8>),
}

/// One duplicate check request.
#[derive(Debug, Clone)]
pub struct JobRequest {
    /// Table source
    pub source: JobSource,
    /// Raw comma-separated column list
    pub columns: String,
}

impl JobRequest {
    /// Request a check of a file on disk.
    #[must_use]
    pub fn path(path: impl Into<PathBuf>, columns: impl Into<String>) -> Self {
        Self {
            source: JobSource::Path(path.into()),
            columns: columns.into(),
        }
    }

    /// Request a check of uploaded bytes.
    #[must_use]
    pub fn upload(bytes: Vec<u8>, columns: impl Into<String>) -> Self {
        Self {
            source: JobSource::Bytes(bytes),
            columns: columns.into(),
        }
    }
}

/// The single structured value a job produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobResponse {
    /// `{"error": ..., "details": ...}`
    Failure(StructuredError),
    /// `{"duplicates": [...], "diagnostics": [...]}`
    Success {
        /// Group objects as emitted by the engine
        duplicates: Vec<Map<String, Value>>,
        /// Skipped rows
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        diagnostics: Vec<RowDiagnostic>,
    },
}

impl JobResponse {
    /// Parse raw engine output.
    ///
    /// Output that is not a success or failure document becomes a failure
    /// carrying the raw text, never a partial success.
    #[must_use]
    pub fn from_engine_output(raw: &[u8]) -> Self {
        match serde_json::from_slice::<JobResponse>(raw) {
            Ok(response) => response,
            Err(e) => {
                log::error!("Unparseable engine output: {}", e);
                Self::failure(
                    "Failed to parse engine output",
                    String::from_utf8_lossy(raw).into_owned(),
                )
            }
        }
    }

    fn failure(error: &str, details: impl Into<String>) -> Self {
        Self::Failure(StructuredError::message(error, details))
    }

    /// True for a success document.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

/// Staged input: either the caller's path or a runner-owned temp file.
enum StagedSource {
    Borrowed(PathBuf),
    Temp(NamedTempFile),
}

impl StagedSource {
    fn stage(source: JobSource) -> std::io::Result<Self> {
        match source {
            JobSource::Path(path) => Ok(Self::Borrowed(path)),
            JobSource::Bytes(bytes) => {
                let mut file = tempfile::Builder::new()
                    .prefix("rowdupe-upload-")
                    .suffix(".csv")
                    .tempfile()?;
                file.write_all(&bytes)?;
                file.flush()?;
                log::debug!("Staged {} byte upload at {}", bytes.len(), file.path().display());
                Ok(Self::Temp(file))
            }
        }
    }

    fn path(&self) -> &Path {
        match self {
            Self::Borrowed(path) => path,
            Self::Temp(file) => file.path(),
        }
    }
}

/// Runs duplicate checks behind a request/response contract.
#[derive(Debug, Clone)]
pub struct JobRunner {
    config: FinderConfig,
    timeout: Duration,
}

impl JobRunner {
    /// Create a runner with a finder configuration and wall-clock budget.
    #[must_use]
    pub fn new(config: FinderConfig, timeout: Duration) -> Self {
        Self { config, timeout }
    }

    /// Runner with default finder settings and [`DEFAULT_TIMEOUT`].
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default(), DEFAULT_TIMEOUT)
    }

    /// The wall-clock budget.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one job to a response.
    ///
    /// Always returns a response; staging, timeout and engine failures are
    /// reported as [`JobResponse::Failure`].
    pub fn run(&self, request: JobRequest) -> JobResponse {
        self.run_with(request, run_engine)
    }

    /// Run a job with the given engine on the worker thread.
    ///
    /// The engine receives the finder configuration (carrying this job's
    /// shutdown flag), the staged path and the raw column list, and returns
    /// the document it would print.
    fn run_with<E>(&self, request: JobRequest, engine: E) -> JobResponse
    where
        E: FnOnce(FinderConfig, &Path, &str) -> Vec<u8> + Send + 'static,
    {
        let staged = match StagedSource::stage(request.source) {
            Ok(staged) => staged,
            Err(e) => return JobResponse::failure("Could not stage upload", e.to_string()),
        };

        let flag = Arc::new(AtomicBool::new(false));
        let config = self.config.clone().with_shutdown_flag(Arc::clone(&flag));
        let path = staged.path().to_path_buf();
        let columns = request.columns;
        let (tx, rx) = mpsc::channel();

        let spawned = thread::Builder::new()
            .name("rowdupe-job".into())
            .spawn(move || {
                let output = engine(config, &path, &columns);
                let _ = tx.send(output);
            });
        let worker = match spawned {
            Ok(handle) => handle,
            Err(e) => return JobResponse::failure("Could not start duplicate check", e.to_string()),
        };

        let (response, stopped) = match rx.recv_timeout(self.timeout) {
            Ok(output) => (JobResponse::from_engine_output(&output), true),
            Err(RecvTimeoutError::Timeout) => {
                log::warn!("Job exceeded {:?}; cancelling", self.timeout);
                flag.store(true, Ordering::SeqCst);
                let stopped = !matches!(
                    rx.recv_timeout(CANCEL_GRACE),
                    Err(RecvTimeoutError::Timeout)
                );
                if !stopped {
                    log::warn!("Worker did not stop within {:?}", CANCEL_GRACE);
                }
                let response = JobResponse::failure(
                    "Duplicate check timed out",
                    format!("No result within {:?}", self.timeout),
                );
                (response, stopped)
            }
            Err(RecvTimeoutError::Disconnected) => {
                let response = JobResponse::failure(
                    "Duplicate check terminated abnormally",
                    "The engine stopped without producing output",
                );
                (response, true)
            }
        };

        // The worker has sent or dropped its sender, so joining is immediate
        if stopped {
            if worker.join().is_err() {
                log::error!("Job worker panicked");
            }
        } else {
            log::warn!("Detaching job worker that is still running");
        }

        drop(staged);
        response
    }
}

/// Run the engine and capture its JSON document.
fn run_engine(config: FinderConfig, path: &Path, columns: &str) -> Vec<u8> {
    let finder = DuplicateFinder::new(config);
    let mut buf = Vec::new();
    let failure = match finder.find_duplicates(path, columns) {
        Ok(report) => match JsonOutput::new(&report).write_to(&mut buf, false) {
            Ok(()) => return buf,
            Err(e) => StructuredError::from_output_error(&e),
        },
        Err(e) => StructuredError::from_finder_error(&e),
    };
    buf.clear();
    if let Err(e) = write_failure(&failure, &mut buf, false) {
        log::error!("Could not write failure document: {}", e);
    }
    buf
}
