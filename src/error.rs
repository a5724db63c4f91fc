//! Exit codes and the structured failure document.

use serde::{Deserialize, Serialize};

use crate::duplicates::FinderError;
use crate::output::OutputError;
use crate::reader::ReadError;

/// Exit codes for the rowdupe binary.
///
/// - 0: Success (duplicates found)
/// - 1: General error
/// - 2: No duplicates found
/// - 3: Duplicates found, but some rows were skipped as malformed
/// - 130: Interrupted by user (Ctrl+C)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Check completed and duplicates were found.
    Success = 0,
    /// An error aborted the check.
    GeneralError = 1,
    /// Check completed without finding duplicates.
    NoDuplicates = 2,
    /// Check completed with skipped rows.
    PartialSuccess = 3,
    /// Check was interrupted by user.
    Interrupted = 130,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "RD000",
            Self::GeneralError => "RD001",
            Self::NoDuplicates => "RD002",
            Self::PartialSuccess => "RD003",
            Self::Interrupted => "RD130",
        }
    }

    /// Exit code for a completed check.
    #[must_use]
    pub fn for_result(groups: usize, skipped: usize) -> Self {
        if groups == 0 {
            Self::NoDuplicates
        } else if skipped > 0 {
            Self::PartialSuccess
        } else {
            Self::Success
        }
    }

    /// Exit code for a failed run.
    #[must_use]
    pub fn for_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<FinderError>() {
            Some(FinderError::Interrupted) => Self::Interrupted,
            _ => Self::GeneralError,
        }
    }
}

/// Failure document: `{"error": ..., "details": ..., "available_columns": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredError {
    /// Short human-readable message
    pub error: String,
    /// Diagnostic detail
    #[serde(default)]
    pub details: String,
    /// Header columns, present for unknown-column failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_columns: Option<Vec<String>>,
}

impl StructuredError {
    /// Build a failure document from a message and detail text.
    #[must_use]
    pub fn message(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: details.into(),
            available_columns: None,
        }
    }

    /// Describe a finder failure.
    #[must_use]
    pub fn from_finder_error(err: &FinderError) -> Self {
        match err {
            FinderError::Interrupted => Self::message("Duplicate check interrupted", ""),
            FinderError::Input(e) => {
                let error = match e {
                    ReadError::Open { .. } | ReadError::NotAFile(_) => "Could not open input",
                    ReadError::Csv(_) => "Could not read input",
                    ReadError::HeaderEncoding { .. } | ReadError::DuplicateHeader(_) => {
                        "Invalid header"
                    }
                };
                Self::message(error, e.to_string())
            }
            FinderError::Schema(e) => Self {
                error: e.to_string(),
                details: e.details(),
                available_columns: Some(e.available.clone()),
            },
        }
    }

    /// Describe a serialization failure.
    #[must_use]
    pub fn from_output_error(err: &OutputError) -> Self {
        Self::message("Could not serialize result", err.to_string())
    }

    /// Describe any application error.
    #[must_use]
    pub fn new(err: &anyhow::Error) -> Self {
        if let Some(e) = err.downcast_ref::<FinderError>() {
            Self::from_finder_error(e)
        } else if let Some(e) = err.downcast_ref::<OutputError>() {
            Self::from_output_error(e)
        } else {
            Self::message("Duplicate check failed", format!("{err:#}"))
        }
    }
}
