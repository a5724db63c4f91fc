//! Output formatters for duplicate check results.
//!
//! - JSON, the structured result document consumed by callers
//! - CSV, one line per member row for spreadsheets
//! - Text, a coloured summary for terminals
//!
//! # Example
//!
//! ```
//! use rowdupe::duplicates::DuplicateFinder;
//! use rowdupe::output::JsonOutput;
//!
//! let data = "A,B\n1,2\n1,3\n";
//! let report = DuplicateFinder::with_defaults()
//!     .find_duplicates_in_reader(data.as_bytes(), "A")
//!     .unwrap();
//!
//! let json = JsonOutput::new(&report).to_json().unwrap();
//! assert_eq!(
//!     json,
//!     r#"{"duplicates":[{"A":"1","rows":[{"A":"1","B":"2"},{"A":"1","B":"3"}]}]}"#
//! );
//! ```

use std::io;

use thiserror::Error;

pub mod csv;
pub mod json;
pub mod text;

pub use self::csv::CsvOutput;
pub use self::json::JsonOutput;
pub use self::text::TextOutput;

/// The computed result could not be serialized or written.
#[derive(Debug, Error)]
pub enum OutputError {
    /// I/O error during writing.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error during JSON serialization.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error during CSV serialization.
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
}
