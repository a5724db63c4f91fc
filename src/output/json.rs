//! JSON output formatter for duplicate check results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "Name": "Alice",
//!       "Email": "a@x.com",
//!       "rows": [
//!         { "Name": "Alice", "Email": "a@x.com" },
//!         { "Name": "Alice", "Email": "a@x.com" }
//!       ]
//!     }
//!   ],
//!   "diagnostics": [
//!     { "record": 3, "line": 5, "reason": "expected 2 fields, found 1" }
//!   ]
//! }
//! ```
//!
//! Group objects list the key columns in selection order, then `rows`. Row
//! objects list every header column in header order. `diagnostics` is only
//! present when rows were skipped. Serialization is deterministic, so equal
//! reports produce byte-identical documents.

use std::io::Write;

use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::duplicates::{DuplicateGroup, ScanReport};
use crate::error::StructuredError;
use crate::output::OutputError;
use crate::reader::{Header, Row, RowDiagnostic};

/// Field name holding a group's member rows.
const ROWS_FIELD: &str = "rows";

/// A row rendered as an object in header order.
#[derive(Debug, Clone, Copy)]
pub struct JsonRow<'a> {
    header: &'a Header,
    row: &'a Row,
}

impl Serialize for JsonRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.header.len()))?;
        for (name, value) in self.header.columns().iter().zip(&self.row.values) {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// A duplicate group rendered as its key columns plus its rows.
#[derive(Debug, Clone)]
pub struct JsonDuplicateGroup<'a> {
    key: Vec<(&'a str, &'a str)>,
    rows: Vec<JsonRow<'a>>,
}

impl<'a> JsonDuplicateGroup<'a> {
    /// Pair each distinct selected column with the group's key value.
    ///
    /// A column repeated in the selection appears once. A column named
    /// `rows` is left to the member rows so the group has one `rows` field.
    #[must_use]
    pub fn from_duplicate_group(report: &'a ScanReport, group: &'a DuplicateGroup) -> Self {
        let mut key: Vec<(&'a str, &'a str)> = Vec::with_capacity(group.key.len());
        for (name, value) in report.selection.names().iter().zip(group.key.values()) {
            if name == ROWS_FIELD || key.iter().any(|(n, _)| *n == name) {
                continue;
            }
            key.push((name.as_str(), value.as_str()));
        }
        let rows = group
            .rows
            .iter()
            .map(|row| JsonRow {
                header: &report.header,
                row,
            })
            .collect();
        Self { key, rows }
    }
}

impl Serialize for JsonDuplicateGroup<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.key.len() + 1))?;
        for (name, value) in &self.key {
            map.serialize_entry(name, value)?;
        }
        map.serialize_entry(ROWS_FIELD, &self.rows)?;
        map.end()
    }
}

/// Complete JSON success document.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput<'a> {
    /// One entry per duplicate group, ordered by first arrival
    pub duplicates: Vec<JsonDuplicateGroup<'a>>,
    /// Skipped rows
    #[serde(skip_serializing_if = "no_diagnostics")]
    pub diagnostics: &'a [RowDiagnostic],
}

fn no_diagnostics(diagnostics: &&[RowDiagnostic]) -> bool {
    diagnostics.is_empty()
}

impl<'a> JsonOutput<'a> {
    /// Create the JSON document for a report.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self {
            duplicates: report
                .groups
                .iter()
                .map(|g| JsonDuplicateGroup::from_duplicate_group(report, g))
                .collect(),
            diagnostics: &report.diagnostics,
        }
    }

    /// Serialize to compact JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Json`] if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, OutputError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the document followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError`] if serialization or writing fails.
    pub fn write_to<W: Write>(&self, mut writer: W, pretty: bool) -> Result<(), OutputError> {
        if pretty {
            serde_json::to_writer_pretty(&mut writer, self)?;
        } else {
            serde_json::to_writer(&mut writer, self)?;
        }
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Write a failure document followed by a newline.
///
/// # Errors
///
/// Returns [`OutputError`] if serialization or writing fails.
pub fn write_failure<W: Write>(
    failure: &StructuredError,
    mut writer: W,
    pretty: bool,
) -> Result<(), OutputError> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, failure)?;
    } else {
        serde_json::to_writer(&mut writer, failure)?;
    }
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}
