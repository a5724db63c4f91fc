//! CSV output formatter for duplicate check results.
//!
//! One line is written per member row of every duplicate group.
//!
//! # Columns
//!
//! - `group_id`: 1-based group number, in output order
//! - `first_index`: arrival index of the group's first row
//! - `row_index`: arrival index of this row
//! - then every source header column, in header order

use std::io;

use crate::duplicates::ScanReport;
use crate::output::OutputError;

/// Fixed columns written before the source columns.
const LEADING_COLUMNS: [&str; 3] = ["group_id", "first_index", "row_index"];

/// CSV output formatter.
pub struct CsvOutput<'a> {
    report: &'a ScanReport,
}

impl<'a> CsvOutput<'a> {
    /// Create a new CSV output formatter.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self { report }
    }

    /// Write the CSV output to the given writer.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if writing or serialization fails.
    pub fn write_to<W: io::Write>(&self, writer: W) -> Result<(), OutputError> {
        let mut csv_writer = csv::Writer::from_writer(writer);

        let header = LEADING_COLUMNS
            .iter()
            .copied()
            .chain(self.report.header.columns().iter().map(String::as_str));
        csv_writer.write_record(header)?;

        for (idx, group) in self.report.groups.iter().enumerate() {
            let group_id = (idx + 1).to_string();
            let first_index = group.first_index.to_string();
            for row in &group.rows {
                let row_index = row.index.to_string();
                let record = [group_id.as_str(), first_index.as_str(), row_index.as_str()]
                    .into_iter()
                    .chain(row.values.iter().map(String::as_str));
                csv_writer.write_record(record)?;
            }
        }

        csv_writer.flush()?;
        Ok(())
    }

    /// Render the CSV output as a string.
    ///
    /// # Errors
    ///
    /// Returns `OutputError` if serialization fails.
    pub fn to_csv_string(&self) -> Result<String, OutputError> {
        let mut buf = Vec::new();
        self.write_to(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    }
}
