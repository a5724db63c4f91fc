//! Human-readable summary for terminals.
//!
//! Colour comes from `yansi`; call `yansi::disable()` (as `--no-color` does)
//! for plain text.

use std::io::Write;

use yansi::Paint;

use crate::duplicates::ScanReport;
use crate::output::OutputError;

/// Rows listed per group before the remainder is elided.
const MAX_ROWS_SHOWN: usize = 10;

/// Text summary formatter.
pub struct TextOutput<'a> {
    report: &'a ScanReport,
}

impl<'a> TextOutput<'a> {
    /// Create a new text formatter.
    #[must_use]
    pub fn new(report: &'a ScanReport) -> Self {
        Self { report }
    }

    /// Write the summary.
    ///
    /// # Errors
    ///
    /// Returns [`OutputError::Io`] if writing fails.
    pub fn write_to<W: Write>(&self, mut w: W) -> Result<(), OutputError> {
        let report = self.report;
        let summary = &report.summary;
        let names = report.selection.names();

        if report.groups.is_empty() {
            writeln!(w, "{}", "No duplicate rows found.".green())?;
        }

        for (idx, group) in report.groups.iter().enumerate() {
            let key = names
                .iter()
                .zip(group.key.values())
                .map(|(n, v)| format!("{n}={v:?}"))
                .collect::<Vec<_>>()
                .join(", ");
            writeln!(
                w,
                "{} {} ({} rows)",
                format!("Group {}", idx + 1).bold().cyan(),
                key,
                group.len()
            )?;
            for row in group.rows.iter().take(MAX_ROWS_SHOWN) {
                writeln!(w, "  row {:>6}: {}", row.index, row.values.join(", "))?;
            }
            if group.len() > MAX_ROWS_SHOWN {
                writeln!(w, "  ... {} more", group.len() - MAX_ROWS_SHOWN)?;
            }
        }

        for diag in &report.diagnostics {
            writeln!(
                w,
                "{} record {} (line {}): {}",
                "skipped".yellow(),
                diag.record,
                diag.line,
                diag.reason
            )?;
        }

        writeln!(
            w,
            "{} rows checked, {} duplicate group(s), {} redundant row(s), {} skipped in {:.2?}",
            summary.rows_scanned,
            summary.duplicate_groups.bold(),
            summary.redundant_rows,
            summary.skipped_rows,
            summary.scan_duration
        )?;
        w.flush()?;
        Ok(())
    }
}
