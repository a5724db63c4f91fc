//! Duplicate finder orchestrating the single-pass pipeline.
//!
//! # Overview
//!
//! 1. **Read** - open the source and read its header
//! 2. **Select** - resolve the caller's columns before any row is read
//! 3. **Index** - stream rows, extract each key and append to its bucket
//! 4. **Assemble** - keep buckets with 2+ rows, ordered by first arrival
//!
//! With `shards > 1` step 3 routes each row to `hash(key) % shards`, the
//! shards are indexed in parallel on rayon and merged before step 4
//! completes. The result is identical to the sequential pass.
//!
//! # Example
//!
//! ```
//! use rowdupe::duplicates::DuplicateFinder;
//!
//! let data = "Name,Email\nAlice,a@x.com\nBob,b@x.com\nAlice,a@x.com\n";
//! let finder = DuplicateFinder::with_defaults();
//! let report = finder.find_duplicates_in_reader(data.as_bytes(), "Name,Email").unwrap();
//!
//! assert_eq!(report.groups.len(), 1);
//! assert_eq!(report.groups[0].indices(), vec![0, 2]);
//! ```

use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;

use crate::duplicates::{
    extract_key, merge_shards, ColumnSelection, CompositeKey, DuplicateGroup, DuplicateIndex,
    GroupingStats, SelectionError,
};
use crate::progress::ProgressCallback;
use crate::reader::{Header, ReadError, Row, RowDiagnostic, TableReader};

/// Rows between progress callbacks.
const PROGRESS_INTERVAL: usize = 1024;

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Field delimiter byte (default `,`).
    pub delimiter: u8,
    /// Number of shards for the parallel pass. 1 runs sequentially.
    pub shards: usize,
    /// Optional shutdown flag for cooperative cancellation.
    pub shutdown_flag: Option<Arc<AtomicBool>>,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("delimiter", &char::from(self.delimiter))
            .field("shards", &self.shards)
            .field("shutdown_flag", &self.shutdown_flag)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            delimiter: b',',
            shards: 1,
            shutdown_flag: None,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the field delimiter.
    #[must_use]
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Set the shard count for the parallel pass.
    #[must_use]
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards.max(1);
        self
    }

    /// Set the shutdown flag for graceful termination.
    #[must_use]
    pub fn with_shutdown_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.shutdown_flag = Some(flag);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_flag
            .as_ref()
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

/// Summary statistics from a duplicate check.
#[derive(Debug, Clone, Default)]
pub struct ScanSummary {
    /// Data records read, including skipped ones
    pub total_records: usize,
    /// Rows that entered the index
    pub rows_scanned: usize,
    /// Records skipped as malformed
    pub skipped_rows: usize,
    /// Distinct composite keys
    pub unique_keys: usize,
    /// Groups with 2+ rows
    pub duplicate_groups: usize,
    /// Rows belonging to some group
    pub duplicate_rows: usize,
    /// Rows beyond the first of each group
    pub redundant_rows: usize,
    /// Shards used for indexing
    pub shards: usize,
    /// Wall time of the whole check
    pub scan_duration: Duration,
}

impl ScanSummary {
    fn from_stats(stats: &GroupingStats, total_records: usize, skipped: usize, shards: usize) -> Self {
        Self {
            total_records,
            rows_scanned: stats.total_rows,
            skipped_rows: skipped,
            unique_keys: stats.unique_keys,
            duplicate_groups: stats.duplicate_groups,
            duplicate_rows: stats.duplicate_rows,
            redundant_rows: stats.redundant_rows,
            shards,
            scan_duration: Duration::ZERO,
        }
    }
}

/// Everything one invocation produces.
#[derive(Debug, Clone)]
pub struct ScanReport {
    /// Header of the source
    pub header: Header,
    /// Resolved key columns
    pub selection: ColumnSelection,
    /// Duplicate groups ordered by first arrival
    pub groups: Vec<DuplicateGroup>,
    /// Records skipped during reading
    pub diagnostics: Vec<RowDiagnostic>,
    /// Counters
    pub summary: ScanSummary,
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// The check was interrupted by a shutdown signal.
    #[error("Duplicate check interrupted")]
    Interrupted,

    /// The source could not be opened or read to completion.
    #[error(transparent)]
    Input(#[from] ReadError),

    /// Selected columns are missing from the header.
    #[error(transparent)]
    Schema(#[from] SelectionError),
}

/// Duplicate finder running the read, select, index and assemble pipeline.
///
/// The finder holds no state between calls; every call is independent.
pub struct DuplicateFinder {
    config: FinderConfig,
}

impl DuplicateFinder {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self { config }
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicate rows in a file.
    ///
    /// The file is only read; its lifecycle stays with the caller.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The file cannot be opened or read
    /// - A selected column is not in the header
    /// - The shutdown flag is raised mid-scan
    pub fn find_duplicates(&self, path: &Path, columns: &str) -> Result<ScanReport, FinderError> {
        log::info!("Checking {} for duplicate rows", path.display());
        let reader = TableReader::from_path(path, self.config.delimiter)?;
        self.scan(reader, columns)
    }

    /// Find duplicate rows in any byte source.
    ///
    /// # Errors
    ///
    /// Same as [`Self::find_duplicates`].
    pub fn find_duplicates_in_reader<R: Read>(
        &self,
        source: R,
        columns: &str,
    ) -> Result<ScanReport, FinderError> {
        let reader = TableReader::from_reader(source, self.config.delimiter)?;
        self.scan(reader, columns)
    }

    fn scan<R: Read>(
        &self,
        mut reader: TableReader<R>,
        columns: &str,
    ) -> Result<ScanReport, FinderError> {
        let start_time = Instant::now();
        let header = reader.header().clone();

        // A source with no header record has no rows either; nothing to validate
        let selection = if header.is_empty() {
            log::info!("Source is empty; no rows to check");
            ColumnSelection::full_row(&header)
        } else {
            // Validate before any row is accumulated
            ColumnSelection::resolve(&header, columns)?
        };
        if selection.is_full_row() {
            log::info!("No columns selected; comparing full rows");
        } else {
            log::info!("Key columns: {:?}", selection.names());
        }

        let shards = self.config.shards.max(1);
        let (groups, stats) = if shards == 1 {
            let mut index = DuplicateIndex::new();
            self.read_rows(&mut reader, &selection, |key, row| index.insert(key, row))?;
            index.into_groups()
        } else {
            let mut routed: Vec<Vec<(CompositeKey, Row)>> = (0..shards).map(|_| Vec::new()).collect();
            self.read_rows(&mut reader, &selection, |key, row| {
                routed[key.shard(shards)].push((key, row));
            })?;
            log::debug!(
                "Routed rows to {} shards: {:?}",
                shards,
                routed.iter().map(Vec::len).collect::<Vec<_>>()
            );
            let parts: Vec<(Vec<DuplicateGroup>, GroupingStats)> = routed
                .into_par_iter()
                .map(|rows| {
                    let mut index = DuplicateIndex::new();
                    for (key, row) in rows {
                        index.insert(key, row);
                    }
                    index.into_groups()
                })
                .collect();
            merge_shards(parts)
        };

        let total_records = reader.records_read();
        let diagnostics = reader.into_diagnostics();
        let mut summary = ScanSummary::from_stats(&stats, total_records, diagnostics.len(), shards);
        summary.scan_duration = start_time.elapsed();

        log::info!(
            "Check complete: {} rows, {} duplicate group(s), {} redundant row(s), {} skipped",
            summary.rows_scanned,
            summary.duplicate_groups,
            summary.redundant_rows,
            summary.skipped_rows
        );

        Ok(ScanReport {
            header,
            selection,
            groups,
            diagnostics,
            summary,
        })
    }

    /// Stream every row through `sink` in arrival order.
    fn read_rows<R: Read>(
        &self,
        reader: &mut TableReader<R>,
        selection: &ColumnSelection,
        mut sink: impl FnMut(CompositeKey, Row),
    ) -> Result<usize, FinderError> {
        let progress = self.config.progress_callback.as_ref();
        if let Some(cb) = progress {
            cb.on_phase_start("reading", 0);
        }

        let mut count = 0usize;
        for row in reader.by_ref() {
            if self.config.is_shutdown_requested() {
                log::warn!("Shutdown requested after {} rows", count);
                if let Some(cb) = progress {
                    cb.on_phase_end("reading");
                }
                return Err(FinderError::Interrupted);
            }

            let row = match row {
                Ok(row) => row,
                Err(e) => {
                    if let Some(cb) = progress {
                        cb.on_phase_end("reading");
                    }
                    return Err(e.into());
                }
            };
            let key = extract_key(&row, selection);
            sink(key, row);

            count += 1;
            if count % PROGRESS_INTERVAL == 0 {
                if let Some(cb) = progress {
                    cb.on_progress(count);
                }
            }
        }

        if let Some(cb) = progress {
            cb.on_progress(count);
            cb.on_phase_end("reading");
        }
        Ok(count)
    }
}
