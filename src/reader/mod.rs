//! Tabular reader for delimited text sources.
//!
//! # Overview
//!
//! The reader turns a byte stream into a [`Header`] (the first record) and a
//! lazy sequence of [`Row`]s. Parsing is delegated to the `csv` crate, which
//! handles RFC4180 quoting, doubled-quote escapes, embedded newlines and both
//! CRLF and LF line endings.
//!
//! Records whose field count disagrees with the header, or whose bytes are not
//! valid UTF-8, are skipped. Each skip is recorded as a [`RowDiagnostic`] and
//! the stream continues with the next record.
//!
//! # Example
//!
//! ```
//! use rowdupe::reader::TableReader;
//!
//! let data = "Name,Email\nAlice,a@x.com\nBob\nAlice,a@x.com\n";
//! let mut reader = TableReader::from_reader(data.as_bytes(), b',').unwrap();
//!
//! assert_eq!(reader.header().columns(), ["Name", "Email"]);
//!
//! let rows: Vec<_> = reader.by_ref().collect::<Result<_, _>>().unwrap();
//! assert_eq!(rows.len(), 2);
//! assert_eq!(rows[1].index, 1);
//! assert_eq!(reader.diagnostics().len(), 1);
//! ```

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use csv::{ByteRecord, ReaderBuilder};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Name given to a blank header field, followed by its 0-based position.
pub const UNNAMED_PREFIX: &str = "Unnamed: ";

/// Errors that abort reading a source.
#[derive(Debug, Error)]
pub enum ReadError {
    /// The source file could not be opened.
    #[error("Could not open {path}: {source}")]
    Open {
        /// Path that failed to open
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The source path exists but is not a regular file.
    #[error("Not a file: {0}")]
    NotAFile(PathBuf),

    /// The underlying stream failed mid-read.
    #[error("Could not read input: {0}")]
    Csv(#[from] csv::Error),

    /// A header field is not valid UTF-8.
    #[error("Header column {column} is not valid UTF-8")]
    HeaderEncoding {
        /// 1-based column position
        column: usize,
    },

    /// The header names the same column twice.
    #[error("Duplicate column name in header: '{0}'")]
    DuplicateHeader(String),
}

/// Ordered, distinct column names defining the shape of every row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
}

impl Header {
    /// Build a header, rejecting repeated names.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError::DuplicateHeader`] naming the first repeated column.
    pub fn new(columns: Vec<String>) -> Result<Self, ReadError> {
        let mut seen = HashSet::with_capacity(columns.len());
        for name in &columns {
            if !seen.insert(name.as_str()) {
                return Err(ReadError::DuplicateHeader(name.clone()));
            }
        }
        Ok(Self { columns })
    }

    /// Column names in source order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True for a source with no header record at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Position of a column by exact name.
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }
}

/// One data record.
///
/// Values are stored in header order; `index` is the arrival order after
/// malformed records have been skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    /// 0-based arrival index
    pub index: usize,
    /// Field values, one per header column
    pub values: Vec<String>,
}

impl Row {
    /// Create a row.
    #[must_use]
    pub fn new(index: usize, values: Vec<String>) -> Self {
        Self { index, values }
    }

    /// Value at a header position.
    #[must_use]
    pub fn get(&self, position: usize) -> Option<&str> {
        self.values.get(position).map(String::as_str)
    }

    /// Number of fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// True when the row has no fields.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A record that was skipped during reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowDiagnostic {
    /// 0-based position of the record among all data records in the source
    pub record: usize,
    /// 1-based source line on which the record starts
    pub line: u64,
    /// Why the record was skipped
    pub reason: String,
}

/// Streaming reader over a delimited text source.
///
/// Implements `Iterator<Item = Result<Row, ReadError>>`. The iterator is
/// finite and not restartable; after the first `Err` it yields `None`.
pub struct TableReader<R> {
    inner: csv::Reader<R>,
    header: Header,
    record: ByteRecord,
    records_read: usize,
    next_index: usize,
    diagnostics: Vec<RowDiagnostic>,
    finished: bool,
}

impl TableReader<File> {
    /// Open a file on disk.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] if the path is missing, is a directory, or its
    /// header cannot be decoded.
    pub fn from_path(path: &Path, delimiter: u8) -> Result<Self, ReadError> {
        if path.is_dir() {
            return Err(ReadError::NotAFile(path.to_path_buf()));
        }
        let file = File::open(path).map_err(|source| ReadError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_reader(file, delimiter)
    }
}

impl<R: Read> TableReader<R> {
    /// Wrap any byte source. The header record is read eagerly.
    ///
    /// An empty source yields an empty header and no rows.
    ///
    /// # Errors
    ///
    /// Returns [`ReadError`] if the header cannot be read or decoded.
    pub fn from_reader(source: R, delimiter: u8) -> Result<Self, ReadError> {
        let mut inner = ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let raw = inner.byte_headers()?.clone();
        let mut columns = Vec::with_capacity(raw.len());
        for (i, field) in raw.iter().enumerate() {
            let name = std::str::from_utf8(field)
                .map_err(|_| ReadError::HeaderEncoding { column: i + 1 })?;
            if name.is_empty() {
                columns.push(format!("{UNNAMED_PREFIX}{i}"));
            } else {
                columns.push(name.to_owned());
            }
        }
        let header = Header::new(columns)?;
        log::debug!("Header: {} column(s) {:?}", header.len(), header.columns());

        Ok(Self {
            inner,
            header,
            record: ByteRecord::new(),
            records_read: 0,
            next_index: 0,
            diagnostics: Vec::new(),
            finished: false,
        })
    }

    /// The header record.
    #[must_use]
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Records skipped so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[RowDiagnostic] {
        &self.diagnostics
    }

    /// Consume the reader, keeping only its diagnostics.
    #[must_use]
    pub fn into_diagnostics(self) -> Vec<RowDiagnostic> {
        self.diagnostics
    }

    /// Data records consumed so far, including skipped ones.
    #[must_use]
    pub fn records_read(&self) -> usize {
        self.records_read
    }

    fn skip(&mut self, record: usize, line: u64, reason: String) {
        log::warn!("Skipping record {} (line {}): {}", record, line, reason);
        self.diagnostics.push(RowDiagnostic {
            record,
            line,
            reason,
        });
    }
}

impl<R: Read> Iterator for TableReader<R> {
    type Item = Result<Row, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        loop {
            match self.inner.read_byte_record(&mut self.record) {
                Ok(true) => {}
                Ok(false) => {
                    self.finished = true;
                    return None;
                }
                Err(e) => {
                    self.finished = true;
                    return Some(Err(ReadError::Csv(e)));
                }
            }

            let record = self.records_read;
            self.records_read += 1;
            let line = self.record.position().map_or(0, |p| p.line());

            if self.record.len() != self.header.len() {
                let reason = format!(
                    "expected {} fields, found {}",
                    self.header.len(),
                    self.record.len()
                );
                self.skip(record, line, reason);
                continue;
            }

            match decode_fields(&self.record) {
                Ok(values) => {
                    let index = self.next_index;
                    self.next_index += 1;
                    return Some(Ok(Row::new(index, values)));
                }
                Err(column) => {
                    self.skip(record, line, format!("field {column} is not valid UTF-8"));
                }
            }
        }
    }
}

/// Decode every field, returning the 1-based position of the first bad one.
fn decode_fields(record: &ByteRecord) -> Result<Vec<String>, usize> {
    record
        .iter()
        .enumerate()
        .map(|(i, field)| String::from_utf8(field.to_vec()).map_err(|_| i + 1))
        .collect()
}
