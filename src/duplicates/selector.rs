//! Column selection against a header.
//!
//! The caller supplies a raw comma-separated list. Entries are trimmed and
//! empty entries dropped. An empty list selects every header column in header
//! order, which turns the check into full-row deduplication.
//!
//! Unknown names are collected in full before failing, so one error reports
//! every bad column at once.

use serde::Serialize;
use thiserror::Error;

use crate::reader::Header;

/// Minimum Jaro-Winkler similarity for a "did you mean" suggestion.
const SUGGESTION_THRESHOLD: f64 = 0.8;

/// One or more selected columns do not exist in the header.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Columns not found: {}", quoted(.unknown))]
pub struct SelectionError {
    /// Unknown names, in the order the caller gave them
    pub unknown: Vec<String>,
    /// Header columns that were available
    pub available: Vec<String>,
    /// Closest header column for each unknown name that has one
    pub suggestions: Vec<Suggestion>,
}

/// A likely intended column for an unknown name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Suggestion {
    /// The name the caller gave
    pub given: String,
    /// The closest header column
    pub closest: String,
}

impl SelectionError {
    /// Human-readable detail line listing available columns and suggestions.
    #[must_use]
    pub fn details(&self) -> String {
        let mut details = format!("Available columns: {}", quoted(&self.available));
        for s in &self.suggestions {
            details.push_str(&format!("; did you mean '{}' for '{}'?", s.closest, s.given));
        }
        details
    }
}

fn quoted(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("'{n}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a raw column list, trimming entries and dropping empty ones.
///
/// # Example
///
/// ```
/// use rowdupe::duplicates::parse_column_list;
///
/// assert_eq!(parse_column_list(" Name , ,Email"), vec!["Name", "Email"]);
/// assert!(parse_column_list("  ").is_empty());
/// ```
#[must_use]
pub fn parse_column_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Selected columns resolved to header positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSelection {
    names: Vec<String>,
    positions: Vec<usize>,
    full_row: bool,
}

impl ColumnSelection {
    /// Resolve a raw comma-separated list against the header.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] naming every column absent from the header.
    pub fn resolve(header: &Header, raw: &str) -> Result<Self, SelectionError> {
        Self::from_names(header, &parse_column_list(raw))
    }

    /// Resolve already-split names against the header.
    ///
    /// Names are used verbatim; an empty slice selects the full row.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError`] naming every column absent from the header.
    pub fn from_names<S: AsRef<str>>(header: &Header, names: &[S]) -> Result<Self, SelectionError> {
        if names.is_empty() {
            return Ok(Self::full_row(header));
        }

        let mut positions = Vec::with_capacity(names.len());
        let mut unknown = Vec::new();
        for name in names {
            match header.position(name.as_ref()) {
                Some(pos) => positions.push(pos),
                None => unknown.push(name.as_ref().to_owned()),
            }
        }

        if !unknown.is_empty() {
            let suggestions = unknown
                .iter()
                .filter_map(|given| suggest(header, given))
                .collect();
            return Err(SelectionError {
                unknown,
                available: header.columns().to_vec(),
                suggestions,
            });
        }

        Ok(Self {
            names: names.iter().map(|n| n.as_ref().to_owned()).collect(),
            positions,
            full_row: false,
        })
    }

    /// Select every header column in header order.
    #[must_use]
    pub fn full_row(header: &Header) -> Self {
        Self {
            names: header.columns().to_vec(),
            positions: (0..header.len()).collect(),
            full_row: true,
        }
    }

    /// Selected names, in key order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Header positions, parallel to [`Self::names`].
    #[must_use]
    pub fn positions(&self) -> &[usize] {
        &self.positions
    }

    /// Whether the selection fell back to the whole row.
    #[must_use]
    pub fn is_full_row(&self) -> bool {
        self.full_row
    }

    /// Number of key components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// True when the key has no components (empty header).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

fn suggest(header: &Header, given: &str) -> Option<Suggestion> {
    header
        .columns()
        .iter()
        .map(|c| (c, strsim::jaro_winkler(given, c)))
        .filter(|(_, score)| *score >= SUGGESTION_THRESHOLD)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(closest, _)| Suggestion {
            given: given.to_owned(),
            closest: closest.clone(),
        })
}
