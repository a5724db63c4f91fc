//! Duplicate row detection.
//!
//! This module provides functionality for:
//! - Column selection against the header
//! - Composite key extraction
//! - Single-pass key indexing and group assembly
//! - Pipeline orchestration, sequential or sharded

pub mod finder;
pub mod groups;
pub mod key;
pub mod selector;

pub use finder::{DuplicateFinder, FinderConfig, FinderError, ScanReport, ScanSummary};
pub use groups::{merge_shards, DuplicateGroup, DuplicateIndex, GroupingStats};
pub use key::{extract_key, CompositeKey};
pub use selector::{parse_column_list, ColumnSelection, SelectionError, Suggestion};
