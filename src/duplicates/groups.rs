//! Duplicate index and group assembly.
//!
//! # Overview
//!
//! [`DuplicateIndex`] accumulates rows by [`CompositeKey`] in a single
//! forward pass. Buckets are kept in the order their key was first seen, so
//! assembling the result is a filter over buckets: any bucket holding two or
//! more rows becomes a [`DuplicateGroup`], and the groups come out ordered by
//! the arrival index of their first row.
//!
//! # Example
//!
//! ```
//! use rowdupe::duplicates::{CompositeKey, DuplicateIndex};
//! use rowdupe::reader::Row;
//!
//! let mut index = DuplicateIndex::new();
//! for (i, v) in ["a", "b", "a"].iter().enumerate() {
//!     let key = CompositeKey::new(vec![(*v).to_owned()]);
//!     index.insert(key, Row::new(i, vec![(*v).to_owned()]));
//! }
//!
//! let (groups, stats) = index.into_groups();
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].first_index, 0);
//! assert_eq!(stats.unique_keys, 2);
//! ```

use std::collections::HashMap;

use crate::duplicates::CompositeKey;
use crate::reader::Row;

/// Rows sharing one composite key, reported only with two or more members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateGroup {
    /// The shared key
    pub key: CompositeKey,
    /// Member rows in arrival order
    pub rows: Vec<Row>,
    /// Arrival index of `rows[0]`
    pub first_index: usize,
}

impl DuplicateGroup {
    /// Number of rows in this group.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Check if this group is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows beyond the first occurrence.
    #[must_use]
    pub fn duplicate_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Arrival indices of the member rows.
    #[must_use]
    pub fn indices(&self) -> Vec<usize> {
        self.rows.iter().map(|r| r.index).collect()
    }
}

/// Statistics from grouping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupingStats {
    /// Rows inserted into the index
    pub total_rows: usize,
    /// Distinct composite keys seen
    pub unique_keys: usize,
    /// Number of groups with 2+ rows
    pub duplicate_groups: usize,
    /// Rows belonging to some duplicate group
    pub duplicate_rows: usize,
    /// Rows beyond the first of each group
    pub redundant_rows: usize,
}

impl GroupingStats {
    /// Fold another shard's statistics into this one.
    pub fn merge(&mut self, other: &GroupingStats) {
        self.total_rows += other.total_rows;
        self.unique_keys += other.unique_keys;
        self.duplicate_groups += other.duplicate_groups;
        self.duplicate_rows += other.duplicate_rows;
        self.redundant_rows += other.redundant_rows;
    }

    /// Percentage of rows that are redundant copies.
    #[must_use]
    pub fn redundancy_rate(&self) -> f64 {
        if self.total_rows == 0 {
            0.0
        } else {
            (self.redundant_rows as f64 / self.total_rows as f64) * 100.0
        }
    }
}

#[derive(Debug)]
struct Bucket {
    key: CompositeKey,
    rows: Vec<Row>,
}

/// Single-pass accumulator from key to rows.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    slots: HashMap<CompositeKey, usize>,
    buckets: Vec<Bucket>,
    rows: usize,
}

impl DuplicateIndex {
    /// Create an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a row to its key's bucket, opening the bucket on first sight.
    ///
    /// Rows must be inserted in arrival order.
    pub fn insert(&mut self, key: CompositeKey, row: Row) {
        self.rows += 1;
        match self.slots.get(&key) {
            Some(&slot) => {
                let bucket = &mut self.buckets[slot];
                debug_assert!(bucket.rows.last().is_none_or(|r| r.index < row.index));
                bucket.rows.push(row);
            }
            None => {
                self.slots.insert(key.clone(), self.buckets.len());
                self.buckets.push(Bucket {
                    key,
                    rows: vec![row],
                });
            }
        }
    }

    /// Rows inserted so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows
    }

    /// True before the first insert.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    /// Distinct keys seen so far.
    #[must_use]
    pub fn unique_keys(&self) -> usize {
        self.buckets.len()
    }

    /// Finalize: keep buckets with 2+ rows, ordered by first arrival.
    #[must_use]
    pub fn into_groups(self) -> (Vec<DuplicateGroup>, GroupingStats) {
        let mut stats = GroupingStats {
            total_rows: self.rows,
            unique_keys: self.buckets.len(),
            ..GroupingStats::default()
        };

        let groups: Vec<DuplicateGroup> = self
            .buckets
            .into_iter()
            .filter(|bucket| {
                if bucket.rows.len() < 2 {
                    return false;
                }
                log::trace!(
                    "Key {:?}: {} rows {:?}",
                    bucket.key.values(),
                    bucket.rows.len(),
                    bucket.rows.iter().map(|r| r.index).collect::<Vec<_>>()
                );
                true
            })
            .map(|bucket| DuplicateGroup {
                first_index: bucket.rows[0].index,
                key: bucket.key,
                rows: bucket.rows,
            })
            .collect();

        stats.duplicate_groups = groups.len();
        stats.duplicate_rows = groups.iter().map(DuplicateGroup::len).sum();
        stats.redundant_rows = groups.iter().map(DuplicateGroup::duplicate_count).sum();

        (groups, stats)
    }
}

/// Merge per-shard results into one result ordered by first arrival.
///
/// Shards never share a key, so merging is a concatenation followed by an
/// ordering pass on `first_index`.
#[must_use]
pub fn merge_shards(
    shards: impl IntoIterator<Item = (Vec<DuplicateGroup>, GroupingStats)>,
) -> (Vec<DuplicateGroup>, GroupingStats) {
    let mut groups = Vec::new();
    let mut stats = GroupingStats::default();
    for (shard_groups, shard_stats) in shards {
        groups.extend(shard_groups);
        stats.merge(&shard_stats);
    }
    groups.sort_by_key(|g| g.first_index);
    (groups, stats)
}
