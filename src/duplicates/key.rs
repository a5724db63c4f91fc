//! Composite key extraction.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::duplicates::ColumnSelection;
use crate::reader::Row;

/// Values of a row's selected columns, in selection order.
///
/// Equality is exact, element-wise string equality. Values are not trimmed,
/// case-folded or coerced.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CompositeKey(Vec<String>);

impl CompositeKey {
    /// Build a key from raw values.
    #[must_use]
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    /// Key components.
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Number of components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True for the key of an empty selection.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shard this key routes to, in `0..shards`.
    ///
    /// Equal keys always route to the same shard.
    #[must_use]
    pub fn shard(&self, shards: usize) -> usize {
        let mut hasher = DefaultHasher::new();
        self.hash(&mut hasher);
        (hasher.finish() % shards.max(1) as u64) as usize
    }
}

/// Extract the composite key of a row.
///
/// # Example
///
/// ```
/// use rowdupe::duplicates::{extract_key, ColumnSelection};
/// use rowdupe::reader::{Header, Row};
///
/// let header = Header::new(vec!["Name".into(), "Email".into()]).unwrap();
/// let selection = ColumnSelection::resolve(&header, "Email,Name").unwrap();
/// let row = Row::new(0, vec!["Alice".into(), "a@x.com".into()]);
///
/// assert_eq!(extract_key(&row, &selection).values(), ["a@x.com", "Alice"]);
/// ```
#[must_use]
pub fn extract_key(row: &Row, selection: &ColumnSelection) -> CompositeKey {
    let values = selection
        .positions()
        .iter()
        .map(|&pos| {
            debug_assert!(pos < row.len(), "row {} is narrower than header", row.index);
            row.get(pos).unwrap_or_default().to_owned()
        })
        .collect();
    CompositeKey(values)
}
