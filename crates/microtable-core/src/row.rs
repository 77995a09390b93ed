//! Row data structure: an ordered mapping from column name to JSON value.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single table row.
///
/// Columns keep their insertion order. Values are arbitrary JSON, so a row
/// can mix numbers, strings, booleans and structured data. Rows are
/// value-like: the table takes ownership on insert and hands out read-only
/// references on read, so caller-side mutation can never reach stored state.
///
/// ```rust
/// use microtable_core::Row;
///
/// let row = Row::new().with("name", "alice").with("age", 30);
/// assert_eq!(row.get("age"), Some(&serde_json::json!(30)));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row {
    columns: IndexMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column assignment.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.columns.insert(column.into(), value.into());
        self
    }

    /// Returns the value stored under `column`, if any.
    #[must_use]
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns.get(column)
    }

    /// Sets a column value, returning the previous value if the column was set.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.columns.insert(column.into(), value.into())
    }

    /// Returns true if the row carries a value for `column`.
    #[must_use]
    pub fn contains_column(&self, column: &str) -> bool {
        self.columns.contains_key(column)
    }

    /// Number of columns in the row.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if the row has no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Iterates over `(column, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.columns.iter()
    }

    /// Returns a new row with `patch` merged on top of `self`.
    ///
    /// Columns named by the patch overwrite; all other columns carry over
    /// unchanged. This is the full post-update row a partial update produces.
    #[must_use]
    pub fn merged(&self, patch: &Self) -> Self {
        let mut out = self.clone();
        for (column, value) in patch.iter() {
            out.columns.insert(column.clone(), value.clone());
        }
        out
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

impl From<IndexMap<String, Value>> for Row {
    fn from(columns: IndexMap<String, Value>) -> Self {
        Self { columns }
    }
}

impl From<serde_json::Map<String, Value>> for Row {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        map.into_iter().collect()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = indexmap::map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl<'a> IntoIterator for &'a Row {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.iter()
    }
}
