//! The table: row store, mutation funnel, and query resolver.
//!
//! Every public mutation funnels through the row store, which then drives
//! the index registry with the old and/or new row contents. Queries only
//! read; they never mutate.

use indexmap::{IndexMap, IndexSet};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::id_alloc::{IdAllocator, RowId};
use crate::index::{Buckets, IndexRegistry};
use crate::row::Row;
use crate::spec::{canonical_key, IndexSpec};
use crate::stats::TableStats;

/// In-memory row table with incrementally maintained secondary indexes.
///
/// The column set is fixed at construction. Rows may carry extra columns;
/// those are stored but never indexed. Lookups against an indexed column (or
/// ordered column combination) are O(1) average; unindexed lookups fall back
/// to a full scan only when explicitly allowed.
///
/// The table is single-threaded by design: mutation requires `&mut self` and
/// concurrent use needs external locking.
///
/// ```rust
/// use microtable_core::{Row, Table};
/// use serde_json::json;
///
/// let mut sessions = Table::builder()
///     .keys(["user", "device"])
///     .index("user")
///     .index(["user", "device"])
///     .build()?;
///
/// let id = sessions.insert(Row::new().with("user", "alice").with("device", "phone"))?;
/// assert_eq!(sessions.where_rows("user", &json!("alice"), false)?, vec![id]);
/// # Ok::<(), microtable_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Table {
    /// Declared columns in declaration order.
    columns: IndexSet<String>,
    /// Live rows, iterated in insertion order (perturbed by deletion).
    rows: IndexMap<RowId, Row>,
    ids: IdAllocator,
    indexes: IndexRegistry,
}

impl Table {
    /// Creates a table over the given key columns and index specifications.
    ///
    /// Duplicate keys and duplicate index specifications are tolerated (set
    /// semantics; later index specs overwrite earlier ones).
    ///
    /// # Errors
    ///
    /// [`Error::EmptySchema`] if no key column is declared, and
    /// [`Error::UnknownKey`] if an index spec names an undeclared column.
    pub fn new(
        keys: impl IntoIterator<Item = impl Into<String>>,
        specs: impl IntoIterator<Item = IndexSpec>,
    ) -> Result<Self> {
        let columns: IndexSet<String> = keys.into_iter().map(Into::into).collect();
        if columns.is_empty() {
            return Err(Error::EmptySchema);
        }
        let indexes = IndexRegistry::new(
            columns.iter().cloned().collect(),
            specs.into_iter().collect::<Vec<_>>(),
        )?;
        Ok(Self {
            columns,
            rows: IndexMap::new(),
            ids: IdAllocator::new(),
            indexes,
        })
    }

    /// Starts a builder for declaring keys and indexes fluently.
    #[must_use]
    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// The declared column names in declaration order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Number of live rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the table holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns true if a row is live at `id`.
    #[must_use]
    pub fn contains(&self, id: RowId) -> bool {
        self.rows.contains_key(&id)
    }

    /// Read-only view of the row at `id`, if live.
    #[must_use]
    pub fn get(&self, id: RowId) -> Option<&Row> {
        self.rows.get(&id)
    }

    /// Inserts a row under a freshly allocated id and returns the id.
    ///
    /// # Errors
    ///
    /// Fails only once the id space is exhausted.
    pub fn insert(&mut self, row: Row) -> Result<RowId> {
        let id = self.ids.allocate()?;
        self.indexes.insert_row(id, &row);
        self.rows.insert(id, row);
        Ok(id)
    }

    /// Stores `row` at `id`, replacing any existing row.
    ///
    /// An absent `id` behaves like an externally-keyed insert: the id is
    /// registered with the allocator and the row indexed fresh. A present
    /// `id` has its old index memberships removed before the new ones are
    /// inserted.
    ///
    /// # Errors
    ///
    /// [`Error::IndexCorrupted`] if the old row's index memberships are
    /// missing, [`Error::IdExhausted`] if the id cannot be registered.
    pub fn set(&mut self, id: RowId, row: Row) -> Result<()> {
        if !self.rows.contains_key(&id) {
            self.ids.allocate_at(id)?;
            self.indexes.insert_row(id, &row);
            self.rows.insert(id, row);
            return Ok(());
        }
        if let Some(old) = self.rows.insert(id, row) {
            self.indexes.remove_row(id, &old)?;
        }
        if let Some(stored) = self.rows.get(&id) {
            self.indexes.insert_row(id, stored);
        }
        Ok(())
    }

    /// Merges `patch` onto the row at `id` (partial overwrite of the named
    /// columns only).
    ///
    /// The full merged row is materialized before any index recomputation,
    /// so derived keys always see complete post-update state.
    ///
    /// # Errors
    ///
    /// [`Error::RowNotFound`] if no row is live at `id`.
    pub fn update(&mut self, id: RowId, patch: Row) -> Result<()> {
        let Some(current) = self.rows.get(&id) else {
            return Err(Error::RowNotFound(id));
        };
        let merged = current.merged(&patch);
        if let Some(old) = self.rows.insert(id, merged) {
            self.indexes.remove_row(id, &old)?;
        }
        if let Some(stored) = self.rows.get(&id) {
            self.indexes.insert_row(id, stored);
        }
        Ok(())
    }

    /// Deletes the row at `id`, reclaiming the id and removing every index
    /// membership. Returns `Ok(false)` if no row was live at `id`.
    ///
    /// # Errors
    ///
    /// [`Error::IndexCorrupted`] if the row's index memberships are missing.
    pub fn delete(&mut self, id: RowId) -> Result<bool> {
        let Some(row) = self.rows.swap_remove(&id) else {
            return Ok(false);
        };
        self.ids.release(id);
        self.indexes.remove_row(id, &row)?;
        Ok(true)
    }

    /// Removes all rows, clears every index, and resets the id allocator.
    pub fn clear(&mut self) {
        tracing::debug!(rows = self.rows.len(), "clearing table");
        self.rows.clear();
        self.indexes.clear();
        self.ids.reset();
    }

    /// Deep copy of the row collection. Mutating the snapshot never affects
    /// the table.
    #[must_use]
    pub fn snapshot(&self) -> IndexMap<RowId, Row> {
        self.rows.clone()
    }

    /// Iterates `(id, row)` pairs in insertion order.
    ///
    /// The order is implementation-defined and not guaranteed to survive
    /// deletions and reinsertions.
    pub fn iter(&self) -> impl Iterator<Item = (RowId, &Row)> {
        self.rows.iter().map(|(&id, row)| (id, row))
    }

    /// Row ids whose canonical value for `column` matches `value`.
    ///
    /// Resolves through the column's index when one exists; otherwise falls
    /// back to a full scan if `allow_scan` is set. An empty result is not an
    /// error. Result order is unspecified.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownKey`] for an undeclared column, [`Error::NotIndexed`]
    /// if the column has no index and scanning is not allowed.
    pub fn where_rows(&self, column: &str, value: &Value, allow_scan: bool) -> Result<Vec<RowId>> {
        if !self.columns.contains(column) {
            return Err(Error::UnknownKey(column.to_string()));
        }
        if let Some(index) = self.indexes.keyed_index(column) {
            let key = index.canonical(value);
            return Ok(index
                .buckets()
                .get(&key)
                .map(|bucket| bucket.iter().collect())
                .unwrap_or_default());
        }
        if allow_scan {
            let target = canonical_key(value);
            return Ok(self
                .rows
                .iter()
                .filter(|(_, row)| {
                    row.get(column)
                        .is_some_and(|v| canonical_key(v) == target)
                })
                .map(|(&id, _)| id)
                .collect());
        }
        Err(Error::NotIndexed(column.to_string()))
    }

    /// Row ids matching an ordered column combination.
    ///
    /// The combination must match a derived index by exact column identity
    /// and order; otherwise a full scan compares positionally concatenated
    /// canonical values when `allow_scan` is set. Query values are matched
    /// positionally to the columns; missing positions read as JSON `null`.
    ///
    /// # Errors
    ///
    /// [`Error::EmptySchema`] for an empty column list, [`Error::UnknownKey`]
    /// for an undeclared column, [`Error::NotIndexed`] if no matching derived
    /// index exists and scanning is not allowed.
    pub fn where_rows_composite(
        &self,
        columns: &[&str],
        values: &[Value],
        allow_scan: bool,
    ) -> Result<Vec<RowId>> {
        if columns.is_empty() {
            return Err(Error::EmptySchema);
        }
        for column in columns {
            if !self.columns.contains(*column) {
                return Err(Error::UnknownKey((*column).to_string()));
            }
        }
        let owned: Vec<String> = columns.iter().map(|c| (*c).to_string()).collect();
        if let Some(index) = self.indexes.composite_index(&owned) {
            let key = index.canonical_for_values(values);
            return Ok(index
                .buckets()
                .get(&key)
                .map(|bucket| bucket.iter().collect())
                .unwrap_or_default());
        }
        if allow_scan {
            let target: String = (0..columns.len())
                .map(|i| canonical_key(values.get(i).unwrap_or(&Value::Null)))
                .collect();
            return Ok(self
                .rows
                .iter()
                .filter(|(_, row)| {
                    columns
                        .iter()
                        .map(|c| canonical_key(row.get(c).unwrap_or(&Value::Null)))
                        .collect::<String>()
                        == target
                })
                .map(|(&id, _)| id)
                .collect());
        }
        Err(Error::NotIndexed(owned.join("+")))
    }

    /// Read-only view of a single-column index's buckets, or `None` if the
    /// column has no index.
    #[must_use]
    pub fn index_snapshot(&self, column: &str) -> Option<&Buckets> {
        self.indexes.keyed_index(column).map(|index| index.buckets())
    }

    /// Read-only view of a derived index's buckets, matched by exact column
    /// identity and order, or `None` if no such index exists.
    #[must_use]
    pub fn composite_index_snapshot(&self, columns: &[&str]) -> Option<&Buckets> {
        let owned: Vec<String> = columns.iter().map(|c| (*c).to_string()).collect();
        self.indexes
            .composite_index(&owned)
            .map(|index| index.buckets())
    }

    /// Number of distinct indexed values for a single-column index.
    #[must_use]
    pub fn cardinality(&self, column: &str) -> Option<usize> {
        self.indexes.cardinality(column)
    }

    /// Current size and shape diagnostics.
    #[must_use]
    pub fn stats(&self) -> TableStats {
        TableStats {
            rows: self.rows.len(),
            key_indexes: self.indexes.key_index_count(),
            composite_indexes: self.indexes.composite_index_count(),
            buckets: self.indexes.bucket_count(),
            memory_bytes: self.memory_usage(),
        }
    }

    /// Total memory estimate in bytes.
    #[must_use]
    pub fn memory_usage(&self) -> usize {
        let mut total = std::mem::size_of::<Self>() + self.indexes.memory_usage();
        for row in self.rows.values() {
            total += std::mem::size_of::<Row>();
            for (column, value) in row.iter() {
                total += column.len() + std::mem::size_of_val(value);
            }
        }
        total
    }
}

/// Fluent construction of a [`Table`].
#[derive(Debug, Default)]
pub struct TableBuilder {
    columns: Vec<String>,
    specs: Vec<IndexSpec>,
}

impl TableBuilder {
    /// Declares one key column.
    #[must_use]
    pub fn key(mut self, column: impl Into<String>) -> Self {
        self.columns.push(column.into());
        self
    }

    /// Declares several key columns at once.
    #[must_use]
    pub fn keys(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Adds an index specification. Accepts anything convertible into an
    /// [`IndexSpec`]: a column name, a column-name array, or an explicit spec.
    #[must_use]
    pub fn index(mut self, spec: impl Into<IndexSpec>) -> Self {
        self.specs.push(spec.into());
        self
    }

    /// Builds the table.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Table::new`].
    pub fn build(self) -> Result<Table> {
        Table::new(self.columns, self.specs)
    }
}
