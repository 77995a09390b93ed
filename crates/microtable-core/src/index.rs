//! Secondary index registry and the insert/remove maintenance pair.
//!
//! Two namespaces: single-column indexes keyed by column name, and derived
//! indexes keyed by an ordered column combination. A dependency map from
//! column name to dependent derived indexes keeps each derived index from
//! being re-derived more than once per mutation.
//!
//! Buckets map a canonical key to the set of row ids whose row produces that
//! key. A bucket emptied by removal is deleted eagerly, so index size stays
//! bounded by live cardinality.

use std::fmt;

use roaring::RoaringBitmap;
use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::id_alloc::RowId;
use crate::row::Row;
use crate::spec::{canonical_key, concat_canonical, IndexSpec, KeyCombiner, KeyTransform};

/// Bucket map of one index: canonical key to the set of matching row ids.
pub type Buckets = FxHashMap<String, RoaringBitmap>;

/// Single-column index.
pub(crate) struct KeyIndex {
    buckets: Buckets,
    transform: Option<KeyTransform>,
}

impl KeyIndex {
    fn new(transform: Option<KeyTransform>) -> Self {
        Self {
            buckets: Buckets::default(),
            transform,
        }
    }

    /// Canonical key for one column value, query-side and insert-side alike.
    pub(crate) fn canonical(&self, value: &Value) -> String {
        match &self.transform {
            Some(f) => f(value),
            None => canonical_key(value),
        }
    }

    pub(crate) fn buckets(&self) -> &Buckets {
        &self.buckets
    }
}

impl fmt::Debug for KeyIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIndex")
            .field("buckets", &self.buckets.len())
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// Derived index over an ordered column combination.
pub(crate) struct CompositeIndex {
    buckets: Buckets,
    deps: Vec<String>,
    combine: Option<KeyCombiner>,
}

impl CompositeIndex {
    fn new(deps: Vec<String>, combine: Option<KeyCombiner>) -> Self {
        Self {
            buckets: Buckets::default(),
            deps,
            combine,
        }
    }

    /// Canonical key from a row's full dependency tuple.
    ///
    /// A dependency column absent from the row contributes JSON `null`.
    fn canonical_for_row(&self, row: &Row) -> String {
        match &self.combine {
            Some(f) => {
                let values: Vec<Value> = self
                    .deps
                    .iter()
                    .map(|dep| row.get(dep).cloned().unwrap_or(Value::Null))
                    .collect();
                f(&values)
            }
            None => self
                .deps
                .iter()
                .map(|dep| canonical_key(row.get(dep).unwrap_or(&Value::Null)))
                .collect(),
        }
    }

    /// Canonical key from query values, positionally matched to the declared
    /// dependencies. Missing positions contribute JSON `null`.
    pub(crate) fn canonical_for_values(&self, values: &[Value]) -> String {
        if values.len() == self.deps.len() {
            return match &self.combine {
                Some(f) => f(values),
                None => concat_canonical(values),
            };
        }
        let padded: Vec<Value> = (0..self.deps.len())
            .map(|i| values.get(i).cloned().unwrap_or(Value::Null))
            .collect();
        match &self.combine {
            Some(f) => f(&padded),
            None => concat_canonical(&padded),
        }
    }

    pub(crate) fn buckets(&self) -> &Buckets {
        &self.buckets
    }
}

impl fmt::Debug for CompositeIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeIndex")
            .field("deps", &self.deps)
            .field("buckets", &self.buckets.len())
            .field("combine", &self.combine.is_some())
            .finish()
    }
}

/// All secondary indexes of one table plus the dependency bookkeeping.
#[derive(Debug)]
pub(crate) struct IndexRegistry {
    /// Declared columns in declaration order; maintenance iterates this fixed
    /// list, never a row's runtime shape.
    columns: Vec<String>,
    keyed: FxHashMap<String, KeyIndex>,
    composites: Vec<CompositeIndex>,
    /// Exact-identity lookup: ordered column combination to composite slot.
    composite_ids: FxHashMap<Vec<String>, usize>,
    /// Column name to the composite slots depending on it.
    deps: FxHashMap<String, Vec<usize>>,
}

impl IndexRegistry {
    /// Builds the registry from index specifications.
    ///
    /// Duplicate specifications overwrite the earlier one. Specs naming an
    /// undeclared column are rejected.
    pub(crate) fn new(columns: Vec<String>, specs: Vec<IndexSpec>) -> Result<Self> {
        let mut registry = Self {
            columns,
            keyed: FxHashMap::default(),
            composites: Vec::new(),
            composite_ids: FxHashMap::default(),
            deps: FxHashMap::default(),
        };
        for spec in specs {
            registry.add_spec(spec)?;
        }
        Ok(registry)
    }

    fn add_spec(&mut self, spec: IndexSpec) -> Result<()> {
        if spec.columns().is_empty() {
            return Err(Error::EmptySchema);
        }
        for column in spec.columns() {
            if !self.columns.contains(column) {
                return Err(Error::UnknownKey(column.clone()));
            }
        }
        match spec {
            IndexSpec::Key(column) => {
                self.keyed.insert(column, KeyIndex::new(None));
            }
            IndexSpec::KeyWith(column, transform) => {
                self.keyed.insert(column, KeyIndex::new(Some(transform)));
            }
            IndexSpec::Composite(columns) => self.add_composite(columns, None),
            IndexSpec::CompositeWith(columns, combiner) => {
                self.add_composite(columns, Some(combiner));
            }
        }
        Ok(())
    }

    fn add_composite(&mut self, columns: Vec<String>, combine: Option<KeyCombiner>) {
        if let Some(&slot) = self.composite_ids.get(&columns) {
            self.composites[slot] = CompositeIndex::new(columns, combine);
            return;
        }
        let slot = self.composites.len();
        for column in &columns {
            let dependents = self.deps.entry(column.clone()).or_default();
            if !dependents.contains(&slot) {
                dependents.push(slot);
            }
        }
        self.composite_ids.insert(columns.clone(), slot);
        self.composites.push(CompositeIndex::new(columns, combine));
    }

    pub(crate) fn keyed_index(&self, column: &str) -> Option<&KeyIndex> {
        self.keyed.get(column)
    }

    pub(crate) fn composite_index(&self, columns: &[String]) -> Option<&CompositeIndex> {
        self.composite_ids
            .get(columns)
            .map(|&slot| &self.composites[slot])
    }

    /// Adds `id` to every index bucket the row belongs in.
    pub(crate) fn insert_row(&mut self, id: RowId, row: &Row) {
        for column in &self.columns {
            let Some(value) = row.get(column) else {
                continue;
            };
            if let Some(index) = self.keyed.get_mut(column) {
                let key = index.canonical(value);
                index.buckets.entry(key).or_default().insert(id);
            }
        }
        let mut processed: FxHashSet<usize> = FxHashSet::default();
        for column in &self.columns {
            if !row.contains_column(column) {
                continue;
            }
            let Some(dependents) = self.deps.get(column) else {
                continue;
            };
            for &slot in dependents {
                if !processed.insert(slot) {
                    continue;
                }
                let index = &mut self.composites[slot];
                let key = index.canonical_for_row(row);
                index.buckets.entry(key).or_default().insert(id);
            }
        }
    }

    /// Removes `id` from every index bucket the row belonged in, recomputing
    /// keys from the old row contents. Buckets emptied by removal are deleted.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexCorrupted`] if a bucket or membership is
    /// missing: the id was never indexed under this row, which signals a
    /// prior bug rather than a normal outcome.
    pub(crate) fn remove_row(&mut self, id: RowId, row: &Row) -> Result<()> {
        for column in &self.columns {
            let Some(value) = row.get(column) else {
                continue;
            };
            if let Some(index) = self.keyed.get_mut(column) {
                let key = index.canonical(value);
                if !Self::remove_from_bucket(&mut index.buckets, &key, id) {
                    tracing::warn!(row = id, column = %column, "index entry missing during removal");
                    return Err(Error::IndexCorrupted(format!(
                        "row {id} missing from index on '{column}'"
                    )));
                }
            }
        }
        let mut processed: FxHashSet<usize> = FxHashSet::default();
        for column in &self.columns {
            if !row.contains_column(column) {
                continue;
            }
            let Some(dependents) = self.deps.get(column) else {
                continue;
            };
            for &slot in dependents {
                if !processed.insert(slot) {
                    continue;
                }
                let index = &mut self.composites[slot];
                let key = index.canonical_for_row(row);
                if !Self::remove_from_bucket(&mut index.buckets, &key, id) {
                    tracing::warn!(
                        row = id,
                        deps = ?index.deps,
                        "derived index entry missing during removal"
                    );
                    return Err(Error::IndexCorrupted(format!(
                        "row {id} missing from derived index on {:?}",
                        index.deps
                    )));
                }
            }
        }
        Ok(())
    }

    fn remove_from_bucket(buckets: &mut Buckets, key: &str, id: RowId) -> bool {
        let Some(bucket) = buckets.get_mut(key) else {
            return false;
        };
        if !bucket.remove(id) {
            return false;
        }
        if bucket.is_empty() {
            buckets.remove(key);
        }
        true
    }

    /// Clears every bucket while keeping the index definitions.
    pub(crate) fn clear(&mut self) {
        for index in self.keyed.values_mut() {
            index.buckets.clear();
        }
        for index in &mut self.composites {
            index.buckets.clear();
        }
    }

    pub(crate) fn key_index_count(&self) -> usize {
        self.keyed.len()
    }

    pub(crate) fn composite_index_count(&self) -> usize {
        self.composites.len()
    }

    /// Total bucket count across every index.
    pub(crate) fn bucket_count(&self) -> usize {
        self.keyed
            .values()
            .map(|index| index.buckets.len())
            .chain(self.composites.iter().map(|index| index.buckets.len()))
            .sum()
    }

    /// Number of distinct indexed values for a single-column index.
    pub(crate) fn cardinality(&self, column: &str) -> Option<usize> {
        self.keyed.get(column).map(|index| index.buckets.len())
    }

    /// Total memory estimate in bytes.
    pub(crate) fn memory_usage(&self) -> usize {
        let mut total = std::mem::size_of::<Self>();
        for (column, index) in &self.keyed {
            total += column.len();
            for (key, bucket) in &index.buckets {
                total += key.len() + bucket.serialized_size();
            }
        }
        for index in &self.composites {
            total += index.deps.iter().map(String::len).sum::<usize>();
            for (key, bucket) in &index.buckets {
                total += key.len() + bucket.serialized_size();
            }
        }
        total
    }
}
