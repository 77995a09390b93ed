//! Table size and shape diagnostics.

use serde::{Deserialize, Serialize};

/// Snapshot of a table's size and index shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStats {
    /// Number of live rows.
    pub rows: usize,
    /// Number of single-column indexes.
    pub key_indexes: usize,
    /// Number of derived indexes.
    pub composite_indexes: usize,
    /// Total buckets across every index.
    pub buckets: usize,
    /// Rough memory estimate in bytes.
    pub memory_bytes: usize,
}
