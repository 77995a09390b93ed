//! Index specifications and canonical key derivation.
//!
//! Every indexed value is reduced to a canonical [`String`] key. The default
//! canonicalization is the JSON text rendering of the value, so `1`, `"1"`
//! and `true` stay distinct while equal logical values always collide.
//! Individual indexes can override it with a transform (single column) or a
//! combiner (derived index).

use std::fmt;

use serde_json::Value;

/// Per-index transform producing the canonical key for one column value.
pub type KeyTransform = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Per-index combiner producing the canonical key for a tuple of column
/// values, in declared dependency order.
pub type KeyCombiner = Box<dyn Fn(&[Value]) -> String + Send + Sync>;

/// Default canonicalization: the JSON text rendering of the value.
///
/// Deterministic and total for every `Value`.
#[must_use]
pub fn canonical_key(value: &Value) -> String {
    value.to_string()
}

/// Default derived-index canonicalization: positional concatenation of the
/// canonical keys of each dependency value.
#[must_use]
pub fn concat_canonical(values: &[Value]) -> String {
    values.iter().map(canonical_key).collect()
}

/// Specification of one secondary index, fixed at table construction.
///
/// The four shapes mirror what callers can ask for: a plain column, a column
/// with a custom transform, an ordered column combination, or a combination
/// with a custom combiner.
pub enum IndexSpec {
    /// Single column, default canonicalization.
    Key(String),
    /// Single column with a custom transform.
    KeyWith(String, KeyTransform),
    /// Ordered column combination, canonicalized by concatenation.
    Composite(Vec<String>),
    /// Ordered column combination with a custom combiner.
    CompositeWith(Vec<String>, KeyCombiner),
}

impl IndexSpec {
    /// Single-column index with default canonicalization.
    #[must_use]
    pub fn key(column: impl Into<String>) -> Self {
        Self::Key(column.into())
    }

    /// Single-column index with a custom transform.
    #[must_use]
    pub fn key_with(
        column: impl Into<String>,
        transform: impl Fn(&Value) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::KeyWith(column.into(), Box::new(transform))
    }

    /// Derived index over an ordered column combination.
    #[must_use]
    pub fn composite(columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::Composite(columns.into_iter().map(Into::into).collect())
    }

    /// Derived index with a custom combiner over the dependency tuple.
    #[must_use]
    pub fn composite_with(
        columns: impl IntoIterator<Item = impl Into<String>>,
        combiner: impl Fn(&[Value]) -> String + Send + Sync + 'static,
    ) -> Self {
        Self::CompositeWith(
            columns.into_iter().map(Into::into).collect(),
            Box::new(combiner),
        )
    }

    /// The columns this index depends on, in declared order.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        match self {
            Self::Key(column) | Self::KeyWith(column, _) => std::slice::from_ref(column),
            Self::Composite(columns) | Self::CompositeWith(columns, _) => columns,
        }
    }
}

impl fmt::Debug for IndexSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(column) => f.debug_tuple("Key").field(column).finish(),
            Self::KeyWith(column, _) => f.debug_tuple("KeyWith").field(column).finish(),
            Self::Composite(columns) => f.debug_tuple("Composite").field(columns).finish(),
            Self::CompositeWith(columns, _) => {
                f.debug_tuple("CompositeWith").field(columns).finish()
            }
        }
    }
}

impl From<&str> for IndexSpec {
    fn from(column: &str) -> Self {
        Self::key(column)
    }
}

impl From<String> for IndexSpec {
    fn from(column: String) -> Self {
        Self::Key(column)
    }
}

impl From<Vec<&str>> for IndexSpec {
    fn from(columns: Vec<&str>) -> Self {
        Self::composite(columns)
    }
}

impl<const N: usize> From<[&str; N]> for IndexSpec {
    fn from(columns: [&str; N]) -> Self {
        Self::composite(columns)
    }
}
