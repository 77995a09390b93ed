//! # `MicroTable` Core
//!
//! Embedded in-memory row table with incrementally maintained secondary
//! indexes.
//!
//! `MicroTable` is a building block for in-process data management (caches,
//! session registries, routing tables) that needs O(1) exact-match lookup by
//! arbitrary column combinations without pulling in a full database. Rows
//! are ordered JSON-valued column maps; single-column and derived
//! (multi-column) indexes are kept consistent with row contents under every
//! insert, set, update, and delete.
//!
//! ## Quick Start
//!
//! ```rust
//! use microtable_core::{IndexSpec, Row, Table};
//! use serde_json::json;
//!
//! let mut table = Table::new(
//!     ["host", "port", "zone"],
//!     [IndexSpec::key("zone"), IndexSpec::composite(["host", "port"])],
//! )?;
//!
//! let id = table.insert(
//!     Row::new().with("host", "10.0.0.7").with("port", 443).with("zone", "eu"),
//! )?;
//!
//! // O(1) lookup through the single-column index.
//! assert_eq!(table.where_rows("zone", &json!("eu"), false)?, vec![id]);
//!
//! // O(1) lookup through the derived index.
//! let hits = table.where_rows_composite(
//!     &["host", "port"],
//!     &[json!("10.0.0.7"), json!(443)],
//!     false,
//! )?;
//! assert_eq!(hits, vec![id]);
//! # Ok::<(), microtable_core::Error>(())
//! ```
//!
//! No persistence, no transactions, no internal locking: the table is a
//! plain single-threaded data structure. Wrap it in your own mutex if you
//! share it across threads.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]

pub mod error;
#[cfg(test)]
mod error_tests;
pub mod id_alloc;
#[cfg(test)]
mod id_alloc_tests;
mod index;
#[cfg(test)]
mod index_tests;
pub mod row;
pub mod spec;
pub mod stats;
pub mod table;
pub mod util;
#[cfg(test)]
mod util_tests;

pub use error::{Error, Result};
pub use id_alloc::{IdAllocator, RowId};
pub use index::Buckets;
pub use row::Row;
pub use spec::{canonical_key, IndexSpec, KeyCombiner, KeyTransform};
pub use stats::TableStats;
pub use table::{Table, TableBuilder};
