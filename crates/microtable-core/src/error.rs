//! Error types for `MicroTable`.
//!
//! A single unified error type covers every table operation. Error codes
//! follow the pattern `MTBL-XXX` for easy debugging.

use thiserror::Error;

use crate::id_alloc::RowId;

/// Result type alias for `MicroTable` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `MicroTable` operations.
///
/// Each variant includes a descriptive error message suitable for end-users.
#[derive(Error, Debug)]
pub enum Error {
    /// Table or index declared without any column (MTBL-001).
    #[error("[MTBL-001] Table needs at least one key column")]
    EmptySchema,

    /// Operation references an undeclared column (MTBL-002).
    #[error("[MTBL-002] Key '{0}' is not declared on this table")]
    UnknownKey(String),

    /// Row not found (MTBL-003).
    #[error("[MTBL-003] Row with id '{0}' not found")]
    RowNotFound(RowId),

    /// Lookup on a column combination with no index and scanning not permitted (MTBL-004).
    #[error("[MTBL-004] Key '{0}' is not indexed (pass allow_scan to fall back to a full scan)")]
    NotIndexed(String),

    /// Index corrupted (MTBL-005).
    ///
    /// Indicates that an index no longer reflects the row store. Signals a
    /// prior bug, not a user error. Please report if encountered.
    #[error("[MTBL-005] Index corrupted: {0}")]
    IndexCorrupted(String),

    /// Row identifier space exhausted (MTBL-006).
    #[error("[MTBL-006] Row id space exhausted")]
    IdExhausted,

    /// Internal error (MTBL-007).
    ///
    /// Indicates an unexpected internal error. Please report if encountered.
    #[error("[MTBL-007] Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code (e.g., "MTBL-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptySchema => "MTBL-001",
            Self::UnknownKey(_) => "MTBL-002",
            Self::RowNotFound(_) => "MTBL-003",
            Self::NotIndexed(_) => "MTBL-004",
            Self::IndexCorrupted(_) => "MTBL-005",
            Self::IdExhausted => "MTBL-006",
            Self::Internal(_) => "MTBL-007",
        }
    }

    /// Returns true if this error is recoverable.
    ///
    /// Non-recoverable errors include corruption and internal errors.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        !matches!(self, Self::IndexCorrupted(_) | Self::Internal(_))
    }
}
