//! Tests for error codes and classification.

use crate::error::Error;

#[test]
fn test_error_codes_are_stable() {
    assert_eq!(Error::EmptySchema.code(), "MTBL-001");
    assert_eq!(Error::UnknownKey("x".into()).code(), "MTBL-002");
    assert_eq!(Error::RowNotFound(7).code(), "MTBL-003");
    assert_eq!(Error::NotIndexed("x".into()).code(), "MTBL-004");
    assert_eq!(Error::IndexCorrupted("bad".into()).code(), "MTBL-005");
    assert_eq!(Error::IdExhausted.code(), "MTBL-006");
    assert_eq!(Error::Internal("bad".into()).code(), "MTBL-007");
}

#[test]
fn test_display_includes_code() {
    let err = Error::UnknownKey("zone".into());
    let message = err.to_string();
    assert!(message.contains("MTBL-002"));
    assert!(message.contains("zone"));
}

#[test]
fn test_recoverable_classification() {
    assert!(Error::EmptySchema.is_recoverable());
    assert!(Error::RowNotFound(0).is_recoverable());
    assert!(Error::NotIndexed("x".into()).is_recoverable());
    assert!(!Error::IndexCorrupted("bad".into()).is_recoverable());
    assert!(!Error::Internal("bad".into()).is_recoverable());
}
