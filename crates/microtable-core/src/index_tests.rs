//! Tests for the index registry and maintenance pair.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde_json::json;

use crate::error::Error;
use crate::index::IndexRegistry;
use crate::row::Row;
use crate::spec::IndexSpec;

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| (*n).to_string()).collect()
}

#[test]
fn test_unknown_column_in_spec_is_rejected() {
    let err = IndexRegistry::new(columns(&["a"]), vec![IndexSpec::key("b")]).unwrap_err();
    assert!(matches!(err, Error::UnknownKey(k) if k == "b"));

    let err =
        IndexRegistry::new(columns(&["a"]), vec![IndexSpec::composite(["a", "b"])]).unwrap_err();
    assert!(matches!(err, Error::UnknownKey(k) if k == "b"));
}

#[test]
fn test_empty_composite_is_rejected() {
    let err = IndexRegistry::new(
        columns(&["a"]),
        vec![IndexSpec::Composite(Vec::new())],
    )
    .unwrap_err();
    assert!(matches!(err, Error::EmptySchema));
}

#[test]
fn test_insert_and_remove_keep_buckets_exact() {
    let mut registry =
        IndexRegistry::new(columns(&["a", "b"]), vec![IndexSpec::key("a")]).unwrap();
    let row1 = Row::new().with("a", 1).with("b", "x");
    let row2 = Row::new().with("a", 1).with("b", "y");

    registry.insert_row(0, &row1);
    registry.insert_row(1, &row2);

    let buckets = registry.keyed_index("a").unwrap().buckets();
    let bucket = buckets.get("1").unwrap();
    assert!(bucket.contains(0) && bucket.contains(1));

    registry.remove_row(0, &row1).unwrap();
    let buckets = registry.keyed_index("a").unwrap().buckets();
    let bucket = buckets.get("1").unwrap();
    assert!(!bucket.contains(0) && bucket.contains(1));

    // Last member removed: the bucket disappears entirely.
    registry.remove_row(1, &row2).unwrap();
    assert!(registry.keyed_index("a").unwrap().buckets().is_empty());
}

#[test]
fn test_remove_for_unindexed_row_is_corruption() {
    let mut registry =
        IndexRegistry::new(columns(&["a"]), vec![IndexSpec::key("a")]).unwrap();
    let row = Row::new().with("a", 1);
    let err = registry.remove_row(0, &row).unwrap_err();
    assert!(matches!(err, Error::IndexCorrupted(_)));
    assert!(!err.is_recoverable());
}

#[test]
fn test_duplicate_spec_overwrites() {
    let mut registry = IndexRegistry::new(
        columns(&["a"]),
        vec![
            IndexSpec::key("a"),
            IndexSpec::key_with("a", |_| "fixed".to_string()),
        ],
    )
    .unwrap();
    assert_eq!(registry.key_index_count(), 1);

    registry.insert_row(0, &Row::new().with("a", 1));
    let buckets = registry.keyed_index("a").unwrap().buckets();
    assert!(buckets.contains_key("fixed"));
    assert!(!buckets.contains_key("1"));
}

#[test]
fn test_composite_processed_once_per_mutation() {
    // Both dependency columns are present in the row; the combiner must
    // still run exactly once per maintenance call.
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut registry = IndexRegistry::new(
        columns(&["a", "b"]),
        vec![IndexSpec::composite_with(["a", "b"], move |vs| {
            counter.fetch_add(1, Ordering::SeqCst);
            format!("{}|{}", vs[0], vs[1])
        })],
    )
    .unwrap();

    let row = Row::new().with("a", 1).with("b", 2);
    registry.insert_row(0, &row);
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    registry.remove_row(0, &row).unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_composite_missing_dependency_reads_null() {
    let mut registry = IndexRegistry::new(
        columns(&["a", "b"]),
        vec![IndexSpec::composite(["a", "b"])],
    )
    .unwrap();

    let row = Row::new().with("a", 1);
    registry.insert_row(0, &row);

    let index = registry.composite_index(&columns(&["a", "b"])).unwrap();
    let key = index.canonical_for_values(&[json!(1), json!(null)]);
    assert!(index.buckets().get(&key).unwrap().contains(0));
}

#[test]
fn test_composite_identity_is_order_sensitive() {
    let registry = IndexRegistry::new(
        columns(&["a", "b"]),
        vec![IndexSpec::composite(["a", "b"])],
    )
    .unwrap();
    assert!(registry.composite_index(&columns(&["a", "b"])).is_some());
    assert!(registry.composite_index(&columns(&["b", "a"])).is_none());
}

#[test]
fn test_clear_keeps_definitions() {
    let mut registry =
        IndexRegistry::new(columns(&["a"]), vec![IndexSpec::key("a")]).unwrap();
    registry.insert_row(0, &Row::new().with("a", 1));
    registry.clear();
    assert_eq!(registry.key_index_count(), 1);
    assert_eq!(registry.bucket_count(), 0);

    // Definitions survive: maintenance keeps working after a clear.
    registry.insert_row(0, &Row::new().with("a", 2));
    assert_eq!(registry.cardinality("a"), Some(1));
}

#[test]
fn test_memory_usage_grows_with_content() {
    let mut registry =
        IndexRegistry::new(columns(&["a"]), vec![IndexSpec::key("a")]).unwrap();
    let initial = registry.memory_usage();
    for i in 0..50 {
        registry.insert_row(i, &Row::new().with("a", i));
    }
    assert!(registry.memory_usage() > initial);
}
