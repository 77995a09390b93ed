//! Tests for the free-list row id allocator.

use crate::error::Error;
use crate::id_alloc::IdAllocator;

#[test]
fn test_fresh_allocator_counts_up_from_zero() {
    let mut ids = IdAllocator::new();
    for expected in 0..100 {
        assert_eq!(ids.allocate().unwrap(), expected);
    }
    assert_eq!(ids.live_count(), 100);
}

#[test]
fn test_release_then_allocate_reuses_lowest() {
    let mut ids = IdAllocator::new();
    for _ in 0..5 {
        ids.allocate().unwrap();
    }
    assert!(ids.release(3));
    assert!(ids.release(1));

    // Lowest reclaimed id first, then the next one, then the high-water mark.
    assert_eq!(ids.allocate().unwrap(), 1);
    assert_eq!(ids.allocate().unwrap(), 3);
    assert_eq!(ids.allocate().unwrap(), 5);
}

#[test]
fn test_release_unknown_id_is_noop() {
    let mut ids = IdAllocator::new();
    ids.allocate().unwrap();
    assert!(!ids.release(10));
    assert!(ids.release(0));
    assert!(!ids.release(0));
    assert_eq!(ids.live_count(), 0);
}

#[test]
fn test_allocate_at_beyond_high_water_reclaims_gap() {
    let mut ids = IdAllocator::new();
    ids.allocate_at(3).unwrap();
    assert!(ids.is_live(3));

    // 0..3 became reclaimable, so fresh allocation fills the gap first.
    assert_eq!(ids.allocate().unwrap(), 0);
    assert_eq!(ids.allocate().unwrap(), 1);
    assert_eq!(ids.allocate().unwrap(), 2);
    assert_eq!(ids.allocate().unwrap(), 4);
}

#[test]
fn test_allocate_at_live_id_fails() {
    let mut ids = IdAllocator::new();
    let id = ids.allocate().unwrap();
    let err = ids.allocate_at(id).unwrap_err();
    assert!(matches!(err, Error::Internal(_)));
}

#[test]
fn test_allocate_at_reclaimed_id_succeeds() {
    let mut ids = IdAllocator::new();
    for _ in 0..3 {
        ids.allocate().unwrap();
    }
    ids.release(1);
    ids.allocate_at(1).unwrap();
    assert!(ids.is_live(1));
    assert_eq!(ids.allocate().unwrap(), 3);
}

#[test]
fn test_reset_restores_initial_state() {
    let mut ids = IdAllocator::new();
    for _ in 0..10 {
        ids.allocate().unwrap();
    }
    ids.release(4);
    ids.reset();
    assert_eq!(ids.live_count(), 0);
    assert_eq!(ids.allocate().unwrap(), 0);
}

#[test]
fn test_allocate_at_max_id_is_rejected() {
    let mut ids = IdAllocator::new();
    assert!(matches!(
        ids.allocate_at(u32::MAX),
        Err(Error::IdExhausted)
    ));
}
