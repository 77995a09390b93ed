//! Tests for lookup-result combination helpers.

use roaring::RoaringBitmap;

use crate::util::{intersect_bitmaps, intersect_ids};

#[test]
fn test_intersect_ids_basic() {
    let sets = vec![vec![1, 2, 3, 4], vec![2, 4, 6], vec![0, 2, 4]];
    assert_eq!(intersect_ids(&sets), vec![2, 4]);
}

#[test]
fn test_intersect_ids_empty_input() {
    assert!(intersect_ids(&[]).is_empty());
}

#[test]
fn test_intersect_ids_disjoint() {
    let sets = vec![vec![1, 2], vec![3, 4]];
    assert!(intersect_ids(&sets).is_empty());
}

#[test]
fn test_intersect_ids_single_set_passes_through() {
    assert_eq!(intersect_ids(&[vec![3, 1, 2]]), vec![1, 2, 3]);
}

#[test]
fn test_intersect_bitmaps() {
    let a: RoaringBitmap = [1u32, 2, 3].into_iter().collect();
    let b: RoaringBitmap = [2u32, 3, 4].into_iter().collect();
    let c: RoaringBitmap = [3u32, 4, 5].into_iter().collect();

    let common = intersect_bitmaps([&a, &b, &c]);
    assert_eq!(common.iter().collect::<Vec<_>>(), vec![3]);

    assert!(intersect_bitmaps(std::iter::empty::<&RoaringBitmap>()).is_empty());
}
