//! Helpers for combining independent lookup results.

use roaring::RoaringBitmap;

use crate::id_alloc::RowId;

/// O(n) intersection of several id sets.
///
/// Useful for combining the results of independent lookups into a single
/// conjunction. An empty input yields an empty result.
#[must_use]
pub fn intersect_ids(sets: &[Vec<RowId>]) -> Vec<RowId> {
    let Some((first, rest)) = sets.split_first() else {
        return Vec::new();
    };
    let mut common: RoaringBitmap = first.iter().copied().collect();
    for set in rest {
        let bitmap: RoaringBitmap = set.iter().copied().collect();
        common &= bitmap;
    }
    common.iter().collect()
}

/// Intersection over borrowed bitmaps, for callers working with index
/// buckets directly.
#[must_use]
pub fn intersect_bitmaps<'a, I>(bitmaps: I) -> RoaringBitmap
where
    I: IntoIterator<Item = &'a RoaringBitmap>,
{
    let mut iter = bitmaps.into_iter();
    let Some(first) = iter.next() else {
        return RoaringBitmap::new();
    };
    let mut common = first.clone();
    for bitmap in iter {
        common &= bitmap;
    }
    common
}
