//! Row identifier allocation with reuse-after-free semantics.
//!
//! Arena+index pattern: a monotonic high-water mark plus a bitmap of
//! reclaimed identifiers. `allocate` prefers the lowest reclaimed id, so a
//! fresh table hands out `0, 1, 2, ...` and deleted ids are recycled before
//! the high-water mark advances.

use roaring::RoaringBitmap;

use crate::error::{Error, Result};

/// Identifier of a row within a [`Table`](crate::Table).
///
/// `u32` matches the domain of the roaring bitmaps used for index buckets.
pub type RowId = u32;

/// Free-list-backed row id allocator.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    /// High-water mark: every id below it has been handed out at least once.
    next: RowId,
    /// Ids below the high-water mark that are currently free.
    reclaimed: RoaringBitmap,
}

impl IdAllocator {
    /// Creates an allocator with no ids handed out.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocates a fresh or reclaimed id, preferring the lowest reclaimed one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IdExhausted`] once the id space is used up.
    pub fn allocate(&mut self) -> Result<RowId> {
        if let Some(id) = self.reclaimed.min() {
            self.reclaimed.remove(id);
            return Ok(id);
        }
        if self.next == RowId::MAX {
            return Err(Error::IdExhausted);
        }
        let id = self.next;
        self.next += 1;
        Ok(id)
    }

    /// Registers an externally chosen id as live.
    ///
    /// Ids between the current high-water mark and `id` become reclaimable,
    /// so interleaving external and fresh allocation stays gap-free.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Internal`] if `id` is already live, and
    /// [`Error::IdExhausted`] if registering `id` would overflow the id space.
    pub fn allocate_at(&mut self, id: RowId) -> Result<()> {
        if id < self.next {
            if !self.reclaimed.remove(id) {
                return Err(Error::Internal(format!("id {id} is already allocated")));
            }
            return Ok(());
        }
        let next = id.checked_add(1).ok_or(Error::IdExhausted)?;
        if id > self.next {
            self.reclaimed.insert_range(self.next..id);
        }
        self.next = next;
        Ok(())
    }

    /// Returns `id` to the reclaim pool. Returns false if it was not live.
    pub fn release(&mut self, id: RowId) -> bool {
        if id >= self.next || self.reclaimed.contains(id) {
            return false;
        }
        self.reclaimed.insert(id);
        true
    }

    /// Returns true if `id` is currently handed out.
    #[must_use]
    pub fn is_live(&self, id: RowId) -> bool {
        id < self.next && !self.reclaimed.contains(id)
    }

    /// Number of currently live ids.
    #[must_use]
    pub fn live_count(&self) -> u64 {
        u64::from(self.next) - self.reclaimed.len()
    }

    /// Restores the initial state: nothing handed out, nothing reclaimed.
    pub fn reset(&mut self) {
        self.next = 0;
        self.reclaimed.clear();
    }
}
