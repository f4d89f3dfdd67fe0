//! Per-set LRU recency tracking.
//!
//! Each set keeps an ordered array of `E` slots, most recently used first.
//! Slots not yet used hold `None`, which can never be confused with a real
//! tag (all 64-bit values are legitimate tags).
//!
//! # Algorithm
//!
//! [`RecencyTracker::touch`] is a move-to-front over a shifted array:
//!
//! 1. Scan the set from the back (`E-1`) to the front (`0`) for the tag.
//! 2. If it is absent, use the last slot, displacing whatever is there.
//! 3. Shift every slot in front of that position back by one.
//! 4. Store the tag in slot `0`.
//!
//! Because the scan runs back to front, a tag that somehow appeared twice
//! would have its *last* occurrence relocated. The simulator never produces
//! duplicates, but the tie-break is part of the observable behaviour.
//!
//! The array is bounded at exactly `E` entries per set, so it never allocates
//! after construction.
//!
//! ```text
//! touch(C) on [A, B, C, D]      touch(E) on [A, B, C, D]
//!   found at 2                    not found -> 3
//!   [C, A, B, D]                  [E, A, B, C]   (D falls off)
//! ```

extern crate alloc;

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroUsize;

/// Recency order for every set of the cache.
#[derive(Debug, Clone)]
pub struct RecencyTracker {
    order: Vec<Option<u64>>,
    ways: NonZeroUsize,
}

impl RecencyTracker {
    /// Creates a tracker with every slot empty.
    ///
    /// # Panics
    ///
    /// Panics if the tracker cannot be allocated.
    pub fn new(num_sets: usize, ways: NonZeroUsize) -> Self {
        Self::try_new(num_sets, ways)
            .unwrap_or_else(|err| panic!("recency table of {num_sets} x {ways}: {err}"))
    }

    /// Creates an empty tracker, reporting allocation failure.
    pub fn try_new(num_sets: usize, ways: NonZeroUsize) -> Result<Self, TryReserveError> {
        let len = num_sets.saturating_mul(ways.get());
        let mut order = Vec::new();
        order.try_reserve_exact(len)?;
        order.resize(len, None);
        Ok(RecencyTracker { order, ways })
    }

    /// Recency order of one set, most recently used first.
    #[inline]
    pub fn order(&self, set: usize) -> &[Option<u64>] {
        let start = set * self.ways.get();
        &self.order[start..start + self.ways.get()]
    }

    #[inline]
    fn order_mut(&mut self, set: usize) -> &mut [Option<u64>] {
        let start = set * self.ways.get();
        &mut self.order[start..start + self.ways.get()]
    }

    /// Marks `tag` as the most recently used entry of `set`.
    pub fn touch(&mut self, set: usize, tag: u64) {
        let order = self.order_mut(set);
        let last = order.len() - 1;

        let position = order
            .iter()
            .rposition(|entry| *entry == Some(tag))
            .unwrap_or(last);

        // Shift [0, position) back by one, overwriting the old slot
        order.copy_within(0..position, 1);
        order[0] = Some(tag);
    }

    /// The entry considered least recently used: the last slot of `set`.
    ///
    /// `None` while the set still has unused slots.
    #[inline]
    pub fn eviction_candidate(&self, set: usize) -> Option<u64> {
        self.order(set)[self.ways.get() - 1]
    }

    /// The most recently used tag of `set`, if any.
    #[inline]
    pub fn mru(&self, set: usize) -> Option<u64> {
        self.order(set)[0]
    }

    /// Number of occupied slots in `set`.
    pub fn len(&self, set: usize) -> usize {
        self.order(set).iter().filter(|entry| entry.is_some()).count()
    }

    /// Empties every set without releasing storage.
    pub fn clear(&mut self) {
        self.order.fill(None);
    }
}

/// One row per set, most recently used first: `Set 0: 0x7 0x5 - -`.
impl fmt::Display for RecencyTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (set, order) in self.order.chunks(self.ways.get()).enumerate() {
            write!(f, "Set {set}:")?;
            for entry in order {
                match entry {
                    Some(tag) => write!(f, " {tag:#x}")?,
                    None => f.write_str(" -")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
