//! Physical cache storage.
//!
//! A [`LineTable`] holds `num_sets × E` lines in one flat allocation made at
//! construction time. Set `i` owns the slots `i * E .. (i + 1) * E`. Slot
//! order within a set carries no meaning; lookups scan the whole set.

extern crate alloc;

use alloc::collections::TryReserveError;
use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroUsize;

/// A single cache line. The tag is meaningless while `valid` is false.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Line {
    /// Whether the line currently holds a block.
    pub valid: bool,
    /// Tag of the block held by the line.
    pub tag: u64,
}

/// Fixed-size `num_sets × ways` array of [`Line`]s.
#[derive(Debug, Clone)]
pub struct LineTable {
    lines: Vec<Line>,
    ways: NonZeroUsize,
}

impl LineTable {
    /// Allocates `num_sets × ways` invalid lines.
    ///
    /// # Panics
    ///
    /// Panics if the table cannot be allocated. Use [`LineTable::try_new`] to
    /// handle that case.
    pub fn new(num_sets: usize, ways: NonZeroUsize) -> Self {
        Self::try_new(num_sets, ways)
            .unwrap_or_else(|err| panic!("line table of {num_sets} x {ways}: {err}"))
    }

    /// Allocates `num_sets × ways` invalid lines, reporting allocation failure.
    pub fn try_new(num_sets: usize, ways: NonZeroUsize) -> Result<Self, TryReserveError> {
        // A saturated length always fails the reservation
        let len = num_sets.saturating_mul(ways.get());
        let mut lines = Vec::new();
        lines.try_reserve_exact(len)?;
        lines.resize(len, Line::default());
        Ok(LineTable { lines, ways })
    }

    /// Number of sets.
    #[inline]
    pub fn num_sets(&self) -> usize {
        self.lines.len() / self.ways.get()
    }

    /// Lines per set.
    #[inline]
    pub fn ways(&self) -> NonZeroUsize {
        self.ways
    }

    /// The lines of one set, in slot order.
    #[inline]
    pub fn lines(&self, set: usize) -> &[Line] {
        let start = set * self.ways.get();
        &self.lines[start..start + self.ways.get()]
    }

    #[inline]
    fn lines_mut(&mut self, set: usize) -> &mut [Line] {
        let start = set * self.ways.get();
        &mut self.lines[start..start + self.ways.get()]
    }

    /// Slot of the first valid line in `set` carrying `tag`.
    pub fn find_valid_line(&self, set: usize, tag: u64) -> Option<usize> {
        self.lines(set)
            .iter()
            .position(|line| line.tag == tag && line.valid)
    }

    /// Slot of the first invalid line in `set`.
    pub fn find_empty_slot(&self, set: usize) -> Option<usize> {
        self.lines(set).iter().position(|line| !line.valid)
    }

    /// Slot of the first line in `set` whose tag is `tag`, valid or not.
    ///
    /// Used to resolve an eviction victim, whose line is always valid.
    pub fn find_tag(&self, set: usize, tag: u64) -> Option<usize> {
        self.lines(set).iter().position(|line| line.tag == tag)
    }

    /// Stores `tag` in `slot` of `set` and marks the line valid.
    pub fn write_line(&mut self, set: usize, slot: usize, tag: u64) {
        let line = &mut self.lines_mut(set)[slot];
        line.tag = tag;
        line.valid = true;
    }

    /// Number of valid lines in `set`.
    pub fn valid_count(&self, set: usize) -> usize {
        self.lines(set).iter().filter(|line| line.valid).count()
    }

    /// Number of valid lines across all sets.
    pub fn total_valid(&self) -> usize {
        self.lines.iter().filter(|line| line.valid).count()
    }

    /// Invalidates every line without releasing storage.
    pub fn clear(&mut self) {
        self.lines.fill(Line::default());
    }
}

/// One row per set, in the form `Set 3: 1:0x2a 0:-`, each entry being the
/// valid bit and tag of a slot.
impl fmt::Display for LineTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for set in 0..self.num_sets() {
            write!(f, "Set {set}:")?;
            for line in self.lines(set) {
                if line.valid {
                    write!(f, " 1:{:#x}", line.tag)?;
                } else {
                    f.write_str(" 0:-")?;
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
