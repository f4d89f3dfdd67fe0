//! Simulation Metrics
//!
//! Counters accumulated by a [`CacheSimulator`](crate::CacheSimulator) over a
//! single run, plus BTreeMap-based reporting.
//!
//! # Why BTreeMap over HashMap?
//!
//! Metrics are reported through a BTreeMap so keys always come out in the same
//! order. Traces are usually compared run against run, and stable output makes
//! diffs and CSV columns reproducible.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use core::fmt;

use crate::simulator::OpKind;

/// Aggregate outcome of a simulation run.
///
/// `Display` renders the classic one-line summary:
///
/// ```
/// use csim::Summary;
///
/// let summary = Summary { hits: 4, misses: 5, evictions: 3 };
/// assert_eq!(summary.to_string(), "hits:4 misses:5 evictions:3");
/// ```
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Summary {
    /// Accesses that found their block cached.
    pub hits: u64,
    /// Accesses that did not.
    pub misses: u64,
    /// Misses that had to overwrite a valid line.
    pub evictions: u64,
}

impl Summary {
    /// Total accesses, `hits + misses`.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hits:{} misses:{} evictions:{}",
            self.hits, self.misses, self.evictions
        )
    }
}

/// Counters tracked by the simulator.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimulatorMetrics {
    /// Number of accesses that hit.
    pub hits: u64,

    /// Number of accesses that missed.
    pub misses: u64,

    /// Number of misses that replaced a valid line.
    pub evictions: u64,

    /// Load operations processed.
    pub loads: u64,

    /// Store operations processed.
    pub stores: u64,

    /// Modify operations processed (each one is two accesses).
    pub modifies: u64,
}

impl SimulatorMetrics {
    /// Creates zeroed metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an access that found its block.
    #[inline]
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Records an access that did not find its block.
    #[inline]
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Records a miss that overwrote the least recently used line.
    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records one trace operation of the given kind.
    #[inline]
    pub fn record_operation(&mut self, kind: OpKind) {
        match kind {
            OpKind::Load => self.loads += 1,
            OpKind::Store => self.stores += 1,
            OpKind::Modify => self.modifies += 1,
        }
    }

    /// Trace operations processed.
    pub fn operations(&self) -> u64 {
        self.loads + self.stores + self.modifies
    }

    /// Cache accesses performed; a modify counts twice.
    pub fn accesses(&self) -> u64 {
        self.hits + self.misses
    }

    /// Fraction of accesses that hit, between 0.0 and 1.0.
    pub fn hit_rate(&self) -> f64 {
        ratio(self.hits, self.accesses())
    }

    /// Fraction of accesses that missed, between 0.0 and 1.0.
    pub fn miss_rate(&self) -> f64 {
        ratio(self.misses, self.accesses())
    }

    /// Fraction of misses that evicted a line, between 0.0 and 1.0.
    pub fn eviction_rate(&self) -> f64 {
        ratio(self.evictions, self.misses)
    }

    /// The three headline counters.
    pub fn summary(&self) -> Summary {
        Summary {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
        }
    }

    /// Resets every counter to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Convert metrics to a BTreeMap for reporting
    ///
    /// # Returns
    /// A BTreeMap containing every counter and derived rate, keyed alphabetically
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        // Counters
        metrics.insert("accesses".to_string(), self.accesses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("hits".to_string(), self.hits as f64);
        metrics.insert("misses".to_string(), self.misses as f64);

        // Operation mix
        metrics.insert("loads".to_string(), self.loads as f64);
        metrics.insert("modifies".to_string(), self.modifies as f64);
        metrics.insert("operations".to_string(), self.operations() as f64);
        metrics.insert("stores".to_string(), self.stores as f64);

        // Rates (0.0 to 1.0)
        metrics.insert("eviction_rate".to_string(), self.eviction_rate());
        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics
    }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole > 0 {
        part as f64 / whole as f64
    } else {
        0.0
    }
}

/// Uniform metrics interface for cache models.
///
/// Uses BTreeMap so that reports, tests and CSV exports see metrics in a
/// deterministic order.
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs in deterministic order
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Replacement policy name for identification (e.g. "LRU")
    fn algorithm_name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_metrics() {
        let m = SimulatorMetrics::new();
        assert_eq!(m.accesses(), 0);
        assert_eq!(m.hit_rate(), 0.0);
        assert_eq!(m.miss_rate(), 0.0);
        assert_eq!(m.eviction_rate(), 0.0);
        assert_eq!(m.summary(), Summary::default());
    }

    #[test]
    fn test_rates() {
        let mut m = SimulatorMetrics::new();
        m.record_hit();
        m.record_miss();
        m.record_miss();
        m.record_miss();
        m.record_eviction();
        assert_eq!(m.accesses(), 4);
        assert!((m.hit_rate() - 0.25).abs() < f64::EPSILON);
        assert!((m.miss_rate() - 0.75).abs() < f64::EPSILON);
        assert!((m.eviction_rate() - 1.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_operation_mix() {
        let mut m = SimulatorMetrics::new();
        m.record_operation(OpKind::Load);
        m.record_operation(OpKind::Modify);
        m.record_operation(OpKind::Modify);
        m.record_operation(OpKind::Store);
        assert_eq!((m.loads, m.stores, m.modifies), (1, 1, 2));
        assert_eq!(m.operations(), 4);
    }

    #[test]
    fn test_btreemap_keys_are_sorted() {
        let mut m = SimulatorMetrics::new();
        m.record_hit();
        let map = m.to_btreemap();
        let keys: alloc::vec::Vec<&str> = map.keys().map(|k| k.as_str()).collect();
        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
        assert_eq!(map.get("hits"), Some(&1.0));
        assert_eq!(map.get("hit_rate"), Some(&1.0));
    }

    #[test]
    fn test_summary_display() {
        let summary = Summary {
            hits: 0,
            misses: 2,
            evictions: 1,
        };
        assert_eq!(
            alloc::format!("{summary}"),
            "hits:0 misses:2 evictions:1"
        );
        assert_eq!(summary.accesses(), 2);
    }

    #[test]
    fn test_reset() {
        let mut m = SimulatorMetrics::new();
        m.record_hit();
        m.record_operation(OpKind::Store);
        m.reset();
        assert_eq!(m, SimulatorMetrics::default());
    }
}
