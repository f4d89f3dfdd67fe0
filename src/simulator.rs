//! Set-Associative Cache Simulator
//!
//! This module ties the address decoder, the line table and the recency
//! tracker together and replays memory operations against them.
//!
//! # Algorithm
//!
//! Every access decodes its address into `(tag, set, offset)` and looks for a
//! valid line in that set carrying the tag:
//!
//! - **Hit**: the tag becomes the most recently used entry of the set.
//! - **Miss with a free line**: the tag is written to the first invalid line
//!   and becomes most recently used.
//! - **Miss in a full set**: the least recently used tag is looked up in the
//!   set, its line is overwritten with the new tag, and the new tag becomes
//!   most recently used. This counts as an eviction.
//!
//! Stores behave exactly like loads: no data, dirty bits or write policy are
//! modelled, only which blocks are resident. A modify is a load followed by a
//! store to the same address, so its second access always hits.
//!
//! # Performance Characteristics
//!
//! - Every access is O(E) in the associativity.
//! - Storage for `2^s × E` lines and recency slots is allocated once in
//!   [`CacheSimulator::new`]; processing operations never allocates.
//!
//! # Thread Safety
//!
//! A simulator is plain owned data with `&mut self` mutation. Independent
//! runs use independent instances.

extern crate alloc;

use alloc::collections::BTreeMap;
use alloc::string::String;
use core::fmt;

use crate::address::Address;
use crate::config::{CacheConfig, ConfigError};
use crate::line_table::LineTable;
use crate::metrics::{CacheMetrics, SimulatorMetrics, Summary};
use crate::recency::RecencyTracker;

/// Kind of a trace operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpKind {
    /// Data load, one access.
    Load,
    /// Data store, one access modelled as a load.
    Store,
    /// Load followed by a store to the same address, two accesses.
    Modify,
}

impl OpKind {
    /// Parses the single-letter trace code (`L`, `S` or `M`).
    pub fn from_char(code: char) -> Option<Self> {
        match code {
            'L' => Some(OpKind::Load),
            'S' => Some(OpKind::Store),
            'M' => Some(OpKind::Modify),
            _ => None,
        }
    }

    /// The single-letter trace code.
    pub fn as_char(&self) -> char {
        match self {
            OpKind::Load => 'L',
            OpKind::Store => 'S',
            OpKind::Modify => 'M',
        }
    }

    /// Number of cache accesses the operation performs.
    pub fn accesses(&self) -> u64 {
        match self {
            OpKind::Load | OpKind::Store => 1,
            OpKind::Modify => 2,
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A single memory operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Operation {
    /// What kind of access.
    pub kind: OpKind,
    /// Byte address accessed.
    pub address: u64,
}

impl Operation {
    /// Creates an operation.
    pub fn new(kind: OpKind, address: u64) -> Self {
        Self { kind, address }
    }

    /// A load from `address`.
    pub fn load(address: u64) -> Self {
        Self::new(OpKind::Load, address)
    }

    /// A store to `address`.
    pub fn store(address: u64) -> Self {
        Self::new(OpKind::Store, address)
    }

    /// A modify of `address`.
    pub fn modify(address: u64) -> Self {
        Self::new(OpKind::Modify, address)
    }
}

/// Reportable event for verbose output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraceEvent {
    /// The access hit.
    Hit,
    /// The access missed.
    Miss,
    /// The miss overwrote a valid line.
    Eviction,
}

impl TraceEvent {
    /// Lowercase label used in verbose traces.
    pub fn as_str(&self) -> &'static str {
        match self {
            TraceEvent::Hit => "hit",
            TraceEvent::Miss => "miss",
            TraceEvent::Eviction => "eviction",
        }
    }
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single cache access. Exactly one applies to every access.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessOutcome {
    /// Found a valid line with the tag.
    Hit,
    /// Missed and filled a free line.
    Miss,
    /// Missed and replaced the least recently used line.
    MissEviction,
}

impl AccessOutcome {
    /// Events in report order: `Miss` comes before `Eviction`.
    pub fn events(&self) -> impl Iterator<Item = TraceEvent> {
        let events: &'static [TraceEvent] = match self {
            AccessOutcome::Hit => &[TraceEvent::Hit],
            AccessOutcome::Miss => &[TraceEvent::Miss],
            AccessOutcome::MissEviction => &[TraceEvent::Miss, TraceEvent::Eviction],
        };
        events.iter().copied()
    }

    /// Whether the access hit.
    pub fn is_hit(&self) -> bool {
        matches!(self, AccessOutcome::Hit)
    }

    /// Whether the access evicted a line.
    pub fn is_eviction(&self) -> bool {
        matches!(self, AccessOutcome::MissEviction)
    }
}

/// Outcomes of one operation: one access, or two for a modify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationReport {
    /// Outcome of the first (or only) access.
    pub first: AccessOutcome,
    /// Outcome of the store half of a modify.
    pub second: Option<AccessOutcome>,
}

impl OperationReport {
    fn single(outcome: AccessOutcome) -> Self {
        Self {
            first: outcome,
            second: None,
        }
    }

    /// Access outcomes in order.
    pub fn outcomes(&self) -> impl Iterator<Item = AccessOutcome> {
        core::iter::once(self.first).chain(self.second)
    }

    /// Flattened trace events in order, e.g. `miss eviction hit`.
    pub fn events(&self) -> impl Iterator<Item = TraceEvent> {
        self.outcomes().flat_map(|outcome| outcome.events())
    }
}

impl fmt::Display for OperationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, event) in self.events().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(event.as_str())?;
        }
        Ok(())
    }
}

/// A set-associative cache with LRU replacement.
///
/// # Examples
///
/// ```
/// use csim::{CacheConfig, CacheSimulator, Operation};
///
/// // 2 sets, direct-mapped, 2-byte blocks
/// let config = CacheConfig::new(1, 1, 1).unwrap();
/// let mut sim = CacheSimulator::new(config).unwrap();
///
/// let summary = sim.run([Operation::load(0x10), Operation::load(0x20)]);
/// assert_eq!(summary.to_string(), "hits:0 misses:2 evictions:1");
/// ```
#[derive(Debug, Clone)]
pub struct CacheSimulator {
    config: CacheConfig,
    lines: LineTable,
    recency: RecencyTracker,
    metrics: SimulatorMetrics,
}

impl CacheSimulator {
    /// Allocates an empty cache for `config`.
    ///
    /// # Errors
    ///
    /// Returns the [`ConfigError`] from [`CacheConfig::validate`] if the
    /// geometry cannot be simulated, or [`ConfigError::TooManyLines`] if its
    /// storage cannot be allocated.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let num_sets = config.num_sets();
        let too_many_lines = |_| ConfigError::TooManyLines {
            set_index_bits: config.set_index_bits,
            lines_per_set: config.ways(),
        };
        Ok(CacheSimulator {
            config,
            lines: LineTable::try_new(num_sets, config.lines_per_set).map_err(too_many_lines)?,
            recency: RecencyTracker::try_new(num_sets, config.lines_per_set)
                .map_err(too_many_lines)?,
            metrics: SimulatorMetrics::new(),
        })
    }

    /// The configuration this cache was built with.
    #[inline]
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Physical line storage, for inspection.
    #[inline]
    pub fn line_table(&self) -> &LineTable {
        &self.lines
    }

    /// Recency state, for inspection.
    #[inline]
    pub fn recency(&self) -> &RecencyTracker {
        &self.recency
    }

    /// Counters accumulated so far.
    #[inline]
    pub fn metrics(&self) -> &SimulatorMetrics {
        &self.metrics
    }

    /// Hit, miss and eviction counts accumulated so far.
    #[inline]
    pub fn summary(&self) -> Summary {
        self.metrics.summary()
    }

    /// Number of valid lines in the whole cache.
    pub fn valid_lines(&self) -> usize {
        self.lines.total_valid()
    }

    /// Processes a single operation.
    pub fn process(&mut self, op: Operation) -> OperationReport {
        self.metrics.record_operation(op.kind);
        match op.kind {
            OpKind::Load => OperationReport::single(self.access(op.address)),
            OpKind::Store => OperationReport::single(self.store_access(op.address)),
            OpKind::Modify => self.modify_access(op.address),
        }
    }

    /// Processes every operation in order and returns the running summary.
    pub fn run<I>(&mut self, ops: I) -> Summary
    where
        I: IntoIterator<Item = Operation>,
    {
        for op in ops {
            self.process(op);
        }
        self.summary()
    }

    /// Loads `address`.
    pub fn load(&mut self, address: u64) -> AccessOutcome {
        self.process(Operation::load(address)).first
    }

    /// Stores to `address`. Modelled exactly as a load.
    pub fn store(&mut self, address: u64) -> AccessOutcome {
        self.process(Operation::store(address)).first
    }

    /// Modifies `address`: a load followed by a store.
    pub fn modify(&mut self, address: u64) -> OperationReport {
        self.process(Operation::modify(address))
    }

    /// Invalidates all lines and zeroes the counters, keeping the allocation.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.recency.clear();
        self.metrics.reset();
    }

    fn store_access(&mut self, address: u64) -> AccessOutcome {
        self.access(address)
    }

    fn modify_access(&mut self, address: u64) -> OperationReport {
        let first = self.access(address);
        let second = self.store_access(address);
        OperationReport {
            first,
            second: Some(second),
        }
    }

    /// One cache access: the load path every operation reduces to.
    fn access(&mut self, address: u64) -> AccessOutcome {
        let decoded = Address::decode(address, &self.config);
        let set = decoded.set_index();

        if self.lines.find_valid_line(set, decoded.tag).is_some() {
            self.metrics.record_hit();
            self.recency.touch(set, decoded.tag);
            AccessOutcome::Hit
        } else {
            self.metrics.record_miss();
            self.place(address)
        }
    }

    /// Fills a free line in the address's set, or evicts when the set is full.
    fn place(&mut self, address: u64) -> AccessOutcome {
        let decoded = Address::decode(address, &self.config);
        let set = decoded.set_index();

        match self.lines.find_empty_slot(set) {
            Some(slot) => {
                self.lines.write_line(set, slot, decoded.tag);
                self.recency.touch(set, decoded.tag);
                AccessOutcome::Miss
            }
            None => {
                self.evict(decoded.tag, set);
                AccessOutcome::MissEviction
            }
        }
    }

    /// Replaces the least recently used line of a full set with `tag`.
    ///
    /// A full set holds `E` distinct valid tags and its recency order lists
    /// exactly those tags, so the victim is always resident. Should the two
    /// ever disagree, slot 0 is replaced so the new tag is still cached.
    fn evict(&mut self, tag: u64, set: usize) {
        let slot = self
            .recency
            .eviction_candidate(set)
            .and_then(|victim| self.lines.find_tag(set, victim))
            .unwrap_or(0);

        self.lines.write_line(set, slot, tag);
        self.recency.touch(set, tag);
        self.metrics.record_eviction();
    }
}

impl CacheMetrics for CacheSimulator {
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.metrics.to_btreemap()
    }

    fn algorithm_name(&self) -> &'static str {
        "LRU"
    }
}
