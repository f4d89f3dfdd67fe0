#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Data Flow
//!
//! ```text
//! ┌────────────┐   ┌─────────────────────────────────────────────────────┐
//! │ operations │──▶│                  CacheSimulator                     │
//! │ L/S/M addr │   │                                                     │
//! └────────────┘   │  Address::decode ──▶ LineTable ──▶ RecencyTracker   │
//!                  │  (tag, set, off)     find/place      touch / victim │
//!                  │                          │                          │
//!                  │                          ▼                          │
//!                  │                  SimulatorMetrics                   │
//!                  └──────────────────────────┬──────────────────────────┘
//!                                             ▼
//!                                 Summary { hits, misses, evictions }
//! ```
//!
//! ## Quick Reference
//!
//! | Type | Role |
//! |------|------|
//! | [`CacheConfig`] | Geometry: `s` set-index bits, `E` lines per set, `b` block-offset bits |
//! | [`Address`] | Tag / set / offset split of a 64-bit address |
//! | [`LineTable`] | `2^s × E` valid/tag lines |
//! | [`RecencyTracker`] | Per-set most-recently-used-first tag order |
//! | [`CacheSimulator`] | Replays [`Operation`]s and counts outcomes |
//! | [`Summary`] | Hits, misses and evictions |
//!
//! ## Code Examples
//!
//! ### Replaying a trace
//!
//! ```rust
//! use csim::{CacheConfig, CacheSimulator, Operation};
//!
//! let config = CacheConfig::new(4, 1, 4).unwrap();
//! let mut sim = CacheSimulator::new(config).unwrap();
//!
//! let ops = [
//!     Operation::load(0x10),
//!     Operation::modify(0x20),
//!     Operation::load(0x22),
//!     Operation::store(0x18),
//! ];
//! let summary = sim.run(ops);
//! assert_eq!(summary.to_string(), "hits:3 misses:2 evictions:0");
//! ```
//!
//! ### Verbose outcomes
//!
//! ```rust
//! use csim::{AccessOutcome, CacheConfig, CacheSimulator, Operation};
//!
//! let mut sim = CacheSimulator::new(CacheConfig::new(0, 1, 0).unwrap()).unwrap();
//! assert_eq!(sim.load(1), AccessOutcome::Miss);
//!
//! let report = sim.process(Operation::modify(2));
//! assert_eq!(report.to_string(), "miss eviction hit");
//! ```
//!
//! ## Modules
//!
//! - [`config`]: Cache geometry and validation
//! - [`address`]: Address decomposition
//! - [`line_table`]: Physical line storage
//! - [`recency`]: LRU recency tracking
//! - [`simulator`]: The cache model and operation types
//! - [`metrics`]: Counters and reporting

#![no_std]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

/// Cache geometry.
///
/// Provides [`CacheConfig`] and the [`ConfigError`] returned when a geometry
/// cannot be simulated.
pub mod config;

/// Address decomposition into tag, set index and block offset.
pub mod address;

/// Fixed-size storage of valid/tag lines.
pub mod line_table;

/// Per-set LRU ordering of tags.
///
/// Decides which line a miss in a full set replaces.
pub mod recency;

/// The set-associative cache model.
///
/// Decodes each operation's address, looks it up, places or evicts on a miss
/// and keeps the counters.
pub mod simulator;

/// Simulation metrics.
///
/// Provides hit/miss/eviction counters and deterministic BTreeMap reporting.
pub mod metrics;

pub use address::Address;
pub use config::{CacheConfig, ConfigError};
pub use line_table::{Line, LineTable};
pub use metrics::{CacheMetrics, SimulatorMetrics, Summary};
pub use recency::RecencyTracker;
pub use simulator::{
    AccessOutcome, CacheSimulator, OpKind, Operation, OperationReport, TraceEvent,
};
