// Data models for cache simulation

use csim::{CacheConfig, Operation, SimulatorMetrics, Summary};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;

/// One parsed trace record
#[derive(Debug, Clone)]
pub struct TraceRecord {
    /// The operation handed to the simulator
    pub operation: Operation,
    /// Declared access size in bytes (not used by the simulator)
    pub size: u64,
    /// The trimmed source line, echoed in verbose mode
    pub raw: String,
}

impl TraceRecord {
    /// Create a new record
    pub fn new(operation: Operation, size: u64, raw: String) -> Self {
        Self {
            operation,
            size,
            raw,
        }
    }
}

/// Configuration for a simulation run
#[derive(Debug, Clone)]
pub struct SimulationConfig {
    /// Cache geometry shared by every trace
    pub cache: CacheConfig,
    /// Trace files, simulated independently in this order
    pub traces: Vec<PathBuf>,
    /// Print the outcome of every operation
    pub verbose: bool,
}

/// Statistics for a single trace
#[derive(Debug, Clone)]
pub struct TraceStats {
    /// Trace file the numbers belong to (None when no trace was given)
    pub trace: Option<PathBuf>,
    /// Counters reported by the simulator
    pub metrics: SimulatorMetrics,
    /// Distinct blocks (address >> b) touched by the trace
    pub unique_blocks: usize,
    /// Sum of declared access sizes
    pub bytes_accessed: u64,
    /// Wall time spent replaying the trace (includes I/O)
    pub duration: Duration,
}

impl TraceStats {
    /// Stats for a run that saw no operations
    pub fn empty(trace: Option<PathBuf>) -> Self {
        Self {
            trace,
            metrics: SimulatorMetrics::new(),
            unique_blocks: 0,
            bytes_accessed: 0,
            duration: Duration::ZERO,
        }
    }

    /// Hits, misses and evictions
    pub fn summary(&self) -> Summary {
        self.metrics.summary()
    }

    /// Display name of the trace
    pub fn name(&self) -> String {
        match &self.trace {
            Some(path) => path.display().to_string(),
            None => "<none>".to_string(),
        }
    }

    /// Hit rate as percentage
    pub fn hit_rate(&self) -> f64 {
        self.metrics.hit_rate() * 100.0
    }

    /// Miss rate as percentage
    pub fn miss_rate(&self) -> f64 {
        self.metrics.miss_rate() * 100.0
    }
}

/// Results of a simulation run
#[derive(Debug, Clone)]
pub struct SimulationResult {
    /// Cache geometry used
    pub cache: CacheConfig,
    /// Per-trace statistics, in input order
    pub traces: Vec<TraceStats>,
    /// Duration of the whole run
    pub duration: Duration,
}

impl SimulationResult {
    /// Counters summed over every trace
    pub fn total(&self) -> Summary {
        self.traces
            .iter()
            .map(TraceStats::summary)
            .fold(Summary::default(), |acc, s| Summary {
                hits: acc.hits + s.hits,
                misses: acc.misses + s.misses,
                evictions: acc.evictions + s.evictions,
            })
    }
}

/// CSV export row for simulation results
#[derive(Debug, Serialize)]
pub struct CsvResultRow {
    pub trace: String,
    pub set_index_bits: u32,
    pub lines_per_set: usize,
    pub block_offset_bits: u32,
    pub operations: u64,
    pub loads: u64,
    pub stores: u64,
    pub modifies: u64,
    pub accesses: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
    pub miss_rate: f64,
    pub unique_blocks: usize,
    pub bytes_accessed: u64,
    pub simulation_time_ms: u64,
}

impl CsvResultRow {
    /// Build a row from one trace's statistics
    pub fn new(cache: &CacheConfig, stats: &TraceStats) -> Self {
        let m = &stats.metrics;
        Self {
            trace: stats.name(),
            set_index_bits: cache.set_index_bits,
            lines_per_set: cache.ways(),
            block_offset_bits: cache.block_offset_bits,
            operations: m.operations(),
            loads: m.loads,
            stores: m.stores,
            modifies: m.modifies,
            accesses: m.accesses(),
            hits: m.hits,
            misses: m.misses,
            evictions: m.evictions,
            hit_rate: stats.hit_rate(),
            miss_rate: stats.miss_rate(),
            unique_blocks: stats.unique_blocks,
            bytes_accessed: stats.bytes_accessed,
            simulation_time_ms: stats.duration.as_millis() as u64,
        }
    }
}
