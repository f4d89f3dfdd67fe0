//! Simulation runner for memory traces
//!
//! The cache is allocated once per run and reset before every trace file, so
//! results for one trace never depend on the traces before it. Records are
//! streamed from disk; memory usage is proportional to the cache geometry and
//! the number of distinct blocks a trace touches, not to the trace length.

use std::path::Path;
use std::time::Instant;

use ahash::AHashSet;
use csim::CacheSimulator;

use crate::input::TraceReader;
use crate::models::{SimulationConfig, SimulationResult, TraceStats};

/// Runner for cache simulations
pub struct SimulationRunner {
    config: SimulationConfig,
}

impl SimulationRunner {
    /// Create a new simulation runner
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Configuration the runner was built with
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Replay every configured trace.
    ///
    /// With no trace the result holds a single all-zero entry, matching a run
    /// over an empty operation sequence.
    pub fn run(&self) -> Result<SimulationResult, String> {
        // Allocate the cache before opening any file; it is reset per trace
        let mut simulator = self.build_simulator()?;

        let start_time = Instant::now();
        let mut traces = Vec::with_capacity(self.config.traces.len().max(1));

        if self.config.traces.is_empty() {
            traces.push(TraceStats::empty(None));
        }

        for path in &self.config.traces {
            simulator.reset();
            traces.push(self.replay(&mut simulator, path)?);
        }

        Ok(SimulationResult {
            cache: self.config.cache,
            traces,
            duration: start_time.elapsed(),
        })
    }

    /// Replay a single trace file against a cold cache.
    pub fn run_trace(&self, path: &Path) -> Result<TraceStats, String> {
        let mut simulator = self.build_simulator()?;
        self.replay(&mut simulator, path)
    }

    fn build_simulator(&self) -> Result<CacheSimulator, String> {
        CacheSimulator::new(self.config.cache)
            .map_err(|err| format!("Invalid cache configuration: {err}"))
    }

    /// Stream one trace through `simulator`, which must start cold.
    fn replay(&self, simulator: &mut CacheSimulator, path: &Path) -> Result<TraceStats, String> {
        let records = TraceReader::stream_operations(path)
            .map_err(|err| format!("Failed to open trace {}: {err}", path.display()))?;

        let block_offset_bits = self.config.cache.block_offset_bits;
        let mut unique_blocks = AHashSet::new();
        let mut bytes_accessed: u64 = 0;
        let start_time = Instant::now();

        for result in records {
            let record = result.map_err(|err| format!("Failed to read trace: {err}"))?;

            let report = simulator.process(record.operation);
            if self.config.verbose {
                println!("{} {}", record.raw, report);
            }

            unique_blocks.insert(
                record
                    .operation
                    .address
                    .checked_shr(block_offset_bits)
                    .unwrap_or(0),
            );
            bytes_accessed = bytes_accessed.saturating_add(record.size);
        }

        Ok(TraceStats {
            trace: Some(path.to_path_buf()),
            metrics: simulator.metrics().clone(),
            unique_blocks: unique_blocks.len(),
            bytes_accessed,
            duration: start_time.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use csim::{CacheConfig, Summary};
    use std::fs;
    use std::io::Write;
    use std::path::PathBuf;

    const YI_TRACE: &str = " L 10,1\n M 20,1\n L 22,1\n S 18,1\n L 110,1\n L 210,1\n M 12,1\n";

    fn create_temp_dir(test_name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "csim_runner_test_{}_{}",
            test_name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).expect("Failed to create temp dir");
        dir
    }

    fn write_trace(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).expect("Failed to create trace");
        file.write_all(contents.as_bytes()).expect("Failed to write trace");
        path
    }

    fn runner(s: u32, e: usize, b: u32, traces: Vec<PathBuf>) -> SimulationRunner {
        SimulationRunner::new(SimulationConfig {
            cache: CacheConfig::new(s, e, b).unwrap(),
            traces,
            verbose: false,
        })
    }

    #[test]
    fn test_yi_trace_totals() {
        let dir = create_temp_dir("yi");
        let trace = write_trace(&dir, "yi.trace", YI_TRACE);

        let result = runner(4, 1, 4, vec![trace.clone()]).run().unwrap();
        assert_eq!(result.traces.len(), 1);

        let stats = &result.traces[0];
        assert_eq!(stats.trace.as_deref(), Some(trace.as_path()));
        assert_eq!(
            stats.summary(),
            Summary {
                hits: 4,
                misses: 5,
                evictions: 3
            }
        );
        assert_eq!(stats.metrics.modifies, 2);
        assert_eq!(stats.metrics.operations(), 7);
        // Blocks 0x1, 0x2, 0x11, 0x21
        assert_eq!(stats.unique_blocks, 4);
        assert_eq!(stats.bytes_accessed, 7);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_each_trace_starts_cold() {
        let dir = create_temp_dir("cold");
        let a = write_trace(&dir, "a.trace", "L 0,1\nL 0,1\n");
        let b = write_trace(&dir, "b.trace", "L 0,1\n");

        let result = runner(2, 2, 2, vec![a, b]).run().unwrap();
        assert_eq!(result.traces[0].summary().to_string(), "hits:1 misses:1 evictions:0");
        // A shared cache would have made this a hit
        assert_eq!(result.traces[1].summary().to_string(), "hits:0 misses:1 evictions:0");
        assert_eq!(result.total().to_string(), "hits:1 misses:2 evictions:0");

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_no_trace_gives_zero_summary() {
        let result = runner(1, 1, 1, Vec::new()).run().unwrap();
        assert_eq!(result.traces.len(), 1);
        assert!(result.traces[0].trace.is_none());
        assert_eq!(
            result.traces[0].summary().to_string(),
            "hits:0 misses:0 evictions:0"
        );
    }

    #[test]
    fn test_missing_trace_is_an_error() {
        let dir = create_temp_dir("missing");
        let err = runner(1, 1, 1, vec![dir.join("absent.trace")])
            .run()
            .unwrap_err();
        assert!(err.contains("absent.trace"), "unexpected error: {err}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_malformed_trace_aborts_run() {
        let dir = create_temp_dir("malformed");
        let trace = write_trace(&dir, "bad.trace", "L 10,1\nQ 20,1\n");
        let err = runner(1, 1, 1, vec![trace]).run().unwrap_err();
        assert!(err.contains("line 2"), "unexpected error: {err}");
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_unallocatable_geometry_reported_before_reading() {
        // Valid on paper, too large to allocate; the trace is never opened
        let runner = runner(57, 1, 4, vec![PathBuf::from("never-opened.trace")]);
        let err = runner.run().unwrap_err();
        assert!(err.starts_with("Invalid cache configuration"), "unexpected error: {err}");
        assert!(!err.contains("never-opened"));
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let mut config = CacheConfig::new(1, 1, 1).unwrap();
        config.set_index_bits = 40;
        config.block_offset_bits = 40;
        let runner = SimulationRunner::new(SimulationConfig {
            cache: config,
            traces: Vec::new(),
            verbose: false,
        });
        assert!(runner.run().is_err());
    }
}
