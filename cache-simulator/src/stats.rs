// Statistics reporting for cache simulation

use crate::models::{CsvResultRow, SimulationResult, TraceStats};
use csim::Summary;
use std::path::Path;

/// Reports statistics collected by a simulation run
pub struct SimulationStats {
    result: SimulationResult,
}

impl SimulationStats {
    /// Create SimulationStats from a SimulationResult
    pub fn from_result(result: &SimulationResult) -> Self {
        Self {
            result: result.clone(),
        }
    }

    /// Per-trace statistics
    pub fn traces(&self) -> &[TraceStats] {
        &self.result.traces
    }

    /// Counters summed over every trace
    pub fn total(&self) -> Summary {
        self.result.total()
    }

    /// Summary lines in the classic `hits:H misses:M evictions:V` format.
    ///
    /// A single trace yields exactly one bare line; several traces prefix each
    /// line with the trace name.
    pub fn summary_lines(&self) -> Vec<String> {
        match self.result.traces.as_slice() {
            [only] => vec![only.summary().to_string()],
            traces => traces
                .iter()
                .map(|stats| format!("{}: {}", stats.name(), stats.summary()))
                .collect(),
        }
    }

    /// Print a summary report of the simulation results
    pub fn print_summary(&self) {
        if self.result.traces.len() <= 1 {
            for line in self.summary_lines() {
                println!("{line}");
            }
            return;
        }

        println!("Cache Simulation Summary");
        println!("========================");
        println!("Cache: {}", self.result.cache);
        if let Some(bytes) = self.result.cache.capacity_bytes() {
            println!("Capacity: {bytes} bytes");
        }
        println!("Traces: {}", self.result.traces.len());
        println!();

        for line in self.summary_lines() {
            println!("{line}");
        }

        println!();
        println!(
            "{:<32} {:>12} {:>12} {:>12} {:>12} {:>8} {:>8} {:>10}",
            "Trace", "Ops", "Hits", "Misses", "Evictions", "HitRate", "MissRate", "Blocks"
        );
        println!("{}", "-".repeat(112));

        for stats in &self.result.traces {
            let summary = stats.summary();
            println!(
                "{:<32} {:>12} {:>12} {:>12} {:>12} {:>7.2}% {:>7.2}% {:>10}",
                stats.name(),
                stats.metrics.operations(),
                summary.hits,
                summary.misses,
                summary.evictions,
                stats.hit_rate(),
                stats.miss_rate(),
                stats.unique_blocks
            );
        }

        println!("{}", "-".repeat(112));
        println!("Total: {}", self.total());
        println!("Simulation completed in {:.2?}", self.result.duration);
    }

    /// Export results to a CSV file, one row per trace
    pub fn export_csv(&self, path: &Path) -> Result<(), std::io::Error> {
        let mut writer = csv::Writer::from_path(path)?;

        for stats in &self.result.traces {
            writer.serialize(CsvResultRow::new(&self.result.cache, stats))?;
        }

        writer.flush()?;
        Ok(())
    }
}
