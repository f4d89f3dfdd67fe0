use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

/// Base of the generated address range
const BASE_ADDRESS: u64 = 0x0400_0000;

/// Access sizes a generated record may declare
const ACCESS_SIZES: [u64; 4] = [1, 2, 4, 8];

/// Parameters for generating a synthetic memory trace
#[derive(Debug, Clone)]
pub struct TraceGenConfig {
    /// Number of data operations to write
    pub operations: u64,
    /// Number of distinct blocks the trace may touch
    pub working_set_blocks: u64,
    /// Block size in bytes used to lay out the working set
    pub block_size: u64,
    /// Percentage of the working set considered "hot"
    pub hot_percent: u8,
    /// Percentage of operations that target hot blocks
    pub hot_traffic_percent: u8,
    /// Percentage of operations that are loads
    pub load_percent: u8,
    /// Percentage of operations that are stores (the rest are modifies)
    pub store_percent: u8,
    /// Seed for reproducible traces; None seeds from entropy
    pub seed: Option<u64>,
    /// Output trace file
    pub output: PathBuf,
}

impl Default for TraceGenConfig {
    fn default() -> Self {
        Self {
            operations: 100_000,
            working_set_blocks: 4096,
            block_size: 64,
            hot_percent: 10,
            hot_traffic_percent: 80,
            load_percent: 60,
            store_percent: 25,
            seed: None,
            output: PathBuf::from("generated.trace"),
        }
    }
}

impl TraceGenConfig {
    /// Check that the parameters describe a usable trace
    pub fn validate(&self) -> Result<(), String> {
        if self.working_set_blocks == 0 {
            return Err("working set must contain at least one block".to_string());
        }
        if self.block_size == 0 {
            return Err("block size must be greater than zero".to_string());
        }
        if self.hot_percent > 100 || self.hot_traffic_percent > 100 {
            return Err("hot percentages must be between 0 and 100".to_string());
        }
        if u16::from(self.load_percent) + u16::from(self.store_percent) > 100 {
            return Err("load and store percentages must not exceed 100 combined".to_string());
        }
        let span = self.working_set_blocks.checked_mul(self.block_size);
        if span.and_then(|s| s.checked_add(BASE_ADDRESS)).is_none() {
            return Err("working set does not fit in a 64-bit address space".to_string());
        }
        Ok(())
    }

    /// Number of hot blocks, at least one when any are requested
    pub fn hot_blocks(&self) -> u64 {
        if self.hot_percent == 0 {
            return 0;
        }
        let hot = u128::from(self.working_set_blocks) * u128::from(self.hot_percent) / 100;
        u64::try_from(hot)
            .unwrap_or(self.working_set_blocks)
            .clamp(1, self.working_set_blocks)
    }
}

/// Generator for synthetic lackey-format traces
pub struct TraceGenerator {
    config: TraceGenConfig,
}

impl TraceGenerator {
    /// Create a new generator with the given configuration
    pub fn new(config: TraceGenConfig) -> Self {
        Self { config }
    }

    /// Generate the trace file described by the configuration
    pub fn generate(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.config.validate()?;

        if let Some(parent) = self.config.output.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        println!("Generating trace with the following parameters:");
        println!("  Operations: {}", self.config.operations);
        println!(
            "  Working set: {} blocks of {} bytes",
            self.config.working_set_blocks, self.config.block_size
        );
        println!(
            "  Hot blocks: {} ({}% of traffic)",
            self.config.hot_blocks(),
            self.config.hot_traffic_percent
        );
        println!(
            "  Mix: {}% loads, {}% stores, {}% modifies",
            self.config.load_percent,
            self.config.store_percent,
            100 - self.config.load_percent - self.config.store_percent
        );
        match self.config.seed {
            Some(seed) => println!("  Seed: {seed}"),
            None => println!("  Seed: random"),
        }
        println!("  Output: {}", self.config.output.display());

        let file = File::create(&self.config.output)?;
        let mut writer = BufWriter::new(file);
        self.write_trace(&mut writer)?;
        writer.flush()?;

        println!("Trace generation complete");
        Ok(())
    }

    /// Write the trace to any writer
    pub fn write_trace<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        self.config
            .validate()
            .map_err(|msg| io::Error::new(io::ErrorKind::InvalidInput, msg))?;

        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let hot_blocks = self.config.hot_blocks();
        let cold_blocks = self.config.working_set_blocks - hot_blocks;

        for _ in 0..self.config.operations {
            let use_hot = cold_blocks == 0
                || (hot_blocks > 0
                    && rng.gen_range(0..100u8) < self.config.hot_traffic_percent);
            let block = if use_hot {
                rng.gen_range(0..hot_blocks)
            } else {
                hot_blocks + rng.gen_range(0..cold_blocks)
            };

            let size = ACCESS_SIZES[rng.gen_range(0..ACCESS_SIZES.len())].min(self.config.block_size);
            // Aligned and fully inside the block
            let offset = rng.gen_range(0..self.config.block_size / size) * size;
            let address = BASE_ADDRESS + block * self.config.block_size + offset;

            let roll = rng.gen_range(0..100u16);
            let loads = u16::from(self.config.load_percent);
            let code = if roll < loads {
                'L'
            } else if roll < loads + u16::from(self.config.store_percent) {
                'S'
            } else {
                'M'
            };

            writeln!(writer, " {code} {address:x},{size}")?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::TraceReader;
    use csim::OpKind;
    use std::path::Path;

    /// Helper function to create a temp directory for tests
    fn create_temp_dir(test_name: &str) -> PathBuf {
        let temp_dir = std::env::temp_dir().join(format!(
            "csim_generator_test_{}_{}",
            test_name,
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&temp_dir);
        fs::create_dir_all(&temp_dir).expect("Failed to create temp directory");
        temp_dir
    }

    /// Helper function to clean up temp directory
    fn cleanup_temp_dir(path: &Path) {
        let _ = fs::remove_dir_all(path);
    }

    fn seeded(operations: u64, seed: u64) -> TraceGenConfig {
        TraceGenConfig {
            operations,
            seed: Some(seed),
            ..TraceGenConfig::default()
        }
    }

    fn render(config: TraceGenConfig) -> String {
        let mut buffer = Vec::new();
        TraceGenerator::new(config)
            .write_trace(&mut buffer)
            .expect("write to Vec cannot fail");
        String::from_utf8(buffer).expect("trace is ASCII")
    }

    #[test]
    fn test_default_config() {
        let config = TraceGenConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.hot_blocks(), 409);
        assert_eq!(config.output, PathBuf::from("generated.trace"));
    }

    #[test]
    fn test_validation_errors() {
        let bad = [
            TraceGenConfig {
                working_set_blocks: 0,
                ..TraceGenConfig::default()
            },
            TraceGenConfig {
                block_size: 0,
                ..TraceGenConfig::default()
            },
            TraceGenConfig {
                hot_percent: 101,
                ..TraceGenConfig::default()
            },
            TraceGenConfig {
                load_percent: 80,
                store_percent: 30,
                ..TraceGenConfig::default()
            },
            TraceGenConfig {
                working_set_blocks: u64::MAX,
                ..TraceGenConfig::default()
            },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?} should be rejected");
        }
    }

    #[test]
    fn test_hot_blocks_bounds() {
        let tiny = TraceGenConfig {
            working_set_blocks: 3,
            hot_percent: 10,
            ..TraceGenConfig::default()
        };
        assert_eq!(tiny.hot_blocks(), 1);

        let none = TraceGenConfig {
            hot_percent: 0,
            ..TraceGenConfig::default()
        };
        assert_eq!(none.hot_blocks(), 0);

        let all = TraceGenConfig {
            hot_percent: 100,
            ..TraceGenConfig::default()
        };
        assert_eq!(all.hot_blocks(), all.working_set_blocks);
    }

    #[test]
    fn test_seed_is_reproducible() {
        assert_eq!(render(seeded(500, 7)), render(seeded(500, 7)));
        assert_ne!(render(seeded(500, 7)), render(seeded(500, 8)));
    }

    #[test]
    fn test_records_parse_and_stay_in_working_set() {
        let config = seeded(2000, 42);
        let limit = BASE_ADDRESS + config.working_set_blocks * config.block_size;
        let text = render(config.clone());

        let mut count = 0;
        for (i, line) in text.lines().enumerate() {
            let record = TraceReader::parse_line(line, i)
                .expect("generated line should parse")
                .expect("generated line is a data record");
            let address = record.operation.address;
            assert!(address >= BASE_ADDRESS && address < limit);
            // Access never straddles a block boundary
            assert!(address % config.block_size + record.size <= config.block_size);
            count += 1;
        }
        assert_eq!(count, 2000);
    }

    #[test]
    fn test_operation_mix() {
        let only_loads = TraceGenConfig {
            load_percent: 100,
            store_percent: 0,
            ..seeded(300, 1)
        };
        let text = render(only_loads);
        assert!(text.lines().all(|l| l.starts_with(" L ")));

        let only_modifies = TraceGenConfig {
            load_percent: 0,
            store_percent: 0,
            ..seeded(300, 1)
        };
        let text = render(only_modifies);
        for (i, line) in text.lines().enumerate() {
            let record = TraceReader::parse_line(line, i).unwrap().unwrap();
            assert_eq!(record.operation.kind, OpKind::Modify);
        }
    }

    #[test]
    fn test_hot_traffic_concentrates() {
        let config = TraceGenConfig {
            working_set_blocks: 1000,
            hot_percent: 10,
            hot_traffic_percent: 100,
            ..seeded(1000, 3)
        };
        let hot_limit = BASE_ADDRESS + config.hot_blocks() * config.block_size;
        let text = render(config);
        for (i, line) in text.lines().enumerate() {
            let record = TraceReader::parse_line(line, i).unwrap().unwrap();
            assert!(record.operation.address < hot_limit);
        }
    }

    #[test]
    fn test_generate_writes_file() {
        let temp_dir = create_temp_dir("file");
        let output = temp_dir.join("nested").join("gen.trace");
        let config = TraceGenConfig {
            output: output.clone(),
            ..seeded(250, 9)
        };

        TraceGenerator::new(config).generate().expect("generation should succeed");

        let records = TraceReader::parse_file(&output).expect("Failed to read trace");
        assert_eq!(records.len(), 250);

        cleanup_temp_dir(&temp_dir);
    }
}
