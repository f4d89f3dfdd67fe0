use cache_simulator::generator::{TraceGenConfig, TraceGenerator};
use cache_simulator::input::TraceReader;
use cache_simulator::models::SimulationConfig;
use cache_simulator::runner::SimulationRunner;
use cache_simulator::stats::SimulationStats;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use csim::CacheConfig;
use std::path::PathBuf;

/// Set-associative cache simulator with LRU replacement
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about,
    long_about = None,
    args_conflicts_with_subcommands = true,
    after_help = "Examples:\n  csim -s 4 -E 1 -b 4 -t traces/yi.trace\n  csim -v -s 8 -E 2 -b 4 -t traces/yi.trace"
)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Print the outcome of every operation
    #[arg(short, long)]
    verbose: bool,

    /// Number of set index bits (2^s sets)
    #[arg(short = 's', value_name = "NUM")]
    set_index_bits: Option<u32>,

    /// Number of lines per set (associativity)
    #[arg(short = 'E', value_name = "NUM")]
    lines_per_set: Option<usize>,

    /// Number of block offset bits (2^b bytes per block)
    #[arg(short = 'b', value_name = "NUM")]
    block_offset_bits: Option<u32>,

    /// Trace file, or a glob pattern such as "traces/*.trace"
    #[arg(short = 't', value_name = "FILE")]
    trace: Option<String>,

    /// Export per-trace results to a CSV file
    #[arg(long, value_name = "PATH")]
    output_csv: Option<PathBuf>,
}

/// Subcommands for the CLI
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate a synthetic lackey-format trace
    Generate {
        /// Number of data operations
        #[arg(long, default_value = "100000")]
        operations: u64,

        /// Number of distinct blocks in the working set
        #[arg(long, default_value = "4096")]
        working_set: u64,

        /// Block size in bytes
        #[arg(long, default_value = "64")]
        block_size: u64,

        /// Percentage of blocks that are hot (default: 10%)
        #[arg(long, default_value = "10")]
        hot_percent: u8,

        /// Percentage of traffic sent to hot blocks (default: 80%)
        #[arg(long, default_value = "80")]
        hot_traffic: u8,

        /// Percentage of loads
        #[arg(long, default_value = "60")]
        loads: u8,

        /// Percentage of stores (the remainder are modifies)
        #[arg(long, default_value = "25")]
        stores: u8,

        /// Seed for a reproducible trace
        #[arg(long)]
        seed: Option<u64>,

        /// Output trace file
        #[arg(short, long, default_value = "generated.trace")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = parse_args();

    match args.command {
        Some(Commands::Generate {
            operations,
            working_set,
            block_size,
            hot_percent,
            hot_traffic,
            loads,
            stores,
            seed,
            output,
        }) => {
            let config = TraceGenConfig {
                operations,
                working_set_blocks: working_set,
                block_size,
                hot_percent,
                hot_traffic_percent: hot_traffic,
                load_percent: loads,
                store_percent: stores,
                seed,
                output,
            };

            TraceGenerator::new(config).generate()
        }

        None => {
            let cache = match cache_config(
                args.set_index_bits,
                args.lines_per_set,
                args.block_offset_bits,
            ) {
                Ok(cache) => cache,
                Err(msg) => {
                    eprintln!("{msg}");
                    eprintln!("{}", Args::command().render_usage());
                    std::process::exit(1);
                }
            };

            run_simulation(cache, args.trace, args.verbose, args.output_csv)
        }
    }
}

/// Parse arguments; usage errors exit with status 1, help and version with 0
fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(err) => match err.kind() {
            ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => err.exit(),
            _ => {
                let _ = err.print();
                std::process::exit(1);
            }
        },
    }
}

/// Build the cache geometry from the command line.
///
/// Every parameter is required and must be positive.
fn cache_config(
    set_index_bits: Option<u32>,
    lines_per_set: Option<usize>,
    block_offset_bits: Option<u32>,
) -> Result<CacheConfig, String> {
    let (Some(s), Some(e), Some(b)) = (set_index_bits, lines_per_set, block_offset_bits) else {
        return Err("Missing required command line argument (-s, -E and -b)".to_string());
    };

    if s == 0 || e == 0 || b == 0 {
        return Err(format!(
            "Invalid configuration: -s, -E and -b must be positive (got s={s} E={e} b={b})"
        ));
    }

    CacheConfig::new(s, e, b).map_err(|err| format!("Invalid configuration: {err}"))
}

/// Run the simulation and report the results
fn run_simulation(
    cache: CacheConfig,
    trace: Option<String>,
    verbose: bool,
    output_csv: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let traces = match trace {
        Some(pattern) => TraceReader::new(pattern).trace_files()?,
        None => Vec::new(),
    };

    let runner = SimulationRunner::new(SimulationConfig {
        cache,
        traces,
        verbose,
    });

    let result = match runner.run() {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error running simulation: {e}");
            return Err(e.into());
        }
    };

    let stats = SimulationStats::from_result(&result);
    stats.print_summary();

    // Export to CSV if requested
    if let Some(csv_path) = output_csv {
        match stats.export_csv(&csv_path) {
            Ok(()) => eprintln!("Results exported to: {}", csv_path.display()),
            Err(e) => eprintln!("Failed to export CSV: {e}"),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_classic_flags() {
        let args = Args::try_parse_from([
            "csim", "-v", "-s", "4", "-E", "1", "-b", "4", "-t", "traces/yi.trace",
        ])
        .unwrap();
        assert!(args.verbose);
        assert_eq!(args.set_index_bits, Some(4));
        assert_eq!(args.lines_per_set, Some(1));
        assert_eq!(args.block_offset_bits, Some(4));
        assert_eq!(args.trace.as_deref(), Some("traces/yi.trace"));
        assert!(args.command.is_none());
    }

    #[test]
    fn test_generate_subcommand() {
        let args = Args::try_parse_from(["csim", "generate", "--seed", "5", "-o", "x.trace"]).unwrap();
        match args.command {
            Some(Commands::Generate {
                seed,
                output,
                operations,
                ..
            }) => {
                assert_eq!(seed, Some(5));
                assert_eq!(output, PathBuf::from("x.trace"));
                assert_eq!(operations, 100_000);
            }
            other => panic!("expected generate, got {other:?}"),
        }
    }

    #[test]
    fn test_non_numeric_value_rejected() {
        assert!(Args::try_parse_from(["csim", "-s", "four"]).is_err());
    }

    #[test]
    fn test_cache_config_validation() {
        let config = cache_config(Some(4), Some(2), Some(5)).unwrap();
        assert_eq!(config.num_sets(), 16);
        assert_eq!(config.ways(), 2);

        assert!(cache_config(None, Some(1), Some(4))
            .unwrap_err()
            .starts_with("Missing"));
        assert!(cache_config(Some(4), None, Some(4)).is_err());
        assert!(cache_config(Some(4), Some(1), None).is_err());

        assert!(cache_config(Some(0), Some(1), Some(4)).is_err());
        assert!(cache_config(Some(4), Some(0), Some(4)).is_err());
        assert!(cache_config(Some(4), Some(1), Some(0)).is_err());

        // s + b beyond the address width
        assert!(cache_config(Some(40), Some(1), Some(30))
            .unwrap_err()
            .starts_with("Invalid configuration"));

        // Geometry whose storage cannot be allocated is rejected up front
        assert!(cache_config(Some(60), Some(1), Some(4))
            .unwrap_err()
            .contains("cannot be allocated"));
    }
}
