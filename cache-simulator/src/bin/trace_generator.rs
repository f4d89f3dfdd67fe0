use cache_simulator::generator::{TraceGenConfig, TraceGenerator};
use clap::Parser;
use std::path::PathBuf;

/// Synthetic memory trace generator for cache simulations
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
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
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse command line arguments
    let args = Args::parse();

    let config = TraceGenConfig {
        operations: args.operations,
        working_set_blocks: args.working_set,
        block_size: args.block_size,
        hot_percent: args.hot_percent,
        hot_traffic_percent: args.hot_traffic,
        load_percent: args.loads,
        store_percent: args.stores,
        seed: args.seed,
        output: args.output,
    };

    println!("Trace Generator");
    println!("===============");

    TraceGenerator::new(config).generate()?;

    Ok(())
}
