#![no_std]
extern crate alloc;
extern crate csim;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use csim::{
    AccessOutcome, CacheConfig, CacheMetrics, CacheSimulator, OpKind, Operation, Summary,
};

// Helper to build a simulator from raw s, E, b values
fn make_sim(s: u32, e: usize, b: u32) -> CacheSimulator {
    CacheSimulator::new(CacheConfig::new(s, e, b).unwrap()).unwrap()
}

#[test]
fn test_simulator_in_no_std() {
    let mut sim = make_sim(1, 1, 1);

    assert_eq!(sim.load(0x10), AccessOutcome::Miss);
    assert_eq!(sim.load(0x20), AccessOutcome::MissEviction);
    assert_eq!(sim.load(0x20), AccessOutcome::Hit);

    assert_eq!(
        sim.summary(),
        Summary {
            hits: 1,
            misses: 2,
            evictions: 1
        }
    );
}

#[test]
fn test_summary_formatting_in_no_std() {
    let mut sim = make_sim(4, 1, 4);
    let summary = sim.run([Operation::load(0x10), Operation::modify(0x10)]);

    let line: String = format!("{summary}");
    assert_eq!(line, "hits:2 misses:1 evictions:0");
}

#[test]
fn test_trace_codes_in_no_std() {
    // Parse a compact trace without std
    let trace = "L 10,1|M 20,1|S 18,1";
    let ops: Vec<Operation> = trace
        .split('|')
        .map(|record| {
            let kind = OpKind::from_char(record.chars().next().unwrap()).unwrap();
            let address = record[2..].split(',').next().unwrap();
            Operation::new(kind, u64::from_str_radix(address, 16).unwrap())
        })
        .collect();

    let mut sim = make_sim(4, 1, 4);
    let reports: Vec<String> = ops
        .into_iter()
        .map(|op| format!("{} {}", op.kind, sim.process(op)))
        .collect();

    assert_eq!(reports, ["L miss", "M miss hit", "S hit"]);
}

#[test]
fn test_metrics_in_no_std() {
    let mut sim = make_sim(0, 2, 0);
    sim.run([
        Operation::load(1),
        Operation::load(2),
        Operation::load(3),
        Operation::store(3),
    ]);

    let metrics = CacheMetrics::metrics(&sim);
    assert_eq!(metrics.get("evictions"), Some(&1.0));
    assert_eq!(metrics.get("hit_rate"), Some(&0.25));
    assert_eq!(sim.algorithm_name(), "LRU");
}
