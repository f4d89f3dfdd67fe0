use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use csim::{CacheConfig, CacheSimulator, Operation};

// Helper to create a simulator with the given geometry
fn make_sim(s: u32, e: usize, b: u32) -> CacheSimulator {
    CacheSimulator::new(CacheConfig::new(s, e, b).unwrap()).unwrap()
}

// Deterministic mixed trace: mostly a hot region, some far addresses
fn make_trace(len: usize) -> Vec<Operation> {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    (0..len)
        .map(|i| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let address = if i % 8 == 0 { state } else { state % 0x8000 };
            match i % 5 {
                0 => Operation::store(address),
                1 => Operation::modify(address),
                _ => Operation::load(address),
            }
        })
        .collect()
}

pub fn criterion_benchmark(c: &mut Criterion) {
    let trace = make_trace(10_000);
    let mut group = c.benchmark_group("Cache Operations");

    // Hit path
    {
        let mut sim = make_sim(4, 4, 4);
        for i in 0..64u64 {
            sim.load(i << 4);
        }

        group.bench_function("load hit", |b| {
            b.iter(|| {
                for i in 0..64u64 {
                    black_box(sim.load(i << 4));
                }
            });
        });
    }

    // Eviction path: a single set cycling one more tag than it has ways
    {
        let mut sim = make_sim(0, 8, 6);
        let mut next = 0u64;

        group.bench_function("load eviction", |b| {
            b.iter(|| {
                for _ in 0..64 {
                    black_box(sim.load(next << 6));
                    next = (next + 1) % 9;
                }
            });
        });
    }

    group.finish();

    // Whole-trace replay across associativities
    let mut group = c.benchmark_group("Trace Replay");
    for ways in [1usize, 2, 4, 8, 16] {
        group.bench_with_input(BenchmarkId::new("E", ways), &ways, |b, &ways| {
            let mut sim = make_sim(5, ways, 5);
            b.iter(|| {
                sim.reset();
                black_box(sim.run(trace.iter().copied()))
            });
        });
    }
    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
