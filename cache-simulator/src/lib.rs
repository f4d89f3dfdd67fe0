// Cache Simulator Library
//
// Trace-driven front end for the `csim` cache model: trace parsing, the
// per-trace runner, reporting and a synthetic trace generator.

pub mod generator;
pub mod input;
pub mod models;
pub mod runner;
pub mod stats;
