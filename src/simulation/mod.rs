//! Benchmark / simulation driver
//!
//! Consumes only the public ledger contract: creates accounts, issues a
//! configurable mix of concurrent transfers and balance reads, and reports
//! timing and correctness figures.
//!
//! - `scenario` - Read/write workload mixes
//! - `config` - Run parameters
//! - `runner` - The timed, multi-threaded driver
//! - `report` - Run outcomes and timing statistics

pub mod config;
pub mod report;
pub mod runner;
pub mod scenario;

pub use config::SimulationConfig;
pub use report::{RunOutcome, RunTimes, SimulationReport};
pub use runner::Simulation;
pub use scenario::Scenario;
