//! Concurrent Ledger benchmark CLI
//!
//! Runs the selected concurrency strategies against the selected workload
//! mixes and writes one CSV row per (scenario, strategy) pair to stdout.
//!
//! # Usage
//!
//! ```bash
//! cargo run --release > report.csv
//! cargo run --release -- --strategy ordered --strategy optimistic > report.csv
//! cargo run --release -- --scenario more-writes --threads 8 --tasks 1000000 > report.csv
//! RUST_LOG=debug cargo run -- --strategy polling --max-attempts 100 > report.csv
//! ```
//!
//! Progress and diagnostics are logged to stderr; set `RUST_LOG` to change
//! the level (default `info`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (runtime could not be built, output not writable, etc.)

use concurrent_ledger::cli;
use concurrent_ledger::io::write_reports_csv;
use concurrent_ledger::strategy;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    // Parse command-line arguments using clap
    let args = cli::parse_args();
    let config = args.to_simulation_config();
    let policy = args.to_retry_policy();

    let mut reports = Vec::new();
    for scenario in args.selected_scenarios() {
        for strategy_type in args.selected_strategies() {
            match strategy::run_simulation(strategy_type, scenario, config.clone(), policy) {
                Ok(report) => {
                    if !report.is_consistent() {
                        tracing::error!(
                            strategy = report.strategy,
                            scenario = report.scenario,
                            final_total = ?report.final_total,
                            expected_total = report.expected_total,
                            "ledger total not conserved"
                        );
                    }
                    reports.push(report);
                }
                Err(e) => {
                    eprintln!("Error: {}", e);
                    process::exit(1);
                }
            }
        }
    }

    let mut output = std::io::stdout();
    if let Err(e) = write_reports_csv(&reports, &mut output) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
