//! Concurrent Ledger Library
//! # Overview
//!
//! This library provides an in-memory ledger of accounts holding integer
//! balances, with several interchangeable concurrency-control strategies and
//! a benchmark driver that compares them under configurable read/write mixes.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (AccountId, Amount, errors)
//! - [`core`] - The ledger contract and the pieces every strategy shares:
//!   - [`core::traits`] - `Account` and `Ledger` traits
//!   - [`core::registry`] - Account registry and global lock order
//!   - [`core::retry`] - Bounded back-off for the polling strategy
//! - [`strategy`] - The four concurrency strategies
//! - [`simulation`] - Timed, multi-threaded benchmark driver
//! - [`io`] - CSV output of reports and balances
//! - [`cli`] - CLI arguments parsing
//!
//! # Strategies
//!
//! - **ordered**: Blocking exclusive locks, always taken in ascending account order
//! - **polling**: Non-blocking try-lock with bounded randomized back-off
//! - **read-write**: Shared locks for reads, exclusive ordered locks for transfers
//! - **optimistic**: Validated lock-free reads with a guarded fallback
//!
//! # Guarantees
//!
//! Every strategy provides:
//! - No balance ever goes negative
//! - Transfers are all-or-nothing and never observed half-applied
//! - The sum of all balances is conserved by transfers
//! - No deadlock; the polling strategy reports a timeout instead of spinning forever
//!
//! # Example
//!
//! ```
//! use concurrent_ledger::{Ledger, OrderedLockLedger};
//!
//! let ledger = OrderedLockLedger::new();
//! let a = ledger.create_account();
//! let b = ledger.create_account();
//! ledger.deposit(&a, 10).unwrap();
//!
//! ledger.transfer(&a, &b, 4).unwrap();
//! assert_eq!(ledger.balance(&b), 4);
//! assert_eq!(ledger.total_funds(), Ok(10));
//! ```

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod simulation;
pub mod strategy;
pub mod types;

pub use core::{Account, Ledger, RetryPolicy};
pub use io::{write_balances_csv, write_reports_csv};
pub use simulation::{Scenario, Simulation, SimulationConfig, SimulationReport};
pub use strategy::{
    run_simulation, OptimisticLedger, OrderedLockLedger, PollingLockLedger, ReadWriteLedger,
};
pub use types::{AccountId, AccountSnapshot, Amount, LedgerError, SimulationError};
