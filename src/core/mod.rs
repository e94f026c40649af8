//! Core ledger module
//!
//! This module contains the pieces shared by every concurrency strategy:
//! - `traits` - The `Account` / `Ledger` contract
//! - `registry` - Append-only account collection and lock ordering
//! - `balance` - Pure balance arithmetic
//! - `retry` - Bounded polling policy
//! - `stats` - Contention counters

pub mod balance;
pub mod registry;
pub mod retry;
pub mod stats;
pub mod traits;

pub use registry::{lock_order, AccountRegistry};
pub use retry::{Backoff, RetryPolicy};
pub use stats::{LockStats, LockStatsSnapshot};
pub use traits::{Account, Ledger};
