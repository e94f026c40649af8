//! Concurrency strategies for the ledger
//!
//! Each submodule is a self-contained implementation of the same
//! [`Ledger`](crate::core::Ledger) contract, differing only in how account
//! guards are taken:
//!
//! - `ordered` - blocking mutexes acquired in a fixed global order
//! - `polling` - non-blocking try-lock with bounded, randomized back-off
//! - `read_write` - shared reads, exclusive writes, fixed order for transfers
//! - `optimistic` - validated lock-free reads, exclusive writers
//!
//! A strategy is selected at construction time by choosing the ledger type;
//! [`run_simulation`] does the same selection at runtime from a
//! [`StrategyType`].

use crate::cli::StrategyType;
use crate::core::RetryPolicy;
use crate::simulation::{Scenario, Simulation, SimulationConfig, SimulationReport};
use crate::types::SimulationError;

pub mod optimistic;
pub mod ordered;
pub mod polling;
pub mod read_write;

pub use optimistic::{OptimisticAccount, OptimisticLedger, OptimisticRead};
pub use ordered::{OrderedAccount, OrderedLockLedger};
pub use polling::{PollingAccount, PollingLockLedger};
pub use read_write::{ReadWriteAccount, ReadWriteLedger};

/// Run a simulation against a fresh ledger of the selected strategy
///
/// # Arguments
///
/// * `strategy_type` - Strategy to instantiate
/// * `scenario` - Read/write mix of the workload
/// * `config` - Ledger size and run parameters
/// * `policy` - Retry policy (used by the polling strategy only)
///
/// # Returns
///
/// The report of all executions, or a fatal driver error
pub fn run_simulation(
    strategy_type: StrategyType,
    scenario: Scenario,
    config: SimulationConfig,
    policy: RetryPolicy,
) -> Result<SimulationReport, SimulationError> {
    match strategy_type {
        StrategyType::Ordered => Simulation::new(OrderedLockLedger::new(), scenario, config)?.run(),
        StrategyType::Polling => {
            Simulation::new(PollingLockLedger::with_policy(policy), scenario, config)?.run()
        }
        StrategyType::ReadWrite => Simulation::new(ReadWriteLedger::new(), scenario, config)?.run(),
        StrategyType::Optimistic => {
            Simulation::new(OptimisticLedger::new(), scenario, config)?.run()
        }
    }
}
