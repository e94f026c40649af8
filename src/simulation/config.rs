//! Simulation configuration

use crate::types::Amount;
use std::time::Duration;

/// Parameters of a simulation
///
/// Controls the size of the ledger, the amount of work per run, and the
/// worker pool that performs it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationConfig {
    /// Worker threads issuing operations concurrently
    pub threads: usize,
    /// Operations per run, split between reads and transfers by the scenario
    pub tasks: u64,
    /// Timed runs per simulation
    pub executions: usize,
    /// Accounts created before the first run
    pub accounts: usize,
    /// Initial balance of every account
    pub starting_balance: Amount,
    /// Amount moved by each transfer
    pub transfer_amount: Amount,
    /// Wall-clock bound of one run
    pub run_timeout: Duration,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            threads: num_cpus::get(),
            tasks: 100_000,
            executions: 5,
            accounts: 10,
            starting_balance: 100_000,
            transfer_amount: 1,
            run_timeout: Duration::from_secs(10),
        }
    }
}

impl SimulationConfig {
    /// Replace invalid values with defaults
    ///
    /// Zero threads, tasks, executions or timeout, and fewer than two
    /// accounts (transfers need two distinct accounts) fall back to the
    /// default value with a warning.
    pub fn validated(self) -> Self {
        let default = Self::default();

        let threads = if self.threads == 0 {
            tracing::warn!(default = default.threads, "invalid threads (0), using default");
            default.threads
        } else {
            self.threads
        };

        let tasks = if self.tasks == 0 {
            tracing::warn!(default = default.tasks, "invalid tasks (0), using default");
            default.tasks
        } else {
            self.tasks
        };

        let executions = if self.executions == 0 {
            tracing::warn!(default = default.executions, "invalid executions (0), using default");
            default.executions
        } else {
            self.executions
        };

        let accounts = if self.accounts < 2 {
            tracing::warn!(
                accounts = self.accounts,
                default = default.accounts,
                "transfers need at least two accounts, using default"
            );
            default.accounts
        } else {
            self.accounts
        };

        let run_timeout = if self.run_timeout.is_zero() {
            tracing::warn!(default = ?default.run_timeout, "invalid run timeout (0), using default");
            default.run_timeout
        } else {
            self.run_timeout
        };

        Self {
            threads,
            tasks,
            executions,
            accounts,
            starting_balance: self.starting_balance,
            transfer_amount: self.transfer_amount,
            run_timeout,
        }
    }
}
