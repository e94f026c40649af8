//! Results of simulation runs

use crate::core::LockStatsSnapshot;
use crate::types::{Amount, LedgerError};
use std::time::Duration;

/// Counters of one timed run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunOutcome {
    /// Wall-clock time until all workers finished or the run timed out
    pub duration: Duration,
    /// Whether every worker finished within the run timeout
    pub terminated: bool,
    /// Sum of every balance read by the workers
    pub observed_balance: u64,
    /// Transfers issued by the scenario
    pub scheduled_transfers: u64,
    pub successful_transfers: u64,
    /// Transfers rejected for insufficient funds
    pub failed_transfers: u64,
    /// Transfers aborted by bounded lock polling
    pub timed_out_transfers: u64,
    /// Balance reads performed
    pub reads: u64,
}

impl RunOutcome {
    /// Transfers that completed with any outcome
    pub fn accounted_transfers(&self) -> u64 {
        self.successful_transfers + self.failed_transfers + self.timed_out_transfers
    }
}

/// Durations of repeated runs
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunTimes {
    times: Vec<Duration>,
}

impl RunTimes {
    pub fn new(times: Vec<Duration>) -> Self {
        Self { times }
    }

    pub fn times(&self) -> &[Duration] {
        &self.times
    }

    /// Upper median; zero when there are no runs
    pub fn median(&self) -> Duration {
        let mut sorted = self.times.clone();
        sorted.sort();
        sorted.get(sorted.len() / 2).copied().unwrap_or_default()
    }

    /// Median of the absolute deviations from the median
    pub fn median_absolute_deviation(&self) -> Duration {
        let median = self.median();
        let deviations = self
            .times
            .iter()
            .map(|&time| time.max(median) - time.min(median))
            .collect();
        RunTimes::new(deviations).median()
    }
}

impl FromIterator<Duration> for RunTimes {
    fn from_iter<I: IntoIterator<Item = Duration>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Summary of all runs of one strategy under one scenario
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationReport {
    pub strategy: &'static str,
    pub scenario: &'static str,
    pub runs: Vec<RunOutcome>,
    pub times: RunTimes,
    /// `total_funds()` after the last run
    pub final_total: Result<Amount, LedgerError>,
    /// Sum of the seeded balances
    pub expected_total: Amount,
    pub lock_stats: LockStatsSnapshot,
}

impl SimulationReport {
    /// Every run finished and the ledger still holds exactly the seeded funds
    pub fn is_consistent(&self) -> bool {
        self.final_total == Ok(self.expected_total) && self.runs.iter().all(|run| run.terminated)
    }

    pub fn last_run(&self) -> Option<&RunOutcome> {
        self.runs.last()
    }
}
