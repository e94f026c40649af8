//! Simulation driver
//!
//! Seeds a ledger and hammers it with a mix of concurrent transfers and
//! balance reads, timing each run and counting every outcome.
//!
//! # Architecture
//!
//! ```text
//! Simulation<L: Ledger>
//!     ├── Arc<L>                       (ledger under test, one strategy)
//!     ├── Arc<Vec<Arc<L::Account>>>    (seeded accounts, read-only during runs)
//!     └── per run: tokio runtime
//!         └── `threads` blocking workers, each with its share of the work
//! ```
//!
//! Ledger operations block on account guards, so workers run on tokio's
//! blocking pool (capped at `threads`). The runtime's core thread stays free
//! to drive the run timeout, so a run that stalls is reported as not
//! terminated instead of hanging the driver.

use super::config::SimulationConfig;
use super::report::{RunOutcome, RunTimes, SimulationReport};
use super::scenario::Scenario;
use crate::core::balance::checked_total;
use crate::core::{Account, Ledger};
use crate::types::{Amount, LedgerError, SimulationError};
use rand::Rng;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared counters updated by all workers of a run
#[derive(Debug, Default)]
struct RunCounters {
    observed_balance: AtomicU64,
    successful_transfers: AtomicU64,
    failed_transfers: AtomicU64,
    timed_out_transfers: AtomicU64,
    reads: AtomicU64,
}

/// One worker's share of a run
struct Worker<L: Ledger> {
    ledger: Arc<L>,
    accounts: Arc<Vec<Arc<L::Account>>>,
    counters: Arc<RunCounters>,
    amount: Amount,
    writes: u64,
    reads: u64,
}

impl<L: Ledger> Worker<L> {
    fn run(self) {
        let mut rng = rand::thread_rng();
        let total = self.writes + self.reads;

        for slot in 0..total {
            if is_write_slot(slot, self.writes, total) {
                self.transfer(&mut rng);
            } else {
                let account = &self.accounts[rng.gen_range(0..self.accounts.len())];
                self.counters
                    .observed_balance
                    .fetch_add(account.balance(), Ordering::Relaxed);
                self.counters.reads.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn transfer(&self, rng: &mut impl Rng) {
        let count = self.accounts.len();
        let from = rng.gen_range(0..count);
        let mut to = rng.gen_range(0..count - 1);
        if to >= from {
            to += 1;
        }

        let counter = match self
            .ledger
            .transfer(&self.accounts[from], &self.accounts[to], self.amount)
        {
            Ok(()) => &self.counters.successful_transfers,
            Err(error) if error.is_retryable() => &self.counters.timed_out_transfers,
            Err(error) => {
                tracing::trace!(%error, "transfer rejected");
                &self.counters.failed_transfers
            }
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// Whether operation `slot` of `total` is a transfer
///
/// Spreads exactly `writes` transfers evenly over the slots.
fn is_write_slot(slot: u64, writes: u64, total: u64) -> bool {
    (slot + 1) * writes / total > slot * writes / total
}

/// Split `total` into `parts` shares differing by at most one
fn split_evenly(total: u64, parts: usize) -> impl Iterator<Item = u64> {
    let parts = parts as u64;
    (0..parts).map(move |i| total / parts + u64::from(i < total % parts))
}

/// Benchmark harness around one ledger
pub struct Simulation<L: Ledger> {
    config: SimulationConfig,
    scenario: Scenario,
    ledger: Arc<L>,
    accounts: Arc<Vec<Arc<L::Account>>>,
    expected_total: Amount,
}

impl<L: Ledger> Simulation<L> {
    /// Create `config.accounts` accounts in `ledger` and seed them
    ///
    /// # Errors
    ///
    /// Returns an error if the seeded total does not fit in [`Amount`].
    pub fn new(
        ledger: L,
        scenario: Scenario,
        config: SimulationConfig,
    ) -> Result<Self, SimulationError> {
        let config = config.validated();

        let accounts = (0..config.accounts)
            .map(|_| {
                let account = ledger.create_account();
                account.deposit(config.starting_balance)?;
                Ok(account)
            })
            .collect::<Result<Vec<_>, LedgerError>>()?;
        let expected_total = checked_total(accounts.iter().map(|account| account.balance()))?;

        tracing::debug!(
            strategy = ledger.name(),
            scenario = scenario.name,
            accounts = accounts.len(),
            expected_total,
            "ledger seeded"
        );

        Ok(Self {
            config,
            scenario,
            ledger: Arc::new(ledger),
            accounts: Arc::new(accounts),
            expected_total,
        })
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Perform every configured execution and summarize them
    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        let mut runs = Vec::with_capacity(self.config.executions);
        for _ in 0..self.config.executions {
            runs.push(self.run_once()?);
        }

        let report = SimulationReport {
            strategy: self.ledger.name(),
            scenario: self.scenario.name,
            times: runs.iter().map(|run| run.duration).collect::<RunTimes>(),
            runs,
            final_total: self.ledger.total_funds(),
            expected_total: self.expected_total,
            lock_stats: self.ledger.lock_stats(),
        };

        tracing::info!(
            strategy = report.strategy,
            scenario = report.scenario,
            median_ms = report.times.median().as_millis() as u64,
            mad_ms = report.times.median_absolute_deviation().as_millis() as u64,
            consistent = report.is_consistent(),
            "simulation finished"
        );
        Ok(report)
    }

    /// Perform one timed execution
    ///
    /// # Errors
    ///
    /// Returns an error only if the worker runtime cannot be built.
    pub fn run_once(&self) -> Result<RunOutcome, SimulationError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .max_blocking_threads(self.config.threads)
            .enable_time()
            .build()?;

        let counters = Arc::new(RunCounters::default());
        let writes = self.scenario.number_of_writes(self.config.tasks);
        let reads = self.scenario.number_of_reads(self.config.tasks);
        let started = Instant::now();

        let terminated = runtime.block_on(async {
            let mut tasks = Vec::with_capacity(self.config.threads);
            let shares = split_evenly(writes, self.config.threads)
                .zip(split_evenly(reads, self.config.threads));

            for (worker_writes, worker_reads) in shares {
                let worker = Worker {
                    ledger: Arc::clone(&self.ledger),
                    accounts: Arc::clone(&self.accounts),
                    counters: Arc::clone(&counters),
                    amount: self.config.transfer_amount,
                    writes: worker_writes,
                    reads: worker_reads,
                };
                tasks.push(tokio::task::spawn_blocking(move || worker.run()));
            }

            let all_done = futures::future::join_all(tasks);
            match tokio::time::timeout(self.config.run_timeout, all_done).await {
                Ok(results) => {
                    for result in results {
                        if let Err(e) = result {
                            tracing::error!(error = %e, "worker panicked");
                        }
                    }
                    true
                }
                Err(_) => false,
            }
        });
        let duration = started.elapsed();

        // a stalled run leaves workers behind; do not wait for them
        runtime.shutdown_timeout(Duration::from_millis(100));

        let outcome = RunOutcome {
            duration,
            terminated,
            observed_balance: counters.observed_balance.load(Ordering::Relaxed),
            scheduled_transfers: writes,
            successful_transfers: counters.successful_transfers.load(Ordering::Relaxed),
            failed_transfers: counters.failed_transfers.load(Ordering::Relaxed),
            timed_out_transfers: counters.timed_out_transfers.load(Ordering::Relaxed),
            reads: counters.reads.load(Ordering::Relaxed),
        };

        if terminated {
            tracing::debug!(
                strategy = self.ledger.name(),
                scenario = self.scenario.name,
                duration_ms = duration.as_millis() as u64,
                successful = outcome.successful_transfers,
                failed = outcome.failed_transfers,
                timed_out = outcome.timed_out_transfers,
                "run finished"
            );
        } else {
            tracing::warn!(
                strategy = self.ledger.name(),
                scenario = self.scenario.name,
                timeout = ?self.config.run_timeout,
                "run did not terminate"
            );
        }
        Ok(outcome)
    }
}
