use crate::core::RetryPolicy;
use crate::simulation::{Scenario, SimulationConfig};
use clap::{Parser, ValueEnum};
use std::time::Duration;

/// Benchmark concurrency-control strategies on a shared ledger
#[derive(Parser, Debug)]
#[command(name = "concurrent-ledger")]
#[command(about = "Benchmark concurrency-control strategies on a shared ledger", long_about = None)]
pub struct CliArgs {
    /// Strategies to run (repeatable)
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        help = "Strategy to run; repeat to run several (default: all)"
    )]
    pub strategies: Vec<StrategyType>,

    /// Workload mixes to run (repeatable)
    #[arg(
        long = "scenario",
        value_name = "SCENARIO",
        help = "Read/write mix; repeat to run several (default: all)"
    )]
    pub scenarios: Vec<ScenarioType>,

    #[arg(
        long = "threads",
        value_name = "COUNT",
        help = "Worker threads issuing operations (default: CPU cores)"
    )]
    pub threads: Option<usize>,

    #[arg(
        long = "tasks",
        value_name = "COUNT",
        help = "Operations per run (default: 100000)"
    )]
    pub tasks: Option<u64>,

    #[arg(
        long = "executions",
        value_name = "COUNT",
        help = "Timed runs per strategy and scenario (default: 5)"
    )]
    pub executions: Option<usize>,

    #[arg(
        long = "accounts",
        value_name = "COUNT",
        help = "Accounts in the ledger, at least 2 (default: 10)"
    )]
    pub accounts: Option<usize>,

    #[arg(
        long = "starting-balance",
        value_name = "AMOUNT",
        help = "Initial balance of every account (default: 100000)"
    )]
    pub starting_balance: Option<u64>,

    #[arg(
        long = "amount",
        value_name = "AMOUNT",
        help = "Amount moved by each transfer (default: 1)"
    )]
    pub amount: Option<u64>,

    #[arg(
        long = "run-timeout-secs",
        value_name = "SECONDS",
        help = "Wall-clock bound of one run (default: 10)"
    )]
    pub run_timeout_secs: Option<u64>,

    #[arg(
        long = "max-attempts",
        value_name = "COUNT",
        help = "Lock polling attempts before a polling operation gives up (default: 10000)"
    )]
    pub max_attempts: Option<u32>,

    #[arg(
        long = "deadline-ms",
        value_name = "MILLIS",
        help = "Wall-clock budget of one polling operation (default: 5000)"
    )]
    pub deadline_ms: Option<u64>,
}

/// Available concurrency strategies
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Ordered,
    Polling,
    ReadWrite,
    Optimistic,
}

impl StrategyType {
    pub const ALL: [StrategyType; 4] = [
        StrategyType::Ordered,
        StrategyType::Polling,
        StrategyType::ReadWrite,
        StrategyType::Optimistic,
    ];
}

/// Available workload mixes
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ScenarioType {
    ReadOnly,
    WriteOnly,
    MoreReads,
    MoreWrites,
    BothEqually,
}

impl From<ScenarioType> for Scenario {
    fn from(scenario: ScenarioType) -> Self {
        match scenario {
            ScenarioType::ReadOnly => Scenario::READ_ONLY,
            ScenarioType::WriteOnly => Scenario::WRITE_ONLY,
            ScenarioType::MoreReads => Scenario::MORE_READS,
            ScenarioType::MoreWrites => Scenario::MORE_WRITES,
            ScenarioType::BothEqually => Scenario::BOTH_EQUALLY,
        }
    }
}

impl CliArgs {
    /// Selected strategies, or all of them
    pub fn selected_strategies(&self) -> Vec<StrategyType> {
        if self.strategies.is_empty() {
            StrategyType::ALL.to_vec()
        } else {
            self.strategies.clone()
        }
    }

    /// Selected scenarios, or all presets
    pub fn selected_scenarios(&self) -> Vec<Scenario> {
        if self.scenarios.is_empty() {
            Scenario::ALL.to_vec()
        } else {
            self.scenarios.iter().copied().map(Scenario::from).collect()
        }
    }

    /// Create a SimulationConfig from CLI arguments
    ///
    /// Missing values take their defaults; invalid ones are replaced with
    /// defaults and reported as warnings by [`SimulationConfig::validated`].
    pub fn to_simulation_config(&self) -> SimulationConfig {
        let default = SimulationConfig::default();
        SimulationConfig {
            threads: self.threads.unwrap_or(default.threads),
            tasks: self.tasks.unwrap_or(default.tasks),
            executions: self.executions.unwrap_or(default.executions),
            accounts: self.accounts.unwrap_or(default.accounts),
            starting_balance: self.starting_balance.unwrap_or(default.starting_balance),
            transfer_amount: self.amount.unwrap_or(default.transfer_amount),
            run_timeout: self
                .run_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(default.run_timeout),
        }
        .validated()
    }

    /// Create the polling RetryPolicy from CLI arguments
    pub fn to_retry_policy(&self) -> RetryPolicy {
        if self.max_attempts.is_none() && self.deadline_ms.is_none() {
            return RetryPolicy::default();
        }
        let default = RetryPolicy::default();
        RetryPolicy::new(
            self.max_attempts.unwrap_or(default.max_attempts),
            self.deadline_ms
                .map(Duration::from_millis)
                .or(default.deadline),
        )
    }
}
