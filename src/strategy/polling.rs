//! Polling-lock strategy
//!
//! Instead of fixing a lock order, a transfer tries to take `from` and then
//! `to` without blocking. If the second guard is busy it releases the first
//! and starts over, so a thread never waits while holding a guard and no
//! deadlock is possible. The price is possible livelock, which is closed by
//! running every polling loop under a [`RetryPolicy`]: exhausting it aborts
//! the operation with [`LedgerError::LockTimeout`] and no partial effect.
//!
//! Single-account operations block on their one mutex; holding a single
//! guard cannot take part in a cycle.

use crate::core::balance::{checked_total, credited, debited, transferred};
use crate::core::{Account, AccountRegistry, Backoff, Ledger, LockStats, LockStatsSnapshot, RetryPolicy};
use crate::types::{AccountId, Amount, LedgerError};
use parking_lot::Mutex;
use std::sync::Arc;

/// Account guarded by a mutex that transfers only ever try-lock
#[derive(Debug)]
pub struct PollingAccount {
    id: AccountId,
    balance: Mutex<Amount>,
}

impl PollingAccount {
    fn new(id: AccountId) -> Self {
        Self {
            id,
            balance: Mutex::new(0),
        }
    }
}

impl Account for PollingAccount {
    fn id(&self) -> AccountId {
        self.id
    }

    fn balance(&self) -> Amount {
        *self.balance.lock()
    }

    fn deposit(&self, amount: Amount) -> Result<(), LedgerError> {
        let mut balance = self.balance.lock();
        *balance = credited(*balance, amount)?;
        Ok(())
    }

    fn withdraw(&self, amount: Amount) -> Result<(), LedgerError> {
        let mut balance = self.balance.lock();
        *balance = debited(self.id, *balance, amount)?;
        Ok(())
    }
}

/// Ledger avoiding deadlock by never blocking while holding a guard
#[derive(Debug, Default)]
pub struct PollingLockLedger {
    accounts: AccountRegistry<PollingAccount>,
    policy: RetryPolicy,
    stats: LockStats,
}

impl PollingLockLedger {
    /// Create a ledger with the default retry policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a ledger with a custom retry policy
    pub fn with_policy(policy: RetryPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Retry policy applied to transfers and totals
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    fn give_up(&self, error: LedgerError) -> LedgerError {
        self.stats.record_timeout();
        tracing::warn!(strategy = "polling", %error, "lock polling aborted");
        error
    }
}

impl Ledger for PollingLockLedger {
    type Account = PollingAccount;

    fn name(&self) -> &'static str {
        "polling"
    }

    fn create_account(&self) -> Arc<PollingAccount> {
        self.accounts.register(PollingAccount::new)
    }

    fn accounts(&self) -> Vec<Arc<PollingAccount>> {
        self.accounts.snapshot()
    }

    fn transfer(
        &self,
        from: &PollingAccount,
        to: &PollingAccount,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.accounts.assert_member(from);
        self.accounts.assert_member(to);
        if from.id == to.id {
            return Ok(());
        }

        let mut backoff = Backoff::new(self.policy);
        loop {
            if let Some(mut from_balance) = from.balance.try_lock() {
                if let Some(mut to_balance) = to.balance.try_lock() {
                    let (new_from, new_to) =
                        transferred((from.id, *from_balance), *to_balance, amount)?;
                    *from_balance = new_from;
                    *to_balance = new_to;
                    return Ok(());
                }
            }

            // nothing is held here
            self.stats.record_retry();
            backoff
                .snooze("transfer")
                .map_err(|error| self.give_up(error))?;
        }
    }

    fn total_funds(&self) -> Result<Amount, LedgerError> {
        let accounts = self.accounts.read();
        let mut backoff = Backoff::new(self.policy);
        let mut guards = Vec::with_capacity(accounts.len());

        for account in accounts.iter() {
            loop {
                if let Some(guard) = account.balance.try_lock() {
                    guards.push(guard);
                    break;
                }
                self.stats.record_retry();
                // an early return drops every accumulated guard
                backoff
                    .snooze("total_funds")
                    .map_err(|error| self.give_up(error))?;
            }
        }

        let total = checked_total(guards.iter().map(|guard| **guard));
        drop(guards);
        total
    }

    fn lock_stats(&self) -> LockStatsSnapshot {
        self.stats.snapshot()
    }
}
