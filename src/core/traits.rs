//! Core traits for accounts and ledgers
//!
//! This module defines the contract every concurrency strategy implements, so
//! the strategies can be used interchangeably by tests, benchmarks, and the
//! simulation driver. A ledger commits to exactly one strategy for its
//! lifetime; the strategy is chosen by picking the concrete type.

use crate::core::stats::LockStatsSnapshot;
use crate::types::{AccountId, AccountSnapshot, Amount, LedgerError};
use std::sync::Arc;

/// A shared balance protected by a strategy-specific guard
///
/// Every operation is atomic with respect to all other operations on the
/// same account.
pub trait Account: Send + Sync + 'static {
    /// Immutable identifier assigned by the creating ledger
    fn id(&self) -> AccountId;

    /// Current balance
    fn balance(&self) -> Amount;

    /// Add `amount` to the balance
    ///
    /// Fails only with `ArithmeticOverflow`, leaving the balance unchanged.
    fn deposit(&self, amount: Amount) -> Result<(), LedgerError>;

    /// Subtract `amount` from the balance
    ///
    /// The check and the subtraction happen under one guard acquisition.
    /// Fails with `InsufficientFunds` when the balance is lower than `amount`,
    /// leaving the balance unchanged.
    fn withdraw(&self, amount: Amount) -> Result<(), LedgerError>;
}

/// A ledger owning an append-only collection of accounts
pub trait Ledger: Send + Sync + 'static {
    /// Account type managed by this strategy
    type Account: Account;

    /// Short strategy name used in logs and reports
    fn name(&self) -> &'static str;

    /// Allocate a new account with balance 0 and register it
    fn create_account(&self) -> Arc<Self::Account>;

    /// All accounts in ordinal order
    fn accounts(&self) -> Vec<Arc<Self::Account>>;

    /// Move `amount` from `from` to `to` as one atomic unit
    ///
    /// No observer sees `from` debited without `to` credited. A
    /// self-transfer is a no-op success. On any error neither account is
    /// changed.
    ///
    /// # Panics
    ///
    /// Panics if either account was created by another ledger instance.
    fn transfer(
        &self,
        from: &Self::Account,
        to: &Self::Account,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Sum of all balances at one consistent instant
    fn total_funds(&self) -> Result<Amount, LedgerError>;

    /// Contention counters collected by the strategy
    fn lock_stats(&self) -> LockStatsSnapshot {
        LockStatsSnapshot::default()
    }

    /// Balance of `account`
    fn balance(&self, account: &Self::Account) -> Amount {
        account.balance()
    }

    /// Deposit into `account`
    fn deposit(&self, account: &Self::Account, amount: Amount) -> Result<(), LedgerError> {
        account.deposit(amount)
    }

    /// Withdraw from `account`
    fn withdraw(&self, account: &Self::Account, amount: Amount) -> Result<(), LedgerError> {
        account.withdraw(amount)
    }

    /// Per-account balances in ordinal order
    ///
    /// Each balance is read independently, so the list is not a snapshot
    /// across accounts; use [`Ledger::total_funds`] for that.
    fn balances(&self) -> Vec<AccountSnapshot> {
        self.accounts()
            .iter()
            .map(|account| AccountSnapshot {
                account: account.id().ordinal(),
                balance: account.balance(),
            })
            .collect()
    }
}
