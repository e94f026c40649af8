//! Append-only account collection shared by all strategies
//!
//! The registry assigns ordinals and owns the account list of one ledger.
//! Accounts are never removed or reordered, so an ordinal is also the index of
//! the account in the list.

use crate::core::traits::Account;
use crate::types::{AccountId, LedgerId};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_LEDGER_ID: AtomicU64 = AtomicU64::new(0);

/// Ordered collection of the accounts created by one ledger
///
/// Creation takes the write side of the list; snapshots (`total_funds`) hold
/// the read side while they lock accounts, which keeps creation out of any
/// snapshot in progress. Transfers never touch the list lock.
#[derive(Debug)]
pub struct AccountRegistry<A> {
    ledger: LedgerId,
    accounts: RwLock<Vec<Arc<A>>>,
}

impl<A: Account> AccountRegistry<A> {
    /// Create an empty registry with a fresh ledger id
    pub fn new() -> Self {
        AccountRegistry {
            ledger: LedgerId(NEXT_LEDGER_ID.fetch_add(1, Ordering::Relaxed)),
            accounts: RwLock::new(Vec::new()),
        }
    }

    /// Id of the owning ledger
    pub fn ledger(&self) -> LedgerId {
        self.ledger
    }

    /// Build an account with the next ordinal and append it
    ///
    /// # Arguments
    ///
    /// * `make` - Constructor receiving the id assigned to the new account
    ///
    /// # Returns
    ///
    /// A shared handle to the registered account
    pub fn register<F>(&self, make: F) -> Arc<A>
    where
        F: FnOnce(AccountId) -> A,
    {
        let mut accounts = self.accounts.write();
        let id = AccountId::new(self.ledger, accounts.len());
        let account = Arc::new(make(id));
        accounts.push(Arc::clone(&account));
        tracing::trace!(account = %id, "account registered");
        account
    }

    /// Hold the account list for reading
    pub fn read(&self) -> RwLockReadGuard<'_, Vec<Arc<A>>> {
        self.accounts.read()
    }

    /// Clone the current account list
    pub fn snapshot(&self) -> Vec<Arc<A>> {
        self.accounts.read().clone()
    }

    /// Number of registered accounts
    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    /// Whether no account has been created yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fail fast when `account` was created by another ledger
    ///
    /// Mixing ledgers would break the lock order, so this is a contract
    /// violation rather than a recoverable error.
    pub fn assert_member(&self, account: &A) {
        assert!(
            account.id().ledger() == self.ledger,
            "account {} does not belong to this ledger",
            account.id()
        );
    }
}

impl<A: Account> Default for AccountRegistry<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// Order two accounts by id, lowest first
///
/// Every strategy that holds two blocking guards acquires them in this order,
/// so no cycle of waiting threads can form.
pub fn lock_order<'a, A: Account>(a: &'a A, b: &'a A) -> (&'a A, &'a A) {
    if a.id() <= b.id() {
        (a, b)
    } else {
        (b, a)
    }
}
