//! Ordered-lock strategy
//!
//! Each account is a `parking_lot::Mutex` around its balance. Any operation
//! that needs more than one account guard acquires them in increasing ordinal
//! order, whatever order the caller named the accounts in. Because every
//! thread climbs the same total order, no cycle of waiting threads can form.
//!
//! `total_funds` locks every account in ordinal order before summing, which
//! serializes it against all transfers but guarantees the snapshot invariant.

use crate::core::balance::{checked_total, credited, debited, transferred};
use crate::core::{lock_order, Account, AccountRegistry, Ledger};
use crate::types::{AccountId, Amount, LedgerError};
use parking_lot::{Mutex, MutexGuard};
use std::sync::Arc;

/// Account guarded by a plain mutex
#[derive(Debug)]
pub struct OrderedAccount {
    id: AccountId,
    balance: Mutex<Amount>,
}

impl OrderedAccount {
    fn new(id: AccountId) -> Self {
        Self {
            id,
            balance: Mutex::new(0),
        }
    }
}

impl Account for OrderedAccount {
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

/// Ledger avoiding deadlock by a fixed global lock order
#[derive(Debug, Default)]
pub struct OrderedLockLedger {
    accounts: AccountRegistry<OrderedAccount>,
}

impl OrderedLockLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for OrderedLockLedger {
    type Account = OrderedAccount;

    fn name(&self) -> &'static str {
        "ordered"
    }

    fn create_account(&self) -> Arc<OrderedAccount> {
        self.accounts.register(OrderedAccount::new)
    }

    fn accounts(&self) -> Vec<Arc<OrderedAccount>> {
        self.accounts.snapshot()
    }

    fn transfer(
        &self,
        from: &OrderedAccount,
        to: &OrderedAccount,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.accounts.assert_member(from);
        self.accounts.assert_member(to);
        if from.id == to.id {
            return Ok(());
        }

        let (first, second) = lock_order(from, to);
        let mut first_guard = first.balance.lock();
        let mut second_guard = second.balance.lock();
        let (from_balance, to_balance) = if first.id == from.id {
            (&mut *first_guard, &mut *second_guard)
        } else {
            (&mut *second_guard, &mut *first_guard)
        };

        let (new_from, new_to) = transferred((from.id, *from_balance), *to_balance, amount)?;
        *from_balance = new_from;
        *to_balance = new_to;
        Ok(())
    }

    fn total_funds(&self) -> Result<Amount, LedgerError> {
        let accounts = self.accounts.read();
        let guards: Vec<MutexGuard<'_, Amount>> = accounts
            .iter()
            .map(|account| account.balance.lock())
            .collect();

        let total = checked_total(guards.iter().map(|guard| **guard));

        // release in reverse acquisition order
        for guard in guards.into_iter().rev() {
            drop(guard);
        }
        total
    }
}
