//! Read-write strategy
//!
//! Each account owns a `parking_lot::RwLock`. Balance reads share the read
//! side; deposits, withdrawals and both legs of a transfer take the write
//! side. Transfers acquire the two write sides in ordinal order, and
//! `total_funds` takes every read side in ordinal order, so totals and
//! balance queries never block one another.

use crate::core::balance::{checked_total, credited, debited, transferred};
use crate::core::{lock_order, Account, AccountRegistry, Ledger};
use crate::types::{AccountId, Amount, LedgerError};
use parking_lot::{RwLock, RwLockReadGuard};
use std::sync::Arc;

/// Account guarded by a read-write lock
#[derive(Debug)]
pub struct ReadWriteAccount {
    id: AccountId,
    balance: RwLock<Amount>,
}

impl ReadWriteAccount {
    fn new(id: AccountId) -> Self {
        Self {
            id,
            balance: RwLock::new(0),
        }
    }
}

impl Account for ReadWriteAccount {
    fn id(&self) -> AccountId {
        self.id
    }

    fn balance(&self) -> Amount {
        *self.balance.read()
    }

    fn deposit(&self, amount: Amount) -> Result<(), LedgerError> {
        let mut balance = self.balance.write();
        *balance = credited(*balance, amount)?;
        Ok(())
    }

    fn withdraw(&self, amount: Amount) -> Result<(), LedgerError> {
        let mut balance = self.balance.write();
        *balance = debited(self.id, *balance, amount)?;
        Ok(())
    }
}

/// Ledger optimized for read-heavy workloads
#[derive(Debug, Default)]
pub struct ReadWriteLedger {
    accounts: AccountRegistry<ReadWriteAccount>,
}

impl ReadWriteLedger {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Ledger for ReadWriteLedger {
    type Account = ReadWriteAccount;

    fn name(&self) -> &'static str {
        "read-write"
    }

    fn create_account(&self) -> Arc<ReadWriteAccount> {
        self.accounts.register(ReadWriteAccount::new)
    }

    fn accounts(&self) -> Vec<Arc<ReadWriteAccount>> {
        self.accounts.snapshot()
    }

    fn transfer(
        &self,
        from: &ReadWriteAccount,
        to: &ReadWriteAccount,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.accounts.assert_member(from);
        self.accounts.assert_member(to);
        if from.id == to.id {
            return Ok(());
        }

        let (first, second) = lock_order(from, to);
        let mut first_guard = first.balance.write();
        let mut second_guard = second.balance.write();
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
        let guards: Vec<RwLockReadGuard<'_, Amount>> = accounts
            .iter()
            .map(|account| account.balance.read())
            .collect();

        checked_total(guards.iter().map(|guard| **guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_balance_reads_share_the_lock() {
        let ledger = ReadWriteLedger::new();
        let account = ledger.create_account();
        account.deposit(9).unwrap();

        let _reader = account.balance.read();
        // a second reader is admitted while the first is still inside
        assert_eq!(account.balance(), 9);
    }

    #[test]
    fn test_total_funds_runs_alongside_readers() {
        let ledger = Arc::new(ReadWriteLedger::new());
        let a = ledger.create_account();
        let b = ledger.create_account();
        a.deposit(4).unwrap();
        b.deposit(6).unwrap();

        let _held = a.balance.read();
        let (tx, rx) = mpsc::channel();
        let worker = {
            let ledger = Arc::clone(&ledger);
            thread::spawn(move || tx.send(ledger.total_funds()).unwrap())
        };

        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Ok(10)));
        worker.join().unwrap();
    }

    #[test]
    fn test_writer_waits_for_reader() {
        let ledger = Arc::new(ReadWriteLedger::new());
        let a = ledger.create_account();
        let b = ledger.create_account();
        a.deposit(5).unwrap();

        let reader = a.balance.read();
        let (tx, rx) = mpsc::channel();
        let worker = {
            let ledger = Arc::clone(&ledger);
            let (a, b) = (Arc::clone(&a), Arc::clone(&b));
            thread::spawn(move || tx.send(ledger.transfer(&a, &b, 5)).unwrap())
        };

        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        drop(reader);
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Ok(())));
        worker.join().unwrap();
        assert_eq!((a.balance(), b.balance()), (0, 5));
    }
}
