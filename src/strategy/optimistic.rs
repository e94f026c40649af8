//! Optimistic-validation strategy
//!
//! Each account carries a sequence stamp next to its balance. Writers
//! serialize on a per-account mutex and enter through a [`WriteGuard`], which
//! makes the stamp odd on entry and even again (and larger) on release.
//! Readers never take the mutex on the fast path: they read the stamp, read
//! the balance, then check that the stamp is unchanged and even.
//!
//! ```text
//! writer:  lock ─ stamp+1 (odd) ─ store balance ─ stamp+1 (even) ─ unlock
//! reader:  s1 = stamp ─ load balance ─ s2 = stamp ─ valid iff s1 == s2 and even
//! ```
//!
//! A transfer holds both write guards for its whole critical section, so
//! there is no instant at which both accounts look stable while only one leg
//! is applied. `total_funds` validates every stamp after reading every
//! balance; if all hold, the values were simultaneously current and the sum
//! is a true snapshot. Any failed validation falls back, exactly once, to the
//! guarded snapshot of the ordered strategy.

use crate::core::balance::{checked_total, credited, debited, transferred};
use crate::core::{lock_order, Account, AccountRegistry, Ledger, LockStats, LockStatsSnapshot};
use crate::types::{AccountId, Amount, LedgerError};
use parking_lot::{Mutex, MutexGuard};
use std::sync::atomic::{fence, AtomicU64, Ordering};
use std::sync::Arc;

/// Outcome of a read that took no guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimisticRead<T> {
    /// No writer touched the data during the read
    Validated(T),
    /// A writer was active or intervened; the value must not be used
    Stale,
}

/// Account readable without blocking writers
#[derive(Debug)]
pub struct OptimisticAccount {
    id: AccountId,
    stamp: AtomicU64,
    balance: AtomicU64,
    writer: Mutex<()>,
    stats: Arc<LockStats>,
}

/// Exclusive access to one account's balance
///
/// Dropping the guard publishes the new stamp before the mutex is released.
struct WriteGuard<'a> {
    account: &'a OptimisticAccount,
    _lock: MutexGuard<'a, ()>,
}

impl WriteGuard<'_> {
    fn get(&self) -> Amount {
        self.account.balance.load(Ordering::Relaxed)
    }

    fn set(&mut self, balance: Amount) {
        self.account.balance.store(balance, Ordering::Relaxed);
    }
}

impl Drop for WriteGuard<'_> {
    fn drop(&mut self) {
        // runs before `_lock` is dropped
        self.account.stamp.fetch_add(1, Ordering::Release);
    }
}

impl OptimisticAccount {
    fn new(id: AccountId, stats: Arc<LockStats>) -> Self {
        Self {
            id,
            stamp: AtomicU64::new(0),
            balance: AtomicU64::new(0),
            writer: Mutex::new(()),
            stats,
        }
    }

    fn write(&self) -> WriteGuard<'_> {
        let lock = self.writer.lock();
        let stamp = self.stamp.load(Ordering::Relaxed);
        self.stamp.store(stamp + 1, Ordering::Relaxed);
        fence(Ordering::Release);
        WriteGuard {
            account: self,
            _lock: lock,
        }
    }

    /// Stamp to validate against, or `None` while a writer is inside
    fn try_optimistic_stamp(&self) -> Option<u64> {
        let stamp = self.stamp.load(Ordering::Acquire);
        (stamp % 2 == 0).then_some(stamp)
    }

    /// Whether nothing was written since `stamp` was taken
    ///
    /// Must be called after the data loads it is meant to validate.
    fn validate(&self, stamp: u64) -> bool {
        fence(Ordering::Acquire);
        self.stamp.load(Ordering::Relaxed) == stamp
    }

    /// Read the balance without taking the writer mutex
    pub fn optimistic_balance(&self) -> OptimisticRead<Amount> {
        let Some(stamp) = self.try_optimistic_stamp() else {
            return OptimisticRead::Stale;
        };
        let balance = self.balance.load(Ordering::Relaxed);
        if self.validate(stamp) {
            OptimisticRead::Validated(balance)
        } else {
            OptimisticRead::Stale
        }
    }

    fn guarded_balance(&self) -> Amount {
        let _lock = self.writer.lock();
        self.balance.load(Ordering::Relaxed)
    }
}

impl Account for OptimisticAccount {
    fn id(&self) -> AccountId {
        self.id
    }

    fn balance(&self) -> Amount {
        match self.optimistic_balance() {
            OptimisticRead::Validated(balance) => {
                self.stats.record_fast_path();
                balance
            }
            OptimisticRead::Stale => {
                self.stats.record_fallback();
                tracing::debug!(account = %self.id, "optimistic balance read stale, locking");
                self.guarded_balance()
            }
        }
    }

    fn deposit(&self, amount: Amount) -> Result<(), LedgerError> {
        let mut guard = self.write();
        let balance = credited(guard.get(), amount)?;
        guard.set(balance);
        Ok(())
    }

    fn withdraw(&self, amount: Amount) -> Result<(), LedgerError> {
        let mut guard = self.write();
        let balance = debited(self.id, guard.get(), amount)?;
        guard.set(balance);
        Ok(())
    }
}

/// Ledger whose reads proceed without blocking writers
#[derive(Debug, Default)]
pub struct OptimisticLedger {
    accounts: AccountRegistry<OptimisticAccount>,
    stats: Arc<LockStats>,
}

impl OptimisticLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sum all balances without taking any writer mutex
    ///
    /// Collects one stamp per account, reads every balance, then validates
    /// every stamp.
    pub fn optimistic_total(&self) -> OptimisticRead<Result<Amount, LedgerError>> {
        let accounts = self.accounts.read();

        let stamps: Option<Vec<u64>> = accounts
            .iter()
            .map(|account| account.try_optimistic_stamp())
            .collect();
        let Some(stamps) = stamps else {
            return OptimisticRead::Stale;
        };

        let balances: Vec<Amount> = accounts
            .iter()
            .map(|account| account.balance.load(Ordering::Relaxed))
            .collect();

        let valid = accounts
            .iter()
            .zip(stamps)
            .all(|(account, stamp)| account.validate(stamp));
        if valid {
            OptimisticRead::Validated(checked_total(balances))
        } else {
            OptimisticRead::Stale
        }
    }

    fn guarded_total(&self) -> Result<Amount, LedgerError> {
        let accounts = self.accounts.read();
        let locks: Vec<MutexGuard<'_, ()>> = accounts
            .iter()
            .map(|account| account.writer.lock())
            .collect();

        let total = checked_total(
            accounts
                .iter()
                .map(|account| account.balance.load(Ordering::Relaxed)),
        );

        for lock in locks.into_iter().rev() {
            drop(lock);
        }
        total
    }
}

impl Ledger for OptimisticLedger {
    type Account = OptimisticAccount;

    fn name(&self) -> &'static str {
        "optimistic"
    }

    fn create_account(&self) -> Arc<OptimisticAccount> {
        let stats = Arc::clone(&self.stats);
        self.accounts
            .register(move |id| OptimisticAccount::new(id, stats))
    }

    fn accounts(&self) -> Vec<Arc<OptimisticAccount>> {
        self.accounts.snapshot()
    }

    fn transfer(
        &self,
        from: &OptimisticAccount,
        to: &OptimisticAccount,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.accounts.assert_member(from);
        self.accounts.assert_member(to);
        if from.id == to.id {
            return Ok(());
        }

        let (first, second) = lock_order(from, to);
        let mut first_guard = first.write();
        let mut second_guard = second.write();
        let (from_guard, to_guard) = if first.id == from.id {
            (&mut first_guard, &mut second_guard)
        } else {
            (&mut second_guard, &mut first_guard)
        };

        let (new_from, new_to) = transferred((from.id, from_guard.get()), to_guard.get(), amount)?;
        from_guard.set(new_from);
        to_guard.set(new_to);
        Ok(())
    }

    fn total_funds(&self) -> Result<Amount, LedgerError> {
        match self.optimistic_total() {
            OptimisticRead::Validated(total) => {
                self.stats.record_fast_path();
                total
            }
            OptimisticRead::Stale => {
                self.stats.record_fallback();
                tracing::debug!("optimistic total stale, locking all accounts");
                self.guarded_total()
            }
        }
    }

    fn lock_stats(&self) -> LockStatsSnapshot {
        self.stats.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_quiescent_reads_take_the_fast_path() {
        let ledger = OptimisticLedger::new();
        let a = ledger.create_account();
        let b = ledger.create_account();
        a.deposit(40).unwrap();
        b.deposit(2).unwrap();
        ledger.transfer(&a, &b, 10).unwrap();

        assert_eq!(a.balance(), 30);
        assert_eq!(b.balance(), 12);
        assert_eq!(ledger.total_funds(), Ok(42));

        let stats = ledger.lock_stats();
        assert_eq!(stats.fast_path, 3);
        assert_eq!(stats.fallbacks, 0);
    }

    #[test]
    fn test_read_during_write_is_stale() {
        let ledger = OptimisticLedger::new();
        let account = ledger.create_account();
        account.deposit(7).unwrap();

        let guard = account.write();
        assert_eq!(account.optimistic_balance(), OptimisticRead::Stale);
        assert!(matches!(ledger.optimistic_total(), OptimisticRead::Stale));
        drop(guard);

        assert_eq!(account.optimistic_balance(), OptimisticRead::Validated(7));
    }

    #[test]
    fn test_stamp_validation_detects_intervening_write() {
        let ledger = OptimisticLedger::new();
        let account = ledger.create_account();

        let stamp = account.try_optimistic_stamp().unwrap();
        account.deposit(1).unwrap();

        assert!(!account.validate(stamp));
        assert_eq!(account.stamp.load(Ordering::Relaxed), stamp + 2);
    }

    #[test]
    fn test_stale_balance_falls_back_to_guarded_read() {
        let ledger = Arc::new(OptimisticLedger::new());
        let account = ledger.create_account();
        account.deposit(5).unwrap();

        let barrier = Arc::new(std::sync::Barrier::new(2));
        let guard = account.write();
        let reader = {
            let account = Arc::clone(&account);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                account.balance()
            })
        };
        barrier.wait();
        thread::sleep(std::time::Duration::from_millis(50));
        drop(guard);

        assert_eq!(reader.join().unwrap(), 5);
        assert_eq!(ledger.lock_stats().fallbacks, 1);
    }

    #[test]
    fn test_failed_withdraw_keeps_balance() {
        let ledger = OptimisticLedger::new();
        let account = ledger.create_account();
        account.deposit(2).unwrap();

        assert!(matches!(
            account.withdraw(3),
            Err(LedgerError::InsufficientFunds { balance: 2, requested: 3, .. })
        ));
        assert_eq!(account.balance(), 2);
    }

    #[test]
    fn test_concurrent_totals_never_observe_torn_transfer() {
        let ledger = Arc::new(OptimisticLedger::new());
        let accounts: Vec<_> = (0..4).map(|_| ledger.create_account()).collect();
        for account in &accounts {
            account.deposit(1_000).unwrap();
        }

        let mut handles = vec![];
        for t in 0..4 {
            let ledger = Arc::clone(&ledger);
            let accounts = accounts.clone();
            handles.push(thread::spawn(move || {
                for i in 0..2_000 {
                    let from = &accounts[(t + i) % 4];
                    let to = &accounts[(t + i + 1) % 4];
                    let _ = ledger.transfer(from, to, 3);
                }
            }));
        }

        for _ in 0..2_000 {
            assert_eq!(ledger.total_funds(), Ok(4_000));
        }
        for handle in handles {
            handle.join().unwrap();
        }
    }
}
