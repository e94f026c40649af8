//! Account identity types for the concurrent ledger
//!
//! Every account is identified by the ledger that created it and an ordinal
//! assigned in creation order. The ordinal is the only sort key used when a
//! strategy has to hold more than one account guard at a time.

use serde::Serialize;
use std::fmt;

/// Balance and amount type
///
/// Balances are plain non-negative integers, so a negative amount cannot be
/// expressed at all.
pub type Amount = u64;

/// Identifier of a ledger instance
///
/// Assigned once per ledger from a process-wide counter. Accounts carry the id
/// of the ledger that created them so a ledger can reject foreign handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LedgerId(pub(crate) u64);

/// Immutable account identifier
///
/// Ordering compares the ledger first and the ordinal second. Within one ledger
/// this is exactly creation order, which defines the global lock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId {
    ledger: LedgerId,
    ordinal: usize,
}

impl AccountId {
    pub(crate) fn new(ledger: LedgerId, ordinal: usize) -> Self {
        AccountId { ledger, ordinal }
    }

    /// Creation-order index of the account within its ledger
    pub fn ordinal(self) -> usize {
        self.ordinal
    }

    /// Ledger that created the account
    pub fn ledger(self) -> LedgerId {
        self.ledger
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.ordinal)
    }
}

/// Point-in-time view of one account, used for output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    /// Creation-order index
    pub account: usize,
    /// Balance observed when the snapshot was taken
    pub balance: Amount,
}
