//! Error types for the concurrent ledger
//!
//! This module defines the errors that ledger operations and the simulation
//! driver can report.
//!
//! # Error Categories
//!
//! - **Domain Errors**: Insufficient funds, arithmetic overflow
//! - **Contention Errors**: Lock acquisition budget exhausted (polling strategy only)
//! - **Driver Errors**: Runtime construction, CSV output, ledger seeding

use super::account::{AccountId, Amount};
use thiserror::Error;

/// Errors returned by ledger operations
///
/// Every variant is recoverable and guarantees that no account was left
/// partially mutated by the failing operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// Withdrawal or transfer debit exceeds the account balance
    ///
    /// The account keeps its balance; in a transfer the credit never happens.
    #[error("Insufficient funds in account {account}: balance {balance}, requested {requested}")]
    InsufficientFunds {
        /// Account that could not cover the amount
        account: AccountId,
        /// Balance observed under the account guard
        balance: Amount,
        /// Requested amount
        requested: Amount,
    },

    /// Bounded lock polling gave up
    ///
    /// Raised only by the polling strategy once its retry budget or deadline
    /// is exhausted. All guards taken by the attempt have been released.
    #[error("Timed out acquiring locks for {operation} after {attempts} attempts")]
    LockTimeout {
        /// Operation that was aborted
        operation: String,
        /// Number of acquisition attempts made
        attempts: u32,
    },

    /// A credit or a sum would exceed the balance range
    #[error("Arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        /// Operation that would overflow
        operation: String,
    },
}

impl LedgerError {
    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, balance: Amount, requested: Amount) -> Self {
        LedgerError::InsufficientFunds {
            account,
            balance,
            requested,
        }
    }

    /// Create a LockTimeout error
    pub fn lock_timeout(operation: &str, attempts: u32) -> Self {
        LedgerError::LockTimeout {
            operation: operation.to_string(),
            attempts,
        }
    }

    /// Create an ArithmeticOverflow error
    pub fn arithmetic_overflow(operation: &str) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
        }
    }

    /// Whether retrying the same operation later may succeed without any
    /// other change to the ledger
    pub fn is_retryable(&self) -> bool {
        matches!(self, LedgerError::LockTimeout { .. })
    }
}

/// Fatal errors of the simulation driver
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The worker runtime could not be built
    #[error("Failed to create worker runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// The report could not be written
    #[error("Failed to write CSV report: {0}")]
    Csv(#[from] csv::Error),

    /// Seeding the ledger failed
    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::account::LedgerId;
    use rstest::rstest;

    fn account(ordinal: usize) -> AccountId {
        AccountId::new(LedgerId(0), ordinal)
    }

    #[rstest]
    #[case::insufficient_funds(
        LedgerError::InsufficientFunds { account: account(1), balance: 5, requested: 10 },
        "Insufficient funds in account 1: balance 5, requested 10"
    )]
    #[case::lock_timeout(
        LedgerError::LockTimeout { operation: "transfer".to_string(), attempts: 64 },
        "Timed out acquiring locks for transfer after 64 attempts"
    )]
    #[case::arithmetic_overflow(
        LedgerError::ArithmeticOverflow { operation: "deposit".to_string() },
        "Arithmetic overflow in deposit"
    )]
    fn test_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::insufficient_funds(
        LedgerError::insufficient_funds(account(2), 3, 4),
        LedgerError::InsufficientFunds { account: account(2), balance: 3, requested: 4 }
    )]
    #[case::lock_timeout(
        LedgerError::lock_timeout("total_funds", 8),
        LedgerError::LockTimeout { operation: "total_funds".to_string(), attempts: 8 }
    )]
    #[case::arithmetic_overflow(
        LedgerError::arithmetic_overflow("credit"),
        LedgerError::ArithmeticOverflow { operation: "credit".to_string() }
    )]
    fn test_helper_functions(#[case] result: LedgerError, #[case] expected: LedgerError) {
        assert_eq!(result, expected);
    }

    #[rstest]
    #[case(LedgerError::lock_timeout("transfer", 1), true)]
    #[case(LedgerError::insufficient_funds(account(0), 0, 1), false)]
    #[case(LedgerError::arithmetic_overflow("deposit"), false)]
    fn test_is_retryable(#[case] error: LedgerError, #[case] expected: bool) {
        assert_eq!(error.is_retryable(), expected);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::Other, "no threads");
        let error: SimulationError = io_error.into();
        assert!(matches!(error, SimulationError::Runtime(_)));
        assert_eq!(error.to_string(), "Failed to create worker runtime: no threads");
    }
}
