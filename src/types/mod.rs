//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identity and balance types
//! - `error`: Error types for ledger operations and the simulation driver

pub mod account;
pub mod error;

pub use account::{AccountId, AccountSnapshot, Amount, LedgerId};
pub use error::{LedgerError, SimulationError};
