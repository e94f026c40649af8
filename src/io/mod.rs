//! I/O module
//!
//! Handles CSV output of simulation results.
//!
//! # Components
//!
//! - `report_csv` - Report and balance serialization

pub mod report_csv;

pub use report_csv::{write_balances_csv, write_reports_csv, ReportRow};
