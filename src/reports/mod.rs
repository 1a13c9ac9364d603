//! Reports module for pocket-ledger
//!
//! Summaries computed from the ledger and the budget document.

pub mod monthly;

pub use monthly::{CategoryTotal, MonthlySummary};
