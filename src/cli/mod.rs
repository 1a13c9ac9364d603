//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod budget;
pub mod ledger;
pub mod report;
pub mod todo;

pub use budget::{handle_budget_command, BudgetCommands};
pub use ledger::{handle_ledger_command, LedgerCommands};
pub use report::{handle_report_command, ReportArgs};
pub use todo::{handle_todo_command, TodoCommands};

use crate::error::{PocketError, PocketResult};
use crate::models::Month;

/// Parse a month argument ("YYYY-MM" or "current"), defaulting to the current month
pub fn parse_month_or_current(arg: Option<&str>) -> PocketResult<Month> {
    match arg.map(str::trim) {
        None | Some("current") => Ok(Month::current()),
        Some(s) => Month::parse(s).map_err(|e| PocketError::Validation(e.to_string())),
    }
}
