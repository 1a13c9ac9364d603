//! Ledger CLI commands

use clap::Subcommand;

use super::parse_month_or_current;
use crate::display::{format_amount, format_entry_list};
use crate::error::PocketResult;
use crate::models::{EntryType, NewEntry};
use crate::services::LedgerService;
use crate::storage::Storage;

/// Ledger subcommands
#[derive(Subcommand)]
pub enum LedgerCommands {
    /// Record an income or expense
    Add {
        /// What happened (e.g., "Groceries")
        event: String,
        /// Amount (non-negative)
        amount: f64,
        /// Entry type: income or expense
        #[arg(short = 't', long = "type", default_value = "expense")]
        entry_type: EntryType,
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,
        /// Category
        #[arg(short, long, default_value = "")]
        category: String,
        /// Free-form remark
        #[arg(short, long, default_value = "")]
        remark: String,
    },
    /// List entries
    List {
        /// Only entries in this month (YYYY-MM or "current")
        #[arg(short, long)]
        month: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Delete an entry by id
    Delete {
        /// Entry id
        id: u64,
    },
}

/// Handle a ledger command
pub fn handle_ledger_command(storage: &Storage, cmd: LedgerCommands) -> PocketResult<()> {
    let service = LedgerService::new(storage);

    match cmd {
        LedgerCommands::Add {
            event,
            amount,
            entry_type,
            date,
            category,
            remark,
        } => {
            let date =
                date.unwrap_or_else(|| chrono::Local::now().date_naive().format("%Y-%m-%d").to_string());
            let entry = service.record(NewEntry {
                date,
                event,
                amount,
                entry_type,
                remark,
                category,
            })?;

            println!(
                "Recorded {} #{}: {} {} on {}",
                entry.entry_type,
                entry.id,
                entry.event,
                format_amount(entry.amount),
                entry.date
            );
        }

        LedgerCommands::List { month, json } => {
            let entries = match month {
                Some(month) => service.list_month(parse_month_or_current(Some(&month))?)?,
                None => service.list()?,
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", format_entry_list(&entries));
            }
        }

        LedgerCommands::Delete { id } => {
            if service.delete(id)? {
                println!("Deleted entry #{}", id);
            } else {
                println!("No entry #{}; nothing deleted.", id);
            }
        }
    }

    Ok(())
}
