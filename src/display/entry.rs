//! Ledger entry display formatting

use super::{format_amount, truncate};
use crate::models::{EntryType, LedgerEntry};

/// Format a single entry as a register row
pub fn format_entry_row(entry: &LedgerEntry) -> String {
    let sign = match entry.entry_type {
        EntryType::Income => "+",
        EntryType::Expense => "-",
        EntryType::Other(_) => " ",
    };

    format!(
        "{:>5} {:10} {:24} {}{:>11} {:14} {}",
        entry.id,
        entry.date,
        truncate(&entry.event, 24),
        sign,
        format_amount(entry.amount),
        truncate(&entry.category, 14),
        entry.remark
    )
}

/// Format a list of entries as a register
pub fn format_entry_list(entries: &[LedgerEntry]) -> String {
    if entries.is_empty() {
        return "No entries found.\n".to_string();
    }

    let mut output = String::new();
    output.push_str(&format!(
        "{:>5} {:10} {:24} {:>12} {:14} {}\n",
        "ID", "Date", "Event", "Amount", "Category", "Remark"
    ));
    output.push_str(&"-".repeat(80));
    output.push('\n');

    for entry in entries {
        output.push_str(&format_entry_row(entry));
        output.push('\n');
    }

    output
}
