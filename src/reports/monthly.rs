//! Monthly summary report
//!
//! Income and expense totals for one month, spending by category and how
//! much of the month's budget has been used.

use std::collections::HashMap;
use std::io::Write;

use serde::Serialize;
use tracing::warn;

use crate::display::{format_amount, format_percentage, format_usage_bar, separator};
use crate::error::{PocketError, PocketResult};
use crate::models::{BudgetStatus, EntryType, Month};
use crate::services::{BudgetService, LedgerService};
use crate::storage::Storage;

/// Label for expenses without a category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Expense total for one category
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    pub entry_count: usize,
    /// Share of the month's expenses
    pub percentage: f64,
}

/// Summary of one month
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummary {
    pub month: String,
    pub total_income: f64,
    pub total_expense: f64,
    pub entry_count: usize,
    /// Largest expense category first
    pub categories: Vec<CategoryTotal>,
    pub budget: BudgetStatus,
    /// Expenses as a share of the limit, capped at 100
    pub budget_used_percent: f64,
    pub over_budget: bool,
}

impl MonthlySummary {
    /// Generate the summary for `month`
    pub fn generate(storage: &Storage, month: Month) -> PocketResult<Self> {
        let entries = LedgerService::new(storage).list()?;
        let budget = BudgetService::new(storage).get(month)?;

        let mut total_income = 0.0;
        let mut total_expense = 0.0;
        let mut entry_count = 0;
        let mut by_category: HashMap<String, (f64, usize)> = HashMap::new();

        for entry in &entries {
            let Some(date) = entry.parsed_date() else {
                warn!(id = entry.id, date = %entry.date, "skipping entry with unreadable date");
                continue;
            };
            if !month.contains(date) {
                continue;
            }

            entry_count += 1;
            match entry.entry_type {
                EntryType::Income => total_income += entry.amount,
                EntryType::Expense => {
                    total_expense += entry.amount;
                    let category = if entry.category.trim().is_empty() {
                        UNCATEGORIZED.to_string()
                    } else {
                        entry.category.clone()
                    };
                    let slot = by_category.entry(category).or_insert((0.0, 0));
                    slot.0 += entry.amount;
                    slot.1 += 1;
                }
                EntryType::Other(_) => {}
            }
        }

        let mut categories: Vec<CategoryTotal> = by_category
            .into_iter()
            .map(|(category, (amount, entry_count))| CategoryTotal {
                category,
                amount,
                entry_count,
                percentage: if total_expense > 0.0 {
                    amount / total_expense * 100.0
                } else {
                    0.0
                },
            })
            .collect();
        categories.sort_by(|a, b| {
            b.amount
                .total_cmp(&a.amount)
                .then_with(|| a.category.cmp(&b.category))
        });

        let over_budget = budget.enabled && total_expense > budget.monthly_limit;
        let budget_used_percent = if !budget.enabled {
            0.0
        } else if budget.monthly_limit > 0.0 {
            (total_expense / budget.monthly_limit * 100.0).min(100.0)
        } else if total_expense > 0.0 {
            100.0
        } else {
            0.0
        };

        Ok(Self {
            month: month.to_string(),
            total_income,
            total_expense,
            entry_count,
            categories,
            budget,
            budget_used_percent,
            over_budget,
        })
    }

    /// Income minus expenses
    pub fn net(&self) -> f64 {
        self.total_income - self.total_expense
    }

    /// Format the summary for terminal display
    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Monthly Summary: {}\n", self.month));
        output.push_str(&"=".repeat(60));
        output.push('\n');
        output.push_str(&format!("Income:   {:>12}\n", format_amount(self.total_income)));
        output.push_str(&format!("Expenses: {:>12}\n", format_amount(self.total_expense)));
        output.push_str(&format!("Net:      {:>12}\n", format_amount(self.net())));
        output.push_str(&format!("Entries:  {:>12}\n\n", self.entry_count));

        if self.budget.enabled {
            output.push_str(&format!(
                "Budget:   {:>12}  {} {}\n",
                format_amount(self.budget.monthly_limit),
                format_usage_bar(self.budget_used_percent, 20),
                format_percentage(self.budget_used_percent)
            ));
            if self.over_budget {
                output.push_str("          Over budget!\n");
            }
        } else {
            output.push_str("Budget:   not set\n");
        }

        if !self.categories.is_empty() {
            output.push_str(&format!("\n{:<24} {:>12} {:>6} {:>7}\n", "Category", "Amount", "Count", "%"));
            output.push_str(&separator(52));
            output.push('\n');
            for total in &self.categories {
                output.push_str(&format!(
                    "{:<24} {:>12} {:>6} {:>7}\n",
                    total.category,
                    format_amount(total.amount),
                    total.entry_count,
                    format_percentage(total.percentage)
                ));
            }
        }

        output
    }

    /// Write the category breakdown as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> PocketResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record(["month", "category", "amount", "count", "percentage"])?;
        for total in &self.categories {
            csv.write_record([
                self.month.clone(),
                total.category.clone(),
                format!("{:.2}", total.amount),
                total.entry_count.to_string(),
                format!("{:.2}", total.percentage),
            ])?;
        }
        csv.flush()
            .map_err(|e| PocketError::Io(format!("Failed to write report: {}", e)))?;
        Ok(())
    }
}
