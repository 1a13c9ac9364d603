//! Budget CLI commands

use clap::Subcommand;

use super::parse_month_or_current;
use crate::display::format_amount;
use crate::error::PocketResult;
use crate::services::BudgetService;
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the spending limit for a month
    Set {
        /// Monthly limit
        amount: f64,
        /// Month (YYYY-MM or "current"), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show the limit for a month
    Show {
        /// Month (YYYY-MM or "current"), defaults to the current month
        #[arg(short, long)]
        month: Option<String>,
    },
    /// Show the latest month that has a limit
    Last,
    /// List every monthly limit
    List,
}

/// Handle a budget command
pub fn handle_budget_command(storage: &Storage, cmd: BudgetCommands) -> PocketResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Set { amount, month } => {
            let month = parse_month_or_current(month.as_deref())?;
            let budget = service.set(month, amount)?;
            println!(
                "Budget for {} set to {}",
                month,
                format_amount(budget.monthly_limit)
            );
        }

        BudgetCommands::Show { month } => {
            let month = parse_month_or_current(month.as_deref())?;
            let status = service.get(month)?;
            if status.enabled {
                println!("Budget for {}: {}", month, format_amount(status.monthly_limit));
            } else {
                println!("No budget set for {}", month);
            }
        }

        BudgetCommands::Last => match service.last()? {
            Some(budget) => println!(
                "Latest budget: {:04}-{:02} {}",
                budget.year,
                budget.month,
                format_amount(budget.monthly_limit)
            ),
            None => println!("No budgets set."),
        },

        BudgetCommands::List => {
            let budgets = service.list()?;
            if budgets.is_empty() {
                println!("No budgets set.");
                return Ok(());
            }

            println!("{:8} {:>12}", "Month", "Limit");
            println!("{}", "-".repeat(21));
            for budget in &budgets {
                println!(
                    "{:04}-{:02}  {:>12}",
                    budget.year,
                    budget.month,
                    format_amount(budget.monthly_limit)
                );
            }
        }
    }

    Ok(())
}
