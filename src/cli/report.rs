//! Report CLI command

use clap::Args;

use super::parse_month_or_current;
use crate::error::PocketResult;
use crate::reports::MonthlySummary;
use crate::storage::Storage;

/// Arguments for the monthly report
#[derive(Args)]
pub struct ReportArgs {
    /// Month (YYYY-MM or "current"), defaults to the current month
    #[arg(short, long)]
    pub month: Option<String>,
    /// Print the category breakdown as CSV
    #[arg(long, conflicts_with = "json")]
    pub csv: bool,
    /// Print the summary as JSON
    #[arg(long)]
    pub json: bool,
}

/// Handle the report command
pub fn handle_report_command(storage: &Storage, args: ReportArgs) -> PocketResult<()> {
    let month = parse_month_or_current(args.month.as_deref())?;
    let summary = MonthlySummary::generate(storage, month)?;

    if args.csv {
        summary.export_csv(std::io::stdout().lock())?;
    } else if args.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        print!("{}", summary.format_terminal());
    }

    Ok(())
}
