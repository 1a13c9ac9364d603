use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pocket_ledger::cli::{
    handle_budget_command, handle_ledger_command, handle_report_command, handle_todo_command,
};
use pocket_ledger::config::{paths::PocketPaths, settings::Settings};
use pocket_ledger::storage::{self, Storage};

#[derive(Parser)]
#[command(
    name = "pocket",
    version,
    about = "Flat-file ledger, to-do list and monthly budgets",
    long_about = "pocket keeps financial entries, to-do items and monthly budgets in \
                  plain CSV and JSON files. Several pocket processes may work on the \
                  same data directory at once."
)]
struct Cli {
    /// Data directory (overrides POCKET_LEDGER_DATA_DIR)
    #[arg(long, global = true, value_name = "DIR", env = "POCKET_LEDGER_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Log debug diagnostics to stderr
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Ledger entry commands
    #[command(subcommand)]
    Ledger(pocket_ledger::cli::LedgerCommands),

    /// To-do list commands
    #[command(subcommand)]
    Todo(pocket_ledger::cli::TodoCommands),

    /// Monthly budget commands
    #[command(subcommand)]
    Budget(pocket_ledger::cli::BudgetCommands),

    /// Monthly summary of income, expenses and budget use
    Report(pocket_ledger::cli::ReportArgs),

    /// Create the data directory, settings and empty data files
    Init,

    /// Show current configuration and paths
    Config,
}

fn init_tracing(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    // Initialize paths and settings
    let paths = PocketPaths::resolve(cli.data_dir)?;
    let settings = Settings::load_or_create(&paths)?;

    match cli.command {
        Some(Commands::Ledger(cmd)) => {
            let storage = Storage::new(paths, &settings)?;
            handle_ledger_command(&storage, cmd)?;
        }
        Some(Commands::Todo(cmd)) => {
            let storage = Storage::new(paths, &settings)?;
            handle_todo_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            let storage = Storage::new(paths, &settings)?;
            handle_budget_command(&storage, cmd)?;
        }
        Some(Commands::Report(args)) => {
            let storage = Storage::new(paths, &settings)?;
            handle_report_command(&storage, args)?;
        }
        Some(Commands::Init) => {
            if !storage::init::needs_initialization(&paths) {
                println!("pocket is already initialized at: {}", paths.base_dir().display());
                return Ok(());
            }
            println!("Initializing pocket at: {}", paths.base_dir().display());
            storage::initialize_storage(&paths)?;
            println!("Initialization complete!");
            println!();
            println!("  Ledger:   {}", paths.ledger_file().display());
            println!("  Tasks:    {}", paths.tasks_file().display());
            println!("  Budgets:  {}", paths.budget_file().display());
            println!("  Settings: {}", paths.settings_file().display());
        }
        Some(Commands::Config) => {
            println!("pocket Configuration");
            println!("====================");
            println!("Data directory: {}", paths.base_dir().display());
            println!("Ledger file:    {}", paths.ledger_file().display());
            println!("Tasks file:     {}", paths.tasks_file().display());
            println!("Budget file:    {}", paths.budget_file().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!();
            println!("Settings:");
            println!("  Lock timeout:          {} ms", settings.lock_timeout_ms);
            println!("  Lock strategy:         {:?}", settings.lock_strategy);
            println!("  Default task category: {}", settings.default_task_category);
        }
        None => {
            println!("pocket - flat-file ledger, to-do list and monthly budgets");
            println!();
            println!("Run 'pocket --help' for usage information.");
        }
    }

    Ok(())
}
