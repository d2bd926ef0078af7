use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{ConfigCommand, GoalsCommand, MealCommand, SummaryCommand};
use config::Config;
use nutrilog_core::{FileStore, MealLedger};

#[derive(Parser)]
#[command(name = "nutrilog")]
#[command(version)]
#[command(about = "A meal and nutrition journal for the command line", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Record, edit and list meals
    Meal(MealCommand),

    /// Show a day's intake against goals
    Summary(SummaryCommand),

    /// View and change nutrition goals
    Goals(GoalsCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.clone())?;
    init_tracing(&config.log_level.value);

    match cli.command {
        Some(Commands::Meal(cmd)) => {
            let mut ledger = open_ledger(&config);
            cmd.run(&mut ledger)?;
        }
        Some(Commands::Summary(cmd)) => {
            let ledger = open_ledger(&config);
            cmd.run(&ledger)?;
        }
        Some(Commands::Goals(cmd)) => {
            let mut ledger = open_ledger(&config);
            cmd.run(&mut ledger)?;
        }
        Some(Commands::Config(cmd)) => {
            cmd.run(&config, cli.config.as_deref())?;
        }
        None => {
            println!("Use --help to see available commands");
        }
    }

    Ok(())
}

/// Logs go to stderr so command output stays pipeable.
fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn open_ledger(config: &Config) -> MealLedger<FileStore> {
    tracing::debug!("Data directory: {}", config.data_dir.value.display());
    MealLedger::with_store(FileStore::new(config.data_dir.value.clone()))
}
