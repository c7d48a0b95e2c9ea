//! conformity-migrate - copy Conformity configuration between deployments
//!
//! The tool reads from a legacy Conformity organisation and writes into a
//! Cloud One Conformity organisation: profiles, accounts, rule settings,
//! groups, users, communication settings, report configs and suppressed
//! checks.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod error;
mod output;
mod prompts;

use error::CliResult;

/// Conformity to Cloud One configuration migration
#[derive(Parser)]
#[command(name = "conformity-migrate")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Increase log verbosity (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file for both deployments
    Configure(commands::configure::ConfigureArgs),

    /// Run the migration
    Migrate(commands::migrate::MigrateArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_filter = match cli.verbose {
        0 => "info,conformity_migration=debug",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    match run(cli).await {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            e.print();
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: Cli) -> CliResult<()> {
    match cli.command {
        Commands::Configure(args) => commands::configure::execute(args),
        Commands::Migrate(args) => commands::migrate::execute(args).await,
    }
}
