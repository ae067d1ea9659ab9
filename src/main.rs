//! Testnet Transfer Pacer - paced daily transfers to a fixed destination
//!
//! # WARNING
//! - Point RPC_URL at a test network. The pacer will spend whatever the
//!   sender holds above its reserve.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::error;

use testnet_pacer::cli::commands;
use testnet_pacer::config::Config;

/// Testnet Transfer Pacer - organic-looking daily transfer schedule
#[derive(Parser)]
#[command(name = "pacer")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the daily transfer schedule
    Start {
        /// Run in dry-run mode (balances are read, nothing is sent)
        #[arg(long)]
        dry_run: bool,
    },

    /// Show sender balance, reserve and network
    Status,

    /// Show current configuration (secrets masked)
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("testnet_pacer=info".parse()?),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Start { dry_run } => commands::start(&config, dry_run).await,
        Commands::Status => commands::status(&config).await,
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}
