//! CLI command implementations

use anyhow::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::chain::{format_units, ChainClient, DryRunChainClient, SolanaChainClient};
use crate::config::Config;
use crate::schedule::{BalanceGuard, DailyScheduler};
use crate::telemetry::status::{run_status_board, StatusBoard};
use crate::telemetry::TelemetrySink;
use crate::wallet::{load_sender_keypair, TransferExecutor};

/// Build the chain client from configuration
fn connect(config: &Config, dry_run: bool) -> Result<Arc<dyn ChainClient>> {
    let keypair = load_sender_keypair(&config.sender)?;
    let client: Arc<dyn ChainClient> = Arc::new(SolanaChainClient::new(&config.rpc, keypair)?);

    if dry_run {
        Ok(Arc::new(DryRunChainClient::new(client)))
    } else {
        Ok(client)
    }
}

/// Start the pacer
pub async fn start(config: &Config, dry_run: bool) -> Result<()> {
    if dry_run {
        warn!("Running in DRY-RUN mode - no transfers will be submitted");
    }

    info!("Starting transfer pacer...");
    info!(
        "Schedule: {}-{} tx/day, {}-{}s apart, {}-{} {}",
        config.schedule.tx_min_per_day,
        config.schedule.tx_max_per_day,
        config.schedule.delay_min_secs,
        config.schedule.delay_max_secs,
        config.schedule.amount_min,
        config.schedule.amount_max,
        config.schedule.symbol
    );

    let client = connect(config, dry_run)?;
    let settings = config.schedule_settings(client.sender())?;
    let guard = BalanceGuard::with_reserve_bps(config.schedule.reserve_bps);
    let executor = TransferExecutor::new(client, guard);

    // Status board drains telemetry until every sink is dropped
    let (telemetry, rx) = TelemetrySink::channel(config.telemetry.channel_capacity);
    let board = tokio::spawn(run_status_board(
        rx,
        StatusBoard::new(config.telemetry.recent_limit)
            .with_units(config.schedule.decimals, config.schedule.symbol.clone()),
    ));

    let cancel = CancellationToken::new();
    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            shutdown.cancel();
        }
    });

    let mut scheduler = DailyScheduler::new(executor, settings, telemetry.clone(), cancel);

    let result = match scheduler.announce().await {
        Ok(network) => {
            if network.name == "mainnet-beta" {
                warn!("Connected to {} - transfers move real funds", network);
            }
            scheduler.run().await
        }
        Err(e) => Err(e),
    };

    let dropped = telemetry.dropped_count();
    drop(scheduler);
    drop(telemetry);

    let board = board.await?;
    info!("Pacer stopped\n{}", board.summary());
    if dropped > 0 {
        warn!("{} telemetry events were dropped", dropped);
    }

    result?;
    Ok(())
}

/// Show sender balance and network
pub async fn status(config: &Config) -> Result<()> {
    let client = connect(config, false)?;
    let settings = config.schedule_settings(client.sender())?;

    let network = client.get_network_info().await?;
    let balance = client.get_balance(client.sender()).await?;
    let reserve = BalanceGuard::with_reserve_bps(config.schedule.reserve_bps).reserve(balance);

    println!("\n=== TRANSFER PACER STATUS ===\n");
    println!("Network: {}", network);
    println!("Wallet:  {}", client.sender());
    println!("DEST:    {}", settings.destination);
    println!(
        "Balance: {} {}",
        format_units(balance, settings.decimals),
        settings.symbol
    );
    println!(
        "Reserve: {} {} ({}bps)",
        format_units(reserve, settings.decimals),
        settings.symbol,
        config.schedule.reserve_bps
    );

    Ok(())
}

/// Show current configuration (secrets masked)
pub fn show_config(config: &Config) -> Result<()> {
    println!("{}", config.masked_display());
    Ok(())
}
