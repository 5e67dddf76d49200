//! Keeper bot entry point.
//!
//! One process runs one role (maker, liquidator, arbitrage) against the
//! exchange on a fixed cadence.

use anyhow::Result;
use clap::Parser;
use keeper_bot::{AppConfig, Application, BotRole, KeySource, Wallet};
use keeper_core::AccountId;
use keeper_exchange::{DynExchangeClient, SimExchange};
use std::sync::Arc;
use tracing::info;

/// Perp exchange keeper bots
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via KEEPER_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    /// Override the role from the config file
    #[arg(short, long, value_enum)]
    role: Option<BotRole>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    keeper_telemetry::init_logging()?;

    info!("Starting keeper bot v{}", env!("CARGO_PKG_VERSION"));

    let config_path = args
        .config
        .or_else(|| std::env::var("KEEPER_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let mut config = AppConfig::from_file(&config_path)?;
    if let Some(role) = args.role {
        config.role = role;
    }
    info!(role = ?config.role, network = ?config.network, rpc_url = %config.rpc_url, "Configuration loaded");

    // The credential is loaded up front so a misconfigured deployment
    // fails here instead of at the first submission.
    let account = config
        .account
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("account is required in config"))?;
    let wallet = Wallet::load(&KeySource::default(), AccountId::parse(account)?)?;
    info!(account = %wallet.account(), "Wallet loaded");

    // Dry-run exchange; an on-chain client implements the same trait and
    // plugs in here.
    let client: DynExchangeClient = Arc::new(SimExchange::new());

    let app = Application::new(config, client)?;
    app.bootstrap().await?;
    app.run().await?;

    Ok(())
}
