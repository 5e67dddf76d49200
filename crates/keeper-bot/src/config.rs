//! Application configuration.

use crate::error::{AppError, AppResult};
use keeper_executor::ReplaceConfig;
use keeper_maker::MakerConfig;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which exchange deployment to run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    #[default]
    Devnet,
    Mainnet,
}

/// Which keeper this process runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum BotRole {
    #[default]
    Maker,
    Liquidator,
    Arbitrage,
}

/// Arbitrage role configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArbConfig {
    /// Price the sizer trades toward. When unset, the role only logs the
    /// slippage preview each cycle.
    #[serde(default)]
    pub target_price: Option<Decimal>,
    /// Hard cap on trade notional (quote currency).
    #[serde(default = "default_max_notional")]
    pub max_notional: Decimal,
    /// Notional whose slippage is previewed each cycle.
    #[serde(default = "default_probe_notional")]
    pub probe_notional: Decimal,
}

fn default_max_notional() -> Decimal {
    Decimal::from(100)
}

fn default_probe_notional() -> Decimal {
    Decimal::from(10)
}

impl Default for ArbConfig {
    fn default() -> Self {
        Self {
            target_price: None,
            max_notional: default_max_notional(),
            probe_notional: default_probe_notional(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Exchange deployment.
    #[serde(default)]
    pub network: Network,
    /// RPC endpoint of the exchange's chain.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,
    /// Keeper role this process runs.
    #[serde(default)]
    pub role: BotRole,
    /// Account id the bot trades as. The wallet credential for it comes
    /// from the environment, never from this file.
    #[serde(default)]
    pub account: Option<String>,
    /// Market the maker and arbitrage roles operate on.
    #[serde(default)]
    pub market: u16,
    /// Seconds between cycles.
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    /// Maker role configuration.
    #[serde(default)]
    pub maker: MakerConfig,
    /// Order replacement configuration.
    #[serde(default)]
    pub replace: ReplaceConfig,
    /// Arbitrage role configuration.
    #[serde(default)]
    pub arb: ArbConfig,
}

fn default_rpc_url() -> String {
    "http://127.0.0.1:8899".to_string()
}

fn default_cycle_interval_secs() -> u64 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: Network::default(),
            rpc_url: default_rpc_url(),
            role: BotRole::default(),
            account: None,
            market: 0,
            cycle_interval_secs: default_cycle_interval_secs(),
            maker: MakerConfig::default(),
            replace: ReplaceConfig::default(),
            arb: ArbConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the default location.
    pub fn load() -> AppResult<Self> {
        let config_path =
            std::env::var("KEEPER_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());

        if Path::new(&config_path).exists() {
            Self::from_file(&config_path)
        } else {
            tracing::warn!(path = %config_path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> AppResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("Failed to read config: {e}")))?;

        toml::from_str(&content).map_err(|e| AppError::Config(format!("Failed to parse config: {e}")))
    }
}
