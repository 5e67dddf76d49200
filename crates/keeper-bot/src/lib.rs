//! Keeper bot application.
//!
//! One process runs one keeper role against the exchange:
//! - market maker: quote a two-sided spread every cycle,
//! - liquidator: discover accounts and close the undercollateralized ones,
//! - arbitrage: trade the mark toward a configured target price.

pub mod app;
pub mod config;
pub mod error;
pub mod wallet;

pub use app::Application;
pub use config::{AppConfig, ArbConfig, BotRole, Network};
pub use error::{AppError, AppResult};
pub use wallet::{KeySource, Wallet};
