//! Application error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Wallet error: {0}")]
    Wallet(#[from] crate::wallet::WalletError),

    #[error("Telemetry error: {0}")]
    Telemetry(#[from] keeper_telemetry::TelemetryError),

    #[error("Exchange error: {0}")]
    Exchange(#[from] keeper_exchange::ExchangeError),

    #[error("Maker error: {0}")]
    Maker(#[from] keeper_maker::MakerError),

    #[error("Executor error: {0}")]
    Executor(#[from] keeper_executor::ExecutorError),

    #[error("Liquidator error: {0}")]
    Liquidator(#[from] keeper_liquidator::LiquidatorError),

    #[error("Sizer error: {0}")]
    Arb(#[from] keeper_arb::ArbError),

    #[error("Core error: {0}")]
    Core(#[from] keeper_core::CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AppResult<T> = Result<T, AppError>;
