//! Error types for the exchange client contract.

use keeper_core::{AccountId, MarketIndex};
use thiserror::Error;

/// Errors surfaced by an exchange client implementation.
#[derive(Debug, Clone, Error)]
pub enum ExchangeError {
    /// The exchange rejected a transaction (post-only would cross, position
    /// cap, insufficient balance, ...). Atomic: nothing was applied.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error("Unknown account: {0}")]
    UnknownAccount(AccountId),

    #[error("Unknown market: {0}")]
    UnknownMarket(MarketIndex),

    /// Call did not complete in time; the cycle should treat this as a
    /// failure and retry next tick.
    #[error("Exchange call timed out")]
    Timeout,

    #[error("Transport error: {0}")]
    Transport(String),
}

impl ExchangeError {
    /// Whether retrying the same call on a later cycle can succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Rejected(_) | Self::Timeout | Self::Transport(_)
        )
    }
}

/// Result type alias for exchange calls.
pub type ExchangeResult<T> = std::result::Result<T, ExchangeError>;
