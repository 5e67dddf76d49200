//! Error types for account discovery and liquidation.

use keeper_core::AccountId;
use keeper_exchange::ExchangeError;
use thiserror::Error;

/// Errors from the liquidation keeper.
#[derive(Debug, Clone, Error)]
pub enum LiquidatorError {
    /// Listing accounts on the exchange failed. The registry is left
    /// unchanged; the next discovery cycle retries from the same state.
    #[error("Account discovery failed: {0}")]
    DiscoveryFailed(#[source] ExchangeError),

    /// A liquidation call for one account failed. Recorded per account in
    /// the scan outcome, never propagated out of the sweep.
    #[error("Liquidation of {account} failed: {source}")]
    LiquidationCallFailed {
        account: AccountId,
        #[source]
        source: ExchangeError,
    },
}

/// Result type alias for liquidator operations.
pub type LiquidatorResult<T> = std::result::Result<T, LiquidatorError>;
