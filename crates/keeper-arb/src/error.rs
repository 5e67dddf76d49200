//! Error types for trade sizing.

use keeper_core::{MarketIndex, Price};
use keeper_exchange::ExchangeError;
use thiserror::Error;

/// Errors from the target-price sizer.
#[derive(Debug, Clone, Error)]
pub enum ArbError {
    /// Reading the market snapshot failed.
    #[error("Market read failed: {0}")]
    MarketRead(#[source] ExchangeError),

    /// A price-impact query failed mid-search.
    #[error("Price impact query failed: {0}")]
    ImpactQuery(#[source] ExchangeError),

    /// No finite notional moves the mark to the target. The exchange's
    /// impact curve flattens out; the search gave up rather than probing
    /// ever larger notionals.
    #[error("No notional reaches target {target} in {market}")]
    TargetUnreachable { market: MarketIndex, target: Price },
}

/// Result type alias for sizer operations.
pub type ArbResult<T> = std::result::Result<T, ArbError>;
