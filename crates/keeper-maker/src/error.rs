//! Error types for quote construction.

use keeper_core::PositionLimitExceeded;
use thiserror::Error;

/// Errors from building quotes.
#[derive(Debug, Clone, Error)]
pub enum MakerError {
    /// Computed limit prices are non-positive or crossed. Fatal to this
    /// quote cycle only; skip submission and rebuild next tick.
    #[error("Invalid spread: {0}")]
    InvalidSpread(String),

    #[error(transparent)]
    PositionLimitExceeded(#[from] PositionLimitExceeded),
}

/// Result type alias for maker operations.
pub type MakerResult<T> = std::result::Result<T, MakerError>;
