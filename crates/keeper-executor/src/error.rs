//! Error types for order replacement.

use keeper_core::PositionLimitExceeded;
use keeper_exchange::ExchangeError;
use thiserror::Error;

/// Errors from the order replacement protocol.
#[derive(Debug, Clone, Error)]
pub enum ExecutorError {
    /// The exchange rejected the whole batch. Nothing was applied;
    /// retryable by rebuilding quotes on the next cycle.
    #[error("Order batch rejected: {0}")]
    BatchRejected(#[source] ExchangeError),

    /// Cross-market position cap would be violated by a placement. Checked
    /// again at submission time since account state may have moved since
    /// quote construction.
    #[error(transparent)]
    PositionLimitExceeded(#[from] PositionLimitExceeded),

    /// Reading account state failed before anything was submitted.
    #[error("Account read failed: {0}")]
    AccountRead(#[source] ExchangeError),
}

impl ExecutorError {
    /// Whether the caller may simply rebuild and retry next cycle.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::BatchRejected(_) | Self::AccountRead(_))
    }
}

/// Result type alias for executor operations.
pub type ExecutorResult<T> = std::result::Result<T, ExecutorError>;
