//! Atomic order replacement.
//!
//! Cancels an account's stale resting orders and places the cycle's fresh
//! intents as a single all-or-nothing transaction.

pub mod error;
pub mod replace;

pub use error::{ExecutorError, ExecutorResult};
pub use replace::{OrderReplacer, ReplaceConfig};
