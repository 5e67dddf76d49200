//! Arbitrage keeper.
//!
//! Sizes a trade that pushes a market's mark price toward a target,
//! capped at a configured maximum notional.

pub mod error;
pub mod sizer;

pub use error::{ArbError, ArbResult};
pub use sizer::{preview_slippage, SizedTrade, TargetPriceSizer};
