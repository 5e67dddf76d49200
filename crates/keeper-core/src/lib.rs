//! Core domain types for the keeper bots.
//!
//! This crate provides the fundamental types shared by every keeper:
//! - `Price`, `Size`: precision-safe numeric types
//! - `MarketIndex`, `MarketSnapshot`: read-only market state
//! - `AccountId`, `Position`, `OpenOrder`: cached account snapshots
//! - `OrderIntent`: immutable per-cycle order specification

pub mod account;
pub mod decimal;
pub mod error;
pub mod market;
pub mod order;

pub use account::{
    check_cross_margin_limit, AccountId, OpenOrder, OrderStatus, Position, PositionLimitExceeded,
    MAX_CROSS_MARGIN_MARKETS,
};
pub use decimal::{Price, Size};
pub use error::{CoreError, Result};
pub use market::{MarketIndex, MarketSnapshot};
pub use order::{OrderIntent, OrderSide};
