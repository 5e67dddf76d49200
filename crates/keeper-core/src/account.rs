//! Account snapshots and the cross-market position guard.
//!
//! Accounts are owned by the exchange; the keepers cache a per-cycle read
//! snapshot of positions and resting orders. The one rule enforced here is
//! the cross-margin cap: an account may carry positions in at most
//! [`MAX_CROSS_MARGIN_MARKETS`] distinct markets.

use crate::decimal::{Price, Size};
use crate::error::CoreError;
use crate::market::MarketIndex;
use crate::order::OrderSide;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of distinct markets an account may hold positions in.
pub const MAX_CROSS_MARGIN_MARKETS: usize = 5;

/// On-chain account identifier (public key, hex encoded).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(String);

impl AccountId {
    /// Create from a hex public key string.
    ///
    /// Accepts an optional `0x` prefix; the remainder must be valid hex.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        let raw = s.strip_prefix("0x").unwrap_or(s);
        if raw.is_empty() || hex::decode(raw).is_err() {
            return Err(CoreError::InvalidAccountId(s.to_string()));
        }
        Ok(Self(s.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// One market's exposure within an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Position {
    /// Market the exposure is in.
    pub market: MarketIndex,
    /// Signed base-asset amount (positive = long, negative = short).
    pub base_asset_amount: Decimal,
}

impl Position {
    pub fn new(market: MarketIndex, base_asset_amount: Decimal) -> Self {
        Self {
            market,
            base_asset_amount,
        }
    }

    pub fn is_open(&self) -> bool {
        !self.base_asset_amount.is_zero()
    }
}

/// Status of a resting order slot on the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Slot has never been used (not an outstanding order).
    Init,
    /// Order is resting on the book.
    Open,
}

/// A resting order as read back from the exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    /// Exchange-assigned order id.
    pub order_id: u64,
    /// Market the order rests in.
    pub market: MarketIndex,
    pub side: OrderSide,
    pub size: Size,
    pub price: Price,
    pub status: OrderStatus,
}

impl OpenOrder {
    /// Outstanding means the slot holds a live order, not an initial slot.
    pub fn is_outstanding(&self) -> bool {
        self.status != OrderStatus::Init
    }
}

/// Cross-market position cap violated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "cannot place an order for additional {market}: account already holds positions in {held} markets (max {MAX_CROSS_MARGIN_MARKETS})"
)]
pub struct PositionLimitExceeded {
    /// Market the rejected order targeted.
    pub market: MarketIndex,
    /// Number of distinct markets the account already holds.
    pub held: usize,
}

/// Enforce the cross-margin market cap for a prospective order.
///
/// Quoting into a market the account already has exposure in is always
/// allowed; opening exposure in a new market fails once the account holds
/// positions in [`MAX_CROSS_MARGIN_MARKETS`] distinct markets.
pub fn check_cross_margin_limit(
    positions: &[Position],
    target: MarketIndex,
) -> Result<(), PositionLimitExceeded> {
    let held: HashSet<MarketIndex> = positions
        .iter()
        .filter(|p| p.is_open())
        .map(|p| p.market)
        .collect();

    if held.len() >= MAX_CROSS_MARGIN_MARKETS && !held.contains(&target) {
        return Err(PositionLimitExceeded {
            market: target,
            held: held.len(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn positions_in(markets: &[u16]) -> Vec<Position> {
        markets
            .iter()
            .map(|&m| Position::new(MarketIndex::new(m), dec!(1)))
            .collect()
    }

    #[test]
    fn test_account_id_parse() {
        assert!(AccountId::parse("deadbeef").is_ok());
        assert!(AccountId::parse("0xdeadbeef").is_ok());
        assert!(AccountId::parse("").is_err());
        assert!(AccountId::parse("not-hex!").is_err());
    }

    #[test]
    fn test_guard_allows_below_cap() {
        let positions = positions_in(&[0, 1, 2, 3]);
        assert!(check_cross_margin_limit(&positions, MarketIndex::new(9)).is_ok());
    }

    #[test]
    fn test_guard_rejects_sixth_market() {
        let positions = positions_in(&[0, 1, 2, 3, 4]);
        let err = check_cross_margin_limit(&positions, MarketIndex::new(5)).unwrap_err();
        assert_eq!(err.market, MarketIndex::new(5));
        assert_eq!(err.held, 5);
    }

    #[test]
    fn test_guard_allows_existing_market_at_cap() {
        let positions = positions_in(&[0, 1, 2, 3, 4]);
        assert!(check_cross_margin_limit(&positions, MarketIndex::new(4)).is_ok());
    }

    #[test]
    fn test_guard_ignores_flat_positions() {
        let mut positions = positions_in(&[0, 1, 2, 3]);
        positions.push(Position::new(MarketIndex::new(4), Decimal::ZERO));
        // Flat slot in market 4 does not count toward the cap.
        assert!(check_cross_margin_limit(&positions, MarketIndex::new(5)).is_ok());
    }

    #[test]
    fn test_outstanding_orders() {
        let order = OpenOrder {
            order_id: 7,
            market: MarketIndex::new(0),
            side: OrderSide::Long,
            size: Size::ONE,
            price: Price::new(dec!(100)),
            status: OrderStatus::Open,
        };
        assert!(order.is_outstanding());

        let init = OpenOrder {
            status: OrderStatus::Init,
            ..order
        };
        assert!(!init.is_outstanding());
    }
}
