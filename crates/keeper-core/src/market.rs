//! Market identifiers and read-only market state.

use crate::decimal::Price;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a perpetual market on the exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MarketIndex(pub u16);

impl MarketIndex {
    #[inline]
    pub fn new(index: u16) -> Self {
        Self(index)
    }

    #[inline]
    pub fn index(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for MarketIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "market-{}", self.0)
    }
}

/// Snapshot of a market as read from the exchange.
///
/// The exchange owns and mutates this data; the keepers only ever hold a
/// per-cycle read snapshot of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    /// Market identifier.
    pub index: MarketIndex,
    /// Current mark (reference) price.
    pub mark_price: Price,
    /// Trailing average of the mark price, used by the floating spread.
    pub twap_price: Price,
    /// Base-asset decimal precision.
    pub base_precision: u32,
}

impl MarketSnapshot {
    pub fn new(index: MarketIndex, mark_price: Price, twap_price: Price) -> Self {
        Self {
            index,
            mark_price,
            twap_price,
            base_precision: 9,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_market_index_display() {
        assert_eq!(MarketIndex::new(3).to_string(), "market-3");
    }

    #[test]
    fn test_snapshot_defaults() {
        let snap = MarketSnapshot::new(
            MarketIndex::new(0),
            Price::new(dec!(100)),
            Price::new(dec!(99.5)),
        );
        assert_eq!(snap.base_precision, 9);
        assert_eq!(snap.mark_price.inner(), dec!(100));
    }
}
