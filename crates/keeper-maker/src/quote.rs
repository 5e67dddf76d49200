//! Quote engine.
//!
//! Applies the configured spread policy after checking the cross-market
//! position guard. Pure computation over snapshots; submission is the
//! replacement protocol's job.

use crate::config::{MakerConfig, SpreadPolicy};
use crate::error::MakerResult;
use crate::spread::{fixed_spread, floating_spread};
use keeper_core::{check_cross_margin_limit, MarketSnapshot, OrderIntent, Position};
use tracing::debug;

/// Builds the two-sided quote set for one market.
#[derive(Debug, Clone)]
pub struct QuoteEngine {
    config: MakerConfig,
}

impl QuoteEngine {
    pub fn new(config: MakerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MakerConfig {
        &self.config
    }

    /// Build `[bid, ask]` intents for `market`.
    ///
    /// Fails with `PositionLimitExceeded` when the account already holds
    /// positions in the maximum number of markets and `market` is not one
    /// of them, and with `InvalidSpread` when the policy produces an
    /// unsubmittable pair.
    pub fn build_quotes(
        &self,
        positions: &[Position],
        market: &MarketSnapshot,
    ) -> MakerResult<[OrderIntent; 2]> {
        check_cross_margin_limit(positions, market.index)?;

        let quotes = match self.config.policy {
            SpreadPolicy::Fixed => {
                fixed_spread(market, self.config.order_size, self.config.post_only)?
            }
            SpreadPolicy::Floating => {
                floating_spread(market, self.config.order_size, self.config.post_only)?
            }
        };

        debug!(
            market = %market.index,
            policy = ?self.config.policy,
            bid = %quotes[0].limit_price,
            bid_offset = %quotes[0].price_offset,
            ask = %quotes[1].limit_price,
            ask_offset = %quotes[1].price_offset,
            "Built quote pair"
        );

        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MakerError;
    use keeper_core::{MarketIndex, Price, Size};
    use rust_decimal_macros::dec;

    fn snapshot(index: u16) -> MarketSnapshot {
        MarketSnapshot::new(
            MarketIndex::new(index),
            Price::new(dec!(100)),
            Price::new(dec!(99.5)),
        )
    }

    fn positions_in(markets: &[u16]) -> Vec<Position> {
        markets
            .iter()
            .map(|&m| Position::new(MarketIndex::new(m), dec!(1)))
            .collect()
    }

    #[test]
    fn test_build_quotes_fixed_policy() {
        let engine = QuoteEngine::new(MakerConfig::default());
        let [bid, ask] = engine.build_quotes(&[], &snapshot(0)).unwrap();

        assert_eq!(bid.limit_price.inner(), dec!(99.99));
        assert_eq!(ask.limit_price.inner(), dec!(100.01));
        assert_eq!(bid.size, Size::ONE);
    }

    #[test]
    fn test_build_quotes_floating_policy() {
        let engine = QuoteEngine::new(MakerConfig {
            policy: SpreadPolicy::Floating,
            ..MakerConfig::default()
        });
        let [bid, ask] = engine.build_quotes(&[], &snapshot(0)).unwrap();

        assert_eq!(ask.price_offset, dec!(0.0995));
        assert_eq!(bid.price_offset, dec!(-0.0995));
    }

    #[test]
    fn test_sixth_market_rejected() {
        let engine = QuoteEngine::new(MakerConfig::default());
        let positions = positions_in(&[0, 1, 2, 3, 4]);

        let err = engine.build_quotes(&positions, &snapshot(5)).unwrap_err();
        assert!(matches!(err, MakerError::PositionLimitExceeded(_)));
    }

    #[test]
    fn test_existing_market_allowed_at_cap() {
        let engine = QuoteEngine::new(MakerConfig::default());
        let positions = positions_in(&[0, 1, 2, 3, 4]);

        assert!(engine.build_quotes(&positions, &snapshot(3)).is_ok());
    }
}
