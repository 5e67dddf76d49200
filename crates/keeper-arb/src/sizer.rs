//! Target-price trade sizing.
//!
//! The exchange exposes `price_impact(market, direction, notional)` and
//! guarantees the resulting mark is monotone in notional. The sizer
//! inverts that function numerically: double the probe notional until the
//! target is bracketed, then bisect. The returned size is capped at the
//! configured maximum, but the entry price of the full (uncapped) trade is
//! reported so a capped trade is visible in the logs.

use crate::error::{ArbError, ArbResult};
use keeper_core::{MarketIndex, OrderSide, Price};
use keeper_exchange::{ExchangeClient, PriceImpact};
use rust_decimal::Decimal;
use tracing::{debug, info};

/// Doubling steps before the target is declared unreachable.
const MAX_DOUBLINGS: u32 = 64;

/// Bisection refinement steps once the target is bracketed.
const BISECTION_STEPS: u32 = 48;

/// A sized trade toward a target price.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizedTrade {
    pub direction: OrderSide,
    /// Notional to trade, in quote currency. Never exceeds the cap.
    pub size: Decimal,
    /// Entry price of the uncapped trade that would fully reach the
    /// target. Differs from the capped trade's entry when the cap binds.
    pub entry_price: Price,
    /// Mark price after the capped trade settles.
    pub resulting_mark: Price,
}

impl SizedTrade {
    fn flat(mark: Price) -> Self {
        Self {
            direction: OrderSide::Long,
            size: Decimal::ZERO,
            entry_price: mark,
            resulting_mark: mark,
        }
    }
}

/// Sizes trades that move a market's mark toward a target price.
#[derive(Debug, Clone, Copy)]
pub struct TargetPriceSizer {
    max_notional: Decimal,
}

impl TargetPriceSizer {
    pub fn new(max_notional: Decimal) -> Self {
        Self { max_notional }
    }

    /// Compute direction and notional to move `market`'s mark to
    /// `target`. Zero size when the mark is already there.
    pub async fn size_trade(
        &self,
        client: &dyn ExchangeClient,
        market: MarketIndex,
        target: Price,
    ) -> ArbResult<SizedTrade> {
        let snapshot = client
            .get_market(market)
            .await
            .map_err(ArbError::MarketRead)?;
        let mark = snapshot.mark_price;

        if target == mark {
            debug!(%market, %target, "Mark already at target");
            return Ok(SizedTrade::flat(mark));
        }
        let direction = if target > mark {
            OrderSide::Long
        } else {
            OrderSide::Short
        };

        let required = self
            .required_notional(client, market, direction, target)
            .await?;
        let capped = required.min(self.max_notional);

        let full = self.impact(client, market, direction, required).await?;
        let trade = self.impact(client, market, direction, capped).await?;

        if capped < required {
            info!(
                %market, %target, %required, %capped,
                "Trade capped at max notional, target will not be reached"
            );
        }
        debug!(
            %market, %direction, size = %capped,
            entry = %full.entry_price, resulting = %trade.resulting_mark,
            "Sized trade toward target"
        );

        Ok(SizedTrade {
            direction,
            size: capped,
            entry_price: full.entry_price,
            resulting_mark: trade.resulting_mark,
        })
    }

    /// Smallest notional whose resulting mark reaches `target`.
    async fn required_notional(
        &self,
        client: &dyn ExchangeClient,
        market: MarketIndex,
        direction: OrderSide,
        target: Price,
    ) -> ArbResult<Decimal> {
        let reached = |impact: &PriceImpact| match direction {
            OrderSide::Long => impact.resulting_mark >= target,
            OrderSide::Short => impact.resulting_mark <= target,
        };

        // Bracket the target: grow the probe until it overshoots.
        let mut hi = self.max_notional.max(Decimal::ONE);
        let mut doublings = 0;
        while !reached(&self.impact(client, market, direction, hi).await?) {
            doublings += 1;
            if doublings > MAX_DOUBLINGS {
                return Err(ArbError::TargetUnreachable { market, target });
            }
            hi *= Decimal::TWO;
        }

        // Bisect: lo never reaches the target, hi always does.
        let mut lo = Decimal::ZERO;
        for _ in 0..BISECTION_STEPS {
            let mid = (lo + hi) / Decimal::TWO;
            if reached(&self.impact(client, market, direction, mid).await?) {
                hi = mid;
            } else {
                lo = mid;
            }
        }
        Ok(hi)
    }

    async fn impact(
        &self,
        client: &dyn ExchangeClient,
        market: MarketIndex,
        direction: OrderSide,
        notional: Decimal,
    ) -> ArbResult<PriceImpact> {
        client
            .price_impact(market, direction, notional)
            .await
            .map_err(ArbError::ImpactQuery)
    }
}

/// Log the slippage a probe notional would incur right now. Purely
/// observational; nothing is traded.
pub async fn preview_slippage(
    client: &dyn ExchangeClient,
    market: MarketIndex,
    direction: OrderSide,
    notional: Decimal,
) -> ArbResult<PriceImpact> {
    let impact = client
        .price_impact(market, direction, notional)
        .await
        .map_err(ArbError::ImpactQuery)?;
    info!(
        %market, %direction, %notional,
        entry = %impact.entry_price, resulting = %impact.resulting_mark,
        "Slippage preview"
    );
    Ok(impact)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::MarketSnapshot;
    use keeper_exchange::SimExchange;
    use rust_decimal_macros::dec;

    // Depth 1000: trading notional N moves the mark by N/1000 of itself.
    fn setup(mark: Decimal) -> SimExchange {
        let sim = SimExchange::new().with_depth(dec!(1000));
        sim.add_market(MarketSnapshot::new(
            MarketIndex::new(0),
            Price::new(mark),
            Price::new(mark),
        ));
        sim
    }

    fn close(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.001)
    }

    #[tokio::test]
    async fn test_zero_size_when_mark_at_target() {
        let sim = setup(dec!(100));
        let sizer = TargetPriceSizer::new(dec!(500));

        let trade = sizer
            .size_trade(&sim, MarketIndex::new(0), Price::new(dec!(100)))
            .await
            .unwrap();

        assert_eq!(trade.size, Decimal::ZERO);
        assert_eq!(trade.resulting_mark.inner(), dec!(100));
    }

    #[tokio::test]
    async fn test_longs_toward_higher_target() {
        let sim = setup(dec!(100));
        let sizer = TargetPriceSizer::new(dec!(500));

        // Reaching 101 from 100 needs 1% of depth: notional 10.
        let trade = sizer
            .size_trade(&sim, MarketIndex::new(0), Price::new(dec!(101)))
            .await
            .unwrap();

        assert_eq!(trade.direction, OrderSide::Long);
        assert!(close(trade.size, dec!(10)));
        assert!(close(trade.resulting_mark.inner(), dec!(101)));
    }

    #[tokio::test]
    async fn test_shorts_toward_lower_target() {
        let sim = setup(dec!(100));
        let sizer = TargetPriceSizer::new(dec!(500));

        let trade = sizer
            .size_trade(&sim, MarketIndex::new(0), Price::new(dec!(95)))
            .await
            .unwrap();

        assert_eq!(trade.direction, OrderSide::Short);
        assert!(close(trade.size, dec!(50)));
        assert!(close(trade.resulting_mark.inner(), dec!(95)));
    }

    #[tokio::test]
    async fn test_size_never_exceeds_cap() {
        let sim = setup(dec!(100));
        let sizer = TargetPriceSizer::new(dec!(100));

        // Reaching 200 needs notional 1000, ten times the cap.
        let trade = sizer
            .size_trade(&sim, MarketIndex::new(0), Price::new(dec!(200)))
            .await
            .unwrap();

        assert_eq!(trade.size, dec!(100));
        // Capped trade only moves the mark to 110.
        assert_eq!(trade.resulting_mark.inner(), dec!(110));
        // Entry price reported for the full trade: averaging 100 and 200.
        assert!(close(trade.entry_price.inner(), dec!(150)));
    }

    #[tokio::test]
    async fn test_unreachable_target() {
        let sim = setup(dec!(100));
        let sizer = TargetPriceSizer::new(dec!(100));

        // The impact curve floors out above zero, so this target is
        // below anything a short can produce.
        let err = sizer
            .size_trade(&sim, MarketIndex::new(0), Price::new(dec!(0.00001)))
            .await
            .unwrap_err();

        assert!(matches!(err, ArbError::TargetUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_preview_slippage_reports_impact() {
        let sim = setup(dec!(100));

        let impact = preview_slippage(&sim, MarketIndex::new(0), OrderSide::Long, dec!(10))
            .await
            .unwrap();

        assert_eq!(impact.resulting_mark.inner(), dec!(101));
        assert_eq!(impact.entry_price.inner(), dec!(100.5));
    }
}
