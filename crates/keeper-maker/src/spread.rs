//! Spread policies: pure price-model functions.
//!
//! Both policies turn a market snapshot into one bid and one ask intent.
//! A non-positive or crossed pair must never reach the exchange, so both
//! validate before returning.

use crate::error::{MakerError, MakerResult};
use keeper_core::{MarketSnapshot, OrderIntent, OrderSide, Price, Size};
use rust_decimal::Decimal;

/// Fixed-spread divisor: mark / 10_000 = 1 basis point.
const FIXED_SPREAD_DIVISOR: Decimal = Decimal::from_parts(10_000, 0, 0, false, 0);

/// Floating-spread divisor: trailing average / 1_000 = 10 basis points.
const FLOATING_SPREAD_DIVISOR: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);

/// User order ids so the two sides of a quote are distinguishable on-chain.
const BID_ORDER_ID: u8 = 1;
const ASK_ORDER_ID: u8 = 2;

/// Build a symmetric 1 bp spread around the current mark price.
///
/// Returns `[bid, ask]` with fixed limit prices of mark -/+ 1 bp.
pub fn fixed_spread(
    market: &MarketSnapshot,
    size: Size,
    post_only: bool,
) -> MakerResult<[OrderIntent; 2]> {
    let mark = market.mark_price;
    let offset = mark / FIXED_SPREAD_DIVISOR;

    let bid_price = mark - offset;
    let ask_price = mark + offset;
    validate_pair(bid_price, ask_price)?;

    let bid = OrderIntent::limit(market.index, OrderSide::Long, size, bid_price)
        .with_post_only(post_only)
        .with_user_order_id(BID_ORDER_ID);
    let ask = OrderIntent::limit(market.index, OrderSide::Short, size, ask_price)
        .with_post_only(post_only)
        .with_user_order_id(ASK_ORDER_ID);

    Ok([bid, ask])
}

/// Build a +-10 bps spread floating around the trailing average price.
///
/// The intents carry a flat zero limit and a signed `price_offset`, so the
/// resting prices trail the trailing average instead of the instantaneous
/// mark. The bid offset is exactly the negation of the ask offset.
pub fn floating_spread(
    market: &MarketSnapshot,
    size: Size,
    post_only: bool,
) -> MakerResult<[OrderIntent; 2]> {
    let twap = market.twap_price;
    let offset = (twap / FLOATING_SPREAD_DIVISOR).inner();

    // The floating pair rests at twap -/+ offset.
    let bid_price = Price::new(twap.inner() - offset);
    let ask_price = Price::new(twap.inner() + offset);
    validate_pair(bid_price, ask_price)?;

    let bid = OrderIntent::limit(market.index, OrderSide::Long, size, Price::ZERO)
        .with_price_offset(-offset)
        .with_post_only(post_only)
        .with_user_order_id(BID_ORDER_ID);
    let ask = OrderIntent::limit(market.index, OrderSide::Short, size, Price::ZERO)
        .with_price_offset(offset)
        .with_post_only(post_only)
        .with_user_order_id(ASK_ORDER_ID);

    Ok([bid, ask])
}

fn validate_pair(bid: Price, ask: Price) -> MakerResult<()> {
    if !bid.is_positive() || !ask.is_positive() {
        return Err(MakerError::InvalidSpread(format!(
            "non-positive quote: bid {bid}, ask {ask}"
        )));
    }
    if ask < bid {
        return Err(MakerError::InvalidSpread(format!(
            "crossed quote: bid {bid} above ask {ask}"
        )));
    }
    Ok(())
}
