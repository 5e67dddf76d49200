//! Order intents.
//!
//! An [`OrderIntent`] is an immutable value object describing one limit
//! order the bot wants resting on the book. Intents are built fresh every
//! cycle and consumed by the replacement protocol; they are never mutated
//! after construction.

use crate::account::AccountId;
use crate::decimal::{Price, Size};
use crate::market::MarketIndex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of an order or trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Long,
    Short,
}

impl OrderSide {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Long => Self::Short,
            Self::Short => Self::Long,
        }
    }

    /// Returns 1 for long, -1 for short.
    pub fn sign(&self) -> i8 {
        match self {
            Self::Long => 1,
            Self::Short => -1,
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long => write!(f, "long"),
            Self::Short => write!(f, "short"),
        }
    }
}

/// Specification of one limit order to place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderIntent {
    /// Target market.
    pub market: MarketIndex,
    pub side: OrderSide,
    /// Base-asset amount.
    pub size: Size,
    /// Limit price. Zero when the order floats on `price_offset` alone.
    pub limit_price: Price,
    /// Signed offset from the market's trailing average price. Zero for
    /// orders priced at a fixed limit.
    pub price_offset: Decimal,
    /// Only ever reduce an existing position.
    pub reduce_only: bool,
    /// Reject instead of filling immediately (maker-only).
    pub post_only: bool,
    /// Cancel any unfilled remainder immediately.
    pub immediate_or_cancel: bool,
    /// Caller-chosen id, echoed back by the exchange.
    pub user_order_id: u8,
    /// Optional fee-discount token account.
    pub discount_token: Option<AccountId>,
    /// Optional referrer account.
    pub referrer: Option<AccountId>,
}

impl OrderIntent {
    /// Plain resting limit order with all flags off.
    pub fn limit(market: MarketIndex, side: OrderSide, size: Size, limit_price: Price) -> Self {
        Self {
            market,
            side,
            size,
            limit_price,
            price_offset: Decimal::ZERO,
            reduce_only: false,
            post_only: false,
            immediate_or_cancel: false,
            user_order_id: 0,
            discount_token: None,
            referrer: None,
        }
    }

    pub fn with_post_only(mut self, post_only: bool) -> Self {
        self.post_only = post_only;
        self
    }

    pub fn with_immediate_or_cancel(mut self, ioc: bool) -> Self {
        self.immediate_or_cancel = ioc;
        self
    }

    pub fn with_price_offset(mut self, offset: Decimal) -> Self {
        self.price_offset = offset;
        self
    }

    pub fn with_user_order_id(mut self, id: u8) -> Self {
        self.user_order_id = id;
        self
    }

    pub fn with_referral(
        mut self,
        discount_token: Option<AccountId>,
        referrer: Option<AccountId>,
    ) -> Self {
        self.discount_token = discount_token;
        self.referrer = referrer;
        self
    }

    /// Whether the order rests relative to the trailing average price
    /// instead of at a fixed limit.
    pub fn is_floating(&self) -> bool {
        self.limit_price.is_zero() && !self.price_offset.is_zero()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_side_opposite_and_sign() {
        assert_eq!(OrderSide::Long.opposite(), OrderSide::Short);
        assert_eq!(OrderSide::Short.opposite(), OrderSide::Long);
        assert_eq!(OrderSide::Long.sign(), 1);
        assert_eq!(OrderSide::Short.sign(), -1);
    }

    #[test]
    fn test_limit_intent_defaults() {
        let intent = OrderIntent::limit(
            MarketIndex::new(0),
            OrderSide::Long,
            Size::ONE,
            Price::new(dec!(99.99)),
        );
        assert!(!intent.post_only);
        assert!(!intent.reduce_only);
        assert!(!intent.immediate_or_cancel);
        assert_eq!(intent.price_offset, Decimal::ZERO);
        assert!(!intent.is_floating());
    }

    #[test]
    fn test_referral_pass_through() {
        let referrer = AccountId::parse("cafe01").unwrap();
        let intent = OrderIntent::limit(
            MarketIndex::new(0),
            OrderSide::Long,
            Size::ONE,
            Price::new(dec!(100)),
        )
        .with_referral(None, Some(referrer.clone()));

        assert!(intent.discount_token.is_none());
        assert_eq!(intent.referrer, Some(referrer));
    }

    #[test]
    fn test_floating_detection() {
        let intent = OrderIntent::limit(
            MarketIndex::new(0),
            OrderSide::Short,
            Size::ONE,
            Price::ZERO,
        )
        .with_price_offset(dec!(0.1));
        assert!(intent.is_floating());
    }
}
