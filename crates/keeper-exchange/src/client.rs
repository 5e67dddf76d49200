//! Exchange client trait.
//!
//! Trait-based abstraction over the external exchange program. This allows:
//! - Dependency injection for testing (see [`crate::sim::SimExchange`])
//! - Swapping in a real on-chain client without touching the keepers
//!
//! Network suspension happens only at these call boundaries; everything the
//! keepers compute between calls is pure.

use crate::error::ExchangeResult;
use crate::instruction::{Instruction, TxId};
use keeper_core::{
    AccountId, MarketIndex, MarketSnapshot, OpenOrder, OrderIntent, OrderSide, Position, Price,
};
use rust_decimal::Decimal;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future for dyn-compatible async trait methods.
pub type BoxFuture<'a, T> = Pin<Box<dyn std::future::Future<Output = T> + Send + 'a>>;

/// Entry price and post-trade mark price for a prospective trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PriceImpact {
    /// Average fill price of the trade.
    pub entry_price: Price,
    /// Mark price after the trade settles.
    pub resulting_mark: Price,
}

/// Fixed contract exposed by the external exchange client.
///
/// All reads return per-cycle snapshots; the exchange owns the data.
/// `submit_atomic` is all-or-nothing by the exchange's transaction contract.
pub trait ExchangeClient: Send + Sync {
    /// Fetch the current snapshot of one market.
    fn get_market(&self, market: MarketIndex) -> BoxFuture<'_, ExchangeResult<MarketSnapshot>>;

    /// Fetch an account's resting orders.
    fn get_account_orders(&self, account: &AccountId)
        -> BoxFuture<'_, ExchangeResult<Vec<OpenOrder>>>;

    /// Fetch an account's per-market positions.
    fn get_account_positions(
        &self,
        account: &AccountId,
    ) -> BoxFuture<'_, ExchangeResult<Vec<Position>>>;

    /// List every account known to the exchange program.
    fn list_all_accounts(&self) -> BoxFuture<'_, ExchangeResult<Vec<AccountId>>>;

    /// One-time subscription to an account's state feed.
    fn subscribe(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<()>>;

    /// Release an account subscription.
    fn unsubscribe(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<()>>;

    /// Liquidation eligibility predicate, delegated to the exchange's
    /// margin math.
    fn can_be_liquidated(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<bool>>;

    /// Free collateral of an account in quote currency.
    fn collateral_balance(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<Decimal>>;

    /// Submit a batch of instructions as one atomic transaction.
    fn submit_atomic(
        &self,
        account: &AccountId,
        instructions: Vec<Instruction>,
    ) -> BoxFuture<'_, ExchangeResult<TxId>>;

    /// Liquidate an eligible account.
    fn liquidate(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<TxId>>;

    /// Entry price and resulting mark for trading `notional` (quote
    /// currency) in `direction`. Monotone in `notional` by the exchange's
    /// pricing contract.
    fn price_impact(
        &self,
        market: MarketIndex,
        direction: OrderSide,
        notional: Decimal,
    ) -> BoxFuture<'_, ExchangeResult<PriceImpact>>;

    /// Build a cancel instruction for a resting order.
    fn build_cancel_instruction(&self, order: &OpenOrder) -> Instruction {
        Instruction::Cancel {
            market: order.market,
            order_id: order.order_id,
        }
    }

    /// Build a place instruction for an order intent.
    fn build_place_order_instruction(&self, intent: &OrderIntent) -> Instruction {
        Instruction::Place {
            intent: intent.clone(),
        }
    }
}

/// Arc wrapper for exchange client trait objects.
pub type DynExchangeClient = Arc<dyn ExchangeClient>;
