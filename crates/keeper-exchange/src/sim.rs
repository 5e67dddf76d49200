//! Deterministic in-memory exchange.
//!
//! `SimExchange` implements [`ExchangeClient`] against local state. It keeps
//! the exchange's two contracts the keepers depend on:
//!
//! - `submit_atomic` is all-or-nothing: every instruction is validated
//!   before any is applied, so a rejected batch leaves accounts untouched.
//! - `price_impact` is monotone in notional (constant-depth curve).
//!
//! Failure injection (`reject_next_batch`, `fail_next_listing`,
//! `fail_liquidation`) scripts the error paths the bots must survive.

use crate::client::{BoxFuture, ExchangeClient, PriceImpact};
use crate::error::{ExchangeError, ExchangeResult};
use crate::instruction::{Instruction, TxId};
use keeper_core::{
    check_cross_margin_limit, AccountId, MarketIndex, MarketSnapshot, OpenOrder, OrderSide,
    OrderStatus, Position, Price,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// Mark price factor floor so an absurd notional cannot drive the simulated
/// mark to zero or below.
const MIN_IMPACT_FACTOR: Decimal = dec!(0.000001);

#[derive(Debug, Default, Clone)]
struct SimAccount {
    positions: Vec<Position>,
    orders: Vec<OpenOrder>,
    collateral: Decimal,
}

#[derive(Debug, Default)]
struct SimState {
    markets: HashMap<MarketIndex, MarketSnapshot>,
    accounts: HashMap<AccountId, SimAccount>,
    subscriptions: HashSet<AccountId>,
    liquidatable: HashSet<AccountId>,
    next_order_id: u64,
    next_tx: u64,
    reject_next_submit: Option<String>,
    fail_next_listing: bool,
    failing_liquidations: HashSet<AccountId>,
    submitted_batches: Vec<Vec<Instruction>>,
    liquidation_calls: Vec<(AccountId, TxId)>,
}

/// In-memory exchange with atomic batch semantics.
pub struct SimExchange {
    state: Mutex<SimState>,
    /// Quote-currency depth of the impact curve: trading `depth` notional
    /// moves the mark by 100%.
    depth: Decimal,
}

impl Default for SimExchange {
    fn default() -> Self {
        Self::new()
    }
}

impl SimExchange {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SimState::default()),
            depth: Decimal::from(1_000_000),
        }
    }

    /// Override the impact-curve depth.
    pub fn with_depth(mut self, depth: Decimal) -> Self {
        self.depth = depth;
        self
    }

    // --- setup -----------------------------------------------------------

    pub fn add_market(&self, snapshot: MarketSnapshot) {
        self.state.lock().markets.insert(snapshot.index, snapshot);
    }

    pub fn set_mark_price(&self, market: MarketIndex, mark: Price) {
        if let Some(m) = self.state.lock().markets.get_mut(&market) {
            m.mark_price = mark;
        }
    }

    pub fn create_account(&self, account: &AccountId) {
        self.state
            .lock()
            .accounts
            .entry(account.clone())
            .or_default();
    }

    pub fn set_positions(&self, account: &AccountId, positions: Vec<Position>) {
        self.state
            .lock()
            .accounts
            .entry(account.clone())
            .or_default()
            .positions = positions;
    }

    pub fn set_collateral(&self, account: &AccountId, collateral: Decimal) {
        self.state
            .lock()
            .accounts
            .entry(account.clone())
            .or_default()
            .collateral = collateral;
    }

    pub fn set_liquidatable(&self, account: &AccountId, eligible: bool) {
        let mut state = self.state.lock();
        if eligible {
            state.liquidatable.insert(account.clone());
        } else {
            state.liquidatable.remove(account);
        }
    }

    // --- failure injection ------------------------------------------------

    /// Reject the next `submit_atomic` call with the given reason.
    pub fn reject_next_batch(&self, reason: impl Into<String>) {
        self.state.lock().reject_next_submit = Some(reason.into());
    }

    /// Fail the next `list_all_accounts` call.
    pub fn fail_next_listing(&self) {
        self.state.lock().fail_next_listing = true;
    }

    /// Make every `liquidate` call for this account fail.
    pub fn fail_liquidation(&self, account: &AccountId) {
        self.state.lock().failing_liquidations.insert(account.clone());
    }

    // --- inspection -------------------------------------------------------

    /// Batches that were accepted and applied, in submission order.
    pub fn submitted_batches(&self) -> Vec<Vec<Instruction>> {
        self.state.lock().submitted_batches.clone()
    }

    /// Successful liquidation calls with their transaction ids.
    pub fn liquidation_calls(&self) -> Vec<(AccountId, TxId)> {
        self.state.lock().liquidation_calls.clone()
    }

    pub fn is_subscribed(&self, account: &AccountId) -> bool {
        self.state.lock().subscriptions.contains(account)
    }

    pub fn subscription_count(&self) -> usize {
        self.state.lock().subscriptions.len()
    }

    // --- internals --------------------------------------------------------

    fn next_tx_id(state: &mut SimState) -> TxId {
        state.next_tx += 1;
        let short = &Uuid::new_v4().to_string()[..8];
        TxId::new(format!("sim-{:06}-{short}", state.next_tx))
    }

    /// Resting price of an intent: floating orders trail the market's
    /// trailing average, fixed orders rest at their limit.
    fn resolve_price(intent: &keeper_core::OrderIntent, snapshot: &MarketSnapshot) -> Price {
        if intent.is_floating() {
            Price::new(snapshot.twap_price.inner() + intent.price_offset)
        } else {
            Price::new(intent.limit_price.inner() + intent.price_offset)
        }
    }

    fn validate_instruction(
        state: &SimState,
        account: &SimAccount,
        instruction: &Instruction,
    ) -> ExchangeResult<()> {
        match instruction {
            Instruction::Cancel { market, order_id } => {
                let found = account
                    .orders
                    .iter()
                    .any(|o| o.order_id == *order_id && o.market == *market && o.is_outstanding());
                if !found {
                    return Err(ExchangeError::Rejected(format!(
                        "cancel of unknown order {order_id} in {market}"
                    )));
                }
            }
            Instruction::Place { intent } => {
                let snapshot = state
                    .markets
                    .get(&intent.market)
                    .ok_or(ExchangeError::UnknownMarket(intent.market))?;

                let price = Self::resolve_price(intent, snapshot);
                if !price.is_positive() {
                    return Err(ExchangeError::Rejected(format!(
                        "non-positive limit price {price} in {}",
                        intent.market
                    )));
                }

                // Post-only must not be immediately marketable against the mark.
                if intent.post_only {
                    let crosses = match intent.side {
                        OrderSide::Long => price >= snapshot.mark_price,
                        OrderSide::Short => price <= snapshot.mark_price,
                    };
                    if crosses {
                        return Err(ExchangeError::Rejected(format!(
                            "post-only {} at {price} would cross mark {}",
                            intent.side, snapshot.mark_price
                        )));
                    }
                }

                check_cross_margin_limit(&account.positions, intent.market)
                    .map_err(|e| ExchangeError::Rejected(e.to_string()))?;
            }
        }
        Ok(())
    }
}

impl ExchangeClient for SimExchange {
    fn get_market(&self, market: MarketIndex) -> BoxFuture<'_, ExchangeResult<MarketSnapshot>> {
        let result = self
            .state
            .lock()
            .markets
            .get(&market)
            .cloned()
            .ok_or(ExchangeError::UnknownMarket(market));
        Box::pin(async move { result })
    }

    fn get_account_orders(
        &self,
        account: &AccountId,
    ) -> BoxFuture<'_, ExchangeResult<Vec<OpenOrder>>> {
        let result = self
            .state
            .lock()
            .accounts
            .get(account)
            .map(|a| a.orders.clone())
            .ok_or_else(|| ExchangeError::UnknownAccount(account.clone()));
        Box::pin(async move { result })
    }

    fn get_account_positions(
        &self,
        account: &AccountId,
    ) -> BoxFuture<'_, ExchangeResult<Vec<Position>>> {
        let result = self
            .state
            .lock()
            .accounts
            .get(account)
            .map(|a| a.positions.clone())
            .ok_or_else(|| ExchangeError::UnknownAccount(account.clone()));
        Box::pin(async move { result })
    }

    fn list_all_accounts(&self) -> BoxFuture<'_, ExchangeResult<Vec<AccountId>>> {
        let result = {
            let mut state = self.state.lock();
            if state.fail_next_listing {
                state.fail_next_listing = false;
                Err(ExchangeError::Transport("account listing failed".into()))
            } else {
                Ok(state.accounts.keys().cloned().collect())
            }
        };
        Box::pin(async move { result })
    }

    fn subscribe(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<()>> {
        let mut state = self.state.lock();
        state.accounts.entry(account.clone()).or_default();
        state.subscriptions.insert(account.clone());
        Box::pin(async move { Ok(()) })
    }

    fn unsubscribe(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<()>> {
        self.state.lock().subscriptions.remove(account);
        Box::pin(async move { Ok(()) })
    }

    fn can_be_liquidated(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<bool>> {
        let result = {
            let state = self.state.lock();
            if state.accounts.contains_key(account) {
                Ok(state.liquidatable.contains(account))
            } else {
                Err(ExchangeError::UnknownAccount(account.clone()))
            }
        };
        Box::pin(async move { result })
    }

    fn collateral_balance(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<Decimal>> {
        let result = self
            .state
            .lock()
            .accounts
            .get(account)
            .map(|a| a.collateral)
            .ok_or_else(|| ExchangeError::UnknownAccount(account.clone()));
        Box::pin(async move { result })
    }

    fn submit_atomic(
        &self,
        account: &AccountId,
        instructions: Vec<Instruction>,
    ) -> BoxFuture<'_, ExchangeResult<TxId>> {
        let result = (|| {
            let mut state = self.state.lock();

            if let Some(reason) = state.reject_next_submit.take() {
                return Err(ExchangeError::Rejected(reason));
            }
            if instructions.is_empty() {
                return Err(ExchangeError::Rejected("empty instruction batch".into()));
            }

            let sim_account = state
                .accounts
                .get(account)
                .cloned()
                .ok_or_else(|| ExchangeError::UnknownAccount(account.clone()))?;

            // Validate everything before applying anything.
            for instruction in &instructions {
                Self::validate_instruction(&state, &sim_account, instruction)?;
            }

            for instruction in &instructions {
                match instruction {
                    Instruction::Cancel { order_id, .. } => {
                        if let Some(entry) = state.accounts.get_mut(account) {
                            entry.orders.retain(|o| o.order_id != *order_id);
                        }
                    }
                    Instruction::Place { intent } => {
                        let price = state
                            .markets
                            .get(&intent.market)
                            .map(|snapshot| Self::resolve_price(intent, snapshot))
                            .unwrap_or(intent.limit_price);
                        state.next_order_id += 1;
                        let order = OpenOrder {
                            order_id: state.next_order_id,
                            market: intent.market,
                            side: intent.side,
                            size: intent.size,
                            price,
                            status: OrderStatus::Open,
                        };
                        if let Some(entry) = state.accounts.get_mut(account) {
                            entry.orders.push(order);
                        }
                    }
                }
            }

            state.submitted_batches.push(instructions);
            Ok(Self::next_tx_id(&mut state))
        })();
        Box::pin(async move { result })
    }

    fn liquidate(&self, account: &AccountId) -> BoxFuture<'_, ExchangeResult<TxId>> {
        let result = (|| {
            let mut state = self.state.lock();

            if state.failing_liquidations.contains(account) {
                return Err(ExchangeError::Transport(format!(
                    "liquidation of {account} failed"
                )));
            }
            if !state.liquidatable.remove(account) {
                return Err(ExchangeError::Rejected(format!(
                    "{account} is not eligible for liquidation"
                )));
            }

            if let Some(entry) = state.accounts.get_mut(account) {
                entry.positions.clear();
                entry.orders.clear();
            }

            let tx = Self::next_tx_id(&mut state);
            state.liquidation_calls.push((account.clone(), tx.clone()));
            Ok(tx)
        })();
        Box::pin(async move { result })
    }

    fn price_impact(
        &self,
        market: MarketIndex,
        direction: OrderSide,
        notional: Decimal,
    ) -> BoxFuture<'_, ExchangeResult<PriceImpact>> {
        let result = (|| {
            let state = self.state.lock();
            let snapshot = state
                .markets
                .get(&market)
                .ok_or(ExchangeError::UnknownMarket(market))?;

            let mark = snapshot.mark_price.inner();
            let signed = Decimal::from(direction.sign()) * notional / self.depth;
            let factor = (Decimal::ONE + signed).max(MIN_IMPACT_FACTOR);
            let resulting = mark * factor;
            let entry = (mark + resulting) / Decimal::from(2);

            Ok(PriceImpact {
                entry_price: Price::new(entry),
                resulting_mark: Price::new(resulting),
            })
        })();
        Box::pin(async move { result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::{OrderIntent, Size};

    fn market(index: u16, mark: Decimal) -> MarketSnapshot {
        MarketSnapshot::new(
            MarketIndex::new(index),
            Price::new(mark),
            Price::new(mark),
        )
    }

    fn account(name: &str) -> AccountId {
        AccountId::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_place_then_read_back() {
        let sim = SimExchange::new();
        sim.add_market(market(0, dec!(100)));
        let acct = account("aa01");
        sim.create_account(&acct);

        let intent = OrderIntent::limit(
            MarketIndex::new(0),
            OrderSide::Long,
            Size::ONE,
            Price::new(dec!(99.99)),
        );
        let instruction = sim.build_place_order_instruction(&intent);
        sim.submit_atomic(&acct, vec![instruction]).await.unwrap();

        let orders = sim.get_account_orders(&acct).await.unwrap();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].price.inner(), dec!(99.99));
        assert!(orders[0].is_outstanding());
    }

    #[tokio::test]
    async fn test_rejected_batch_applies_nothing() {
        let sim = SimExchange::new();
        sim.add_market(market(0, dec!(100)));
        let acct = account("aa02");
        sim.create_account(&acct);

        // Second instruction invalid (post-only long at the mark crosses).
        let good = OrderIntent::limit(
            MarketIndex::new(0),
            OrderSide::Long,
            Size::ONE,
            Price::new(dec!(99)),
        );
        let crossing = OrderIntent::limit(
            MarketIndex::new(0),
            OrderSide::Long,
            Size::ONE,
            Price::new(dec!(101)),
        )
        .with_post_only(true);

        let result = sim
            .submit_atomic(
                &acct,
                vec![
                    sim.build_place_order_instruction(&good),
                    sim.build_place_order_instruction(&crossing),
                ],
            )
            .await;

        assert!(matches!(result, Err(ExchangeError::Rejected(_))));
        assert!(sim.get_account_orders(&acct).await.unwrap().is_empty());
        assert!(sim.submitted_batches().is_empty());
    }

    #[tokio::test]
    async fn test_liquidate_only_when_eligible() {
        let sim = SimExchange::new();
        let acct = account("aa03");
        sim.create_account(&acct);

        assert!(matches!(
            sim.liquidate(&acct).await,
            Err(ExchangeError::Rejected(_))
        ));

        sim.set_liquidatable(&acct, true);
        let tx = sim.liquidate(&acct).await.unwrap();
        assert_eq!(sim.liquidation_calls(), vec![(acct.clone(), tx)]);

        // Eligibility is consumed by the liquidation.
        assert!(!sim.can_be_liquidated(&acct).await.unwrap());
    }

    #[tokio::test]
    async fn test_price_impact_monotone() {
        let sim = SimExchange::new().with_depth(dec!(1000));
        sim.add_market(market(0, dec!(100)));

        let small = sim
            .price_impact(MarketIndex::new(0), OrderSide::Long, dec!(10))
            .await
            .unwrap();
        let large = sim
            .price_impact(MarketIndex::new(0), OrderSide::Long, dec!(100))
            .await
            .unwrap();

        assert!(large.resulting_mark > small.resulting_mark);
        assert_eq!(small.resulting_mark.inner(), dec!(101));
        assert_eq!(small.entry_price.inner(), dec!(100.5));

        let short = sim
            .price_impact(MarketIndex::new(0), OrderSide::Short, dec!(100))
            .await
            .unwrap();
        assert_eq!(short.resulting_mark.inner(), dec!(90));
    }

    #[tokio::test]
    async fn test_subscription_lifecycle() {
        let sim = SimExchange::new();
        let acct = account("aa04");

        sim.subscribe(&acct).await.unwrap();
        assert!(sim.is_subscribed(&acct));
        assert_eq!(sim.subscription_count(), 1);

        sim.unsubscribe(&acct).await.unwrap();
        assert!(!sim.is_subscribed(&acct));
    }
}
