//! Application scheduler.
//!
//! One fixed-cadence loop drives the configured role. Cycles never
//! overlap: the next tick waits for the current cycle to finish. A failed
//! cycle is logged and the loop keeps going; only setup errors are fatal.

use crate::config::{AppConfig, BotRole};
use crate::error::{AppError, AppResult};
use keeper_arb::{preview_slippage, TargetPriceSizer};
use keeper_core::{AccountId, MarketIndex, OrderIntent, OrderSide, Price, Size};
use keeper_exchange::DynExchangeClient;
use keeper_executor::OrderReplacer;
use keeper_liquidator::LiquidationScanner;
use keeper_maker::QuoteEngine;
use std::time::Duration;
use tracing::{error, info, warn};

/// The keeper application.
pub struct Application {
    config: AppConfig,
    client: DynExchangeClient,
    account: AccountId,
    quote_engine: QuoteEngine,
    replacer: OrderReplacer,
    sizer: TargetPriceSizer,
    scanner: LiquidationScanner,
}

impl std::fmt::Debug for Application {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Application")
            .field("config", &self.config)
            .field("account", &self.account)
            .field("quote_engine", &self.quote_engine)
            .field("replacer", &self.replacer)
            .field("sizer", &self.sizer)
            .field("scanner", &self.scanner)
            .finish_non_exhaustive()
    }
}

impl Application {
    pub fn new(config: AppConfig, client: DynExchangeClient) -> AppResult<Self> {
        let account = config
            .account
            .as_deref()
            .ok_or_else(|| AppError::Config("account is required".to_string()))?;
        let account = AccountId::parse(account)?;

        Ok(Self {
            quote_engine: QuoteEngine::new(config.maker.clone()),
            replacer: OrderReplacer::new(config.replace),
            sizer: TargetPriceSizer::new(config.arb.max_notional),
            scanner: LiquidationScanner::new(),
            config,
            client,
            account,
        })
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Subscribe the bot's own account and log its standing. Fatal on
    /// failure: a bot that cannot see its own account must not trade.
    pub async fn bootstrap(&self) -> AppResult<()> {
        self.client.subscribe(&self.account).await?;
        let collateral = self.client.collateral_balance(&self.account).await?;
        info!(
            account = %self.account,
            %collateral,
            network = ?self.config.network,
            role = ?self.config.role,
            "Bot account subscribed"
        );
        Ok(())
    }

    /// Run the scheduler until shutdown is signalled.
    pub async fn run(mut self) -> AppResult<()> {
        info!(
            role = ?self.config.role,
            interval_secs = self.config.cycle_interval_secs,
            "Starting scheduler"
        );

        let mut interval =
            tokio::time::interval(Duration::from_secs(self.config.cycle_interval_secs));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if let Err(e) = self.run_cycle().await {
                        warn!(error = %e, "Cycle failed, retrying next tick");
                    }
                }

                _ = tokio::signal::ctrl_c() => {
                    info!("Shutdown signal received");
                    break;
                }
            }
        }

        self.shutdown().await;
        Ok(())
    }

    /// One cycle of the configured role.
    pub async fn run_cycle(&mut self) -> AppResult<()> {
        match self.config.role {
            BotRole::Maker => self.maker_cycle().await,
            BotRole::Liquidator => self.liquidator_cycle().await,
            BotRole::Arbitrage => self.arbitrage_cycle().await,
        }
    }

    async fn maker_cycle(&self) -> AppResult<()> {
        let market = MarketIndex::new(self.config.market);
        let snapshot = self.client.get_market(market).await?;
        let positions = self.client.get_account_positions(&self.account).await?;

        let quotes = self.quote_engine.build_quotes(&positions, &snapshot)?;
        let tx = self
            .replacer
            .replace_orders(self.client.as_ref(), &self.account, &quotes)
            .await?;

        info!(%market, tx = %tx, "Quotes placed");
        Ok(())
    }

    async fn liquidator_cycle(&mut self) -> AppResult<()> {
        let report = self
            .scanner
            .discover_accounts(self.client.as_ref())
            .await?;
        let outcomes = self.scanner.scan_for_liquidations(self.client.as_ref()).await;

        let liquidated = outcomes.iter().filter(|o| o.is_success()).count();
        let failed = outcomes.len() - liquidated;
        info!(
            tracked = report.total_known,
            liquidated, failed, "Liquidation sweep complete"
        );
        Ok(())
    }

    async fn arbitrage_cycle(&self) -> AppResult<()> {
        let market = MarketIndex::new(self.config.market);

        preview_slippage(
            self.client.as_ref(),
            market,
            OrderSide::Long,
            self.config.arb.probe_notional,
        )
        .await?;

        let Some(target) = self.config.arb.target_price else {
            return Ok(());
        };

        let trade = self
            .sizer
            .size_trade(self.client.as_ref(), market, Price::new(target))
            .await?;
        if trade.size.is_zero() {
            return Ok(());
        }

        // Limit at the post-trade mark: every fill along the impact curve
        // stays inside it.
        let limit = trade.resulting_mark;
        let base_size = Size::new(trade.size / limit.inner());
        let intent = OrderIntent::limit(market, trade.direction, base_size, limit)
            .with_immediate_or_cancel(true);

        let tx = self
            .replacer
            .replace_orders(self.client.as_ref(), &self.account, &[intent])
            .await?;
        info!(
            %market, direction = %trade.direction, notional = %trade.size,
            %limit, tx = %tx, "Arbitrage trade submitted"
        );
        Ok(())
    }

    /// Release subscriptions before exit.
    async fn shutdown(&self) {
        info!("Shutting down");
        self.scanner.unsubscribe_all(self.client.as_ref()).await;
        if let Err(e) = self.client.unsubscribe(&self.account).await {
            error!(error = %e, "Failed to release own subscription");
        }
    }
}
