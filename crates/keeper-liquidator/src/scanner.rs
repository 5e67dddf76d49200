//! Account discovery and the liquidation sweep.
//!
//! Discovery lists every account the exchange knows, subscribes to each
//! new one, and registers it. The sweep checks every registered account
//! against the exchange's margin math and fires one liquidation call per
//! eligible account, recording each outcome without aborting the rest.

use crate::error::{LiquidatorError, LiquidatorResult};
use crate::registry::{AccountHandle, AccountRegistry};
use futures_util::future::join_all;
use keeper_core::AccountId;
use keeper_exchange::{ExchangeClient, TxId};
use tracing::{debug, info, warn};

/// Outcome of one discovery cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiscoveryReport {
    /// Registry size after the cycle.
    pub total_known: usize,
    /// Accounts first seen this cycle.
    pub newly_added: usize,
}

/// Outcome of one liquidation attempt within a sweep.
#[derive(Debug, Clone)]
pub struct LiquidationOutcome {
    pub account: AccountId,
    pub result: LiquidatorResult<TxId>,
}

impl LiquidationOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Drives discovery and the liquidation sweep over one registry.
#[derive(Debug, Default)]
pub struct LiquidationScanner {
    registry: AccountRegistry,
}

impl LiquidationScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn registry(&self) -> &AccountRegistry {
        &self.registry
    }

    /// List the exchange's accounts and register every one not yet seen,
    /// subscribing to its state feed before registering it.
    ///
    /// If listing fails the registry is untouched. If a single
    /// subscription fails that account is skipped this cycle and picked
    /// up again on the next one.
    pub async fn discover_accounts(
        &mut self,
        client: &dyn ExchangeClient,
    ) -> LiquidatorResult<DiscoveryReport> {
        let listed = client
            .list_all_accounts()
            .await
            .map_err(LiquidatorError::DiscoveryFailed)?;

        let mut newly_added = 0;
        for id in listed {
            if self.registry.contains(&id) {
                continue;
            }
            if let Err(error) = client.subscribe(&id).await {
                warn!(account = %id, %error, "Subscription failed, retrying next cycle");
                continue;
            }
            self.registry.insert(AccountHandle::new(id));
            newly_added += 1;
        }

        let report = DiscoveryReport {
            total_known: self.registry.len(),
            newly_added,
        };
        if report.newly_added > 0 {
            info!(
                total = report.total_known,
                new = report.newly_added,
                "Discovered new accounts"
            );
        } else {
            debug!(total = report.total_known, "No new accounts");
        }
        Ok(report)
    }

    /// Sweep every registered account. Eligible accounts get exactly one
    /// liquidation call each, dispatched concurrently. Each failed check
    /// or call becomes its own outcome; none aborts the sweep.
    pub async fn scan_for_liquidations(
        &self,
        client: &dyn ExchangeClient,
    ) -> Vec<LiquidationOutcome> {
        let mut eligible: Vec<AccountId> = Vec::new();
        let mut outcomes: Vec<LiquidationOutcome> = Vec::new();

        for handle in self.registry.iter() {
            match client.can_be_liquidated(handle.id()).await {
                Ok(true) => eligible.push(handle.id().clone()),
                Ok(false) => {}
                Err(error) => {
                    warn!(account = %handle.id(), %error, "Eligibility check failed");
                    outcomes.push(LiquidationOutcome {
                        account: handle.id().clone(),
                        result: Err(LiquidatorError::LiquidationCallFailed {
                            account: handle.id().clone(),
                            source: error,
                        }),
                    });
                }
            }
        }

        if !eligible.is_empty() {
            info!(count = eligible.len(), "Liquidating eligible accounts");
        }

        let calls = eligible.iter().map(|id| async move {
            let result = client.liquidate(id).await;
            match &result {
                Ok(tx) => info!(account = %id, tx = %tx, "Liquidated account"),
                Err(error) => warn!(account = %id, %error, "Liquidation call failed"),
            }
            LiquidationOutcome {
                account: id.clone(),
                result: result.map_err(|source| LiquidatorError::LiquidationCallFailed {
                    account: id.clone(),
                    source,
                }),
            }
        });
        outcomes.extend(join_all(calls).await);
        outcomes
    }

    /// Release every subscription held by the registry. Shutdown path;
    /// failures are logged and skipped.
    pub async fn unsubscribe_all(&self, client: &dyn ExchangeClient) {
        for handle in self.registry.iter() {
            if let Err(error) = client.unsubscribe(handle.id()).await {
                warn!(account = %handle.id(), %error, "Unsubscribe failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_exchange::SimExchange;

    fn account(name: &str) -> AccountId {
        AccountId::parse(name).unwrap()
    }

    #[tokio::test]
    async fn test_discovery_registers_and_subscribes_new_accounts() {
        let sim = SimExchange::new();
        sim.create_account(&account("aa01"));
        sim.create_account(&account("bb02"));

        let mut scanner = LiquidationScanner::new();
        let report = scanner.discover_accounts(&sim).await.unwrap();

        assert_eq!(report.total_known, 2);
        assert_eq!(report.newly_added, 2);
        assert!(sim.is_subscribed(&account("aa01")));
        assert!(sim.is_subscribed(&account("bb02")));
    }

    #[tokio::test]
    async fn test_discovery_only_adds_unseen_accounts() {
        let sim = SimExchange::new();
        sim.create_account(&account("aa01"));
        sim.create_account(&account("bb02"));

        let mut scanner = LiquidationScanner::new();
        scanner.discover_accounts(&sim).await.unwrap();

        sim.create_account(&account("cc03"));
        let report = scanner.discover_accounts(&sim).await.unwrap();

        assert_eq!(report.total_known, 3);
        assert_eq!(report.newly_added, 1);
        // The existing accounts were not re-subscribed.
        assert_eq!(sim.subscription_count(), 3);
    }

    #[tokio::test]
    async fn test_discovery_is_idempotent() {
        let sim = SimExchange::new();
        sim.create_account(&account("aa01"));

        let mut scanner = LiquidationScanner::new();
        scanner.discover_accounts(&sim).await.unwrap();
        let report = scanner.discover_accounts(&sim).await.unwrap();

        assert_eq!(report.total_known, 1);
        assert_eq!(report.newly_added, 0);
    }

    #[tokio::test]
    async fn test_listing_failure_leaves_registry_unchanged() {
        let sim = SimExchange::new();
        sim.create_account(&account("aa01"));

        let mut scanner = LiquidationScanner::new();
        scanner.discover_accounts(&sim).await.unwrap();

        sim.create_account(&account("bb02"));
        sim.fail_next_listing();
        let err = scanner.discover_accounts(&sim).await.unwrap_err();

        assert!(matches!(err, LiquidatorError::DiscoveryFailed(_)));
        assert_eq!(scanner.registry().len(), 1);
    }

    #[tokio::test]
    async fn test_scan_liquidates_eligible_account_once() {
        let sim = SimExchange::new();
        sim.create_account(&account("aa01"));
        sim.create_account(&account("bb02"));
        sim.set_liquidatable(&account("bb02"), true);

        let mut scanner = LiquidationScanner::new();
        scanner.discover_accounts(&sim).await.unwrap();
        let outcomes = scanner.scan_for_liquidations(&sim).await;

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].account, account("bb02"));
        assert!(outcomes[0].is_success());

        let calls = sim.liquidation_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, account("bb02"));

        // Eligibility was consumed; a second sweep fires nothing.
        let outcomes = scanner.scan_for_liquidations(&sim).await;
        assert!(outcomes.is_empty());
        assert_eq!(sim.liquidation_calls().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failed_liquidation_does_not_abort_sweep() {
        let sim = SimExchange::new();
        sim.create_account(&account("aa01"));
        sim.create_account(&account("bb02"));
        sim.set_liquidatable(&account("aa01"), true);
        sim.set_liquidatable(&account("bb02"), true);
        sim.fail_liquidation(&account("aa01"));

        let mut scanner = LiquidationScanner::new();
        scanner.discover_accounts(&sim).await.unwrap();
        let outcomes = scanner.scan_for_liquidations(&sim).await;

        assert_eq!(outcomes.len(), 2);
        let failed = outcomes
            .iter()
            .find(|o| o.account == account("aa01"))
            .unwrap();
        assert!(matches!(
            failed.result,
            Err(LiquidatorError::LiquidationCallFailed { .. })
        ));
        let succeeded = outcomes
            .iter()
            .find(|o| o.account == account("bb02"))
            .unwrap();
        assert!(succeeded.is_success());
    }

    #[tokio::test]
    async fn test_unsubscribe_all_releases_subscriptions() {
        let sim = SimExchange::new();
        sim.create_account(&account("aa01"));
        sim.create_account(&account("bb02"));

        let mut scanner = LiquidationScanner::new();
        scanner.discover_accounts(&sim).await.unwrap();
        assert_eq!(sim.subscription_count(), 2);

        scanner.unsubscribe_all(&sim).await;
        assert_eq!(sim.subscription_count(), 0);
    }
}
