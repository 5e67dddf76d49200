//! Cancel-all-then-place as one atomic transaction.
//!
//! The protocol per cycle:
//! 1. read the account's outstanding (non-initial) resting orders,
//! 2. optionally build one cancel instruction per outstanding order
//!    (`cancel_before_place` toggle),
//! 3. re-validate the cross-market guard for every placement,
//! 4. submit cancels + placements via `submit_atomic`.
//!
//! Atomicity is the exchange's contract: a rejection leaves no orphan
//! cancellations and no duplicate resting orders to reconcile.

use crate::error::{ExecutorError, ExecutorResult};
use keeper_core::{check_cross_margin_limit, AccountId, OrderIntent};
use keeper_exchange::{ExchangeClient, Instruction, TxId};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Order replacement configuration.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ReplaceConfig {
    /// Cancel all outstanding orders in the same transaction as the new
    /// placements. Off by default, matching the reference deployment.
    #[serde(default)]
    pub cancel_before_place: bool,
}

/// Executes the order replacement protocol against an exchange client.
#[derive(Debug, Clone, Default)]
pub struct OrderReplacer {
    config: ReplaceConfig,
}

impl OrderReplacer {
    pub fn new(config: ReplaceConfig) -> Self {
        Self { config }
    }

    /// Replace `account`'s resting orders with `intents` atomically.
    pub async fn replace_orders(
        &self,
        client: &dyn ExchangeClient,
        account: &AccountId,
        intents: &[OrderIntent],
    ) -> ExecutorResult<TxId> {
        let orders = client
            .get_account_orders(account)
            .await
            .map_err(ExecutorError::AccountRead)?;
        let outstanding: Vec<_> = orders.iter().filter(|o| o.is_outstanding()).collect();

        let mut instructions: Vec<Instruction> = Vec::new();

        if self.config.cancel_before_place && !outstanding.is_empty() {
            info!(
                account = %account,
                count = outstanding.len(),
                "Canceling all open orders"
            );
            for order in &outstanding {
                instructions.push(client.build_cancel_instruction(order));
            }
        } else {
            debug!(
                account = %account,
                outstanding = outstanding.len(),
                "Leaving outstanding orders in place"
            );
        }

        // Account state may have changed since the quotes were built, so
        // the position guard runs again here against a fresh snapshot.
        let positions = client
            .get_account_positions(account)
            .await
            .map_err(ExecutorError::AccountRead)?;
        for intent in intents {
            check_cross_margin_limit(&positions, intent.market)?;
            instructions.push(client.build_place_order_instruction(intent));
        }

        info!(
            account = %account,
            cancels = instructions.iter().filter(|i| i.is_cancel()).count(),
            placements = intents.len(),
            "Submitting atomic order replacement"
        );

        client
            .submit_atomic(account, instructions)
            .await
            .map_err(ExecutorError::BatchRejected)
    }
}
