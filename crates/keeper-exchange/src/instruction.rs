//! Exchange instructions and transaction identifiers.
//!
//! Instructions are immutable value objects built fresh each cycle and
//! submitted in atomic batches: either every instruction in a batch lands
//! or none do.

use keeper_core::{MarketIndex, OrderIntent};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One instruction within an atomic transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "kind")]
pub enum Instruction {
    /// Cancel a resting order.
    Cancel { market: MarketIndex, order_id: u64 },
    /// Place a new order.
    Place { intent: OrderIntent },
}

impl Instruction {
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel { .. })
    }

    pub fn is_place(&self) -> bool {
        matches!(self, Self::Place { .. })
    }
}

/// Identifier of a confirmed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(String);

impl TxId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keeper_core::{OrderSide, Price, Size};
    use rust_decimal_macros::dec;

    #[test]
    fn test_instruction_predicates() {
        let cancel = Instruction::Cancel {
            market: MarketIndex::new(0),
            order_id: 1,
        };
        assert!(cancel.is_cancel());
        assert!(!cancel.is_place());

        let place = Instruction::Place {
            intent: OrderIntent::limit(
                MarketIndex::new(0),
                OrderSide::Long,
                Size::ONE,
                Price::new(dec!(100)),
            ),
        };
        assert!(place.is_place());
    }
}
