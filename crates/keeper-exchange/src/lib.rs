//! Exchange client contract for the keeper bots.
//!
//! The actual exchange is an external on-chain program; this crate models
//! it as a fixed-contract trait ([`ExchangeClient`]) plus a deterministic
//! in-memory implementation ([`SimExchange`]) used for dry runs and tests.

pub mod client;
pub mod error;
pub mod instruction;
pub mod sim;

pub use client::{BoxFuture, DynExchangeClient, ExchangeClient, PriceImpact};
pub use error::{ExchangeError, ExchangeResult};
pub use instruction::{Instruction, TxId};
pub use sim::SimExchange;
