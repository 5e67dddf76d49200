//! Liquidation keeper.
//!
//! Discovers every account known to the exchange program, subscribes to
//! each one's state feed, and sweeps the registry for accounts whose
//! margin has fallen below maintenance.

pub mod error;
pub mod registry;
pub mod scanner;

pub use error::{LiquidatorError, LiquidatorResult};
pub use registry::{AccountHandle, AccountRegistry};
pub use scanner::{DiscoveryReport, LiquidationOutcome, LiquidationScanner};
