//! Quote construction for the market-making keeper.
//!
//! Turns a market snapshot into a two-sided set of order intents using
//! either a fixed spread around the mark price or a floating spread around
//! the trailing average price.

pub mod config;
pub mod error;
pub mod quote;
pub mod spread;

pub use config::{MakerConfig, SpreadPolicy};
pub use error::{MakerError, MakerResult};
pub use quote::QuoteEngine;
pub use spread::{fixed_spread, floating_spread};
