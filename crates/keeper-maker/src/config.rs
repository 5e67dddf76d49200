//! Maker configuration.

use keeper_core::Size;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Which spread policy the maker runs with.
///
/// This is a configuration choice made once at startup, not a per-quote
/// decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpreadPolicy {
    /// 1 bp either side of the current mark price.
    #[default]
    Fixed,
    /// +-10 bps floating around the trailing average price.
    Floating,
}

/// Maker configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MakerConfig {
    /// Spread policy to quote with.
    #[serde(default)]
    pub policy: SpreadPolicy,
    /// Base-asset amount per side.
    #[serde(default = "default_order_size")]
    pub order_size: Size,
    /// Quote with post-only orders so the maker never takes liquidity.
    #[serde(default = "default_post_only")]
    pub post_only: bool,
}

fn default_order_size() -> Size {
    Size::new(Decimal::ONE)
}

fn default_post_only() -> bool {
    true
}

impl Default for MakerConfig {
    fn default() -> Self {
        Self {
            policy: SpreadPolicy::default(),
            order_size: default_order_size(),
            post_only: default_post_only(),
        }
    }
}
