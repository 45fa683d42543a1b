//! Strategy Layer - Anchor mean reversion
//!
//! Trades the fine series against its coarse anchor:
//! - enters when the fine price strays past `entry_threshold` from the anchor
//! - exits on take-profit, stop-loss, holding-time cap, or end of series
//! - holds at most one position at a time

pub mod params;
pub mod mean_reversion;

pub use params::{ExitReference, StrategyConfig, StrategyError};
pub use mean_reversion::{MeanReversionStrategy, PositionState, TradeAction};
