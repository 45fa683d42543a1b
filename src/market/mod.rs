//! Market Layer - Synthetic two-tier price process
//!
//! - `ou_process`: exact OU step and a half-life estimator
//! - `params`: generator configuration and its validation errors
//! - `generator`: the seeded coarse + fine walk
//! - `anchor_index`: floor-to-boundary lookup from fine time to anchor

pub mod ou_process;
pub mod params;
pub mod anchor_index;
pub mod generator;

pub use ou_process::{estimate_half_life, estimate_pooled_half_life, OuParams, OuStep};
pub use params::{GeneratorError, MarketParams};
pub use anchor_index::AnchorIndex;
pub use generator::{PriceProcessGenerator, PriceSeries};
