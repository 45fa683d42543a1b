//! interval-arb - Coarse/Fine Interval Arbitrage Simulator Library
//!
//! Generates a seeded two-tier Ornstein-Uhlenbeck price series and
//! replays a single-position mean reversion strategy against it.
//!
//! # Modules
//!
//! - `domain`: Core value types (price points, Position, Trade, TradeSummary)
//! - `ports`: Trait abstractions (AnchorLookup)
//! - `market`: Price process generator and anchor index
//! - `strategy`: Anchor mean reversion simulator
//! - `adapters`: CLI and report export
//! - `config`: Configuration loading and validation
//! - `application`: Simulation and interval sweep use cases

pub mod domain;
pub mod ports;
pub mod market;
pub mod strategy;
pub mod adapters;
pub mod config;
pub mod application;
