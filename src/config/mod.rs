//! Configuration Module
//!
//! Loads and validates configuration from TOML files.

pub mod loader;

pub use loader::{
    Config, ConfigError, LoggingSection, MarketSection, StrategySection, SweepSection, load_config,
};
