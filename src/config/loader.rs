//! Configuration Loader
//!
//! Loads and validates configuration from TOML files matching
//! config/simulation.toml. Every key has a default, so a partial file
//! (or an empty one) is a valid configuration.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::market::MarketParams;
use crate::strategy::{ExitReference, StrategyConfig};

/// Main configuration structure matching simulation.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub market: MarketSection,
    #[serde(default)]
    pub strategy: StrategySection,
    #[serde(default)]
    pub logging: LoggingSection,
    #[serde(default)]
    pub sweep: SweepSection,
}

/// Price process configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MarketSection {
    /// Number of coarse (price-setting) intervals
    pub coarse_intervals: usize,
    /// Length of one coarse interval in seconds
    pub coarse_interval_secs: u64,
    /// Length of one fine sub-interval in seconds
    pub fine_interval_secs: u64,
    /// Long-run mean of the coarse walk
    pub base_price: f64,
    /// Stationary volatility of the coarse walk
    pub coarse_volatility: f64,
    /// Coarse half-life in seconds
    pub coarse_half_life_secs: u64,
    /// Stationary volatility of the fine walk around its anchor
    pub fine_volatility: f64,
    /// Fine half-life in seconds
    pub fine_half_life_secs: u64,
    /// First coarse boundary (RFC 3339)
    pub start_time: DateTime<Utc>,
    /// Seed for the single random stream
    pub seed: u64,
}

impl Default for MarketSection {
    fn default() -> Self {
        let params = MarketParams::default();
        Self {
            coarse_intervals: params.coarse_intervals,
            coarse_interval_secs: params.coarse_interval.num_seconds() as u64,
            fine_interval_secs: params.fine_interval.num_seconds() as u64,
            base_price: params.base_price,
            coarse_volatility: params.coarse_volatility,
            coarse_half_life_secs: params.coarse_half_life.num_seconds() as u64,
            fine_volatility: params.fine_volatility,
            fine_half_life_secs: params.fine_half_life.num_seconds() as u64,
            start_time: params.start_time,
            seed: params.seed,
        }
    }
}

/// Strategy configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StrategySection {
    /// Deviation from anchor (price units) needed to open a position
    pub entry_threshold: f64,
    /// Take-profit distance in price units
    pub take_profit: f64,
    /// Stop-loss distance in price units
    pub stop_loss: f64,
    /// Time-based stop in seconds
    pub max_holding_secs: u64,
    /// "anchor" or "entry"
    pub exit_reference: ExitReference,
}

impl Default for StrategySection {
    fn default() -> Self {
        let config = StrategyConfig::default();
        Self {
            entry_threshold: config.entry_threshold,
            take_profit: config.take_profit,
            stop_loss: config.stop_loss,
            max_holding_secs: config.max_holding.num_seconds() as u64,
            exit_reference: config.exit_reference,
        }
    }
}

/// Logging configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "trace", "debug", "info", "warn", "error"
    pub level: String,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

/// Interval sweep configuration section
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SweepSection {
    /// Coarse interval lengths (seconds) to compare at a fixed horizon
    pub coarse_interval_secs: Vec<u64>,
}

impl Default for SweepSection {
    fn default() -> Self {
        Self {
            coarse_interval_secs: vec![3600, 1800, 900, 300],
        }
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Load configuration from a TOML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    config.validate()?;
    Ok(config)
}

impl Config {
    /// Validate all configuration parameters
    pub fn validate(&self) -> Result<(), ConfigError> {
        MarketParams::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("[market] {e}")))?;

        StrategyConfig::from(self)
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("[strategy] {e}")))?;

        if !LOG_LEVELS.contains(&self.logging.level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "logging.level must be one of {:?}, got '{}'",
                LOG_LEVELS, self.logging.level
            )));
        }

        if self.sweep.coarse_interval_secs.contains(&0) {
            return Err(ConfigError::ValidationError(
                "sweep.coarse_interval_secs entries must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Saturates at the largest representable `Duration`
fn seconds(secs: u64) -> Duration {
    let max = (i64::MAX / 1000) as u64;
    Duration::seconds(secs.min(max) as i64)
}

// Conversion from Config to MarketParams
impl From<&Config> for MarketParams {
    fn from(config: &Config) -> Self {
        let m = &config.market;
        MarketParams {
            coarse_intervals: m.coarse_intervals,
            coarse_interval: seconds(m.coarse_interval_secs),
            fine_interval: seconds(m.fine_interval_secs),
            base_price: m.base_price,
            coarse_volatility: m.coarse_volatility,
            coarse_half_life: seconds(m.coarse_half_life_secs),
            fine_volatility: m.fine_volatility,
            fine_half_life: seconds(m.fine_half_life_secs),
            start_time: m.start_time,
            seed: m.seed,
        }
    }
}

// Conversion from Config to StrategyConfig
impl From<&Config> for StrategyConfig {
    fn from(config: &Config) -> Self {
        let s = &config.strategy;
        StrategyConfig {
            entry_threshold: s.entry_threshold,
            take_profit: s.take_profit,
            stop_loss: s.stop_loss,
            max_holding: seconds(s.max_holding_secs),
            exit_reference: s.exit_reference,
        }
    }
}
