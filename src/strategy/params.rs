//! Strategy Parameters
//!
//! Configuration for the anchor mean reversion strategy. Distances are in
//! price units, holding time is wall-clock simulated time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Price that take-profit and stop-loss distances are measured from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExitReference {
    /// `(price - current anchor) * side_sign`
    #[default]
    Anchor,
    /// `(price - entry price) * side_sign`, i.e. the open P&L
    Entry,
}

impl fmt::Display for ExitReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitReference::Anchor => write!(f, "anchor"),
            ExitReference::Entry => write!(f, "entry"),
        }
    }
}

impl FromStr for ExitReference {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "anchor" => Ok(ExitReference::Anchor),
            "entry" => Ok(ExitReference::Entry),
            other => Err(StrategyError::InvalidParameter(format!(
                "exit_reference must be 'anchor' or 'entry', got '{other}'"
            ))),
        }
    }
}

/// Strategy errors. Parameter errors are caught up front; the rest are
/// data-consistency failures that abort a replay.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StrategyError {
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No coarse anchor covers fine timestamp {timestamp}")]
    UnmappedTimestamp { timestamp: DateTime<Utc> },

    #[error("Fine point at {timestamp} claims interval {recorded} but resolves to {resolved}")]
    AnchorMismatch {
        timestamp: DateTime<Utc>,
        recorded: DateTime<Utc>,
        resolved: DateTime<Utc>,
    },

    #[error("Fine points out of order: {current} does not follow {previous}")]
    OutOfOrder {
        previous: DateTime<Utc>,
        current: DateTime<Utc>,
    },
}

/// Main strategy configuration
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyConfig {
    /// |price - anchor| must exceed this to open a position
    pub entry_threshold: f64,
    /// Signed distance at which profit is taken
    pub take_profit: f64,
    /// Signed adverse distance at which the position is stopped out
    pub stop_loss: f64,
    /// Positions held this long are closed regardless of price
    pub max_holding: Duration,
    pub exit_reference: ExitReference,
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            entry_threshold: 1.5,
            take_profit: 1.0,
            stop_loss: 2.5,
            max_holding: Duration::minutes(10),
            exit_reference: ExitReference::Anchor,
        }
    }
}

impl StrategyConfig {
    /// Create a new config with a custom entry threshold
    pub fn with_entry_threshold(mut self, threshold: f64) -> Self {
        self.entry_threshold = threshold;
        self
    }

    /// Create a new config measuring exits from a different reference
    pub fn with_exit_reference(mut self, reference: ExitReference) -> Self {
        self.exit_reference = reference;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), StrategyError> {
        for (name, value) in [
            ("entry_threshold", self.entry_threshold),
            ("take_profit", self.take_profit),
            ("stop_loss", self.stop_loss),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(StrategyError::InvalidParameter(format!(
                    "{name} must be finite and >= 0, got {value}"
                )));
            }
        }
        if self.max_holding <= Duration::zero() {
            return Err(StrategyError::InvalidParameter(format!(
                "max_holding must be > 0, got {} ms",
                self.max_holding.num_milliseconds()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(StrategyConfig::default().validate().is_ok());
        assert_eq!(StrategyConfig::default().exit_reference, ExitReference::Anchor);
    }

    #[test]
    fn test_negative_distance_rejected() {
        let config = StrategyConfig {
            stop_loss: -1.0,
            ..StrategyConfig::default()
        };
        assert!(matches!(config.validate(), Err(StrategyError::InvalidParameter(_))));
    }

    #[test]
    fn test_nan_threshold_rejected() {
        let config = StrategyConfig::default().with_entry_threshold(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_holding_rejected() {
        let config = StrategyConfig {
            max_holding: Duration::zero(),
            ..StrategyConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_exit_reference_parse() {
        assert_eq!("anchor".parse::<ExitReference>(), Ok(ExitReference::Anchor));
        assert_eq!("Entry".parse::<ExitReference>(), Ok(ExitReference::Entry));
        assert!("mid".parse::<ExitReference>().is_err());
        assert_eq!(ExitReference::Entry.to_string(), "entry");
    }
}
