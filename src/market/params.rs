//! Generator Parameters
//!
//! Immutable configuration for the two-tier price process, validated
//! before any random draw is made.

use chrono::{DateTime, Duration, TimeZone, Utc};
use thiserror::Error;

use super::ou_process::OuParams;

/// Upper bound on generated fine points per run
pub const MAX_FINE_POINTS: usize = 10_000_000;

/// Configuration errors detected at generator setup
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GeneratorError {
    #[error("coarse interval count must be > 0")]
    NoIntervals,
    #[error("{field} must be a positive duration, got {millis} ms")]
    NonPositiveDuration { field: &'static str, millis: i64 },
    #[error("fine interval ({fine_ms} ms) must evenly divide coarse interval ({coarse_ms} ms)")]
    UnevenSubdivision { coarse_ms: i64, fine_ms: i64 },
    #[error("{field} must be > 0, got {millis} ms")]
    NonPositiveHalfLife { field: &'static str, millis: i64 },
    #[error("{field} must be finite and >= 0, got {value}")]
    InvalidVolatility { field: &'static str, value: f64 },
    #[error("base price must be finite, got {0}")]
    InvalidBasePrice(f64),
    #[error("time grid of {coarse_intervals} x {coarse_ms} ms from {start} does not fit in a timestamp")]
    HorizonOverflow {
        start: DateTime<Utc>,
        coarse_intervals: usize,
        coarse_ms: i64,
    },
    #[error("{points} fine points exceeds the limit of {limit}")]
    TooManyPoints { points: usize, limit: usize },
    #[error("normal distribution setup failed: {0}")]
    Distribution(String),
}

/// Parameters of the coarse and fine OU walks
#[derive(Debug, Clone, PartialEq)]
pub struct MarketParams {
    /// Number of coarse intervals to generate
    pub coarse_intervals: usize,
    /// Length of one coarse (price-setting) interval
    pub coarse_interval: Duration,
    /// Length of one fine sub-interval
    pub fine_interval: Duration,
    /// Global long-run mean of the coarse walk
    pub base_price: f64,
    pub coarse_volatility: f64,
    pub coarse_half_life: Duration,
    pub fine_volatility: f64,
    pub fine_half_life: Duration,
    /// Timestamp of the first coarse interval
    pub start_time: DateTime<Utc>,
    pub seed: u64,
}

impl Default for MarketParams {
    fn default() -> Self {
        Self {
            coarse_intervals: 48,
            coarse_interval: Duration::minutes(30),
            fine_interval: Duration::seconds(30),
            base_price: 100.0,
            coarse_volatility: 2.0,
            coarse_half_life: Duration::hours(4),
            fine_volatility: 1.0,
            fine_half_life: Duration::minutes(5),
            start_time: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default(),
            seed: 42,
        }
    }
}

impl MarketParams {
    /// Create a new config with a different seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Create a new config with a different coarse interval
    pub fn with_coarse_interval(mut self, interval: Duration, count: usize) -> Self {
        self.coarse_interval = interval;
        self.coarse_intervals = count;
        self
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), GeneratorError> {
        if self.coarse_intervals == 0 {
            return Err(GeneratorError::NoIntervals);
        }

        let coarse_ms = self.coarse_interval.num_milliseconds();
        let fine_ms = self.fine_interval.num_milliseconds();
        if coarse_ms <= 0 {
            return Err(GeneratorError::NonPositiveDuration {
                field: "coarse_interval",
                millis: coarse_ms,
            });
        }
        if fine_ms <= 0 {
            return Err(GeneratorError::NonPositiveDuration {
                field: "fine_interval",
                millis: fine_ms,
            });
        }
        if coarse_ms % fine_ms != 0 {
            return Err(GeneratorError::UnevenSubdivision { coarse_ms, fine_ms });
        }

        let end = i64::try_from(self.coarse_intervals)
            .ok()
            .and_then(|n| coarse_ms.checked_mul(n))
            .and_then(Duration::try_milliseconds)
            .and_then(|horizon| self.start_time.checked_add_signed(horizon));
        if end.is_none() {
            return Err(GeneratorError::HorizonOverflow {
                start: self.start_time,
                coarse_intervals: self.coarse_intervals,
                coarse_ms,
            });
        }

        let steps = (coarse_ms / fine_ms) as usize;
        match self.coarse_intervals.checked_mul(steps) {
            Some(points) if points <= MAX_FINE_POINTS => {}
            overflow => {
                return Err(GeneratorError::TooManyPoints {
                    points: overflow.unwrap_or(usize::MAX),
                    limit: MAX_FINE_POINTS,
                })
            }
        }

        for (field, half_life) in [
            ("coarse_half_life", self.coarse_half_life),
            ("fine_half_life", self.fine_half_life),
        ] {
            let millis = half_life.num_milliseconds();
            if millis <= 0 {
                return Err(GeneratorError::NonPositiveHalfLife { field, millis });
            }
        }

        for (field, value) in [
            ("coarse_volatility", self.coarse_volatility),
            ("fine_volatility", self.fine_volatility),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(GeneratorError::InvalidVolatility { field, value });
            }
        }

        if !self.base_price.is_finite() {
            return Err(GeneratorError::InvalidBasePrice(self.base_price));
        }

        Ok(())
    }

    /// Fine points per coarse interval. Only meaningful after `validate`.
    pub fn steps_per_interval(&self) -> usize {
        let fine_ms = self.fine_interval.num_milliseconds();
        if fine_ms <= 0 {
            return 0;
        }
        (self.coarse_interval.num_milliseconds() / fine_ms) as usize
    }

    /// Total simulated horizon
    pub fn horizon(&self) -> Duration {
        Duration::milliseconds(
            self.coarse_interval
                .num_milliseconds()
                .saturating_mul(self.coarse_intervals as i64),
        )
    }

    pub fn coarse_ou(&self) -> OuParams {
        OuParams::new(
            self.base_price,
            self.coarse_volatility,
            secs(self.coarse_half_life),
        )
    }

    /// Fine-scale OU parameters; the mean is replaced per interval
    pub fn fine_ou(&self) -> OuParams {
        OuParams::new(self.base_price, self.fine_volatility, secs(self.fine_half_life))
    }
}

/// Duration in fractional seconds
pub(crate) fn secs(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / 1000.0
}
