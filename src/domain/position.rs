use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Long,
    Short,
}

impl Side {
    /// +1 for long, -1 for short
    pub fn sign(self) -> f64 {
        match self {
            Side::Long => 1.0,
            Side::Short => -1.0,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
        }
    }
}

/// The single open position held by the strategy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub side: Side,
    /// Coarse anchor in force when the position was opened
    pub anchor_price: f64,
}

impl Position {
    pub fn new(entry_time: DateTime<Utc>, entry_price: f64, side: Side, anchor_price: f64) -> Self {
        Self {
            entry_time,
            entry_price,
            side,
            anchor_price,
        }
    }

    /// P&L if the position were closed at `price`
    pub fn pnl_at(&self, price: f64) -> f64 {
        (price - self.entry_price) * self.side.sign()
    }

    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        now - self.entry_time
    }
}
