use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::position::{Position, Side};

/// Why a position was closed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    TakeProfit,
    StopLoss,
    TimeCap,
    /// Forced close on the last fine point
    EndOfSeries,
}

impl ExitReason {
    pub const ALL: [ExitReason; 4] = [
        ExitReason::TakeProfit,
        ExitReason::StopLoss,
        ExitReason::TimeCap,
        ExitReason::EndOfSeries,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ExitReason::TakeProfit => "take_profit",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TimeCap => "time_cap",
            ExitReason::EndOfSeries => "end_of_series",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A closed round trip. Immutable once recorded in the ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: DateTime<Utc>,
    pub entry_price: f64,
    pub side: Side,
    pub anchor_price: f64,
    pub exit_time: DateTime<Utc>,
    pub exit_price: f64,
    pub realized_pnl: f64,
    #[serde(rename = "holding_secs", with = "holding_secs")]
    pub holding: Duration,
    pub exit_reason: ExitReason,
}

impl Trade {
    /// Close `position` at the given price and time
    pub fn close(
        position: Position,
        exit_time: DateTime<Utc>,
        exit_price: f64,
        exit_reason: ExitReason,
    ) -> Self {
        Self {
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            side: position.side,
            anchor_price: position.anchor_price,
            exit_time,
            exit_price,
            realized_pnl: position.pnl_at(exit_price),
            holding: exit_time - position.entry_time,
            exit_reason,
        }
    }

    pub fn is_win(&self) -> bool {
        self.realized_pnl > 0.0
    }
}

impl fmt::Display for Trade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {:.4} -> {:.4} ({}) pnl {:+.4}",
            self.side, self.entry_price, self.exit_price, self.exit_reason, self.realized_pnl
        )
    }
}

/// Holding durations go over the wire as fractional seconds
mod holding_secs {
    use chrono::Duration;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.num_milliseconds() as f64 / 1000.0)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::milliseconds((secs * 1000.0).round() as i64))
    }
}
