//! Ledger Analytics
//!
//! Pure derived views over a finished trade ledger: running realized P&L
//! and the headline statistics printed after a run.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::trade::{ExitReason, Trade};

/// One step of the running realized P&L curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PnlPoint {
    pub timestamp: DateTime<Utc>,
    pub cumulative_pnl: f64,
}

/// Running sum of realized P&L in exit order
pub fn cumulative_pnl(trades: &[Trade]) -> Vec<PnlPoint> {
    let mut running = 0.0;
    trades
        .iter()
        .map(|trade| {
            running += trade.realized_pnl;
            PnlPoint {
                timestamp: trade.exit_time,
                cumulative_pnl: running,
            }
        })
        .collect()
}

/// Summary statistics for a ledger
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeSummary {
    /// Number of closed trades
    pub trade_count: usize,
    /// Sum of realized P&L
    pub total_pnl: f64,
    /// Fraction of trades with strictly positive P&L (0.0 - 1.0)
    pub win_rate: f64,
    /// Mean holding time in seconds
    pub mean_holding_secs: f64,
    /// Average P&L of winning trades
    pub avg_win: f64,
    /// Average P&L of losing trades (negative or zero)
    pub avg_loss: f64,
    /// Gross profit over gross loss; infinite when there are no losses
    #[serde(with = "profit_factor")]
    pub profit_factor: f64,
    /// Largest peak-to-trough fall of cumulative P&L, in price units
    pub max_drawdown: f64,
    /// Trade count per exit path
    pub exits: BTreeMap<String, usize>,
}

impl TradeSummary {
    pub fn from_trades(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return Self::default();
        }

        let count = trades.len();
        let total_pnl: f64 = trades.iter().map(|t| t.realized_pnl).sum();

        let (wins, losses): (Vec<&Trade>, Vec<&Trade>) =
            trades.iter().partition(|t| t.is_win());
        let gross_profit: f64 = wins.iter().map(|t| t.realized_pnl).sum();
        let gross_loss: f64 = losses.iter().map(|t| t.realized_pnl).sum();

        let avg_win = if wins.is_empty() { 0.0 } else { gross_profit / wins.len() as f64 };
        let avg_loss = if losses.is_empty() { 0.0 } else { gross_loss / losses.len() as f64 };

        let profit_factor = if gross_loss.abs() < 1e-12 {
            if gross_profit > 0.0 {
                f64::INFINITY
            } else {
                0.0
            }
        } else {
            gross_profit / gross_loss.abs()
        };

        let total_holding: Duration = trades
            .iter()
            .fold(Duration::zero(), |acc, t| acc + t.holding);
        let mean_holding_secs = total_holding.num_milliseconds() as f64 / 1000.0 / count as f64;

        let mut exits = BTreeMap::new();
        for reason in ExitReason::ALL {
            let n = trades.iter().filter(|t| t.exit_reason == reason).count();
            exits.insert(reason.as_str().to_string(), n);
        }

        Self {
            trade_count: count,
            total_pnl,
            win_rate: wins.len() as f64 / count as f64,
            mean_holding_secs,
            avg_win,
            avg_loss,
            profit_factor,
            max_drawdown: max_drawdown(&cumulative_pnl(trades)),
            exits,
        }
    }

    pub fn exit_count(&self, reason: ExitReason) -> usize {
        self.exits.get(reason.as_str()).copied().unwrap_or(0)
    }
}

/// An infinite profit factor goes over the wire as `null`
mod profit_factor {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        if value.is_infinite() {
            serializer.serialize_none()
        } else {
            serializer.serialize_some(value)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(f64::INFINITY))
    }
}

/// Peak-to-trough drawdown of a cumulative curve that starts at zero
fn max_drawdown(curve: &[PnlPoint]) -> f64 {
    let mut peak = 0.0_f64;
    let mut worst = 0.0_f64;
    for point in curve {
        peak = peak.max(point.cumulative_pnl);
        worst = worst.max(peak - point.cumulative_pnl);
    }
    worst
}
