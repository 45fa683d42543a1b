//! Console tables
//!
//! Box-drawing views of a run, a generated series, and a sweep. Every
//! renderer returns a `String` so callers decide where it goes.

use crate::application::{RealizedHalfLives, SimulationReport, SweepRow};
use crate::domain::{ExitReason, Trade, TradeSummary};
use crate::market::{MarketParams, PriceSeries};
use crate::strategy::StrategyConfig;

const WIDTH: usize = 46;

fn top() -> String {
    format!("┌{}┐", "─".repeat(WIDTH))
}

fn divider() -> String {
    format!("├{}┤", "─".repeat(WIDTH))
}

fn bottom() -> String {
    format!("└{}┘", "─".repeat(WIDTH))
}

fn title(text: &str) -> String {
    format!("│ {:<w$} │", text, w = WIDTH - 2)
}

fn row(label: &str, value: impl std::fmt::Display) -> String {
    let value = value.to_string();
    format!("│ {:<20}{:>w$} │", label, value, w = WIDTH - 22)
}

fn market_rows(market: &MarketParams) -> Vec<String> {
    vec![
        row("Seed", market.seed),
        row(
            "Coarse interval",
            format!(
                "{}s x {}",
                market.coarse_interval.num_seconds(),
                market.coarse_intervals
            ),
        ),
        row(
            "Fine interval",
            format!(
                "{}s ({}/interval)",
                market.fine_interval.num_seconds(),
                market.steps_per_interval()
            ),
        ),
        row("Horizon", format!("{}s", market.horizon().num_seconds())),
    ]
}

fn format_factor(value: f64) -> String {
    if value.is_infinite() {
        "inf".to_string()
    } else {
        format!("{:.2}", value)
    }
}

fn summary_rows(summary: &TradeSummary) -> Vec<String> {
    let mut lines = vec![
        row("Trades", summary.trade_count),
        row("Total P&L", format!("{:+.4}", summary.total_pnl)),
        row("Win rate", format!("{:.1}%", summary.win_rate * 100.0)),
        row("Avg win", format!("{:+.4}", summary.avg_win)),
        row("Avg loss", format!("{:+.4}", summary.avg_loss)),
        row("Profit factor", format_factor(summary.profit_factor)),
        row("Max drawdown", format!("{:.4}", summary.max_drawdown)),
        row("Mean holding", format!("{:.1}s", summary.mean_holding_secs)),
    ];
    for reason in ExitReason::ALL {
        lines.push(row(&format!("  {}", reason), summary.exit_count(reason)));
    }
    lines
}

/// Summary table for a full run
pub fn render_summary(
    report: &SimulationReport,
    market: &MarketParams,
    strategy: &StrategyConfig,
) -> String {
    let mut lines = vec![top(), title("Interval Arbitrage - Simulation"), divider()];
    lines.extend(market_rows(market));
    lines.push(row("Fine points", report.series.fine.len()));
    lines.push(divider());
    lines.push(row("Entry threshold", format!("{:.4}", strategy.entry_threshold)));
    lines.push(row(
        "TP / SL",
        format!("{:.4} / {:.4}", strategy.take_profit, strategy.stop_loss),
    ));
    lines.push(row("Max holding", format!("{}s", strategy.max_holding.num_seconds())));
    lines.push(row("Exit reference", strategy.exit_reference));
    lines.push(divider());
    lines.extend(summary_rows(&report.summary));
    lines.push(bottom());
    lines.join("\n")
}

/// One line per trade, in ledger order
pub fn render_trades(trades: &[Trade]) -> String {
    if trades.is_empty() {
        return "No trades".to_string();
    }
    trades
        .iter()
        .enumerate()
        .map(|(i, trade)| {
            format!(
                "{:>4}  {}  {}",
                i + 1,
                trade.entry_time.format("%Y-%m-%d %H:%M:%S"),
                trade
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Overview of a generated series
pub fn render_series(
    series: &PriceSeries,
    market: &MarketParams,
    realized: &RealizedHalfLives,
) -> String {
    let (low, high) = series
        .fine
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.price), hi.max(p.price))
        });
    let fmt_half_life = |estimate: Option<f64>, configured: f64| match estimate {
        Some(secs) => format!("{:.0}s (cfg {:.0}s)", secs, configured),
        None => format!("n/a (cfg {:.0}s)", configured),
    };

    let mut lines = vec![top(), title("Interval Arbitrage - Price Series"), divider()];
    lines.extend(market_rows(market));
    lines.push(divider());
    lines.push(row("Coarse points", series.coarse().len()));
    lines.push(row("Fine points", series.fine.len()));
    if !series.fine.is_empty() {
        lines.push(row("Fine range", format!("{:.4} - {:.4}", low, high)));
    }
    lines.push(row(
        "Coarse half-life",
        fmt_half_life(realized.coarse_secs, market.coarse_half_life.num_seconds() as f64),
    ));
    lines.push(row(
        "Fine half-life",
        fmt_half_life(realized.fine_secs, market.fine_half_life.num_seconds() as f64),
    ));
    lines.push(bottom());
    lines.join("\n")
}

/// Side-by-side comparison of sweep rows
pub fn render_sweep(rows: &[SweepRow]) -> String {
    let mut lines = vec![
        format!(
            "{:>10} {:>9} {:>7} {:>12} {:>8} {:>10}",
            "coarse_s", "intervals", "trades", "total_pnl", "win%", "max_dd"
        ),
        "─".repeat(61),
    ];
    for r in rows {
        lines.push(format!(
            "{:>10} {:>9} {:>7} {:>+12.4} {:>7.1}% {:>10.4}",
            r.coarse_interval_secs,
            r.coarse_intervals,
            r.summary.trade_count,
            r.summary.total_pnl,
            r.summary.win_rate * 100.0,
            r.summary.max_drawdown,
        ));
    }
    lines.join("\n")
}
