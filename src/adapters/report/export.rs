//! File export
//!
//! JSON documents of a run, a series, or a sweep, and flat CSV files for
//! the ledger and the fine series.

use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::application::{SimulationReport, SweepRow};
use crate::domain::{CoarsePricePoint, FinePricePoint, PnlPoint, Trade, TradeSummary};
use crate::market::PriceSeries;
use crate::ports::AnchorLookup;

pub const TRADES_CSV: &str = "trades.csv";
pub const FINE_CSV: &str = "fine.csv";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Serialize)]
struct SeriesDocument<'a> {
    steps_per_interval: usize,
    coarse: &'a [CoarsePricePoint],
    fine: &'a [FinePricePoint],
}

impl<'a> From<&'a PriceSeries> for SeriesDocument<'a> {
    fn from(series: &'a PriceSeries) -> Self {
        Self {
            steps_per_interval: series.steps_per_interval(),
            coarse: series.coarse(),
            fine: &series.fine,
        }
    }
}

#[derive(Debug, Serialize)]
struct RunDocument<'a> {
    series: SeriesDocument<'a>,
    trades: &'a [Trade],
    cumulative_pnl: &'a [PnlPoint],
    summary: &'a TradeSummary,
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ExportError> {
    let json = serde_json::to_string_pretty(value)?;
    fs::write(path, json).map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Series, ledger, running P&L and summary in one document
pub fn write_report_json(path: &Path, report: &SimulationReport) -> Result<(), ExportError> {
    let doc = RunDocument {
        series: SeriesDocument::from(&report.series),
        trades: &report.trades,
        cumulative_pnl: &report.cumulative_pnl,
        summary: &report.summary,
    };
    write_json(path, &doc)
}

pub fn write_series_json(path: &Path, series: &PriceSeries) -> Result<(), ExportError> {
    write_json(path, &SeriesDocument::from(series))
}

pub fn write_sweep_json(path: &Path, rows: &[SweepRow]) -> Result<(), ExportError> {
    write_json(path, &rows)
}

pub fn write_trades_csv(path: &Path, trades: &[Trade]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "entry_time",
        "side",
        "entry_price",
        "anchor_price",
        "exit_time",
        "exit_price",
        "realized_pnl",
        "holding_secs",
        "exit_reason",
    ])?;

    for trade in trades {
        wtr.write_record([
            trade.entry_time.to_rfc3339(),
            trade.side.to_string(),
            trade.entry_price.to_string(),
            trade.anchor_price.to_string(),
            trade.exit_time.to_rfc3339(),
            trade.exit_price.to_string(),
            trade.realized_pnl.to_string(),
            (trade.holding.num_milliseconds() as f64 / 1000.0).to_string(),
            trade.exit_reason.to_string(),
        ])?;
    }

    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Fine series with its anchor and deviation on every row
pub fn write_fine_csv(path: &Path, series: &PriceSeries) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record(["timestamp", "price", "coarse_timestamp", "anchor_price", "deviation"])?;

    for point in &series.fine {
        let (anchor, deviation) = match series.anchors.anchor_at(point.timestamp) {
            Some(quote) => (
                quote.price.to_string(),
                point.deviation_from(quote.price).to_string(),
            ),
            None => (String::new(), String::new()),
        };
        wtr.write_record([
            point.timestamp.to_rfc3339(),
            point.price.to_string(),
            point.coarse_timestamp.to_rfc3339(),
            anchor,
            deviation,
        ])?;
    }

    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn write_sweep_csv(path: &Path, rows: &[SweepRow]) -> Result<(), ExportError> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([
        "coarse_interval_secs",
        "coarse_intervals",
        "trade_count",
        "total_pnl",
        "win_rate",
        "profit_factor",
        "max_drawdown",
        "mean_holding_secs",
    ])?;

    for row in rows {
        let s = &row.summary;
        wtr.write_record([
            row.coarse_interval_secs.to_string(),
            row.coarse_intervals.to_string(),
            s.trade_count.to_string(),
            s.total_pnl.to_string(),
            s.win_rate.to_string(),
            s.profit_factor.to_string(),
            s.max_drawdown.to_string(),
            s.mean_holding_secs.to_string(),
        ])?;
    }

    wtr.flush().map_err(|source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Write `trades.csv` and `fine.csv` into `dir`, creating it if needed
pub fn write_csv_bundle(
    dir: &Path,
    trades: &[Trade],
    series: &PriceSeries,
) -> Result<Vec<PathBuf>, ExportError> {
    fs::create_dir_all(dir).map_err(|source| ExportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let trades_path = dir.join(TRADES_CSV);
    let fine_path = dir.join(FINE_CSV);
    write_trades_csv(&trades_path, trades)?;
    write_fine_csv(&fine_path, series)?;
    Ok(vec![trades_path, fine_path])
}
