//! Coarse Interval Sweep
//!
//! Re-runs the simulation for several coarse interval lengths while
//! holding the total horizon, the fine interval, the seed, and the
//! strategy fixed. Each row reports the same ledger summary a single
//! run does.

use chrono::Duration;
use serde::Serialize;
use thiserror::Error;
use tracing::{info, info_span};

use super::simulation::{Simulation, SimulationError};
use crate::domain::TradeSummary;
use crate::market::MarketParams;
use crate::strategy::StrategyConfig;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SweepError {
    #[error("sweep needs at least one coarse interval")]
    Empty,
    #[error("coarse interval of {coarse_secs}s does not evenly divide the {horizon_secs}s horizon")]
    UnevenHorizon { coarse_secs: u64, horizon_secs: i64 },
    #[error("coarse interval of {coarse_secs}s failed: {source}")]
    Simulation {
        coarse_secs: u64,
        #[source]
        source: SimulationError,
    },
}

/// One sweep result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SweepRow {
    pub coarse_interval_secs: u64,
    pub coarse_intervals: usize,
    pub summary: TradeSummary,
}

/// Run one simulation per coarse interval length, in the given order
pub fn run_interval_sweep(
    base: &MarketParams,
    strategy: &StrategyConfig,
    coarse_interval_secs: &[u64],
) -> Result<Vec<SweepRow>, SweepError> {
    if coarse_interval_secs.is_empty() {
        return Err(SweepError::Empty);
    }

    let horizon_ms = base.horizon().num_milliseconds();
    let mut rows = Vec::with_capacity(coarse_interval_secs.len());

    for &coarse_secs in coarse_interval_secs {
        let _span = info_span!("sweep", coarse_secs).entered();

        let coarse_intervals = intervals_for(horizon_ms, coarse_secs)?;
        let params = base
            .clone()
            .with_coarse_interval(Duration::seconds(coarse_secs as i64), coarse_intervals);

        let report = Simulation::new(params, strategy.clone())
            .and_then(|sim| sim.run())
            .map_err(|source| SweepError::Simulation { coarse_secs, source })?;

        info!(
            coarse_intervals,
            trades = report.summary.trade_count,
            total_pnl = report.summary.total_pnl,
            "Sweep point complete"
        );

        rows.push(SweepRow {
            coarse_interval_secs: coarse_secs,
            coarse_intervals,
            summary: report.summary,
        });
    }

    Ok(rows)
}

/// Interval count that keeps the horizon unchanged
fn intervals_for(horizon_ms: i64, coarse_secs: u64) -> Result<usize, SweepError> {
    let uneven = SweepError::UnevenHorizon {
        coarse_secs,
        horizon_secs: horizon_ms / 1000,
    };

    let coarse_ms = i64::try_from(coarse_secs)
        .ok()
        .and_then(|s| s.checked_mul(1000))
        .filter(|ms| *ms > 0)
        .ok_or_else(|| uneven.clone())?;

    if horizon_ms % coarse_ms != 0 {
        return Err(uneven);
    }
    usize::try_from(horizon_ms / coarse_ms).map_err(|_| uneven)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> MarketParams {
        MarketParams {
            coarse_intervals: 4,
            coarse_interval: Duration::minutes(30),
            fine_interval: Duration::seconds(30),
            ..MarketParams::default()
        }
    }

    #[test]
    fn test_sweep_keeps_horizon_constant() {
        let rows = run_interval_sweep(&base(), &StrategyConfig::default(), &[3600, 1800, 600]).unwrap();

        let counts: Vec<usize> = rows.iter().map(|r| r.coarse_intervals).collect();
        assert_eq!(counts, vec![2, 4, 12]);
        assert_eq!(rows[0].coarse_interval_secs, 3600);
    }

    #[test]
    fn test_sweep_row_matches_single_run() {
        let strategy = StrategyConfig::default().with_entry_threshold(0.5);
        let rows = run_interval_sweep(&base(), &strategy, &[1800]).unwrap();

        let report = Simulation::new(base(), strategy).unwrap().run().unwrap();
        assert_eq!(rows[0].summary, report.summary);
    }

    #[test]
    fn test_uneven_horizon_rejected() {
        let err = run_interval_sweep(&base(), &StrategyConfig::default(), &[1800, 4200]).unwrap_err();
        assert!(matches!(err, SweepError::UnevenHorizon { coarse_secs: 4200, .. }));
    }

    #[test]
    fn test_zero_interval_rejected() {
        let err = run_interval_sweep(&base(), &StrategyConfig::default(), &[0]).unwrap_err();
        assert!(matches!(err, SweepError::UnevenHorizon { coarse_secs: 0, .. }));
    }

    #[test]
    fn test_fine_interval_must_still_divide() {
        // 45s divides the 2h horizon but not by the 30s fine step
        let err = run_interval_sweep(&base(), &StrategyConfig::default(), &[45]).unwrap_err();
        assert!(matches!(
            err,
            SweepError::Simulation {
                coarse_secs: 45,
                source: SimulationError::Generator(_)
            }
        ));
    }

    #[test]
    fn test_empty_sweep_rejected() {
        let err = run_interval_sweep(&base(), &StrategyConfig::default(), &[]).unwrap_err();
        assert_eq!(err, SweepError::Empty);
    }
}
