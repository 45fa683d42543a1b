//! Simulation Orchestrator
//!
//! Runs the two core stages strictly in sequence: generate the price
//! series, then replay the strategy over the fine series. Both sets of
//! parameters are validated before anything is generated.

use thiserror::Error;
use tracing::{info, info_span, warn};

use crate::domain::{cumulative_pnl, PnlPoint, Trade, TradeSummary};
use crate::market::params::secs;
use crate::market::{
    estimate_half_life, estimate_pooled_half_life, GeneratorError, MarketParams,
    PriceProcessGenerator, PriceSeries,
};
use crate::strategy::{MeanReversionStrategy, StrategyConfig, StrategyError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SimulationError {
    #[error("Generator configuration error: {0}")]
    Generator(#[from] GeneratorError),
    #[error("Strategy error: {0}")]
    Strategy(#[from] StrategyError),
}

/// Everything a run produces
#[derive(Debug, Clone)]
pub struct SimulationReport {
    pub series: PriceSeries,
    pub trades: Vec<Trade>,
    pub cumulative_pnl: Vec<PnlPoint>,
    pub summary: TradeSummary,
}

/// Half-lives recovered from a generated series, in seconds
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct RealizedHalfLives {
    pub coarse_secs: Option<f64>,
    /// Estimated from fine deviations around their anchors
    pub fine_secs: Option<f64>,
}

/// Generator + strategy wired together
#[derive(Debug, Clone)]
pub struct Simulation {
    generator: PriceProcessGenerator,
    strategy: StrategyConfig,
}

impl Simulation {
    /// Validate both configurations up front
    pub fn new(market: MarketParams, strategy: StrategyConfig) -> Result<Self, SimulationError> {
        let generator = PriceProcessGenerator::new(market)?;
        strategy.validate()?;
        Ok(Self { generator, strategy })
    }

    pub fn market(&self) -> &MarketParams {
        self.generator.params()
    }

    pub fn strategy(&self) -> &StrategyConfig {
        &self.strategy
    }

    /// Generate the series only
    pub fn generate(&self) -> PriceSeries {
        let params = self.generator.params();
        let _span = info_span!("generate", seed = params.seed).entered();
        let series = self.generator.generate();
        info!(
            coarse = series.coarse().len(),
            fine = series.fine.len(),
            steps_per_interval = series.steps_per_interval(),
            "Price series generated"
        );
        series
    }

    /// Generate, replay, and summarise
    pub fn run(&self) -> Result<SimulationReport, SimulationError> {
        let series = self.generate();

        let _span = info_span!("replay", exit_reference = %self.strategy.exit_reference).entered();
        let trades = MeanReversionStrategy::run(self.strategy.clone(), &series.fine, &series.anchors)?;
        let summary = TradeSummary::from_trades(&trades);

        if trades.is_empty() {
            warn!(
                entry_threshold = self.strategy.entry_threshold,
                "No fine price exceeded the entry threshold; ledger is empty"
            );
        } else {
            info!(
                trades = summary.trade_count,
                total_pnl = summary.total_pnl,
                win_rate = summary.win_rate,
                "Strategy replay complete"
            );
        }

        Ok(SimulationReport {
            cumulative_pnl: cumulative_pnl(&trades),
            series,
            trades,
            summary,
        })
    }

    /// Estimate the half-lives actually present in `series`
    pub fn realized_half_lives(&self, series: &PriceSeries) -> RealizedHalfLives {
        let params = self.generator.params();
        let coarse: Vec<f64> = series.coarse().iter().map(|p| p.price).collect();

        // One segment per interval so no lag pair crosses an anchor reset
        let deviations: Vec<Vec<f64>> = series
            .coarse()
            .iter()
            .enumerate()
            .map(|(idx, anchor)| {
                series
                    .fine_in_interval(idx)
                    .iter()
                    .map(|p| p.price - anchor.price)
                    .collect()
            })
            .collect();

        RealizedHalfLives {
            coarse_secs: estimate_half_life(&coarse, secs(params.coarse_interval)),
            fine_secs: estimate_pooled_half_life(
                deviations.iter().map(Vec::as_slice),
                secs(params.fine_interval),
            ),
        }
    }
}
