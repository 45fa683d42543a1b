//! Anchor Mean Reversion Strategy
//!
//! Single-position replay over the fine series. Each point is handled in
//! strict timestamp order:
//!
//! 1. resolve the coarse anchor (a miss aborts the run)
//! 2. if a position is open, check exits: take-profit, then stop-loss,
//!    then the holding-time cap; the first hit closes the position
//! 3. if flat (including just closed on this point), open short when the
//!    price sits more than `entry_threshold` above the anchor, long when
//!    more than `entry_threshold` below
//!
//! Whatever is still open after the last point is force-closed there.
//!
//! State machine: `Flat -> Open(Long | Short) -> Flat`, a trade is
//! recorded on every `Open -> Flat` transition.

use tracing::debug;

use super::params::{ExitReference, StrategyConfig, StrategyError};
use crate::domain::{ExitReason, FinePricePoint, Position, Side, Trade};
use crate::ports::AnchorLookup;

/// Position state of the strategy
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PositionState {
    Flat,
    Open(Position),
}

/// What happened on one fine point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TradeAction {
    /// Set when an open position was closed on this point
    pub exit: Option<ExitReason>,
    /// Set when a position was opened on this point
    pub entry: Option<Side>,
}

impl TradeAction {
    pub fn is_none(&self) -> bool {
        self.exit.is_none() && self.entry.is_none()
    }
}

/// Stateful single-position mean reversion simulator
#[derive(Debug, Clone)]
pub struct MeanReversionStrategy {
    config: StrategyConfig,
    state: PositionState,
    ledger: Vec<Trade>,
    last_point: Option<FinePricePoint>,
}

impl MeanReversionStrategy {
    /// Create a strategy after validating its parameters
    pub fn new(config: StrategyConfig) -> Result<Self, StrategyError> {
        config.validate()?;
        Ok(Self {
            config,
            state: PositionState::Flat,
            ledger: Vec::new(),
            last_point: None,
        })
    }

    /// Replay a whole fine series and return the closed-trade ledger
    pub fn run<A: AnchorLookup>(
        config: StrategyConfig,
        fine: &[FinePricePoint],
        anchors: &A,
    ) -> Result<Vec<Trade>, StrategyError> {
        let mut strategy = Self::new(config)?;
        for point in fine {
            strategy.on_point(point, anchors)?;
        }
        Ok(strategy.finish())
    }

    /// Process one fine point: exits first, then entry on the same price
    pub fn on_point<A: AnchorLookup>(
        &mut self,
        point: &FinePricePoint,
        anchors: &A,
    ) -> Result<TradeAction, StrategyError> {
        if let Some(previous) = &self.last_point {
            if point.timestamp <= previous.timestamp {
                return Err(StrategyError::OutOfOrder {
                    previous: previous.timestamp,
                    current: point.timestamp,
                });
            }
        }

        let anchor = anchors
            .anchor_at(point.timestamp)
            .ok_or(StrategyError::UnmappedTimestamp {
                timestamp: point.timestamp,
            })?;
        if anchor.boundary != point.coarse_timestamp {
            return Err(StrategyError::AnchorMismatch {
                timestamp: point.timestamp,
                recorded: point.coarse_timestamp,
                resolved: anchor.boundary,
            });
        }
        self.last_point = Some(*point);

        let mut action = TradeAction::default();

        if let PositionState::Open(position) = self.state {
            if let Some(reason) = self.exit_reason(&position, point, anchor.price) {
                self.close(position, point, reason);
                action.exit = Some(reason);
            }
        }

        if self.state == PositionState::Flat {
            let deviation = point.deviation_from(anchor.price);
            let side = if deviation > self.config.entry_threshold {
                Some(Side::Short)
            } else if deviation < -self.config.entry_threshold {
                Some(Side::Long)
            } else {
                None
            };

            if let Some(side) = side {
                let position = Position::new(point.timestamp, point.price, side, anchor.price);
                debug!(
                    %side,
                    price = point.price,
                    anchor = anchor.price,
                    deviation,
                    at = %point.timestamp,
                    "Opened position"
                );
                self.state = PositionState::Open(position);
                action.entry = Some(side);
            }
        }

        Ok(action)
    }

    /// Force-close any open position at the last processed point and
    /// hand back the ledger
    pub fn finish(mut self) -> Vec<Trade> {
        if let (PositionState::Open(position), Some(last)) = (self.state, self.last_point) {
            self.close(position, &last, ExitReason::EndOfSeries);
        }
        self.ledger
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    /// Currently open position, if any
    pub fn position(&self) -> Option<&Position> {
        match &self.state {
            PositionState::Open(position) => Some(position),
            PositionState::Flat => None,
        }
    }

    /// Trades closed so far, in exit order
    pub fn ledger(&self) -> &[Trade] {
        &self.ledger
    }

    pub fn config(&self) -> &StrategyConfig {
        &self.config
    }

    fn exit_reason(&self, position: &Position, point: &FinePricePoint, anchor: f64) -> Option<ExitReason> {
        let reference = match self.config.exit_reference {
            ExitReference::Anchor => anchor,
            ExitReference::Entry => position.entry_price,
        };
        let signed = (point.price - reference) * position.side.sign();

        if signed >= self.config.take_profit {
            Some(ExitReason::TakeProfit)
        } else if signed <= -self.config.stop_loss {
            Some(ExitReason::StopLoss)
        } else if position.elapsed(point.timestamp) >= self.config.max_holding {
            Some(ExitReason::TimeCap)
        } else {
            None
        }
    }

    fn close(&mut self, position: Position, point: &FinePricePoint, reason: ExitReason) {
        let trade = Trade::close(position, point.timestamp, point.price, reason);
        debug!(
            side = %trade.side,
            entry = trade.entry_price,
            exit = trade.exit_price,
            pnl = trade.realized_pnl,
            %reason,
            "Closed position"
        );
        self.ledger.push(trade);
        self.state = PositionState::Flat;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CoarsePricePoint;
    use crate::market::AnchorIndex;
    use crate::ports::MockAnchors;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    /// Fine points 30s apart inside one 30-minute interval anchored at `anchor`
    fn single_anchor(anchor: f64, prices: &[f64]) -> (Vec<FinePricePoint>, AnchorIndex) {
        let fine = prices
            .iter()
            .enumerate()
            .map(|(i, &p)| FinePricePoint::new(t0() + Duration::seconds(30 * i as i64), p, t0()))
            .collect();
        let index = AnchorIndex::new(t0(), Duration::minutes(30), vec![CoarsePricePoint::new(t0(), anchor)]);
        (fine, index)
    }

    fn config(entry: f64, tp: f64, sl: f64) -> StrategyConfig {
        StrategyConfig {
            entry_threshold: entry,
            take_profit: tp,
            stop_loss: sl,
            max_holding: Duration::minutes(10),
            exit_reference: ExitReference::Anchor,
        }
    }

    #[test]
    fn test_boundary_scenario_entry_reference() {
        let (fine, index) = single_anchor(100.0, &[100.0, 103.5, 102.0, 101.0]);
        let cfg = config(2.0, 1.0, 3.0).with_exit_reference(ExitReference::Entry);

        let trades = MeanReversionStrategy::run(cfg, &fine, &index).unwrap();

        assert_eq!(trades.len(), 1);
        let trade = &trades[0];
        assert_eq!(trade.side, Side::Short);
        assert_eq!(trade.entry_price, 103.5);
        assert_eq!(trade.exit_price, 102.0);
        assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
        assert_eq!(trade.realized_pnl, 1.5);
        assert_eq!(trade.anchor_price, 100.0);
    }

    #[test]
    fn test_boundary_scenario_anchor_reference() {
        // Anchor-relative signed deviation for the short stays negative
        // (-2.0, -1.0) so neither TP nor SL fires; the end-of-series close applies
        let (fine, index) = single_anchor(100.0, &[100.0, 103.5, 102.0, 101.0]);

        let trades = MeanReversionStrategy::run(config(2.0, 1.0, 3.0), &fine, &index).unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].side, Side::Short);
        assert_eq!(trades[0].exit_reason, ExitReason::EndOfSeries);
        assert_eq!(trades[0].exit_price, 101.0);
        assert_eq!(trades[0].realized_pnl, 2.5);
        assert_eq!(trades[0].exit_time, fine[3].timestamp);
    }

    #[test]
    fn test_anchor_reference_take_profit_on_overshoot() {
        // Short from +3.0, anchor-relative TP needs price 1.0 below anchor
        let (fine, index) = single_anchor(100.0, &[103.0, 100.5, 99.0]);

        let trades = MeanReversionStrategy::run(config(2.0, 1.0, 3.0), &fine, &index).unwrap();

        assert_eq!(trades[0].exit_reason, ExitReason::TakeProfit);
        assert_eq!(trades[0].exit_price, 99.0);
        assert_eq!(trades[0].realized_pnl, 4.0);
    }

    #[test]
    fn test_zero_trades_when_threshold_never_exceeded() {
        let (fine, index) = single_anchor(100.0, &[100.0, 101.0, 99.0, 102.0, 98.0]);

        let trades = MeanReversionStrategy::run(config(2.0, 1.0, 3.0), &fine, &index).unwrap();

        assert!(trades.is_empty());
    }

    #[test]
    fn test_threshold_tie_does_not_enter() {
        let (fine, index) = single_anchor(100.0, &[102.0, 98.0]);
        let mut strategy = MeanReversionStrategy::new(config(2.0, 1.0, 3.0)).unwrap();

        for point in &fine {
            assert!(strategy.on_point(point, &index).unwrap().is_none());
        }
        assert_eq!(strategy.state(), PositionState::Flat);
    }

    #[test]
    fn test_long_entry_below_anchor() {
        let (fine, index) = single_anchor(100.0, &[97.5, 98.0]);
        let mut strategy = MeanReversionStrategy::new(config(2.0, 1.0, 3.0)).unwrap();

        let action = strategy.on_point(&fine[0], &index).unwrap();
        assert_eq!(action.entry, Some(Side::Long));
        assert_eq!(strategy.position().map(|p| p.anchor_price), Some(100.0));

        let trades = strategy.finish();
        assert_eq!(trades.len(), 1);
        // Forced close on the only processed point
        assert_eq!(trades[0].exit_time, fine[0].timestamp);
        assert_eq!(trades[0].realized_pnl, 0.0);
    }

    #[test]
    fn test_forced_close_on_final_point() {
        let (fine, index) = single_anchor(100.0, &[100.0, 100.5, 97.0, 97.5]);

        let trades = MeanReversionStrategy::run(config(2.0, 5.0, 5.0), &fine, &index).unwrap();

        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].entry_time, fine[2].timestamp);
        assert_eq!(trades[0].exit_time, fine[3].timestamp);
        assert_eq!(trades[0].exit_reason, ExitReason::EndOfSeries);
        assert_eq!(trades[0].realized_pnl, 0.5);
    }

    #[test]
    fn test_stop_loss_long() {
        // Long at 97 (dev -3); anchor-relative signed = price - 100
        let (fine, index) = single_anchor(100.0, &[97.0, 96.5, 95.0]);

        let trades = MeanReversionStrategy::run(config(2.0, 1.0, 4.5), &fine, &index).unwrap();

        assert_eq!(trades[0].exit_reason, ExitReason::StopLoss);
        assert_eq!(trades[0].exit_price, 95.0);
        assert_eq!(trades[0].realized_pnl, -2.0);
    }

    #[test]
    fn test_time_cap_closes_position() {
        let cfg = StrategyConfig {
            max_holding: Duration::seconds(60),
            ..config(2.0, 10.0, 10.0)
        };
        let (fine, index) = single_anchor(100.0, &[103.0, 102.8, 102.9, 101.0]);

        let trades = MeanReversionStrategy::run(cfg, &fine, &index).unwrap();

        assert_eq!(trades[0].exit_reason, ExitReason::TimeCap);
        assert_eq!(trades[0].exit_time, fine[2].timestamp);
        assert_eq!(trades[0].holding, Duration::seconds(60));
        // Re-entered short on the same point (dev +2.9) then force-closed
        assert_eq!(trades.len(), 2);
        assert_eq!(trades[1].entry_time, fine[2].timestamp);
        assert_eq!(trades[1].exit_reason, ExitReason::EndOfSeries);
    }

    #[test]
    fn test_take_profit_wins_over_time_cap() {
        let cfg = StrategyConfig {
            max_holding: Duration::seconds(30),
            exit_reference: ExitReference::Entry,
            ..config(2.0, 1.0, 3.0)
        };
        let (fine, index) = single_anchor(100.0, &[103.0, 101.5]);

        let trades = MeanReversionStrategy::run(cfg, &fine, &index).unwrap();

        assert_eq!(trades[0].exit_reason, ExitReason::TakeProfit);
    }

    #[test]
    fn test_reentry_on_exit_point() {
        // Long at 97, TP (entry-relative) at 98.5 fires; 98.5 is not beyond
        // the threshold so no re-entry. Then short at 103 and SL at 106.5,
        // where the deviation (+6.5) immediately re-opens a short.
        let cfg = config(2.0, 1.0, 3.0).with_exit_reference(ExitReference::Entry);
        let (fine, index) = single_anchor(100.0, &[97.0, 98.5, 103.0, 106.5]);
        let mut strategy = MeanReversionStrategy::new(cfg).unwrap();

        let actions: Vec<TradeAction> = fine
            .iter()
            .map(|p| strategy.on_point(p, &index).unwrap())
            .collect();

        assert_eq!(actions[1].exit, Some(ExitReason::TakeProfit));
        assert_eq!(actions[1].entry, None);
        assert_eq!(actions[3].exit, Some(ExitReason::StopLoss));
        assert_eq!(actions[3].entry, Some(Side::Short));

        let trades = strategy.finish();
        assert_eq!(trades.len(), 3);
        assert_eq!(trades[2].entry_time, fine[3].timestamp);
        assert_eq!(trades[2].exit_time, fine[3].timestamp);
    }

    #[test]
    fn test_no_second_position_while_open() {
        let cfg = config(1.0, 50.0, 50.0);
        let (fine, index) = single_anchor(100.0, &[102.0, 110.0, 90.0, 115.0]);
        let mut strategy = MeanReversionStrategy::new(cfg).unwrap();

        for point in &fine {
            let held = strategy.position().is_some();
            let action = strategy.on_point(point, &index).unwrap();
            if held {
                assert!(action.entry.is_none(), "entered at {}", point.price);
            }
        }

        let trades = strategy.finish();
        assert_eq!(trades.len(), 1);
        assert_eq!(trades[0].entry_price, 102.0);
        assert_eq!(trades[0].exit_reason, ExitReason::EndOfSeries);
    }

    #[test]
    fn test_unmapped_timestamp_is_fatal() {
        let anchors = MockAnchors::new()
            .with_anchor(t0(), 100.0)
            .with_gap(t0() + Duration::seconds(30));
        let fine = vec![
            FinePricePoint::new(t0(), 100.0, t0()),
            FinePricePoint::new(t0() + Duration::seconds(30), 104.0, t0()),
        ];

        let result = MeanReversionStrategy::run(StrategyConfig::default(), &fine, &anchors);

        assert_eq!(
            result,
            Err(StrategyError::UnmappedTimestamp {
                timestamp: t0() + Duration::seconds(30)
            })
        );
        assert_eq!(anchors.get_calls().len(), 2);
    }

    #[test]
    fn test_point_outside_grid_is_fatal() {
        let (_, index) = single_anchor(100.0, &[]);
        let stray = FinePricePoint::new(t0() + Duration::hours(1), 100.0, t0() + Duration::hours(1));

        let result = MeanReversionStrategy::run(StrategyConfig::default(), &[stray], &index);

        assert!(matches!(result, Err(StrategyError::UnmappedTimestamp { .. })));
    }

    #[test]
    fn test_anchor_mismatch_is_fatal() {
        let (_, index) = single_anchor(100.0, &[]);
        let wrong_owner = FinePricePoint::new(t0() + Duration::seconds(30), 100.0, t0() + Duration::seconds(30));

        let result = MeanReversionStrategy::run(StrategyConfig::default(), &[wrong_owner], &index);

        assert!(matches!(result, Err(StrategyError::AnchorMismatch { .. })));
    }

    #[test]
    fn test_out_of_order_is_fatal() {
        let (mut fine, index) = single_anchor(100.0, &[100.0, 100.0]);
        fine.swap(0, 1);

        let result = MeanReversionStrategy::run(StrategyConfig::default(), &fine, &index);

        assert!(matches!(result, Err(StrategyError::OutOfOrder { .. })));
    }

    #[test]
    fn test_empty_series_yields_empty_ledger() {
        let (fine, index) = single_anchor(100.0, &[]);
        let trades = MeanReversionStrategy::run(StrategyConfig::default(), &fine, &index).unwrap();
        assert!(trades.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let cfg = StrategyConfig {
            take_profit: -0.5,
            ..StrategyConfig::default()
        };
        assert!(MeanReversionStrategy::new(cfg).is_err());
    }
}
