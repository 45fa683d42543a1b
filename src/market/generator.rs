//! Two-Tier Price Process Generator
//!
//! Produces a coarse anchor series (one OU walk around the global base
//! price) and, nested inside every coarse interval, a fine OU walk that
//! starts exactly at that interval's anchor and reverts toward it.
//!
//! Randomness comes from one seeded stream consumed in a fixed order:
//! the whole coarse walk first (N - 1 draws), then each interval's fine
//! walk in chronological order (steps_per_interval - 1 draws each). The
//! same seed therefore reproduces every series bit for bit.

use chrono::Duration;
use rand::distributions::Distribution;
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;
use tracing::debug;

use super::anchor_index::AnchorIndex;
use super::ou_process::OuStep;
use super::params::{secs, GeneratorError, MarketParams};
use crate::domain::{CoarsePricePoint, FinePricePoint};

/// Generated coarse and fine series plus the anchor lookup between them
#[derive(Debug, Clone)]
pub struct PriceSeries {
    pub fine: Vec<FinePricePoint>,
    pub anchors: AnchorIndex,
    steps_per_interval: usize,
}

impl PriceSeries {
    pub fn coarse(&self) -> &[CoarsePricePoint] {
        self.anchors.coarse()
    }

    pub fn steps_per_interval(&self) -> usize {
        self.steps_per_interval
    }

    /// Fine points belonging to coarse interval `idx`
    pub fn fine_in_interval(&self, idx: usize) -> &[FinePricePoint] {
        let from = idx * self.steps_per_interval;
        let to = from + self.steps_per_interval;
        self.fine.get(from..to).unwrap_or(&[])
    }
}

/// Seeded generator for the two-tier price process
#[derive(Debug, Clone)]
pub struct PriceProcessGenerator {
    params: MarketParams,
    normal: Normal,
}

impl PriceProcessGenerator {
    /// Validate `params` and build a generator
    pub fn new(params: MarketParams) -> Result<Self, GeneratorError> {
        params.validate()?;
        let normal =
            Normal::new(0.0, 1.0).map_err(|e| GeneratorError::Distribution(e.to_string()))?;
        Ok(Self { params, normal })
    }

    pub fn params(&self) -> &MarketParams {
        &self.params
    }

    /// Run both walks. Pure: calling twice yields identical output.
    pub fn generate(&self) -> PriceSeries {
        let mut rng = StdRng::seed_from_u64(self.params.seed);
        let coarse = self.coarse_walk(&mut rng);
        let fine = self.fine_walks(&coarse, &mut rng);

        debug!(
            coarse_points = coarse.len(),
            fine_points = fine.len(),
            seed = self.params.seed,
            "Generated price series"
        );

        PriceSeries {
            fine,
            anchors: AnchorIndex::new(self.params.start_time, self.params.coarse_interval, coarse),
            steps_per_interval: self.params.steps_per_interval(),
        }
    }

    fn coarse_walk(&self, rng: &mut StdRng) -> Vec<CoarsePricePoint> {
        let p = &self.params;
        let step = OuStep::new(p.coarse_ou(), secs(p.coarse_interval));
        let interval_ms = p.coarse_interval.num_milliseconds();

        let mut coarse = Vec::with_capacity(p.coarse_intervals);
        let mut price = p.base_price;
        for i in 0..p.coarse_intervals {
            if i > 0 {
                price = step.advance(price, self.normal.sample(rng));
            }
            let timestamp = p.start_time + Duration::milliseconds(interval_ms * i as i64);
            coarse.push(CoarsePricePoint::new(timestamp, price));
        }
        coarse
    }

    fn fine_walks(&self, coarse: &[CoarsePricePoint], rng: &mut StdRng) -> Vec<FinePricePoint> {
        let p = &self.params;
        let steps = p.steps_per_interval();
        let step = OuStep::new(p.fine_ou(), secs(p.fine_interval));
        let fine_ms = p.fine_interval.num_milliseconds();

        let mut fine = Vec::with_capacity(coarse.len() * steps);
        for anchor in coarse {
            let anchored = step.anchored_at(anchor.price);
            let mut price = anchor.price;
            for j in 0..steps {
                if j > 0 {
                    price = anchored.advance(price, self.normal.sample(rng));
                }
                let timestamp = anchor.timestamp + Duration::milliseconds(fine_ms * j as i64);
                fine.push(FinePricePoint::new(timestamp, price, anchor.timestamp));
            }
        }
        fine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::AnchorLookup;

    fn small_params() -> MarketParams {
        MarketParams {
            coarse_intervals: 6,
            coarse_interval: Duration::minutes(5),
            fine_interval: Duration::seconds(30),
            ..MarketParams::default()
        }
    }

    #[test]
    fn test_invalid_params_produce_no_generator() {
        let params = MarketParams {
            fine_half_life: Duration::seconds(-5),
            ..small_params()
        };
        assert!(PriceProcessGenerator::new(params).is_err());
    }

    #[test]
    fn test_unrepresentable_grid_produces_no_generator() {
        let huge = Duration::seconds(9_000_000_000_000);
        let params = MarketParams {
            coarse_intervals: 2,
            coarse_interval: huge,
            fine_interval: huge,
            ..small_params()
        };
        assert!(matches!(
            PriceProcessGenerator::new(params),
            Err(GeneratorError::HorizonOverflow { .. })
        ));
    }

    #[test]
    fn test_series_shape_and_spacing() {
        let generator = PriceProcessGenerator::new(small_params()).unwrap();
        let series = generator.generate();

        assert_eq!(series.coarse().len(), 6);
        assert_eq!(series.steps_per_interval(), 10);
        assert_eq!(series.fine.len(), 60);

        for pair in series.coarse().windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::minutes(5));
        }
        for pair in series.fine.windows(2) {
            assert_eq!(pair[1].timestamp - pair[0].timestamp, Duration::seconds(30));
        }
        assert_eq!(series.coarse()[0].timestamp, small_params().start_time);
    }

    #[test]
    fn test_first_coarse_is_base_price() {
        let series = PriceProcessGenerator::new(small_params()).unwrap().generate();
        assert_eq!(series.coarse()[0].price, 100.0);
    }

    #[test]
    fn test_fine_walk_starts_at_anchor() {
        let series = PriceProcessGenerator::new(small_params()).unwrap().generate();
        for (idx, anchor) in series.coarse().iter().enumerate() {
            let walk = series.fine_in_interval(idx);
            assert_eq!(walk[0].timestamp, anchor.timestamp);
            assert_eq!(walk[0].price, anchor.price);
            assert!(walk.iter().all(|p| p.coarse_timestamp == anchor.timestamp));
        }
    }

    #[test]
    fn test_every_fine_point_maps_to_its_anchor() {
        let series = PriceProcessGenerator::new(small_params()).unwrap().generate();
        for point in &series.fine {
            let quote = series.anchors.anchor_at(point.timestamp).unwrap();
            assert_eq!(quote.boundary, point.coarse_timestamp);
        }
    }

    #[test]
    fn test_same_seed_is_bit_identical() {
        let a = PriceProcessGenerator::new(small_params()).unwrap().generate();
        let b = PriceProcessGenerator::new(small_params()).unwrap().generate();
        assert_eq!(a.coarse(), b.coarse());
        assert_eq!(a.fine, b.fine);
    }

    #[test]
    fn test_different_seed_differs() {
        let a = PriceProcessGenerator::new(small_params()).unwrap().generate();
        let b = PriceProcessGenerator::new(small_params().with_seed(43)).unwrap().generate();
        assert_ne!(a.fine, b.fine);
    }

    #[test]
    fn test_draw_order_coarse_then_fine() {
        // Replaying the stream by hand must reproduce the generator exactly
        let params = small_params();
        let series = PriceProcessGenerator::new(params.clone()).unwrap().generate();

        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut rng = StdRng::seed_from_u64(params.seed);
        let coarse_step = OuStep::new(params.coarse_ou(), 300.0);
        let fine_step = OuStep::new(params.fine_ou(), 30.0);

        let mut anchors = vec![params.base_price];
        for _ in 1..params.coarse_intervals {
            let prev = *anchors.last().unwrap();
            anchors.push(coarse_step.advance(prev, normal.sample(&mut rng)));
        }

        let mut expected = Vec::new();
        for anchor in &anchors {
            let step = fine_step.anchored_at(*anchor);
            let mut x = *anchor;
            expected.push(x);
            for _ in 1..10 {
                x = step.advance(x, normal.sample(&mut rng));
                expected.push(x);
            }
        }

        let coarse: Vec<f64> = series.coarse().iter().map(|p| p.price).collect();
        let fine: Vec<f64> = series.fine.iter().map(|p| p.price).collect();
        assert_eq!(coarse, anchors);
        assert_eq!(fine, expected);
    }

    #[test]
    fn test_zero_volatility_is_flat() {
        let params = MarketParams {
            coarse_volatility: 0.0,
            fine_volatility: 0.0,
            ..small_params()
        };
        let series = PriceProcessGenerator::new(params).unwrap().generate();
        assert!(series.fine.iter().all(|p| (p.price - 100.0).abs() < 1e-9));
    }

    #[test]
    fn test_single_step_intervals() {
        let params = MarketParams {
            coarse_intervals: 3,
            coarse_interval: Duration::seconds(30),
            fine_interval: Duration::seconds(30),
            ..MarketParams::default()
        };
        let series = PriceProcessGenerator::new(params).unwrap().generate();
        assert_eq!(series.fine.len(), 3);
        for (coarse, fine) in series.coarse().iter().zip(&series.fine) {
            assert_eq!(coarse.price, fine.price);
        }
    }

    #[test]
    fn test_fine_in_interval_out_of_range() {
        let series = PriceProcessGenerator::new(small_params()).unwrap().generate();
        assert!(series.fine_in_interval(6).is_empty());
    }
}
