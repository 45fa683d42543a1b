use chrono::{DateTime, Duration, Utc};

use crate::domain::CoarsePricePoint;
use crate::ports::{AnchorLookup, AnchorQuote};

/// O(1) floor-to-boundary index over an evenly spaced coarse series
///
/// interval = (timestamp - start) / coarse_interval, integer division on
/// milliseconds. Anything before `start` or at/after the end of the last
/// interval is unmapped.
#[derive(Debug, Clone, PartialEq)]
pub struct AnchorIndex {
    start: DateTime<Utc>,
    interval_ms: i64,
    coarse: Vec<CoarsePricePoint>,
}

impl AnchorIndex {
    /// `coarse` must be spaced exactly `interval` apart starting at `start`
    pub fn new(start: DateTime<Utc>, interval: Duration, coarse: Vec<CoarsePricePoint>) -> Self {
        Self {
            start,
            interval_ms: interval.num_milliseconds(),
            coarse,
        }
    }

    /// Index of the coarse interval owning `timestamp`
    pub fn interval_of(&self, timestamp: DateTime<Utc>) -> Option<usize> {
        if self.interval_ms <= 0 {
            return None;
        }
        let elapsed = (timestamp - self.start).num_milliseconds();
        if elapsed < 0 {
            return None;
        }
        let idx = usize::try_from(elapsed / self.interval_ms).ok()?;
        (idx < self.coarse.len()).then_some(idx)
    }

    pub fn coarse(&self) -> &[CoarsePricePoint] {
        &self.coarse
    }

    pub fn len(&self) -> usize {
        self.coarse.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coarse.is_empty()
    }
}

impl AnchorLookup for AnchorIndex {
    fn anchor_at(&self, timestamp: DateTime<Utc>) -> Option<AnchorQuote> {
        let point = self.coarse.get(self.interval_of(timestamp)?)?;
        Some(AnchorQuote {
            boundary: point.timestamp,
            price: point.price,
        })
    }
}
