use chrono::{DateTime, Utc};
use std::cell::RefCell;
use std::collections::BTreeMap;

use super::anchor::{AnchorLookup, AnchorQuote};

/// Mock anchor lookup that records calls and serves configured anchors
///
/// Anchors are keyed by interval boundary; a timestamp resolves to the
/// latest boundary at or before it. Timestamps before the first boundary
/// and anything listed with `with_gap` resolve to `None`.
#[derive(Debug, Default)]
pub struct MockAnchors {
    anchors: BTreeMap<DateTime<Utc>, f64>,
    gaps: Vec<DateTime<Utc>>,
    calls: RefCell<Vec<DateTime<Utc>>>,
}

impl MockAnchors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to register an anchor starting at `boundary`
    pub fn with_anchor(mut self, boundary: DateTime<Utc>, price: f64) -> Self {
        self.anchors.insert(boundary, price);
        self
    }

    /// Builder method to make a specific timestamp miss
    pub fn with_gap(mut self, timestamp: DateTime<Utc>) -> Self {
        self.gaps.push(timestamp);
        self
    }

    /// Get all recorded lookups
    pub fn get_calls(&self) -> Vec<DateTime<Utc>> {
        self.calls.borrow().clone()
    }
}

impl AnchorLookup for MockAnchors {
    fn anchor_at(&self, timestamp: DateTime<Utc>) -> Option<AnchorQuote> {
        self.calls.borrow_mut().push(timestamp);
        if self.gaps.contains(&timestamp) {
            return None;
        }
        self.anchors
            .range(..=timestamp)
            .next_back()
            .map(|(boundary, price)| AnchorQuote {
                boundary: *boundary,
                price: *price,
            })
    }
}
