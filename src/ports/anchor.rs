use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Coarse anchor resolved for a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorQuote {
    /// Start of the owning coarse interval
    pub boundary: DateTime<Utc>,
    pub price: f64,
}

/// Floor-to-boundary lookup from any timestamp to its coarse anchor
///
/// Implementations must partition time exactly: every timestamp inside
/// the generated grid maps to one interval, everything outside maps to
/// `None`.
pub trait AnchorLookup {
    fn anchor_at(&self, timestamp: DateTime<Utc>) -> Option<AnchorQuote>;
}

impl<T: AnchorLookup + ?Sized> AnchorLookup for &T {
    fn anchor_at(&self, timestamp: DateTime<Utc>) -> Option<AnchorQuote> {
        (**self).anchor_at(timestamp)
    }
}
