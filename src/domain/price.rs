use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Anchor price for one coarse interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoarsePricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
}

/// One fine-grained observation nested inside a coarse interval
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FinePricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: f64,
    /// Boundary of the coarse interval this point belongs to
    pub coarse_timestamp: DateTime<Utc>,
}

impl CoarsePricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64) -> Self {
        Self { timestamp, price }
    }
}

impl FinePricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: f64, coarse_timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            price,
            coarse_timestamp,
        }
    }

    /// Signed distance from an anchor price
    pub fn deviation_from(&self, anchor: f64) -> f64 {
        self.price - anchor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_deviation_from_anchor() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 30).unwrap();
        let boundary = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let point = FinePricePoint::new(ts, 103.5, boundary);

        assert_eq!(point.deviation_from(100.0), 3.5);
        assert_eq!(point.deviation_from(105.0), -1.5);
    }

    #[test]
    fn test_point_serializes_rfc3339() {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 30, 0).unwrap();
        let point = CoarsePricePoint::new(ts, 100.0);

        let json = serde_json::to_string(&point).unwrap();
        assert!(json.contains("2024-01-01T00:30:00Z"));
    }
}
