//! The normalized position record.

use crate::platform::RawFix;
use quickbite_geo::Coordinate;
use serde::{Deserialize, Serialize};

/// A single normalized position reading.
///
/// Produced from a platform [`RawFix`] by one-shot retrieval or a tracking
/// session; immutable once constructed. The timestamp is platform-supplied
/// epoch milliseconds and is monotonically non-decreasing within one
/// process run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LocationSample {
    /// Latitude in degrees
    pub latitude: f64,
    /// Longitude in degrees
    pub longitude: f64,
    /// Horizontal accuracy in meters, when the platform reports it
    pub accuracy: Option<f64>,
    /// Platform-supplied timestamp in milliseconds since epoch
    pub timestamp_ms: i64,
}

impl LocationSample {
    /// The position as a bare coordinate for distance math.
    #[inline]
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// Six-decimal "lat, lon" string for display in the ordering screens.
    pub fn display_string(&self) -> String {
        format!("{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl From<RawFix> for LocationSample {
    fn from(fix: RawFix) -> Self {
        Self {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            timestamp_ms: fix.timestamp_ms,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_raw_fix() {
        let fix = RawFix {
            latitude: 30.0444,
            longitude: 31.2357,
            accuracy: Some(20.0),
            timestamp_ms: 1_700_000_000_000,
        };
        let sample = LocationSample::from(fix);
        assert_eq!(sample.latitude, 30.0444);
        assert_eq!(sample.accuracy, Some(20.0));
        assert_eq!(sample.timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn test_display_string_six_decimals() {
        let sample = LocationSample {
            latitude: 30.0444,
            longitude: 31.2357,
            accuracy: None,
            timestamp_ms: 0,
        };
        assert_eq!(sample.display_string(), "30.044400, 31.235700");
    }
}
