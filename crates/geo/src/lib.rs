//! Geospatial math for QuickBite proximity features.
//!
//! This crate provides:
//! - Haversine great-circle distance calculations
//! - Delivery-time estimation from distance and courier speed
//! - The `Coordinate` type shared by the location service and CLI tools
//!
//! Everything here is pure and synchronous; position acquisition lives in
//! `quickbite-location`.
//!
//! # Example
//!
//! ```
//! use quickbite_geo::{distance_km, Coordinate};
//!
//! let cairo = Coordinate::new(30.0444, 31.2357);
//! let alexandria = Coordinate::new(31.2001, 29.9187);
//!
//! let km = distance_km(cairo.latitude, cairo.longitude, alexandria.latitude, alexandria.longitude);
//! assert!(km > 170.0 && km < 190.0);
//! ```

mod error;
mod eta;
mod haversine;

pub use error::{GeoError, Result};
pub use eta::{
    delivery_estimate_minutes, is_within_radius, DEFAULT_RANGE_KM, DEFAULT_SPEED_KMH,
    PREPARATION_MINUTES,
};
pub use haversine::{distance_km, haversine_distance, EARTH_RADIUS_KM};

/// A geographic coordinate with latitude and longitude.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Coordinate {
    /// Latitude in degrees (-90 to 90)
    pub latitude: f64,
    /// Longitude in degrees (-180 to 180)
    pub longitude: f64,
}

impl Coordinate {
    /// Creates a new coordinate without validation.
    ///
    /// Out-of-range values produce nonsensical distances rather than errors;
    /// use [`Coordinate::try_new`] when the input comes from outside the
    /// process.
    #[inline]
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Creates a coordinate, rejecting out-of-range values.
    pub fn try_new(latitude: f64, longitude: f64) -> Result<Self> {
        let coord = Self::new(latitude, longitude);
        if coord.is_valid() {
            Ok(coord)
        } else {
            Err(GeoError::InvalidCoordinate(format!(
                "({latitude}, {longitude}) is outside [-90, 90] x [-180, 180]"
            )))
        }
    }

    /// Returns true if the coordinate has valid values.
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }

    /// Converts degrees to radians for internal calculations.
    #[inline]
    pub(crate) fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl From<(f64, f64)> for Coordinate {
    fn from((lat, lng): (f64, f64)) -> Self {
        Self::new(lat, lng)
    }
}

impl std::str::FromStr for Coordinate {
    type Err = GeoError;

    /// Parses a `"lat,lon"` pair, as passed on the command line.
    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(2, ',');
        let lat = parts
            .next()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected 'lat,lon', got '{s}'")))?;
        let lon = parts
            .next()
            .and_then(|p| p.trim().parse::<f64>().ok())
            .ok_or_else(|| GeoError::InvalidCoordinate(format!("expected 'lat,lon', got '{s}'")))?;
        Self::try_new(lat, lon)
    }
}
