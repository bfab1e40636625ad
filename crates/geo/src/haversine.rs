//! Haversine distance calculation.
//!
//! The Haversine formula calculates the great-circle distance between two
//! points on a sphere given their longitudes and latitudes.

use crate::Coordinate;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Calculates the great-circle distance between two coordinates in kilometers.
///
/// Returns the unrounded value; delivery-facing callers usually want
/// [`distance_km`] instead.
///
/// # Example
/// ```
/// use quickbite_geo::{haversine_distance, Coordinate};
///
/// let cairo = Coordinate::new(30.0444, 31.2357);
/// let alexandria = Coordinate::new(31.2001, 29.9187);
///
/// let distance = haversine_distance(&cairo, &alexandria);
/// assert!((distance - 180.0).abs() < 10.0);
/// ```
#[inline]
pub fn haversine_distance(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a =
        (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two raw coordinate pairs in kilometers, rounded to two
/// decimal places.
///
/// This is the form the ordering flows consume: restaurant rows carry bare
/// lat/lon columns, and two decimals (10 m) is the display precision.
/// Identical coordinates yield exactly `0.0`.
#[inline]
pub fn distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let raw = haversine_distance(&Coordinate::new(lat1, lon1), &Coordinate::new(lat2, lon2));
    (raw * 100.0).round() / 100.0
}
