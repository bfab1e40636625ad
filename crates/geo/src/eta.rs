//! Delivery-range and delivery-time estimation.
//!
//! Converts a computed distance into the two questions the ordering screens
//! ask: "does this restaurant deliver here?" and "when does the food arrive?".

/// Default delivery radius in kilometers.
pub const DEFAULT_RANGE_KM: f64 = 3.0;

/// Default assumed courier speed in km/h.
pub const DEFAULT_SPEED_KMH: f64 = 30.0;

/// Fixed kitchen preparation time added to every estimate, in minutes.
pub const PREPARATION_MINUTES: u32 = 20;

/// Returns true when `distance_km` is within `max_km`, inclusive.
///
/// The boundary counts as in-range so a restaurant advertising a 3 km zone
/// accepts an order from exactly 3 km away.
#[inline]
pub fn is_within_radius(distance_km: f64, max_km: f64) -> bool {
    distance_km <= max_km
}

/// Estimated delivery time in whole minutes for a given distance and
/// average courier speed.
///
/// `travel = distance / speed * 60`, plus [`PREPARATION_MINUTES`], rounded
/// to the nearest minute. Zero distance yields exactly the preparation
/// constant. Non-positive speeds are a caller bug and produce nonsense
/// rather than an error.
#[inline]
pub fn delivery_estimate_minutes(distance_km: f64, avg_speed_kmh: f64) -> u32 {
    let travel_minutes = (distance_km / avg_speed_kmh) * 60.0;
    (travel_minutes + f64::from(PREPARATION_MINUTES)).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance_is_preparation_only() {
        assert_eq!(delivery_estimate_minutes(0.0, DEFAULT_SPEED_KMH), PREPARATION_MINUTES);
    }

    #[test]
    fn test_estimate_known_values() {
        // 10 km at 30 km/h: 20 min travel + 20 min prep
        assert_eq!(delivery_estimate_minutes(10.0, 30.0), 40);
        // 5 km at 30 km/h: 10 min travel + 20 min prep
        assert_eq!(delivery_estimate_minutes(5.0, 30.0), 30);
    }

    #[test]
    fn test_slower_courier_takes_longer() {
        let slow = delivery_estimate_minutes(12.0, 20.0);
        let fast = delivery_estimate_minutes(12.0, 40.0);
        assert!(slow > fast, "slow={slow} fast={fast}");
    }

    #[test]
    fn test_estimate_rounds_to_nearest_minute() {
        // 1 km at 30 km/h = 2.0 min travel; 1.3 km = 2.6 min -> rounds up
        assert_eq!(delivery_estimate_minutes(1.0, 30.0), 22);
        assert_eq!(delivery_estimate_minutes(1.3, 30.0), 23);
    }

    #[test]
    fn test_radius_is_inclusive() {
        assert!(is_within_radius(3.0, 3.0));
        assert!(is_within_radius(2.99, 3.0));
        assert!(!is_within_radius(3.01, 3.0));
    }

    #[test]
    fn test_larger_radius_never_excludes() {
        for d in [0.0, 1.5, 2.99, 3.0] {
            if is_within_radius(d, 3.0) {
                assert!(is_within_radius(d, 5.0));
            }
        }
    }
}
