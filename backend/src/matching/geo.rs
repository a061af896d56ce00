//! Great-circle distance and departure-time helpers for the match engine.

use chrono::{DateTime, Utc};

/// Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two coordinates, in meters.
///
/// Inputs are assumed to be valid coordinates; NaN propagates otherwise.
/// Validation belongs to the request handlers, see [`is_valid_coordinates`].
pub fn distance_between_meters(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let lat1_rad = lat1.to_radians();
    let lat2_rad = lat2.to_radians();
    let delta_lat = (lat2 - lat1).to_radians();
    let delta_lng = (lng2 - lng1).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().asin();

    EARTH_RADIUS_M * c
}

/// Absolute difference between two instants, in minutes. Always non-negative.
pub fn time_difference_minutes(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (a - b).num_milliseconds().abs() as f64 / 60_000.0
}

pub fn is_valid_coordinates(lat: f64, lng: f64) -> bool {
    lat.is_finite() && lng.is_finite() && (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn distance_is_symmetric() {
        let d1 = distance_between_meters(12.9716, 77.5946, 12.9352, 77.6245);
        let d2 = distance_between_meters(12.9352, 77.6245, 12.9716, 77.5946);
        assert_eq!(d1, d2);
    }

    #[test]
    fn distance_zero_at_same_point() {
        let d = distance_between_meters(12.9716, 77.5946, 12.9716, 77.5946);
        assert_eq!(d, 0.0);
    }

    #[test]
    fn distance_known_city_pair() {
        // Bangalore MG Road to Chennai, roughly 290 km
        let d = distance_between_meters(12.9716, 77.5946, 13.0827, 80.2707);
        assert!(
            (280_000.0..300_000.0).contains(&d),
            "expected ~290km, got {}m",
            d
        );
    }

    #[test]
    fn distance_nearby_destinations() {
        // Two drop-offs a block apart, ~60m
        let d = distance_between_meters(12.9716, 77.5946, 12.9720, 77.5950);
        assert!((50.0..80.0).contains(&d), "expected ~60m, got {}m", d);
    }

    #[test]
    fn time_difference_is_absolute() {
        let t1 = Utc::now();
        let t2 = t1 + TimeDelta::minutes(23);
        assert_eq!(time_difference_minutes(t1, t2), 23.0);
        assert_eq!(time_difference_minutes(t2, t1), 23.0);
        assert_eq!(time_difference_minutes(t1, t1), 0.0);
    }

    #[test]
    fn coordinate_validation_bounds() {
        assert!(is_valid_coordinates(12.9716, 77.5946));
        assert!(is_valid_coordinates(-90.0, 180.0));
        assert!(!is_valid_coordinates(90.1, 0.0));
        assert!(!is_valid_coordinates(0.0, -180.5));
        assert!(!is_valid_coordinates(f64::NAN, 0.0));
    }
}
