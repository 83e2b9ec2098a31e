//! Geo & distance kernel.
//!
//! Pure functions over latitude/longitude pairs. Distances are great-circle
//! (haversine) on a spherical Earth and reported in kilometres with metre
//! precision.

use serde::{Deserialize, Serialize};

use super::Waypoint;

/// Mean Earth radius used for every distance in the system.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A bare latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Great-circle distance between two points, in kilometres (unrounded).
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let phi1 = from.latitude.to_radians();
    let phi2 = to.latitude.to_radians();
    let d_phi = (to.latitude - from.latitude).to_radians();
    let d_lambda = (to.longitude - from.longitude).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Rounds a distance to three decimal places (metres).
pub fn round_km(km: f64) -> f64 {
    (km * 1000.0).round() / 1000.0
}

/// Total distance travelled along waypoints in the order given.
///
/// Callers pass waypoints sorted by `recorded_at`; the sum is order-sensitive.
/// Fewer than two points yields exactly `0.0`.
pub fn total_distance_km(waypoints: &[Waypoint]) -> f64 {
    let total: f64 = waypoints
        .windows(2)
        .map(|pair| haversine_km(pair[0].point(), pair[1].point()))
        .sum();

    round_km(total)
}
