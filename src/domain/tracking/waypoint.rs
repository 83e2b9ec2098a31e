//! Waypoint value object.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Timestamp, ValidationError, WaypointId};

use super::geo::GeoPoint;

pub const MIN_LATITUDE: f64 = -90.0;
pub const MAX_LATITUDE: f64 = 90.0;
pub const MIN_LONGITUDE: f64 = -180.0;
pub const MAX_LONGITUDE: f64 = 180.0;

/// One timestamped GPS sample.
///
/// # Invariants
///
/// - latitude in [-90, 90], longitude in [-180, 180]
/// - speed is never negative
/// - heading lies in [0, 360)
///
/// Waypoints carry no reference to their trip; the repository indexes them
/// by trip track id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    id: WaypointId,
    latitude: f64,
    longitude: f64,
    speed_kmh: f64,
    heading_degrees: f64,
    recorded_at: Timestamp,
}

impl Waypoint {
    /// Validates raw telemetry into a waypoint.
    ///
    /// Coordinates outside their range are rejected. Speed and heading are
    /// noisy on real devices, so invalid values are reset to 0 instead.
    pub fn new(
        latitude: f64,
        longitude: f64,
        speed_kmh: f64,
        heading_degrees: f64,
        recorded_at: Timestamp,
    ) -> Result<Self, ValidationError> {
        if !(MIN_LATITUDE..=MAX_LATITUDE).contains(&latitude) {
            return Err(ValidationError::out_of_range(
                "latitude",
                MIN_LATITUDE,
                MAX_LATITUDE,
                latitude,
            ));
        }
        if !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&longitude) {
            return Err(ValidationError::out_of_range(
                "longitude",
                MIN_LONGITUDE,
                MAX_LONGITUDE,
                longitude,
            ));
        }

        Ok(Self {
            id: WaypointId::new(),
            latitude,
            longitude,
            speed_kmh: normalize_speed(speed_kmh),
            heading_degrees: normalize_heading(heading_degrees),
            recorded_at,
        })
    }

    /// Reconstitute a waypoint from persistence (no validation).
    pub fn reconstitute(
        id: WaypointId,
        latitude: f64,
        longitude: f64,
        speed_kmh: f64,
        heading_degrees: f64,
        recorded_at: Timestamp,
    ) -> Self {
        Self {
            id,
            latitude,
            longitude,
            speed_kmh,
            heading_degrees,
            recorded_at,
        }
    }

    pub fn id(&self) -> &WaypointId {
        &self.id
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn speed_kmh(&self) -> f64 {
        self.speed_kmh
    }

    pub fn heading_degrees(&self) -> f64 {
        self.heading_degrees
    }

    pub fn recorded_at(&self) -> &Timestamp {
        &self.recorded_at
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

fn normalize_speed(speed: f64) -> f64 {
    if speed.is_finite() && speed > 0.0 {
        speed
    } else {
        0.0
    }
}

fn normalize_heading(heading: f64) -> f64 {
    if (0.0..360.0).contains(&heading) {
        heading
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn accepts_boundary_coordinates() {
        for (lat, lon) in [(-90.0, -180.0), (90.0, 180.0), (0.0, 0.0)] {
            assert!(Waypoint::new(lat, lon, 10.0, 90.0, Timestamp::now()).is_ok());
        }
    }

    #[test]
    fn rejects_latitude_out_of_range() {
        let err = Waypoint::new(90.0001, 0.0, 0.0, 0.0, Timestamp::now()).unwrap_err();
        assert_eq!(err.field(), "latitude");
    }

    #[test]
    fn rejects_longitude_out_of_range() {
        let err = Waypoint::new(0.0, -180.5, 0.0, 0.0, Timestamp::now()).unwrap_err();
        assert_eq!(err.field(), "longitude");
    }

    #[test]
    fn rejects_nan_coordinates() {
        assert!(Waypoint::new(f64::NAN, 0.0, 0.0, 0.0, Timestamp::now()).is_err());
        assert!(Waypoint::new(0.0, f64::NAN, 0.0, 0.0, Timestamp::now()).is_err());
    }

    #[test]
    fn clamps_negative_speed_to_zero() {
        let wp = Waypoint::new(1.0, 1.0, -12.0, 45.0, Timestamp::now()).unwrap();
        assert_eq!(wp.speed_kmh(), 0.0);
        assert_eq!(wp.heading_degrees(), 45.0);
    }

    #[test]
    fn resets_heading_outside_half_open_range() {
        for heading in [-1.0, 360.0, 725.0, f64::NAN] {
            let wp = Waypoint::new(1.0, 1.0, 5.0, heading, Timestamp::now()).unwrap();
            assert_eq!(wp.heading_degrees(), 0.0, "heading {heading}");
        }
    }

    #[test]
    fn keeps_valid_speed_and_heading() {
        let wp = Waypoint::new(1.0, 1.0, 32.5, 359.9, Timestamp::now()).unwrap();
        assert_eq!(wp.speed_kmh(), 32.5);
        assert_eq!(wp.heading_degrees(), 359.9);
    }

    proptest! {
        #[test]
        fn in_range_coordinates_always_construct(
            lat in -90.0f64..=90.0,
            lon in -180.0f64..=180.0,
            speed in -500.0f64..500.0,
            heading in -720.0f64..720.0,
        ) {
            let wp = Waypoint::new(lat, lon, speed, heading, Timestamp::now()).unwrap();
            prop_assert_eq!(wp.latitude(), lat);
            prop_assert_eq!(wp.longitude(), lon);
            prop_assert!(wp.speed_kmh() >= 0.0);
            prop_assert!((0.0..360.0).contains(&wp.heading_degrees()));
        }

        #[test]
        fn out_of_range_latitude_always_fails(
            lat in prop_oneof![-1.0e6f64..-90.000_001, 90.000_001f64..1.0e6],
            lon in -180.0f64..=180.0,
        ) {
            prop_assert!(Waypoint::new(lat, lon, 0.0, 0.0, Timestamp::now()).is_err());
        }

        #[test]
        fn out_of_range_longitude_always_fails(
            lat in -90.0f64..=90.0,
            lon in prop_oneof![-1.0e6f64..-180.000_001, 180.000_001f64..1.0e6],
        ) {
            prop_assert!(Waypoint::new(lat, lon, 0.0, 0.0, Timestamp::now()).is_err());
        }
    }
}
