//! Trip tracking domain module.
//!
//! The trip track aggregate, its waypoints, the distance kernel and the
//! route geometry builder.
//!
//! # Events
//!
//! - `TrackingStarted` - Published when a booking's trip starts being tracked
//! - `TrackingUpdated` - Published for every recorded waypoint
//! - `TrackingCompleted` - Published when the delivery is confirmed

mod aggregate;
mod errors;
mod events;
pub mod geo;
mod route;
mod status;
mod waypoint;

pub use aggregate::{TripTrack, INITIAL_VERSION};
pub use errors::TrackingError;
pub use events::{TrackingCompleted, TrackingStarted, TrackingUpdated};
pub use geo::{haversine_km, total_distance_km, GeoPoint, EARTH_RADIUS_KM};
pub use route::{line_string_geojson, EMPTY_LINE_STRING};
pub use status::TrackingStatus;
pub use waypoint::Waypoint;
