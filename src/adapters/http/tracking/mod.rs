//! HTTP adapter for trip tracking read endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{ErrorResponse, TrackingResponse, WaypointResponse};
pub use handlers::TrackingHandlers;
pub use routes::tracking_routes;
