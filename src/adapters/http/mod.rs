//! HTTP adapters - REST API implementations.

pub mod health;
pub mod tracking;

pub use health::health_router;
pub use tracking::{tracking_routes, ErrorResponse, TrackingHandlers};
