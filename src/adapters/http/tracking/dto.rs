//! HTTP DTOs for tracking endpoints.

use serde::Serialize;

use crate::application::TrackingView;
use crate::domain::tracking::{TrackingStatus, Waypoint};

/// Tracking summary of a booking with its recorded path.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingResponse {
    pub id: String,
    pub booking_id: String,
    pub runner_id: String,
    pub status: TrackingStatus,
    pub total_distance_km: f64,
    pub started_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
    pub version: i64,
    pub waypoints: Vec<WaypointResponse>,
}

impl From<TrackingView> for TrackingResponse {
    fn from(view: TrackingView) -> Self {
        let track = view.track;
        Self {
            id: track.id().to_string(),
            booking_id: track.booking_id().to_string(),
            runner_id: track.runner_id().to_string(),
            status: track.status(),
            total_distance_km: track.total_distance_km(),
            started_at: track.started_at().to_rfc3339(),
            completed_at: track.completed_at().map(|t| t.to_rfc3339()),
            version: track.version(),
            waypoints: view.waypoints.iter().map(WaypointResponse::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WaypointResponse {
    pub id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_degrees: f64,
    pub recorded_at: String,
}

impl From<&Waypoint> for WaypointResponse {
    fn from(wp: &Waypoint) -> Self {
        Self {
            id: wp.id().to_string(),
            latitude: wp.latitude(),
            longitude: wp.longitude(),
            speed_kmh: wp.speed_kmh(),
            heading_degrees: wp.heading_degrees(),
            recorded_at: wp.recorded_at().to_rfc3339(),
        }
    }
}

/// Structured error body shared by every tracking endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new("INTERNAL_ERROR", message)
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }
}
