//! HTTP routes for tracking endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_route, get_tracking, TrackingHandlers};

/// Creates the tracking router. Mount under `/api/v1/tracking`.
pub fn tracking_routes(handlers: TrackingHandlers) -> Router {
    Router::new()
        .route("/:booking_id", get(get_tracking))
        .route("/:booking_id/route", get(get_route))
        .with_state(handlers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    use crate::adapters::memory::InMemoryTripTrackRepository;
    use crate::application::{ExportRouteHandler, GetTrackingHandler};
    use crate::domain::foundation::{BookingId, RunnerId, Timestamp};
    use crate::domain::tracking::{TripTrack, Waypoint};
    use crate::ports::TripTrackRepository;

    async fn app_with_track() -> (Router, TripTrack) {
        let repo = Arc::new(InMemoryTripTrackRepository::new());
        let track = TripTrack::new(BookingId::new(), RunnerId::new());
        repo.save(&track).await.unwrap();
        let wp = Waypoint::new(1.0, 2.0, 0.0, 0.0, Timestamp::now()).unwrap();
        repo.append_waypoint(track.id(), &wp).await.unwrap();

        let handlers = TrackingHandlers::new(
            Arc::new(GetTrackingHandler::new(repo.clone())),
            Arc::new(ExportRouteHandler::new(repo)),
        );
        let app = Router::new().nest("/api/v1/tracking", tracking_routes(handlers));
        (app, track)
    }

    async fn get(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn returns_tracking_view() {
        let (app, track) = app_with_track().await;

        let response = get(app, &format!("/api/v1/tracking/{}", track.booking_id())).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], track.id().to_string());
        assert_eq!(json["waypoints"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn returns_route_as_geojson() {
        let (app, track) = app_with_track().await;

        let response = get(app, &format!("/api/v1/tracking/{}/route", track.booking_id())).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/geo+json"
        );
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(
            std::str::from_utf8(&body).unwrap(),
            r#"{"type":"LineString","coordinates":[[2.0,1.0]]}"#
        );
    }

    #[tokio::test]
    async fn unknown_booking_is_404_with_error_body() {
        let (app, _) = app_with_track().await;

        let response = get(app, &format!("/api/v1/tracking/{}", BookingId::new())).await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["code"], "TRIP_TRACK_NOT_FOUND");
    }

    #[tokio::test]
    async fn malformed_booking_id_is_400() {
        let (app, _) = app_with_track().await;

        let response = get(app, "/api/v1/tracking/not-a-uuid/route").await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
