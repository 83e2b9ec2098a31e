//! HTTP handlers for tracking endpoints.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::{
    ExportRouteHandler, ExportRouteQuery, GetTrackingHandler, GetTrackingQuery,
};
use crate::domain::foundation::BookingId;
use crate::domain::tracking::TrackingError;

use super::dto::{ErrorResponse, TrackingResponse};

pub const GEOJSON_CONTENT_TYPE: &str = "application/geo+json";

#[derive(Clone)]
pub struct TrackingHandlers {
    get_handler: Arc<GetTrackingHandler>,
    export_handler: Arc<ExportRouteHandler>,
}

impl TrackingHandlers {
    pub fn new(
        get_handler: Arc<GetTrackingHandler>,
        export_handler: Arc<ExportRouteHandler>,
    ) -> Self {
        Self {
            get_handler,
            export_handler,
        }
    }
}

/// GET /api/v1/tracking/:booking_id - Current tracking state
pub async fn get_tracking(
    State(handlers): State<TrackingHandlers>,
    Path(booking_id): Path<String>,
) -> Response {
    let booking_id = match parse_booking_id(&booking_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .get_handler
        .handle(GetTrackingQuery { booking_id })
        .await
    {
        Ok(view) => {
            let response: TrackingResponse = view.into();
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_tracking_error(e),
    }
}

/// GET /api/v1/tracking/:booking_id/route - Route as GeoJSON LineString
pub async fn get_route(
    State(handlers): State<TrackingHandlers>,
    Path(booking_id): Path<String>,
) -> Response {
    let booking_id = match parse_booking_id(&booking_id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match handlers
        .export_handler
        .handle(ExportRouteQuery { booking_id })
        .await
    {
        Ok(geojson) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, GEOJSON_CONTENT_TYPE)],
            geojson,
        )
            .into_response(),
        Err(e) => handle_tracking_error(e),
    }
}

fn parse_booking_id(raw: &str) -> Result<BookingId, Response> {
    raw.parse::<BookingId>().map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(
                ErrorResponse::bad_request("Invalid booking ID")
                    .with_details(serde_json::json!({ "booking_id": raw })),
            ),
        )
            .into_response()
    })
}

fn handle_tracking_error(error: TrackingError) -> Response {
    let status = match &error {
        TrackingError::NotFound(_) => StatusCode::NOT_FOUND,
        TrackingError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        TrackingError::InvalidState { .. }
        | TrackingError::AlreadyTracked(_)
        | TrackingError::RunnerBusy(_)
        | TrackingError::ConcurrencyConflict(_) => StatusCode::CONFLICT,
        TrackingError::Infrastructure(msg) => {
            tracing::error!(error = %msg, "Tracking request failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::internal("Internal server error")),
            )
                .into_response();
        }
    };

    (
        status,
        Json(ErrorResponse::new(error.code().to_string(), error.message())),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_404() {
        let response =
            handle_tracking_error(TrackingError::not_found_for_booking(&BookingId::new()));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn conflicts_map_to_409() {
        let response = handle_tracking_error(TrackingError::ConcurrencyConflict("v2".into()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn infrastructure_maps_to_500() {
        let response = handle_tracking_error(TrackingError::Infrastructure("pool closed".into()));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn malformed_booking_id_maps_to_400() {
        let response = parse_booking_id("abc").unwrap_err();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
