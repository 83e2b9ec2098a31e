//! Liveness endpoint reporting broadcast hub load.

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde_json::json;

use crate::adapters::websocket::HubHandle;

/// GET /health
pub async fn health(State(hub): State<HubHandle>) -> impl IntoResponse {
    match hub.stats().await {
        Ok(stats) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "rooms": stats.rooms,
                "connections": stats.connections,
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "error": e.to_string() })),
        ),
    }
}

pub fn health_router(hub: HubHandle) -> Router {
    Router::new().route("/health", get(health)).with_state(hub)
}
