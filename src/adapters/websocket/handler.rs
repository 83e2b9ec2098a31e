//! WebSocket upgrade handler for trip observers.
//!
//! 1. Parse the booking id from the path
//! 2. Upgrade to WebSocket with the inbound frame limit applied
//! 3. Hand both socket halves to `serve_connection`, which registers with
//!    the hub and cleans up when either half finishes

use axum::{
    extract::{ws::WebSocketUpgrade, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use futures::StreamExt;

use crate::domain::foundation::BookingId;

use super::connection::{serve_connection, ConnectionSettings};
use super::hub::HubHandle;

/// State required for WebSocket handling.
#[derive(Clone)]
pub struct WebSocketState {
    pub hub: HubHandle,
    pub settings: ConnectionSettings,
}

impl WebSocketState {
    pub fn new(hub: HubHandle, settings: ConnectionSettings) -> Self {
        Self { hub, settings }
    }
}

/// Handle WebSocket upgrade requests for a booking's live updates.
///
/// Route: `GET /ws/tracking/:booking_id`
pub async fn ws_handler(
    Path(booking_id): Path<String>,
    State(state): State<WebSocketState>,
    ws: Option<WebSocketUpgrade>,
) -> Response {
    let booking_id: BookingId = match booking_id.parse() {
        Ok(id) => id,
        Err(_) => return (StatusCode::BAD_REQUEST, "Invalid booking ID").into_response(),
    };
    let Some(ws) = ws else {
        return (StatusCode::UPGRADE_REQUIRED, "Expected a WebSocket upgrade").into_response();
    };

    let WebSocketState { hub, settings } = state;
    ws.max_message_size(settings.max_message_size)
        .on_upgrade(move |socket| {
            let (sink, stream) = socket.split();
            serve_connection(hub, booking_id, sink, stream, settings)
        })
}

/// Create axum router for the WebSocket endpoint.
pub fn websocket_router(state: WebSocketState) -> Router {
    Router::new()
        .route("/ws/tracking/:booking_id", get(ws_handler))
        .with_state(state)
}
