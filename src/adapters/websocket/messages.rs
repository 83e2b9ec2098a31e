//! WebSocket message types pushed to trip observers.
//!
//! Server → Client only. Anything a client sends is treated as a liveness
//! signal and never parsed.

use std::sync::Arc;

use serde::Serialize;

use crate::ports::{ChatBroadcast, LocationBroadcast};

use super::hub::HubError;

/// Pre-encoded JSON text shared by every connection in a room.
pub type Frame = Arc<str>;

// ============================================
// Server → Client Messages
// ============================================

/// All message types that can be sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// `{"type":"location_update","data":{...}}`
    LocationUpdate { data: LocationBroadcast },

    /// `{"type":"chat_message", booking_id, message_id, ...}` with fields inline.
    ChatMessage(ChatBroadcast),
}

impl ServerMessage {
    /// Encodes the message once so it can be shared across a room.
    pub fn to_frame(&self) -> Result<Frame, HubError> {
        serde_json::to_string(self)
            .map(Frame::from)
            .map_err(|e| HubError::Encode(e.to_string()))
    }
}

impl From<LocationBroadcast> for ServerMessage {
    fn from(data: LocationBroadcast) -> Self {
        ServerMessage::LocationUpdate { data }
    }
}

impl From<ChatBroadcast> for ServerMessage {
    fn from(message: ChatBroadcast) -> Self {
        ServerMessage::ChatMessage(message)
    }
}
