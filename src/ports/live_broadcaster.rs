//! LiveBroadcaster port - push updates to observers connected to a booking.
//!
//! Delivery is best-effort and at-most-once. Implementations must never
//! block on a slow observer.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{BookingId, DomainError, RunnerId, Timestamp};

/// Position update pushed to a booking's observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationBroadcast {
    pub booking_id: BookingId,
    pub runner_id: RunnerId,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_degrees: f64,
    pub timestamp: Timestamp,
}

/// Kind of chat content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChatMessageType {
    Text,
    Image,
    QuickReply,
}

/// Chat message pushed to a booking's observers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatBroadcast {
    pub booking_id: BookingId,
    pub message_id: Uuid,
    pub sender_id: Uuid,
    pub sender_role: String,
    pub message_type: ChatMessageType,
    pub content: String,
    pub created_at: Timestamp,
}

/// Port for fanning out live messages to every observer of a booking.
#[async_trait]
pub trait LiveBroadcaster: Send + Sync {
    /// Push a location update to the booking's room.
    async fn broadcast_location(&self, update: LocationBroadcast) -> Result<(), DomainError>;

    /// Push a chat message to the booking's room.
    async fn broadcast_chat(&self, message: ChatBroadcast) -> Result<(), DomainError>;
}
