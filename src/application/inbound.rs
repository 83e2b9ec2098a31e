//! Inbound events consumed from the booking and runner channels.
//!
//! Only three event types are recognized. Anything else decodes to `None`
//! and is ignored by the router.

use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::domain::foundation::{BookingId, DomainError, EventEnvelope, RunnerId, Timestamp};

pub const BOOKING_ACCEPTED: &str = "booking.accepted";
pub const RUNNER_LOCATION_UPDATE: &str = "runner.location_update";
pub const DELIVERY_CONFIRMED: &str = "booking.delivery_confirmed";

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct BookingAccepted {
    #[serde(alias = "bookingId")]
    pub booking_id: BookingId,
    #[serde(alias = "runnerId")]
    pub runner_id: RunnerId,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RunnerLocationUpdate {
    #[serde(alias = "runnerId")]
    pub runner_id: RunnerId,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub speed: Option<f64>,
    #[serde(default)]
    pub heading: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliveryConfirmed {
    #[serde(alias = "bookingId")]
    pub booking_id: BookingId,
}

/// Closed set of events that drive the tracking pipeline.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundEvent {
    BookingAccepted(BookingAccepted),
    RunnerLocationUpdate(RunnerLocationUpdate),
    DeliveryConfirmed(DeliveryConfirmed),
}

impl InboundEvent {
    /// Decodes a recognized envelope.
    ///
    /// Returns `Ok(None)` for unknown event types, and a validation error
    /// when a known type carries a payload that does not match its shape.
    pub fn decode(envelope: &EventEnvelope) -> Result<Option<Self>, DomainError> {
        let event = match envelope.event_type.as_str() {
            BOOKING_ACCEPTED => Self::BookingAccepted(payload(envelope)?),
            RUNNER_LOCATION_UPDATE => Self::RunnerLocationUpdate(payload(envelope)?),
            DELIVERY_CONFIRMED => Self::DeliveryConfirmed(payload(envelope)?),
            _ => return Ok(None),
        };
        Ok(Some(event))
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::BookingAccepted(_) => BOOKING_ACCEPTED,
            Self::RunnerLocationUpdate(_) => RUNNER_LOCATION_UPDATE,
            Self::DeliveryConfirmed(_) => DELIVERY_CONFIRMED,
        }
    }
}

fn payload<T: DeserializeOwned>(envelope: &EventEnvelope) -> Result<T, DomainError> {
    envelope.payload_as().map_err(|e| {
        DomainError::validation(
            "payload",
            format!("Malformed {} payload: {}", envelope.event_type, e),
        )
    })
}
