//! Foundation module - Shared domain primitives.
//!
//! Identifiers, timestamps, error types and the event envelope that form
//! the vocabulary of the trip tracking domain.

mod errors;
mod events;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use events::{DomainEvent, EventEnvelope, EventId, EventMetadata};
pub use ids::{BookingId, RunnerId, TripTrackId, WaypointId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;

pub use crate::domain_event;
