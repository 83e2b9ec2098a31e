//! Trip tracking error types.

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, ValidationError};

use super::TrackingStatus;

/// Tracking-specific errors surfaced by the aggregate and application handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// No trip track matched the lookup.
    NotFound(String),
    /// Transition attempted from a state that does not allow it.
    InvalidState {
        current: TrackingStatus,
        target: TrackingStatus,
    },
    /// A track already exists for the booking.
    AlreadyTracked(String),
    /// The runner already has a different active track.
    RunnerBusy(String),
    /// The stored version moved on since the aggregate was read.
    ConcurrencyConflict(String),
    /// Validation failed.
    ValidationFailed { field: String, message: String },
    /// Infrastructure error.
    Infrastructure(String),
}

impl TrackingError {
    pub fn not_found_for_booking(booking_id: &BookingId) -> Self {
        TrackingError::NotFound(format!("booking {}", booking_id))
    }

    pub fn invalid_state(current: TrackingStatus, target: TrackingStatus) -> Self {
        TrackingError::InvalidState { current, target }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            TrackingError::NotFound(_) => ErrorCode::TripTrackNotFound,
            TrackingError::InvalidState { .. } => ErrorCode::InvalidStateTransition,
            TrackingError::AlreadyTracked(_) => ErrorCode::DuplicateTripTrack,
            TrackingError::RunnerBusy(_) => ErrorCode::RunnerAlreadyTracking,
            TrackingError::ConcurrencyConflict(_) => ErrorCode::ConcurrencyConflict,
            TrackingError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            TrackingError::Infrastructure(_) => ErrorCode::InternalError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            TrackingError::NotFound(what) => format!("No trip track found for {}", what),
            TrackingError::InvalidState { current, target } => {
                format!("Cannot move trip track from {} to {}", current, target)
            }
            TrackingError::AlreadyTracked(what) => format!("Trip track already exists: {}", what),
            TrackingError::RunnerBusy(runner) => {
                format!("Runner {} already has an active trip track", runner)
            }
            TrackingError::ConcurrencyConflict(msg) => format!("Concurrent update: {}", msg),
            TrackingError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            TrackingError::Infrastructure(msg) => format!("Error: {}", msg),
        }
    }
}

impl std::fmt::Display for TrackingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for TrackingError {}

impl From<DomainError> for TrackingError {
    fn from(err: DomainError) -> Self {
        match err.code {
            ErrorCode::TripTrackNotFound => TrackingError::NotFound(err.message),
            ErrorCode::DuplicateTripTrack => TrackingError::AlreadyTracked(err.message),
            ErrorCode::RunnerAlreadyTracking => TrackingError::RunnerBusy(err.message),
            ErrorCode::ConcurrencyConflict => TrackingError::ConcurrencyConflict(err.message),
            ErrorCode::ValidationFailed
            | ErrorCode::EmptyField
            | ErrorCode::OutOfRange
            | ErrorCode::InvalidFormat => TrackingError::ValidationFailed {
                field: err.detail("field").unwrap_or("unknown").to_string(),
                message: err.message,
            },
            _ => TrackingError::Infrastructure(err.to_string()),
        }
    }
}

impl From<ValidationError> for TrackingError {
    fn from(err: ValidationError) -> Self {
        TrackingError::ValidationFailed {
            field: err.field().to_string(),
            message: err.to_string(),
        }
    }
}

impl From<TrackingError> for DomainError {
    fn from(err: TrackingError) -> Self {
        let domain = DomainError::new(err.code(), err.message());
        match err {
            TrackingError::ValidationFailed { field, .. } => domain.with_detail("field", field),
            _ => domain,
        }
    }
}
