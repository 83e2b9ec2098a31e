//! Trip track aggregate.
//!
//! One trip track exists per booking and records the tracking session of the
//! runner delivering it. Waypoints are not embedded: they live in an
//! append-only collection keyed by the track id.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{BookingId, RunnerId, StateMachine, Timestamp, TripTrackId};

use super::geo::round_km;
use super::{TrackingError, TrackingStatus};

/// Version assigned to a freshly created track.
pub const INITIAL_VERSION: i64 = 1;

/// Trip track aggregate - the tracking session for one booking.
///
/// # Invariants
///
/// - exactly one track per `booking_id` (enforced by the repository)
/// - status only moves active → completed or active → cancelled
/// - `version` increases by one on every status transition
/// - `completed_at` is set iff status is completed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripTrack {
    id: TripTrackId,
    booking_id: BookingId,
    runner_id: RunnerId,
    status: TrackingStatus,
    total_distance_km: f64,
    started_at: Timestamp,
    completed_at: Option<Timestamp>,
    version: i64,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl TripTrack {
    /// Starts tracking a booking for the given runner.
    pub fn new(booking_id: BookingId, runner_id: RunnerId) -> Self {
        let now = Timestamp::now();
        Self {
            id: TripTrackId::new(),
            booking_id,
            runner_id,
            status: TrackingStatus::Active,
            total_distance_km: 0.0,
            started_at: now,
            completed_at: None,
            version: INITIAL_VERSION,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstitute a trip track from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: TripTrackId,
        booking_id: BookingId,
        runner_id: RunnerId,
        status: TrackingStatus,
        total_distance_km: f64,
        started_at: Timestamp,
        completed_at: Option<Timestamp>,
        version: i64,
        created_at: Timestamp,
        updated_at: Timestamp,
    ) -> Self {
        Self {
            id,
            booking_id,
            runner_id,
            status,
            total_distance_km,
            started_at,
            completed_at,
            version,
            created_at,
            updated_at,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn id(&self) -> &TripTrackId {
        &self.id
    }

    pub fn booking_id(&self) -> &BookingId {
        &self.booking_id
    }

    pub fn runner_id(&self) -> &RunnerId {
        &self.runner_id
    }

    pub fn status(&self) -> TrackingStatus {
        self.status
    }

    /// Distance in kilometres, rounded to metres. Zero until completion.
    pub fn total_distance_km(&self) -> f64 {
        self.total_distance_km
    }

    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    pub fn completed_at(&self) -> Option<&Timestamp> {
        self.completed_at.as_ref()
    }

    /// Optimistic concurrency version.
    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    pub fn updated_at(&self) -> &Timestamp {
        &self.updated_at
    }

    pub fn is_active(&self) -> bool {
        self.status == TrackingStatus::Active
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Transitions
    // ─────────────────────────────────────────────────────────────────────────

    /// Completes the trip with its final travelled distance.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the track is no longer active
    pub fn complete(&mut self, total_distance_km: f64) -> Result<(), TrackingError> {
        self.transition(TrackingStatus::Completed)?;
        self.total_distance_km = round_km(total_distance_km.max(0.0));
        self.completed_at = Some(self.updated_at);
        Ok(())
    }

    /// Cancels the trip.
    ///
    /// # Errors
    ///
    /// - `InvalidState` if the track is no longer active
    pub fn cancel(&mut self) -> Result<(), TrackingError> {
        self.transition(TrackingStatus::Cancelled)
    }

    fn transition(&mut self, target: TrackingStatus) -> Result<(), TrackingError> {
        if !self.status.can_transition_to(&target) {
            return Err(TrackingError::invalid_state(self.status, target));
        }
        self.status = target;
        self.version += 1;
        self.updated_at = Timestamp::now();
        Ok(())
    }
}
