//! TripTrackRepository port - persistence for trip tracks and their waypoints.
//!
//! Waypoints form an append-only collection keyed by the owning track id;
//! they are never updated or deleted individually.

use async_trait::async_trait;

use crate::domain::foundation::{BookingId, DomainError, RunnerId, TripTrackId};
use crate::domain::tracking::{TripTrack, Waypoint};

/// Repository port for trip track persistence.
///
/// # Contract
///
/// - `save` fails with `DuplicateTripTrack` if the booking already has a
///   track, and with `RunnerAlreadyTracking` if the runner already has a
///   different active track.
/// - `update` writes only when the stored version equals `expected_version`.
///   A mismatch fails with `ConcurrencyConflict`; a missing row fails with
///   `TripTrackNotFound`.
#[async_trait]
pub trait TripTrackRepository: Send + Sync {
    /// Find a track by its id.
    async fn find_by_id(&self, id: &TripTrackId) -> Result<Option<TripTrack>, DomainError>;

    /// Find the track for a booking.
    async fn find_by_booking_id(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<TripTrack>, DomainError>;

    /// Find the runner's active track, if any.
    async fn find_active_by_runner_id(
        &self,
        runner_id: &RunnerId,
    ) -> Result<Option<TripTrack>, DomainError>;

    /// Insert a new track.
    async fn save(&self, track: &TripTrack) -> Result<(), DomainError>;

    /// Persist a mutated track, conditioned on the version it was read at.
    async fn update(&self, track: &TripTrack, expected_version: i64) -> Result<(), DomainError>;

    /// Append a waypoint to a track's history.
    async fn append_waypoint(
        &self,
        track_id: &TripTrackId,
        waypoint: &Waypoint,
    ) -> Result<(), DomainError>;

    /// All waypoints of a track ordered by `recorded_at` ascending.
    async fn list_waypoints(&self, track_id: &TripTrackId) -> Result<Vec<Waypoint>, DomainError>;

    /// Route geometry built by the storage engine itself.
    ///
    /// Returns `Ok(None)` when the store has no spatial support or produced
    /// nothing, in which case callers build the geometry from `list_waypoints`.
    async fn route_geometry(&self, track_id: &TripTrackId) -> Result<Option<String>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn TripTrackRepository) {}
}
