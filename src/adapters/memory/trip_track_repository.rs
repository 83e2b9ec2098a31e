//! In-memory TripTrackRepository with the same uniqueness and versioning
//! rules as the PostgreSQL adapter.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{BookingId, DomainError, ErrorCode, RunnerId, TripTrackId};
use crate::domain::tracking::{TripTrack, Waypoint};
use crate::ports::TripTrackRepository;

#[derive(Debug, Default)]
struct Store {
    tracks: HashMap<TripTrackId, TripTrack>,
    waypoints: HashMap<TripTrackId, Vec<Waypoint>>,
}

/// Trip track storage backed by process memory.
#[derive(Debug, Default)]
pub struct InMemoryTripTrackRepository {
    store: RwLock<Store>,
}

impl InMemoryTripTrackRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored tracks.
    pub async fn track_count(&self) -> usize {
        self.store.read().await.tracks.len()
    }

    /// Number of waypoints stored for a track.
    pub async fn waypoint_count(&self, track_id: &TripTrackId) -> usize {
        self.store
            .read()
            .await
            .waypoints
            .get(track_id)
            .map_or(0, Vec::len)
    }
}

#[async_trait]
impl TripTrackRepository for InMemoryTripTrackRepository {
    async fn find_by_id(&self, id: &TripTrackId) -> Result<Option<TripTrack>, DomainError> {
        Ok(self.store.read().await.tracks.get(id).cloned())
    }

    async fn find_by_booking_id(
        &self,
        booking_id: &BookingId,
    ) -> Result<Option<TripTrack>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .tracks
            .values()
            .find(|t| t.booking_id() == booking_id)
            .cloned())
    }

    async fn find_active_by_runner_id(
        &self,
        runner_id: &RunnerId,
    ) -> Result<Option<TripTrack>, DomainError> {
        let store = self.store.read().await;
        Ok(store
            .tracks
            .values()
            .filter(|t| t.runner_id() == runner_id && t.is_active())
            .max_by_key(|t| *t.started_at())
            .cloned())
    }

    async fn save(&self, track: &TripTrack) -> Result<(), DomainError> {
        let mut store = self.store.write().await;

        if store
            .tracks
            .values()
            .any(|t| t.booking_id() == track.booking_id())
        {
            return Err(DomainError::new(
                ErrorCode::DuplicateTripTrack,
                format!("booking {}", track.booking_id()),
            ));
        }

        if track.is_active()
            && store
                .tracks
                .values()
                .any(|t| t.runner_id() == track.runner_id() && t.is_active())
        {
            return Err(DomainError::new(
                ErrorCode::RunnerAlreadyTracking,
                track.runner_id().to_string(),
            ));
        }

        store.tracks.insert(*track.id(), track.clone());
        Ok(())
    }

    async fn update(&self, track: &TripTrack, expected_version: i64) -> Result<(), DomainError> {
        let mut store = self.store.write().await;

        let stored = store.tracks.get_mut(track.id()).ok_or_else(|| {
            DomainError::new(
                ErrorCode::TripTrackNotFound,
                format!("trip track {}", track.id()),
            )
        })?;

        if stored.version() != expected_version {
            return Err(DomainError::new(
                ErrorCode::ConcurrencyConflict,
                format!(
                    "trip track {} is no longer at version {}",
                    track.id(),
                    expected_version
                ),
            )
            .with_detail("expected_version", expected_version.to_string()));
        }

        *stored = track.clone();
        Ok(())
    }

    async fn append_waypoint(
        &self,
        track_id: &TripTrackId,
        waypoint: &Waypoint,
    ) -> Result<(), DomainError> {
        let mut store = self.store.write().await;

        if !store.tracks.contains_key(track_id) {
            return Err(DomainError::new(
                ErrorCode::TripTrackNotFound,
                format!("trip track {}", track_id),
            ));
        }

        store
            .waypoints
            .entry(*track_id)
            .or_default()
            .push(waypoint.clone());
        Ok(())
    }

    async fn list_waypoints(&self, track_id: &TripTrackId) -> Result<Vec<Waypoint>, DomainError> {
        let store = self.store.read().await;
        let mut waypoints = store.waypoints.get(track_id).cloned().unwrap_or_default();
        waypoints.sort_by_key(|w| *w.recorded_at());
        Ok(waypoints)
    }

    async fn route_geometry(&self, _track_id: &TripTrackId) -> Result<Option<String>, DomainError> {
        Ok(None)
    }
}
