//! GetTrackingHandler - current tracking state of a booking.

use std::sync::Arc;

use crate::domain::foundation::BookingId;
use crate::domain::tracking::{TrackingError, TripTrack, Waypoint};
use crate::ports::TripTrackRepository;

#[derive(Debug, Clone)]
pub struct GetTrackingQuery {
    pub booking_id: BookingId,
}

/// A track summary with its waypoints in recorded order.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackingView {
    pub track: TripTrack,
    pub waypoints: Vec<Waypoint>,
}

pub struct GetTrackingHandler {
    repository: Arc<dyn TripTrackRepository>,
}

impl GetTrackingHandler {
    pub fn new(repository: Arc<dyn TripTrackRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(&self, query: GetTrackingQuery) -> Result<TrackingView, TrackingError> {
        let track = self
            .repository
            .find_by_booking_id(&query.booking_id)
            .await?
            .ok_or_else(|| TrackingError::not_found_for_booking(&query.booking_id))?;

        let waypoints = match self.repository.list_waypoints(track.id()).await {
            Ok(waypoints) => waypoints,
            Err(e) => {
                tracing::warn!(track_id = %track.id(), error = %e, "Failed to load waypoints");
                Vec::new()
            }
        };

        Ok(TrackingView { track, waypoints })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTripTrackRepository;
    use crate::domain::foundation::{RunnerId, Timestamp};

    #[tokio::test]
    async fn returns_track_with_waypoints() {
        let repo = Arc::new(InMemoryTripTrackRepository::new());
        let track = TripTrack::new(BookingId::new(), RunnerId::new());
        repo.save(&track).await.unwrap();
        let wp = Waypoint::new(10.0, 20.0, 5.0, 90.0, Timestamp::now()).unwrap();
        repo.append_waypoint(track.id(), &wp).await.unwrap();

        let view = GetTrackingHandler::new(repo)
            .handle(GetTrackingQuery {
                booking_id: *track.booking_id(),
            })
            .await
            .unwrap();

        assert_eq!(view.track.id(), track.id());
        assert_eq!(view.waypoints, vec![wp]);
    }

    #[tokio::test]
    async fn missing_booking_is_not_found() {
        let handler = GetTrackingHandler::new(Arc::new(InMemoryTripTrackRepository::new()));

        let err = handler
            .handle(GetTrackingQuery {
                booking_id: BookingId::new(),
            })
            .await
            .unwrap_err();

        assert!(matches!(err, TrackingError::NotFound(_)));
    }
}
