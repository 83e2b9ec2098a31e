//! CompleteTrackingHandler - closes a trip track when delivery is confirmed.

use std::sync::Arc;

use crate::domain::foundation::{BookingId, ErrorCode};
use crate::domain::tracking::{
    total_distance_km, TrackingCompleted, TrackingError, TrackingStatus, TripTrack,
};
use crate::ports::{EventPublisher, TripTrackRepository};

use super::publish_notification;

#[derive(Debug, Clone)]
pub struct CompleteTrackingCommand {
    pub booking_id: BookingId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CompleteTrackingOutcome {
    Completed(TripTrack),
    /// The track had already left the active state; nothing changed.
    AlreadyFinished(TrackingStatus),
    /// Another writer updated the track first; redelivery will see fresh state.
    Superseded,
}

pub struct CompleteTrackingHandler {
    repository: Arc<dyn TripTrackRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl CompleteTrackingHandler {
    pub fn new(
        repository: Arc<dyn TripTrackRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
        }
    }

    pub async fn handle(
        &self,
        cmd: CompleteTrackingCommand,
    ) -> Result<CompleteTrackingOutcome, TrackingError> {
        let mut track = self
            .repository
            .find_by_booking_id(&cmd.booking_id)
            .await?
            .ok_or_else(|| TrackingError::not_found_for_booking(&cmd.booking_id))?;

        if !track.is_active() {
            tracing::info!(
                track_id = %track.id(),
                status = %track.status(),
                "Trip track already finished, ignoring delivery confirmation"
            );
            return Ok(CompleteTrackingOutcome::AlreadyFinished(track.status()));
        }

        let waypoints = self.repository.list_waypoints(track.id()).await?;
        let distance = total_distance_km(&waypoints);

        let expected_version = track.version();
        track.complete(distance)?;

        match self.repository.update(&track, expected_version).await {
            Ok(()) => {}
            Err(e) if e.code == ErrorCode::ConcurrencyConflict => {
                tracing::warn!(
                    track_id = %track.id(),
                    expected_version,
                    "Trip track changed concurrently, dropping completion"
                );
                return Ok(CompleteTrackingOutcome::Superseded);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            track_id = %track.id(),
            booking_id = %track.booking_id(),
            waypoints = waypoints.len(),
            total_distance_km = track.total_distance_km(),
            "Trip tracking completed"
        );

        publish_notification(
            self.event_publisher.as_ref(),
            &TrackingCompleted::from_track(&track),
        )
        .await;

        Ok(CompleteTrackingOutcome::Completed(track))
    }
}
