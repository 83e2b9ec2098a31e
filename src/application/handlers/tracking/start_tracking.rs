//! StartTrackingHandler - opens a trip track when a booking is accepted.

use std::sync::Arc;

use crate::domain::foundation::{BookingId, ErrorCode, RunnerId};
use crate::domain::tracking::{TrackingError, TrackingStarted, TripTrack};
use crate::ports::{EventPublisher, TripTrackRepository};

use super::publish_notification;

#[derive(Debug, Clone)]
pub struct StartTrackingCommand {
    pub booking_id: BookingId,
    pub runner_id: RunnerId,
}

#[derive(Debug, Clone, PartialEq)]
pub enum StartTrackingOutcome {
    Started(TripTrack),
    /// The booking already has a track; nothing was written.
    AlreadyTracking,
}

pub struct StartTrackingHandler {
    repository: Arc<dyn TripTrackRepository>,
    event_publisher: Arc<dyn EventPublisher>,
}

impl StartTrackingHandler {
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
        cmd: StartTrackingCommand,
    ) -> Result<StartTrackingOutcome, TrackingError> {
        if self
            .repository
            .find_by_booking_id(&cmd.booking_id)
            .await?
            .is_some()
        {
            tracing::debug!(booking_id = %cmd.booking_id, "Booking already tracked");
            return Ok(StartTrackingOutcome::AlreadyTracking);
        }

        let track = TripTrack::new(cmd.booking_id, cmd.runner_id);

        // A concurrent redelivery can win between the lookup and the insert.
        match self.repository.save(&track).await {
            Ok(()) => {}
            Err(e) if e.code == ErrorCode::DuplicateTripTrack => {
                tracing::debug!(booking_id = %cmd.booking_id, "Lost creation race, booking already tracked");
                return Ok(StartTrackingOutcome::AlreadyTracking);
            }
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            track_id = %track.id(),
            booking_id = %track.booking_id(),
            runner_id = %track.runner_id(),
            "Trip tracking started"
        );

        publish_notification(
            self.event_publisher.as_ref(),
            &TrackingStarted::from_track(&track),
        )
        .await;

        Ok(StartTrackingOutcome::Started(track))
    }
}
