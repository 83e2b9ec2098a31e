//! RecordLocationHandler - appends a waypoint and fans it out to observers.

use std::sync::Arc;

use crate::domain::foundation::{RunnerId, Timestamp, ValidationError};
use crate::domain::tracking::{TrackingError, TrackingUpdated, Waypoint};
use crate::ports::{EventPublisher, LiveBroadcaster, LocationBroadcast, TripTrackRepository};

use super::publish_notification;

/// Raw telemetry sample reported by a runner's device.
#[derive(Debug, Clone)]
pub struct RecordLocationCommand {
    pub runner_id: RunnerId,
    pub latitude: f64,
    pub longitude: f64,
    pub speed_kmh: f64,
    pub heading_degrees: f64,
    pub recorded_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RecordLocationOutcome {
    Recorded(Waypoint),
    /// The runner has no trip being tracked; the sample was ignored.
    NoActiveTrack,
    /// The sample failed coordinate validation and was dropped.
    InvalidWaypoint(ValidationError),
}

pub struct RecordLocationHandler {
    repository: Arc<dyn TripTrackRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    broadcaster: Arc<dyn LiveBroadcaster>,
}

impl RecordLocationHandler {
    pub fn new(
        repository: Arc<dyn TripTrackRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        broadcaster: Arc<dyn LiveBroadcaster>,
    ) -> Self {
        Self {
            repository,
            event_publisher,
            broadcaster,
        }
    }

    pub async fn handle(
        &self,
        cmd: RecordLocationCommand,
    ) -> Result<RecordLocationOutcome, TrackingError> {
        let Some(track) = self
            .repository
            .find_active_by_runner_id(&cmd.runner_id)
            .await?
        else {
            tracing::debug!(runner_id = %cmd.runner_id, "No active trip for runner, ignoring location");
            return Ok(RecordLocationOutcome::NoActiveTrack);
        };

        let waypoint = match Waypoint::new(
            cmd.latitude,
            cmd.longitude,
            cmd.speed_kmh,
            cmd.heading_degrees,
            cmd.recorded_at,
        ) {
            Ok(waypoint) => waypoint,
            Err(e) => {
                tracing::warn!(
                    runner_id = %cmd.runner_id,
                    track_id = %track.id(),
                    error = %e,
                    "Dropping invalid waypoint"
                );
                return Ok(RecordLocationOutcome::InvalidWaypoint(e));
            }
        };

        self.repository.append_waypoint(track.id(), &waypoint).await?;

        let update = LocationBroadcast {
            booking_id: *track.booking_id(),
            runner_id: *track.runner_id(),
            latitude: waypoint.latitude(),
            longitude: waypoint.longitude(),
            speed_kmh: waypoint.speed_kmh(),
            heading_degrees: waypoint.heading_degrees(),
            timestamp: *waypoint.recorded_at(),
        };
        if let Err(e) = self.broadcaster.broadcast_location(update).await {
            tracing::warn!(booking_id = %track.booking_id(), error = %e, "Location broadcast failed");
        }

        publish_notification(
            self.event_publisher.as_ref(),
            &TrackingUpdated::from_waypoint(&track, &waypoint),
        )
        .await;

        Ok(RecordLocationOutcome::Recorded(waypoint))
    }
}
