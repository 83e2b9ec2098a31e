//! TrackingEventRouter - entry point from the event bus into the tracking handlers.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope, Timestamp};
use crate::ports::{EventHandler, EventPublisher, LiveBroadcaster, TripTrackRepository};

use super::handlers::tracking::{
    CompleteTrackingCommand, CompleteTrackingHandler, RecordLocationCommand,
    RecordLocationHandler, StartTrackingCommand, StartTrackingHandler,
};
use super::inbound::InboundEvent;

/// Routes recognized inbound events to their handler.
///
/// Safe under redelivery: every handler treats repeats as no-ops. Only
/// failures that need intervention are returned to the consumer.
pub struct TrackingEventRouter {
    start: StartTrackingHandler,
    record: RecordLocationHandler,
    complete: CompleteTrackingHandler,
}

impl TrackingEventRouter {
    pub fn new(
        repository: Arc<dyn TripTrackRepository>,
        event_publisher: Arc<dyn EventPublisher>,
        broadcaster: Arc<dyn LiveBroadcaster>,
    ) -> Self {
        Self {
            start: StartTrackingHandler::new(repository.clone(), event_publisher.clone()),
            record: RecordLocationHandler::new(
                repository.clone(),
                event_publisher.clone(),
                broadcaster,
            ),
            complete: CompleteTrackingHandler::new(repository, event_publisher),
        }
    }

    async fn route(&self, event: InboundEvent) -> Result<(), DomainError> {
        match event {
            InboundEvent::BookingAccepted(e) => {
                self.start
                    .handle(StartTrackingCommand {
                        booking_id: e.booking_id,
                        runner_id: e.runner_id,
                    })
                    .await?;
            }
            InboundEvent::RunnerLocationUpdate(e) => {
                self.record
                    .handle(RecordLocationCommand {
                        runner_id: e.runner_id,
                        latitude: e.latitude,
                        longitude: e.longitude,
                        speed_kmh: e.speed.unwrap_or(0.0),
                        heading_degrees: e.heading.unwrap_or(0.0),
                        recorded_at: e.timestamp.unwrap_or_else(Timestamp::now),
                    })
                    .await?;
            }
            InboundEvent::DeliveryConfirmed(e) => {
                self.complete
                    .handle(CompleteTrackingCommand {
                        booking_id: e.booking_id,
                    })
                    .await?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventHandler for TrackingEventRouter {
    async fn handle(&self, envelope: EventEnvelope) -> Result<(), DomainError> {
        let event = match InboundEvent::decode(&envelope) {
            Ok(Some(event)) => event,
            Ok(None) => {
                tracing::trace!(event_type = %envelope.event_type, "Ignoring unrecognized event");
                return Ok(());
            }
            Err(e) => {
                tracing::warn!(
                    event_type = %envelope.event_type,
                    event_id = %envelope.event_id,
                    error = %e,
                    "Dropping malformed event"
                );
                return Ok(());
            }
        };

        tracing::debug!(
            event_type = event.event_type(),
            event_id = %envelope.event_id,
            "Routing inbound event"
        );
        self.route(event).await
    }

    fn name(&self) -> &'static str {
        "TrackingEventRouter"
    }
}
