//! Trip tracking command and query handlers.

mod complete_tracking;
mod export_route;
mod get_tracking;
mod record_location;
mod start_tracking;

pub use complete_tracking::{
    CompleteTrackingCommand, CompleteTrackingHandler, CompleteTrackingOutcome,
};
pub use export_route::{ExportRouteHandler, ExportRouteQuery};
pub use get_tracking::{GetTrackingHandler, GetTrackingQuery, TrackingView};
pub use record_location::{RecordLocationCommand, RecordLocationHandler, RecordLocationOutcome};
pub use start_tracking::{StartTrackingCommand, StartTrackingHandler, StartTrackingOutcome};

use serde::Serialize;

use crate::domain::foundation::{DomainEvent, EventEnvelope};
use crate::ports::EventPublisher;

/// Publishes a downstream notification without failing the caller.
///
/// The persisted aggregate is already authoritative when this runs.
async fn publish_notification<E>(publisher: &dyn EventPublisher, event: &E)
where
    E: DomainEvent + Serialize,
{
    let envelope = match EventEnvelope::from_event(event) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::warn!(event_type = event.event_type(), error = %e, "Failed to encode notification");
            return;
        }
    };

    if let Err(e) = publisher.publish(envelope).await {
        tracing::warn!(
            event_type = event.event_type(),
            aggregate_id = %event.aggregate_id(),
            error = %e,
            "Failed to publish notification"
        );
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use crate::domain::foundation::{DomainError, ErrorCode};
    use crate::ports::{ChatBroadcast, LiveBroadcaster, LocationBroadcast};

    /// Broadcaster that records location updates instead of delivering them.
    #[derive(Default)]
    pub struct RecordingBroadcaster {
        locations: Mutex<Vec<LocationBroadcast>>,
        fail: bool,
    }

    impl RecordingBroadcaster {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn locations(&self) -> Vec<LocationBroadcast> {
            self.locations.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LiveBroadcaster for RecordingBroadcaster {
        async fn broadcast_location(&self, update: LocationBroadcast) -> Result<(), DomainError> {
            if self.fail {
                return Err(DomainError::new(ErrorCode::InternalError, "hub stopped"));
            }
            self.locations.lock().unwrap().push(update);
            Ok(())
        }

        async fn broadcast_chat(&self, _message: ChatBroadcast) -> Result<(), DomainError> {
            Ok(())
        }
    }
}
