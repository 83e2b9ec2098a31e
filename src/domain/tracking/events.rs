//! Trip tracking domain events.
//!
//! Published downstream after the aggregate change has been persisted:
//! - `TrackingStarted` - a booking's trip is now being tracked
//! - `TrackingUpdated` - a waypoint was recorded for an active trip
//! - `TrackingCompleted` - the trip finished with its final distance

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    domain_event, BookingId, EventId, RunnerId, Timestamp, TripTrackId,
};

use super::{TripTrack, Waypoint};

// ════════════════════════════════════════════════════════════════════════════
// TrackingStarted
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingStarted {
    pub event_id: EventId,
    pub track_id: TripTrackId,
    pub booking_id: BookingId,
    pub runner_id: RunnerId,
    pub started_at: Timestamp,
    pub occurred_at: Timestamp,
}

domain_event!(
    TrackingStarted,
    event_type = "tracking.started",
    aggregate_id = track_id,
    aggregate_type = "TripTrack",
    occurred_at = occurred_at,
    event_id = event_id
);

impl TrackingStarted {
    pub fn from_track(track: &TripTrack) -> Self {
        Self {
            event_id: EventId::new(),
            track_id: *track.id(),
            booking_id: *track.booking_id(),
            runner_id: *track.runner_id(),
            started_at: *track.started_at(),
            occurred_at: Timestamp::now(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingUpdated
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingUpdated {
    pub event_id: EventId,
    pub track_id: TripTrackId,
    pub booking_id: BookingId,
    pub runner_id: RunnerId,
    pub latitude: f64,
    pub longitude: f64,
    pub occurred_at: Timestamp,
}

domain_event!(
    TrackingUpdated,
    event_type = "tracking.updated",
    aggregate_id = track_id,
    aggregate_type = "TripTrack",
    occurred_at = occurred_at,
    event_id = event_id
);

impl TrackingUpdated {
    pub fn from_waypoint(track: &TripTrack, waypoint: &Waypoint) -> Self {
        Self {
            event_id: EventId::new(),
            track_id: *track.id(),
            booking_id: *track.booking_id(),
            runner_id: *track.runner_id(),
            latitude: waypoint.latitude(),
            longitude: waypoint.longitude(),
            occurred_at: Timestamp::now(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingCompleted
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackingCompleted {
    pub event_id: EventId,
    pub track_id: TripTrackId,
    pub booking_id: BookingId,
    pub runner_id: RunnerId,
    /// Kilometres, three decimals.
    pub total_distance: f64,
    pub completed_at: Timestamp,
    pub occurred_at: Timestamp,
}

domain_event!(
    TrackingCompleted,
    event_type = "tracking.completed",
    aggregate_id = track_id,
    aggregate_type = "TripTrack",
    occurred_at = occurred_at,
    event_id = event_id
);

impl TrackingCompleted {
    pub fn from_track(track: &TripTrack) -> Self {
        let occurred_at = Timestamp::now();
        Self {
            event_id: EventId::new(),
            track_id: *track.id(),
            booking_id: *track.booking_id(),
            runner_id: *track.runner_id(),
            total_distance: track.total_distance_km(),
            completed_at: track.completed_at().copied().unwrap_or(occurred_at),
            occurred_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainEvent, EventEnvelope};

    #[test]
    fn started_envelope_is_keyed_by_track() {
        let track = TripTrack::new(BookingId::new(), RunnerId::new());
        let event = TrackingStarted::from_track(&track);

        let envelope = EventEnvelope::from_event(&event).unwrap();

        assert_eq!(envelope.event_type, "tracking.started");
        assert_eq!(envelope.aggregate_type, "TripTrack");
        assert_eq!(envelope.aggregate_id, track.id().to_string());
        assert_eq!(envelope.payload["booking_id"], track.booking_id().to_string());
    }

    #[test]
    fn updated_carries_waypoint_coordinates() {
        let track = TripTrack::new(BookingId::new(), RunnerId::new());
        let wp = Waypoint::new(1.5, 2.5, 10.0, 90.0, Timestamp::now()).unwrap();

        let event = TrackingUpdated::from_waypoint(&track, &wp);

        assert_eq!(event.event_type(), "tracking.updated");
        assert_eq!(event.latitude, 1.5);
        assert_eq!(event.longitude, 2.5);
    }

    #[test]
    fn completed_reports_final_distance() {
        let mut track = TripTrack::new(BookingId::new(), RunnerId::new());
        track.complete(111.178).unwrap();

        let event = TrackingCompleted::from_track(&track);

        assert_eq!(event.total_distance, 111.178);
        assert_eq!(Some(&event.completed_at), track.completed_at());
        let payload = EventEnvelope::from_event(&event).unwrap().payload;
        assert_eq!(payload["total_distance"], 111.178);
    }
}
