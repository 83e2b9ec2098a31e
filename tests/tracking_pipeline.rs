//! End-to-end tests for the tracking pipeline.
//!
//! Inbound events flow through the router into the trip track repository,
//! out to observers connected to the broadcast hub, and on to the downstream
//! event bus. Everything runs in-process with the in-memory adapters.

use std::sync::Arc;
use std::time::Duration;

use futures::stream;
use serde_json::{json, Value};
use tokio::sync::{mpsc, watch};
use tokio::time::timeout;

use trip_tracker::adapters::events::{EventConsumer, InMemoryEventBus, InboundMessage};
use trip_tracker::adapters::memory::InMemoryTripTrackRepository;
use trip_tracker::adapters::websocket::{BroadcastHub, Connection, Frame, HubConfig, HubHandle};
use trip_tracker::application::TrackingEventRouter;
use trip_tracker::domain::foundation::{BookingId, EventEnvelope, RunnerId};
use trip_tracker::domain::tracking::TrackingStatus;
use trip_tracker::ports::{EventHandler, TripTrackRepository};

// =============================================================================
// Test Infrastructure
// =============================================================================

struct Pipeline {
    router: Arc<TrackingEventRouter>,
    repo: Arc<InMemoryTripTrackRepository>,
    bus: Arc<InMemoryEventBus>,
    hub: HubHandle,
    _shutdown: watch::Sender<bool>,
}

impl Pipeline {
    fn start() -> Self {
        let repo = Arc::new(InMemoryTripTrackRepository::new());
        let bus = Arc::new(InMemoryEventBus::new());
        let (hub, handle) = BroadcastHub::new(HubConfig::default());
        let (shutdown, shutdown_rx) = watch::channel(false);
        tokio::spawn(hub.run(shutdown_rx));

        let router = Arc::new(TrackingEventRouter::new(
            repo.clone(),
            bus.clone(),
            Arc::new(handle.clone()),
        ));

        Self {
            router,
            repo,
            bus,
            hub: handle,
            _shutdown: shutdown,
        }
    }

    async fn observe(&self, booking_id: BookingId) -> mpsc::Receiver<Frame> {
        let (connection, queue) = Connection::open(booking_id, self.hub.queue_capacity());
        self.hub.register(connection).await.unwrap();
        queue
    }

    async fn send(&self, event_type: &str, payload: Value) {
        self.router
            .handle(EventEnvelope::new(event_type, "", "", payload))
            .await
            .unwrap();
    }
}

fn accepted(booking: BookingId, runner: RunnerId) -> Value {
    json!({ "bookingId": booking.to_string(), "runnerId": runner.to_string() })
}

fn location(runner: RunnerId, latitude: f64, longitude: f64, at: &str) -> Value {
    json!({
        "runnerId": runner.to_string(),
        "latitude": latitude,
        "longitude": longitude,
        "speed": 25.0,
        "heading": 90.0,
        "timestamp": at,
    })
}

fn confirmed(booking: BookingId) -> Value {
    json!({ "bookingId": booking.to_string() })
}

async fn next_frame(queue: &mut mpsc::Receiver<Frame>) -> Value {
    let frame = timeout(Duration::from_secs(1), queue.recv())
        .await
        .expect("no frame within a second")
        .expect("queue closed");
    serde_json::from_str(&frame).unwrap()
}

// =============================================================================
// Scenarios
// =============================================================================

#[tokio::test]
async fn booking_lifecycle_tracks_broadcasts_and_completes() {
    let pipeline = Pipeline::start();
    let booking = BookingId::new();
    let runner = RunnerId::new();
    let mut customer = pipeline.observe(booking).await;
    let mut merchant = pipeline.observe(booking).await;

    pipeline.send("booking.accepted", accepted(booking, runner)).await;

    let track = pipeline.repo.find_by_booking_id(&booking).await.unwrap().unwrap();
    assert_eq!(track.status(), TrackingStatus::Active);
    assert_eq!(track.total_distance_km(), 0.0);

    pipeline
        .send("runner.location_update", location(runner, 1.0, 1.0, "2026-05-01T12:00:00Z"))
        .await;
    pipeline
        .send("runner.location_update", location(runner, 1.0, 2.0, "2026-05-01T12:05:00Z"))
        .await;

    assert_eq!(pipeline.repo.waypoint_count(track.id()).await, 2);
    for queue in [&mut customer, &mut merchant] {
        let first = next_frame(queue).await;
        let second = next_frame(queue).await;
        assert_eq!(first["type"], "location_update");
        assert_eq!(first["data"]["longitude"], 1.0);
        assert_eq!(second["data"]["longitude"], 2.0);
        assert_eq!(second["data"]["booking_id"], booking.to_string());
        assert_eq!(second["data"]["speed_kmh"], 25.0);
    }

    pipeline.send("booking.delivery_confirmed", confirmed(booking)).await;

    let done = pipeline.repo.find_by_booking_id(&booking).await.unwrap().unwrap();
    assert_eq!(done.status(), TrackingStatus::Completed);
    assert_eq!(done.total_distance_km(), 111.178);
    assert!(done.completed_at().is_some());

    assert_eq!(pipeline.bus.events_of_type("tracking.started").len(), 1);
    assert_eq!(pipeline.bus.events_of_type("tracking.updated").len(), 2);
    let completed = pipeline.bus.events_of_type("tracking.completed");
    assert_eq!(completed.len(), 1);
    assert_eq!(completed[0].payload["total_distance"], 111.178);
}

#[tokio::test]
async fn updates_after_completion_are_ignored() {
    let pipeline = Pipeline::start();
    let booking = BookingId::new();
    let runner = RunnerId::new();
    let mut observer = pipeline.observe(booking).await;

    pipeline.send("booking.accepted", accepted(booking, runner)).await;
    pipeline.send("booking.delivery_confirmed", confirmed(booking)).await;
    pipeline.send("booking.delivery_confirmed", confirmed(booking)).await;
    pipeline
        .send("runner.location_update", location(runner, 3.0, 3.0, "2026-05-01T13:00:00Z"))
        .await;

    assert!(observer.try_recv().is_err());
    assert_eq!(pipeline.bus.events_of_type("tracking.completed").len(), 1);
}

#[tokio::test]
async fn location_for_idle_runner_is_silently_dropped() {
    let pipeline = Pipeline::start();

    pipeline
        .send("runner.location_update", location(RunnerId::new(), 1.0, 1.0, "2026-05-01T12:00:00Z"))
        .await;

    assert_eq!(pipeline.repo.track_count().await, 0);
    assert_eq!(pipeline.bus.event_count(), 0);
}

#[tokio::test]
async fn invalid_waypoint_does_not_stop_later_updates() {
    let pipeline = Pipeline::start();
    let booking = BookingId::new();
    let runner = RunnerId::new();
    let mut observer = pipeline.observe(booking).await;
    pipeline.send("booking.accepted", accepted(booking, runner)).await;

    pipeline
        .send("runner.location_update", location(runner, 120.0, 1.0, "2026-05-01T12:00:00Z"))
        .await;
    pipeline
        .send("runner.location_update", location(runner, 1.0, 1.0, "2026-05-01T12:01:00Z"))
        .await;

    let frame = next_frame(&mut observer).await;
    assert_eq!(frame["data"]["latitude"], 1.0);
    assert!(observer.try_recv().is_err());
}

#[tokio::test]
async fn confirmation_for_unknown_booking_is_an_error() {
    let pipeline = Pipeline::start();

    let result = pipeline
        .router
        .handle(EventEnvelope::new(
            "booking.delivery_confirmed",
            "",
            "",
            confirmed(BookingId::new()),
        ))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn concurrent_duplicate_acceptances_create_one_track() {
    let pipeline = Pipeline::start();
    let booking = BookingId::new();
    let runner = RunnerId::new();
    let payload = serde_json::to_string(&json!({
        "event_type": "booking.accepted",
        "payload": accepted(booking, runner),
    }))
    .unwrap();

    let messages: Vec<_> = (0..16)
        .map(|_| InboundMessage::new("booking-events", payload.clone()))
        .collect();
    let consumer = EventConsumer::new(pipeline.router.clone());
    let (_stop, stop_rx) = watch::channel(false);

    let report = consumer.consume(stream::iter(messages), stop_rx).await;

    assert_eq!(report.received, 16);
    assert_eq!(report.failed, 0);
    assert_eq!(pipeline.repo.track_count().await, 1);
    assert_eq!(pipeline.bus.events_of_type("tracking.started").len(), 1);
}

#[tokio::test]
async fn cloud_events_from_upstream_start_tracking() {
    let pipeline = Pipeline::start();
    let booking = BookingId::new();
    let runner = RunnerId::new();
    let cloud_event = json!({
        "specversion": "1.0",
        "id": "5b0f6c1e-booking-accepted",
        "source": "booking-service",
        "type": "booking.accepted",
        "time": "2026-05-01T11:59:00Z",
        "datacontenttype": "application/json",
        "data": accepted(booking, runner),
    });
    let consumer = EventConsumer::new(pipeline.router.clone());
    let (_stop, stop_rx) = watch::channel(false);

    let report = consumer
        .consume(
            stream::iter(vec![InboundMessage::new(
                "booking-events",
                cloud_event.to_string(),
            )]),
            stop_rx,
        )
        .await;

    assert_eq!(report.malformed, 0);
    assert_eq!(report.failed, 0);
    let track = pipeline.repo.find_by_booking_id(&booking).await.unwrap().unwrap();
    assert_eq!(track.runner_id(), &runner);
    assert_eq!(pipeline.bus.events_of_type("tracking.started").len(), 1);
}

#[tokio::test]
async fn consumer_skips_garbage_and_unknown_events() {
    let pipeline = Pipeline::start();
    let messages = vec![
        InboundMessage::new("booking-events", "not json"),
        InboundMessage::new(
            "booking-events",
            r#"{"event_type":"booking.created","payload":{}}"#,
        ),
    ];
    let consumer = EventConsumer::new(pipeline.router.clone());
    let (_stop, stop_rx) = watch::channel(false);

    let report = consumer.consume(stream::iter(messages), stop_rx).await;

    assert_eq!(report.received, 2);
    assert_eq!(report.malformed, 1);
    assert_eq!(report.failed, 0);
    assert_eq!(pipeline.repo.track_count().await, 0);
}
