//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `EventPublisher` - publishing tracking notifications
//! - `EventHandler` - consuming upstream booking and runner events
//! - `TripTrackRepository` - trip track and waypoint persistence
//! - `LiveBroadcaster` - fan-out to observers connected to a booking

mod event_publisher;
mod event_handler;
mod live_broadcaster;
mod trip_track_repository;

pub use event_publisher::EventPublisher;
pub use event_handler::EventHandler;
pub use live_broadcaster::{ChatBroadcast, ChatMessageType, LiveBroadcaster, LocationBroadcast};
pub use trip_track_repository::TripTrackRepository;
