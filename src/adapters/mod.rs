//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `events` - Event bus implementations (in-memory, Redis pub/sub)
//! - `http` - REST read endpoints and health
//! - `memory` - In-process repository
//! - `postgres` - sqlx repository
//! - `websocket` - Broadcast hub and live connections

pub mod events;
pub mod http;
pub mod memory;
pub mod postgres;
pub mod websocket;

pub use events::{
    EventConsumer, InMemoryEventBus, RedisEventConsumer, RedisEventPublisher,
};
pub use memory::InMemoryTripTrackRepository;
pub use postgres::PostgresTripTrackRepository;
pub use websocket::{BroadcastHub, HubConfig, HubHandle};
