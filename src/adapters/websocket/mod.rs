//! WebSocket adapter: live location and chat fan-out per booking.
//!
//! ```text
//!  TrackingEventRouter ──broadcast_location──▶ HubHandle
//!                                                │ command channel
//!                                                ▼
//!                                        BroadcastHub::run
//!                                   Room: booking-123 │ Room: booking-456
//!                                     conn-a, conn-b  │ conn-c
//!                                                │ try_send per connection
//!                                                ▼
//!                             writer task ──▶ socket ◀── reader task
//! ```
//!
//! - [`hub`] - single-owner room registry and delivery
//! - [`connection`] - per-connection writer/reader pumps
//! - [`messages`] - JSON payloads pushed to clients
//! - [`handler`] - axum upgrade endpoint

pub mod connection;
pub mod handler;
pub mod hub;
pub mod messages;

pub use connection::{serve_connection, ConnectionSettings, ReaderExit, WriterExit};
pub use handler::{websocket_router, ws_handler, WebSocketState};
pub use hub::{
    BroadcastHub, Connection, ConnectionId, HubConfig, HubError, HubHandle, HubStats,
};
pub use messages::{Frame, ServerMessage};
