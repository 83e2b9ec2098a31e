//! Broadcast hub: per-booking rooms of live connections.
//!
//! # Architecture
//!
//! ```text
//!   HubHandle (cloned everywhere)
//!        │  register / unregister / broadcast / stats
//!        ▼
//!   ┌──────────────── BroadcastHub::run ────────────────┐
//!   │ Room: booking-123        Room: booking-456        │
//!   │ ├── conn-a ─▶ queue      ├── conn-d ─▶ queue      │
//!   │ └── conn-b ─▶ queue      └── conn-e ─▶ queue      │
//!   └───────────────────────────────────────────────────┘
//! ```
//!
//! The room map is owned by the control loop alone; every other task talks
//! to it through the command channel, so no lock guards it. Delivery uses
//! `try_send` on each connection's bounded queue. A full queue means the
//! consumer is not keeping up and the connection is evicted, never awaited.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot, watch};
use uuid::Uuid;

use crate::domain::foundation::{BookingId, DomainError, ErrorCode};
use crate::ports::{ChatBroadcast, LiveBroadcaster, LocationBroadcast};

use super::messages::{Frame, ServerMessage};

pub const DEFAULT_QUEUE_CAPACITY: usize = 256;
pub const DEFAULT_COMMAND_BUFFER: usize = 1024;

/// Unique identifier for one live connection.
///
/// Generated server-side when a client attaches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HubError {
    #[error("broadcast hub is not running")]
    Stopped,

    #[error("failed to encode live message: {0}")]
    Encode(String),
}

impl From<HubError> for DomainError {
    fn from(err: HubError) -> Self {
        let code = match err {
            HubError::Stopped => ErrorCode::InternalError,
            HubError::Encode(_) => ErrorCode::SerializationError,
        };
        DomainError::new(code, err.to_string())
    }
}

/// One observer's registration: the room it belongs to and the producer side
/// of its outbound queue.
///
/// The consumer side stays with the connection's writer task. Once the hub
/// drops this value the queue is closed and the writer shuts the socket.
#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    booking_id: BookingId,
    outbound: mpsc::Sender<Frame>,
}

impl Connection {
    /// Creates a connection and the receiving end of its bounded queue.
    pub fn open(booking_id: BookingId, capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (outbound, queue) = mpsc::channel(capacity.max(1));
        let connection = Self {
            id: ConnectionId::new(),
            booking_id,
            outbound,
        };
        (connection, queue)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn booking_id(&self) -> &BookingId {
        &self.booking_id
    }
}

/// Room and connection counts at one instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct HubStats {
    pub rooms: usize,
    pub connections: usize,
}

/// Sizing for the hub's channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubConfig {
    /// Per-connection outbound queue capacity.
    pub queue_capacity: usize,
    /// Buffer of the command channel into the control loop.
    pub command_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            command_buffer: DEFAULT_COMMAND_BUFFER,
        }
    }
}

enum Command {
    Register(Connection),
    Unregister {
        booking_id: BookingId,
        connection_id: ConnectionId,
    },
    Broadcast {
        booking_id: BookingId,
        frame: Frame,
    },
    RoomSize {
        booking_id: BookingId,
        reply: oneshot::Sender<usize>,
    },
    Stats(oneshot::Sender<HubStats>),
}

/// The control loop owning every room.
pub struct BroadcastHub {
    rooms: HashMap<BookingId, HashMap<ConnectionId, mpsc::Sender<Frame>>>,
    commands: mpsc::Receiver<Command>,
}

impl BroadcastHub {
    /// Creates the hub and the handle used to reach it.
    ///
    /// Nothing is delivered until [`BroadcastHub::run`] is spawned.
    pub fn new(config: HubConfig) -> (Self, HubHandle) {
        let (tx, rx) = mpsc::channel(config.command_buffer.max(1));
        let hub = Self {
            rooms: HashMap::new(),
            commands: rx,
        };
        let handle = HubHandle {
            commands: tx,
            queue_capacity: config.queue_capacity.max(1),
        };
        (hub, handle)
    }

    /// Processes commands until shutdown is signalled or every handle is gone.
    ///
    /// Dropping the rooms on exit closes every outbound queue, which lets
    /// each connection tear itself down.
    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        tracing::info!("Broadcast hub started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(command) => self.apply(command),
                    None => break,
                },
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!(
            rooms = self.rooms.len(),
            connections = self.connection_count(),
            "Broadcast hub stopped"
        );
    }

    fn apply(&mut self, command: Command) {
        match command {
            Command::Register(connection) => self.register(connection),
            Command::Unregister {
                booking_id,
                connection_id,
            } => self.unregister(&booking_id, &connection_id),
            Command::Broadcast { booking_id, frame } => self.deliver(&booking_id, frame),
            Command::RoomSize { booking_id, reply } => {
                let size = self.rooms.get(&booking_id).map_or(0, HashMap::len);
                let _ = reply.send(size);
            }
            Command::Stats(reply) => {
                let _ = reply.send(HubStats {
                    rooms: self.rooms.len(),
                    connections: self.connection_count(),
                });
            }
        }
    }

    fn register(&mut self, connection: Connection) {
        let Connection {
            id,
            booking_id,
            outbound,
        } = connection;

        let room = self.rooms.entry(booking_id).or_default();
        room.insert(id, outbound);

        tracing::debug!(
            booking_id = %booking_id,
            connection_id = %id,
            room_size = room.len(),
            "Connection joined room"
        );
    }

    fn unregister(&mut self, booking_id: &BookingId, connection_id: &ConnectionId) {
        let Some(room) = self.rooms.get_mut(booking_id) else {
            return;
        };
        if room.remove(connection_id).is_none() {
            return;
        }

        tracing::debug!(
            booking_id = %booking_id,
            connection_id = %connection_id,
            room_size = room.len(),
            "Connection left room"
        );

        if room.is_empty() {
            self.rooms.remove(booking_id);
        }
    }

    /// Enqueues the frame on every connection in the room without waiting.
    fn deliver(&mut self, booking_id: &BookingId, frame: Frame) {
        let Some(room) = self.rooms.get_mut(booking_id) else {
            return;
        };

        room.retain(|connection_id, outbound| match outbound.try_send(frame.clone()) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::warn!(
                    booking_id = %booking_id,
                    connection_id = %connection_id,
                    "Outbound queue full, dropping slow connection"
                );
                false
            }
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(
                    booking_id = %booking_id,
                    connection_id = %connection_id,
                    "Outbound queue closed, removing connection"
                );
                false
            }
        });

        if room.is_empty() {
            self.rooms.remove(booking_id);
        }
    }

    fn connection_count(&self) -> usize {
        self.rooms.values().map(HashMap::len).sum()
    }
}

/// Cloneable handle to a running [`BroadcastHub`].
#[derive(Clone)]
pub struct HubHandle {
    commands: mpsc::Sender<Command>,
    queue_capacity: usize,
}

impl HubHandle {
    /// Capacity to use for new connection queues.
    pub fn queue_capacity(&self) -> usize {
        self.queue_capacity
    }

    /// Adds the connection to its booking's room, creating the room if needed.
    pub async fn register(&self, connection: Connection) -> Result<(), HubError> {
        self.send(Command::Register(connection)).await
    }

    /// Removes a connection and closes its queue.
    ///
    /// Unknown connections, repeated calls and a stopped hub are all no-ops.
    pub async fn unregister(&self, booking_id: BookingId, connection_id: ConnectionId) {
        let _ = self
            .send(Command::Unregister {
                booking_id,
                connection_id,
            })
            .await;
    }

    /// Sends an encoded frame to every connection observing the booking.
    pub async fn broadcast(&self, booking_id: BookingId, frame: Frame) -> Result<(), HubError> {
        self.send(Command::Broadcast { booking_id, frame }).await
    }

    /// Number of connections currently in the booking's room.
    pub async fn room_size(&self, booking_id: BookingId) -> Result<usize, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::RoomSize { booking_id, reply }).await?;
        rx.await.map_err(|_| HubError::Stopped)
    }

    /// Current room and connection counts.
    pub async fn stats(&self) -> Result<HubStats, HubError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Stats(reply)).await?;
        rx.await.map_err(|_| HubError::Stopped)
    }

    async fn send(&self, command: Command) -> Result<(), HubError> {
        self.commands.send(command).await.map_err(|_| HubError::Stopped)
    }
}

#[async_trait]
impl LiveBroadcaster for HubHandle {
    async fn broadcast_location(&self, update: LocationBroadcast) -> Result<(), DomainError> {
        let booking_id = update.booking_id;
        let frame = ServerMessage::from(update).to_frame()?;
        Ok(self.broadcast(booking_id, frame).await?)
    }

    async fn broadcast_chat(&self, message: ChatBroadcast) -> Result<(), DomainError> {
        let booking_id = message.booking_id;
        let frame = ServerMessage::from(message).to_frame()?;
        Ok(self.broadcast(booking_id, frame).await?)
    }
}
