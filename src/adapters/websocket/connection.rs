//! Per-connection reader and writer tasks.
//!
//! The writer owns the outbound half of the socket and drains the hub queue;
//! the reader owns the inbound half and only watches for liveness. Whichever
//! finishes first ends the connection, and exactly one unregister follows.
//!
//! Both pumps are generic over `Sink`/`Stream` of axum messages so they run
//! the same against a real socket or an in-memory channel.

use std::fmt::Display;
use std::time::Duration;

use axum::extract::ws::Message;
use futures::{Sink, SinkExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::time::{interval_at, timeout, Instant, MissedTickBehavior};

use crate::domain::foundation::BookingId;

use super::hub::{Connection, HubHandle};
use super::messages::Frame;

/// Timing limits for one live connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Maximum time a single write may take.
    pub write_wait: Duration,
    /// Maximum silence from the peer before it is considered gone.
    pub pong_wait: Duration,
    /// Idle time after which a ping is sent. Must be below `pong_wait`.
    pub ping_period: Duration,
    /// Largest inbound frame accepted, in bytes.
    pub max_message_size: usize,
}

impl ConnectionSettings {
    /// Settings with the ping period at nine tenths of the pong wait.
    pub fn new(write_wait: Duration, pong_wait: Duration, max_message_size: usize) -> Self {
        Self {
            write_wait,
            pong_wait,
            ping_period: pong_wait * 9 / 10,
            max_message_size,
        }
    }
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self::new(Duration::from_secs(10), Duration::from_secs(60), 512)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterExit {
    /// The hub closed the queue (unregistered or evicted).
    QueueClosed,
    WriteFailed,
    WriteTimedOut,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReaderExit {
    ClosedByPeer,
    StreamEnded,
    ReadFailed,
    LivenessTimeout,
}

/// Drains the outbound queue into the sink, pinging whenever idle.
pub async fn write_pump<S>(
    mut sink: S,
    mut queue: mpsc::Receiver<Frame>,
    settings: ConnectionSettings,
) -> WriterExit
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    let mut heartbeat = interval_at(Instant::now() + settings.ping_period, settings.ping_period);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            frame = queue.recv() => {
                let Some(frame) = frame else {
                    let _ = send_within(&mut sink, Message::Close(None), settings.write_wait).await;
                    return WriterExit::QueueClosed;
                };
                if let Err(exit) = send_within(&mut sink, Message::Text(frame.to_string()), settings.write_wait).await {
                    return exit;
                }
                heartbeat.reset();
            }
            _ = heartbeat.tick() => {
                if let Err(exit) = send_within(&mut sink, Message::Ping(Vec::new()), settings.write_wait).await {
                    return exit;
                }
            }
        }
    }
}

async fn send_within<S>(sink: &mut S, message: Message, deadline: Duration) -> Result<(), WriterExit>
where
    S: Sink<Message> + Unpin,
    S::Error: Display,
{
    match timeout(deadline, sink.send(message)).await {
        Ok(Ok(())) => Ok(()),
        Ok(Err(e)) => {
            tracing::debug!(error = %e, "Write to live connection failed");
            Err(WriterExit::WriteFailed)
        }
        Err(_) => Err(WriterExit::WriteTimedOut),
    }
}

/// Reads until the peer closes, errors, or stays silent past `pong_wait`.
///
/// Every inbound frame, whatever its content, counts as proof of life.
pub async fn read_pump<St, E>(mut stream: St, pong_wait: Duration) -> ReaderExit
where
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        match timeout(pong_wait, stream.next()).await {
            Err(_) => return ReaderExit::LivenessTimeout,
            Ok(None) => return ReaderExit::StreamEnded,
            Ok(Some(Err(e))) => {
                tracing::debug!(error = %e, "Read from live connection failed");
                return ReaderExit::ReadFailed;
            }
            Ok(Some(Ok(Message::Close(_)))) => return ReaderExit::ClosedByPeer,
            Ok(Some(Ok(_))) => {}
        }
    }
}

/// Runs one observer connection from registration to cleanup.
pub async fn serve_connection<S, St, E>(
    hub: HubHandle,
    booking_id: BookingId,
    sink: S,
    stream: St,
    settings: ConnectionSettings,
) where
    S: Sink<Message> + Unpin + Send + 'static,
    S::Error: Display + Send,
    St: Stream<Item = Result<Message, E>> + Unpin + Send + 'static,
    E: Display + Send + 'static,
{
    let (connection, queue) = Connection::open(booking_id, hub.queue_capacity());
    let connection_id = connection.id();

    if let Err(e) = hub.register(connection).await {
        tracing::warn!(booking_id = %booking_id, error = %e, "Rejecting live connection");
        return;
    }
    tracing::debug!(booking_id = %booking_id, connection_id = %connection_id, "Live connection opened");

    let mut writer = tokio::spawn(write_pump(sink, queue, settings));
    let mut reader = tokio::spawn(read_pump(stream, settings.pong_wait));

    tokio::select! {
        exit = &mut writer => {
            reader.abort();
            tracing::debug!(connection_id = %connection_id, exit = ?exit.ok(), "Writer finished");
        }
        exit = &mut reader => {
            writer.abort();
            tracing::debug!(connection_id = %connection_id, exit = ?exit.ok(), "Reader finished");
        }
    }

    hub.unregister(booking_id, connection_id).await;
    tracing::debug!(booking_id = %booking_id, connection_id = %connection_id, "Live connection closed");
}
