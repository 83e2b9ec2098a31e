//! Redis pub/sub event bus adapters.
//!
//! - `RedisEventPublisher` publishes outbound envelopes as JSON to one channel.
//! - `RedisEventConsumer` subscribes to the inbound channels and feeds every
//!   message to an [`EventConsumer`].
//!
//! Pub/sub gives at-most-once delivery to connected subscribers; redelivery,
//! when it happens, comes from upstream producers.

use std::sync::Arc;

use async_trait::async_trait;
use futures::StreamExt;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::watch;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher};

use super::consumer::{ConsumeReport, EventConsumer, InboundMessage};

fn bus_error(context: &str, e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::EventBusError, format!("{}: {}", context, e))
}

/// Publishes envelopes to a Redis channel.
#[derive(Clone)]
pub struct RedisEventPublisher {
    conn: MultiplexedConnection,
    channel: String,
}

impl RedisEventPublisher {
    pub fn new(conn: MultiplexedConnection, channel: impl Into<String>) -> Self {
        Self {
            conn,
            channel: channel.into(),
        }
    }

    /// Opens a multiplexed connection and builds a publisher on it.
    pub async fn connect(client: &redis::Client, channel: impl Into<String>) -> Result<Self, DomainError> {
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| bus_error("Failed to connect to Redis", e))?;
        Ok(Self::new(conn, channel))
    }
}

#[async_trait]
impl EventPublisher for RedisEventPublisher {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        let payload = serde_json::to_string(&event).map_err(|e| {
            DomainError::new(
                ErrorCode::SerializationError,
                format!("Failed to encode {}: {}", event.event_type, e),
            )
        })?;

        let mut conn = self.conn.clone();
        let receivers: i64 = conn
            .publish(&self.channel, payload)
            .await
            .map_err(|e: redis::RedisError| bus_error("Failed to publish event", e))?;

        tracing::debug!(
            channel = %self.channel,
            event_type = %event.event_type,
            event_id = %event.event_id,
            receivers,
            "Published event"
        );
        Ok(())
    }
}

/// Subscribes to inbound channels and dispatches to a handler.
pub struct RedisEventConsumer {
    client: redis::Client,
    channels: Vec<String>,
    consumer: EventConsumer,
}

impl RedisEventConsumer {
    pub fn new(client: redis::Client, channels: Vec<String>, handler: Arc<dyn EventHandler>) -> Self {
        Self {
            client,
            channels,
            consumer: EventConsumer::new(handler),
        }
    }

    /// Runs until shutdown is signalled or the subscription drops.
    pub async fn run(&self, shutdown: watch::Receiver<bool>) -> Result<ConsumeReport, DomainError> {
        let mut pubsub = self
            .client
            .get_async_connection()
            .await
            .map_err(|e| bus_error("Failed to open subscription connection", e))?
            .into_pubsub();

        for channel in &self.channels {
            pubsub
                .subscribe(channel)
                .await
                .map_err(|e| bus_error("Failed to subscribe", e))?;
        }
        tracing::info!(channels = ?self.channels, "Subscribed to inbound event channels");

        let messages = pubsub.on_message().filter_map(|msg| async move {
            match msg.get_payload::<String>() {
                Ok(payload) => Some(InboundMessage::new(msg.get_channel_name(), payload)),
                Err(e) => {
                    tracing::warn!(channel = %msg.get_channel_name(), error = %e, "Skipping non-text message");
                    None
                }
            }
        });

        let report = self.consumer.consume(messages, shutdown).await;
        tracing::info!(
            received = report.received,
            malformed = report.malformed,
            failed = report.failed,
            "Inbound event consumption stopped"
        );
        Ok(report)
    }
}
