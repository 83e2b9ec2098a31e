//! Transport-agnostic consumption loop for inbound bus messages.
//!
//! Each message is decoded into an `EventEnvelope` and handed to the handler
//! on its own task. On shutdown the loop stops reading and waits for the
//! tasks already started.

use std::sync::Arc;

use futures::{Stream, StreamExt};
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::domain::foundation::EventEnvelope;
use crate::ports::EventHandler;

/// A raw message received from a bus channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub channel: String,
    pub payload: String,
}

impl InboundMessage {
    pub fn new(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            payload: payload.into(),
        }
    }
}

/// Counters reported when consumption ends.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConsumeReport {
    pub received: usize,
    pub malformed: usize,
    pub failed: usize,
}

/// Dispatches decoded envelopes to a single handler.
pub struct EventConsumer {
    handler: Arc<dyn EventHandler>,
}

impl EventConsumer {
    pub fn new(handler: Arc<dyn EventHandler>) -> Self {
        Self { handler }
    }

    /// Consumes until the stream ends or shutdown is signalled.
    pub async fn consume<S>(&self, messages: S, mut shutdown: watch::Receiver<bool>) -> ConsumeReport
    where
        S: Stream<Item = InboundMessage>,
    {
        tokio::pin!(messages);
        let mut in_flight: JoinSet<bool> = JoinSet::new();
        let mut report = ConsumeReport::default();

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        tracing::info!(in_flight = in_flight.len(), "Event consumer stopping");
                        break;
                    }
                }
                message = messages.next() => {
                    let Some(message) = message else { break };
                    report.received += 1;
                    if !self.dispatch(message, &mut in_flight) {
                        report.malformed += 1;
                    }
                }
                Some(done) = in_flight.join_next(), if !in_flight.is_empty() => {
                    if !matches!(done, Ok(true)) {
                        report.failed += 1;
                    }
                }
            }
        }

        while let Some(done) = in_flight.join_next().await {
            if !matches!(done, Ok(true)) {
                report.failed += 1;
            }
        }

        report
    }

    fn dispatch(&self, message: InboundMessage, in_flight: &mut JoinSet<bool>) -> bool {
        let envelope: EventEnvelope = match serde_json::from_str(&message.payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::warn!(channel = %message.channel, error = %e, "Skipping malformed event");
                return false;
            }
        };

        let handler = Arc::clone(&self.handler);
        in_flight.spawn(async move {
            let event_type = envelope.event_type.clone();
            let event_id = envelope.event_id.clone();
            match handler.handle(envelope).await {
                Ok(()) => true,
                Err(e) => {
                    tracing::error!(
                        handler = handler.name(),
                        event_type = %event_type,
                        event_id = %event_id,
                        error = %e,
                        "Event handling failed"
                    );
                    false
                }
            }
        });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::{DomainError, ErrorCode};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    struct Recorder {
        seen: Mutex<Vec<String>>,
        delay: Duration,
    }

    #[async_trait]
    impl EventHandler for Recorder {
        async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError> {
            tokio::time::sleep(self.delay).await;
            self.seen.lock().unwrap().push(event.event_type.clone());
            if event.event_type == "explode" {
                return Err(DomainError::new(ErrorCode::InternalError, "boom"));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Recorder"
        }
    }

    fn recorder(delay: Duration) -> Arc<Recorder> {
        Arc::new(Recorder {
            seen: Mutex::new(Vec::new()),
            delay,
        })
    }

    fn message(event_type: &str) -> InboundMessage {
        InboundMessage::new("booking-events", json!({"event_type": event_type, "payload": {}}).to_string())
    }

    #[tokio::test]
    async fn consumes_until_stream_ends_and_counts_outcomes() {
        let handler = recorder(Duration::ZERO);
        let consumer = EventConsumer::new(handler.clone());
        let (_tx, rx) = watch::channel(false);
        let messages = futures::stream::iter(vec![
            message("booking.accepted"),
            InboundMessage::new("booking-events", "not json"),
            message("explode"),
        ]);

        let report = consumer.consume(messages, rx).await;

        assert_eq!(
            report,
            ConsumeReport {
                received: 3,
                malformed: 1,
                failed: 1
            }
        );
        assert_eq!(handler.seen.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn shutdown_waits_for_in_flight_handlers() {
        let handler = recorder(Duration::from_millis(50));
        let consumer = EventConsumer::new(handler.clone());
        let (tx, rx) = watch::channel(false);
        let (msg_tx, msg_rx) = futures::channel::mpsc::unbounded();
        msg_tx.unbounded_send(message("booking.accepted")).unwrap();

        let run = tokio::spawn(async move { consumer.consume(msg_rx, rx).await });
        tokio::time::sleep(Duration::from_millis(10)).await;
        tx.send(true).unwrap();
        let report = run.await.unwrap();

        assert_eq!(report.received, 1);
        assert_eq!(handler.seen.lock().unwrap().as_slice(), ["booking.accepted"]);
        drop(msg_tx);
    }
}
