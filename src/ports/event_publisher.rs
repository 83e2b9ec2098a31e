//! EventPublisher port - Interface for publishing domain events.
//!
//! The application publishes tracking notifications without knowing about
//! the underlying transport (in-memory, Redis pub/sub).

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Port for publishing domain events.
///
/// Callers in this service treat publishing as best-effort: a failure is
/// logged and never rolls back persisted state.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    /// Publish a single event.
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publish multiple events in order, stopping at the first failure.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}
