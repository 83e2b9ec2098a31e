//! In-memory event bus.
//!
//! Stands in for the Redis publisher in tests and local runs, recording
//! every envelope in publish order. Uses `.expect()` on lock operations; a poisoned lock here means a
//! test already panicked.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::EventPublisher;

/// In-memory event bus recording every published envelope.
///
/// ```ignore
/// let bus = Arc::new(InMemoryEventBus::new());
/// bus.publish(envelope).await?;
/// assert!(bus.has_event("tracking.started"));
/// ```
pub struct InMemoryEventBus {
    published: RwLock<Vec<EventEnvelope>>,
    reject_publishes: AtomicBool,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            published: RwLock::new(Vec::new()),
            reject_publishes: AtomicBool::new(false),
        }
    }

    /// Makes every subsequent publish fail, simulating a broker outage.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.reject_publishes.store(unavailable, Ordering::SeqCst);
    }

    // === Test Helpers ===

    /// Returns all published events in publish order.
    pub fn published_events(&self) -> Vec<EventEnvelope> {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .clone()
    }

    /// Returns events of a specific type.
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        self.published_events()
            .into_iter()
            .filter(|e| e.event_type == event_type)
            .collect()
    }

    pub fn event_count(&self) -> usize {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .len()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        self.published
            .read()
            .expect("InMemoryEventBus: published lock poisoned")
            .iter()
            .any(|e| e.event_type == event_type)
    }

    pub fn clear(&self) {
        self.published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned")
            .clear();
    }
}

impl Default for InMemoryEventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventPublisher for InMemoryEventBus {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError> {
        if self.reject_publishes.load(Ordering::SeqCst) {
            return Err(DomainError::new(
                ErrorCode::EventBusError,
                format!("Event bus unavailable, dropped {}", event.event_type),
            ));
        }

        self.published
            .write()
            .expect("InMemoryEventBus: published write lock poisoned")
            .push(event);

        Ok(())
    }
}
