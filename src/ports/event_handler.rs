//! EventHandler port - Interface for consuming events from the bus.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Handler for processing events from the bus.
///
/// Delivery upstream is at-least-once, so implementations must be safe to
/// invoke again with an event they already processed.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Process an event.
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Handler name for logging.
    fn name(&self) -> &'static str;
}
