//! Outbound side of the event flow.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Sends envelopes to whoever listens.
///
/// Callers treat publishing as best effort: a failure is logged and never
/// rolls back the state change that produced the event.
#[async_trait]
pub trait EventPublisher: Send + Sync {
    async fn publish(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Publishes in order and stops at the first failure. Envelopes before
    /// the failing one have already been delivered.
    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError>;
}
