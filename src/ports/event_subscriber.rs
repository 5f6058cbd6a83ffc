//! Inbound side of the event flow: handlers and their registration.

use async_trait::async_trait;
use std::sync::Arc;

use crate::domain::foundation::{DomainError, EventEnvelope};

/// Reacts to envelopes of the event types it was subscribed to.
///
/// Delivery is at-least-once from the handler's point of view, so `handle`
/// must tolerate seeing the same envelope twice.
#[async_trait]
pub trait EventHandler: Send + Sync {
    async fn handle(&self, event: EventEnvelope) -> Result<(), DomainError>;

    /// Used in logs and aggregated handler errors.
    fn name(&self) -> &'static str;
}

pub trait EventSubscriber: Send + Sync {
    /// Registers `handler` for envelopes whose `event_type` equals `event_type`.
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>);
}
