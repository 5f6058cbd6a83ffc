//! In-process event bus.
//!
//! `publish` awaits every handler subscribed to the envelope's event type, in
//! subscription order, before returning. The server wires the divergence
//! trigger onto it; tests build it with [`InMemoryEventBus::recording`] and
//! inspect what went out.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::{debug, warn};

use crate::domain::foundation::{DomainError, ErrorCode, EventEnvelope};
use crate::ports::{EventHandler, EventPublisher, EventSubscriber};

type Subscriptions = HashMap<String, Vec<Arc<dyn EventHandler>>>;

pub struct InMemoryEventBus {
    subscriptions: RwLock<Subscriptions>,
    history: Option<Mutex<Vec<EventEnvelope>>>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self {
            subscriptions: RwLock::default(),
            history: None,
        }
    }

    /// A bus that also remembers every envelope it was given.
    pub fn recording() -> Self {
        Self {
            subscriptions: RwLock::default(),
            history: Some(Mutex::default()),
        }
    }

    /// Remembered envelopes of `event_type`, oldest first.
    ///
    /// Always empty unless the bus was built with [`Self::recording`].
    pub fn events_of_type(&self, event_type: &str) -> Vec<EventEnvelope> {
        let Some(history) = &self.history else {
            return Vec::new();
        };
        history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|envelope| envelope.event_type == event_type)
            .cloned()
            .collect()
    }

    pub fn has_event(&self, event_type: &str) -> bool {
        !self.events_of_type(event_type).is_empty()
    }

    fn handlers_for(&self, event_type: &str) -> Vec<Arc<dyn EventHandler>> {
        self.subscriptions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(event_type)
            .cloned()
            .unwrap_or_default()
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
        if let Some(history) = &self.history {
            history
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(event.clone());
        }

        let handlers = self.handlers_for(&event.event_type);
        debug!(
            event_type = %event.event_type,
            event_id = %event.event_id,
            handlers = handlers.len(),
            "Dispatching event"
        );

        let mut failed = Vec::new();
        for handler in handlers {
            if let Err(e) = handler.handle(event.clone()).await {
                warn!(handler = handler.name(), event_id = %event.event_id, error = %e, "Event handler failed");
                failed.push(format!("{}: {}", handler.name(), e));
            }
        }

        if failed.is_empty() {
            Ok(())
        } else {
            Err(DomainError::new(
                ErrorCode::InternalError,
                format!("Event handlers failed: {}", failed.join("; ")),
            ))
        }
    }

    async fn publish_all(&self, events: Vec<EventEnvelope>) -> Result<(), DomainError> {
        for event in events {
            self.publish(event).await?;
        }
        Ok(())
    }
}

impl EventSubscriber for InMemoryEventBus {
    fn subscribe(&self, event_type: &str, handler: Arc<dyn EventHandler>) {
        // Subscribing only appends, so a poisoned map is still usable.
        self.subscriptions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(event_type.to_string())
            .or_default()
            .push(handler);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn envelope(event_type: &str) -> EventEnvelope {
        EventEnvelope::new(event_type, "campaign-1", "Campaign", json!({}))
    }

    /// Counts deliveries; fails every one when `fail` is set.
    struct Probe {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Probe {
        fn counting(calls: &Arc<AtomicUsize>) -> Arc<Self> {
            Arc::new(Self { calls: calls.clone(), fail: false })
        }

        fn failing(calls: &Arc<AtomicUsize>) -> Arc<Self> {
            Arc::new(Self { calls: calls.clone(), fail: true })
        }
    }

    #[async_trait]
    impl EventHandler for Probe {
        async fn handle(&self, _: EventEnvelope) -> Result<(), DomainError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(DomainError::new(ErrorCode::InternalError, "probe refused"));
            }
            Ok(())
        }

        fn name(&self) -> &'static str {
            "Probe"
        }
    }

    #[tokio::test]
    async fn recording_bus_filters_history_by_type() {
        let bus = InMemoryEventBus::recording();

        bus.publish_all(vec![envelope("survey.a"), envelope("survey.b"), envelope("survey.a")])
            .await
            .unwrap();

        assert_eq!(bus.events_of_type("survey.a").len(), 2);
        assert!(bus.has_event("survey.b"));
        assert!(!bus.has_event("survey.c"));
    }

    #[tokio::test]
    async fn plain_bus_remembers_nothing() {
        let bus = InMemoryEventBus::new();
        bus.publish(envelope("survey.a")).await.unwrap();
        assert!(!bus.has_event("survey.a"));
    }

    #[tokio::test]
    async fn only_handlers_of_the_published_type_run() {
        let bus = InMemoryEventBus::new();
        let a_calls = Arc::new(AtomicUsize::new(0));
        let b_calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("survey.a", Probe::counting(&a_calls));
        bus.subscribe("survey.a", Probe::counting(&a_calls));
        bus.subscribe("survey.b", Probe::counting(&b_calls));

        bus.publish(envelope("survey.a")).await.unwrap();

        assert_eq!(a_calls.load(Ordering::SeqCst), 2);
        assert_eq!(b_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn failing_handler_does_not_starve_later_handlers() {
        let bus = InMemoryEventBus::new();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("survey.a", Probe::failing(&calls));
        bus.subscribe("survey.a", Probe::counting(&calls));

        let err = bus.publish(envelope("survey.a")).await.unwrap_err();

        assert_eq!(err.code, ErrorCode::InternalError);
        assert!(err.message.contains("probe refused"));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn publish_all_stops_at_first_failure() {
        let bus = InMemoryEventBus::recording();
        let calls = Arc::new(AtomicUsize::new(0));
        bus.subscribe("survey.a", Probe::failing(&calls));

        let result = bus
            .publish_all(vec![envelope("survey.b"), envelope("survey.a"), envelope("survey.c")])
            .await;

        assert!(result.is_err());
        assert!(bus.has_event("survey.b"));
        assert!(!bus.has_event("survey.c"));
    }
}
