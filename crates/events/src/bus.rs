//! In-process event bus backed by a `tokio::sync::broadcast` channel.
//!
//! Handlers publish after their database write has committed; subscribers
//! (the notification dispatcher) react asynchronously, so a slow or failing
//! subscriber never holds up a request.

use chrono::{DateTime, Utc};
use roofdesk_core::types::DbId;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

// ---------------------------------------------------------------------------
// PlatformEvent
// ---------------------------------------------------------------------------

/// Something that happened to a project, inventory row or user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEvent {
    /// Dot-separated event name, e.g. `"proposal.sent"`.
    pub event_type: String,

    /// Kind of the entity the event is about (`"project"`, `"warehouse"`).
    pub entity_type: Option<String>,

    pub entity_id: Option<DbId>,

    /// User whose request caused the event.
    pub actor_user_id: Option<DbId>,

    /// Event-specific data. For workflow events this is a serialized
    /// [`ProjectNotice`](crate::ProjectNotice).
    pub payload: serde_json::Value,

    pub timestamp: DateTime<Utc>,
}

impl PlatformEvent {
    pub fn new(event_type: impl Into<String>) -> Self {
        Self {
            event_type: event_type.into(),
            entity_type: None,
            entity_id: None,
            actor_user_id: None,
            payload: serde_json::Value::Object(Default::default()),
            timestamp: Utc::now(),
        }
    }

    pub fn with_entity(mut self, entity_type: impl Into<String>, entity_id: DbId) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_actor(mut self, user_id: DbId) -> Self {
        self.actor_user_id = Some(user_id);
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Default buffer capacity for the broadcast channel.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Fan-out event bus shared as `Arc<EventBus>` through the app state.
///
/// When the buffer is full the oldest unread events are dropped and slow
/// receivers observe `RecvError::Lagged`.
pub struct EventBus {
    sender: broadcast::Sender<PlatformEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event and return how many subscribers will see it.
    ///
    /// With no subscribers the event is dropped and `0` is returned.
    pub fn publish(&self, event: PlatformEvent) -> usize {
        match self.sender.send(event) {
            Ok(receivers) => receivers,
            Err(broadcast::error::SendError(event)) => {
                tracing::debug!(event_type = %event.event_type, "No subscribers for event");
                0
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PlatformEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscriber_receives_published_event() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();

        let delivered = bus.publish(
            PlatformEvent::new("proposal.sent")
                .with_entity("project", 42)
                .with_actor(7)
                .with_payload(serde_json::json!({"amount": 12500.0})),
        );
        assert_eq!(delivered, 1);

        let received = rx.recv().await.expect("should receive the event");
        assert_eq!(received.event_type, "proposal.sent");
        assert_eq!(received.entity_type.as_deref(), Some("project"));
        assert_eq!(received.entity_id, Some(42));
        assert_eq!(received.actor_user_id, Some(7));
        assert_eq!(received.payload["amount"], 12500.0);
    }

    #[tokio::test]
    async fn every_subscriber_gets_a_copy() {
        let bus = EventBus::default();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        bus.publish(PlatformEvent::new("project.completed"));

        assert_eq!(rx1.recv().await.unwrap().event_type, "project.completed");
        assert_eq!(rx2.recv().await.unwrap().event_type, "project.completed");
    }

    #[test]
    fn publish_without_subscribers_is_dropped() {
        let bus = EventBus::default();
        assert_eq!(bus.publish(PlatformEvent::new("orphan.event")), 0);
    }

    #[tokio::test]
    async fn slow_subscriber_observes_lag() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();
        for i in 0..4 {
            bus.publish(PlatformEvent::new(format!("burst.{i}")));
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(2))
        ));
        assert_eq!(rx.recv().await.unwrap().event_type, "burst.2");
    }
}
