//! In-process event bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use zonelight_domain::error::ZonelightError;
use zonelight_domain::event::SceneEvent;

use crate::ports::EventPublisher;

/// In-process event bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the event is simply dropped).
pub struct InProcessEventBus {
    sender: broadcast::Sender<SceneEvent>,
}

impl InProcessEventBus {
    /// Create a new event bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SceneEvent> {
        self.sender.subscribe()
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(&self, event: SceneEvent) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        tracing::debug!(zone_id = %event.zone_id, action = %event.action, scene = %event.scene, "scene event");
        // send only fails without receivers
        let _ = self.sender.send(event);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use zonelight_domain::event::SceneAction;
    use zonelight_domain::id::ZoneId;

    fn event(scene: &str) -> SceneEvent {
        SceneEvent::new(ZoneId::from_name("Hall"), SceneAction::Activate, scene)
    }

    #[tokio::test]
    async fn should_deliver_event_to_every_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        let event = event("Party");
        let event_id = event.id;
        bus.publish(event).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap().id, event_id);
        assert_eq!(rx2.recv().await.unwrap().id, event_id);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        assert!(bus.publish(event("Party")).await.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_events_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(event("Early")).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(event("Late")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap().scene, "Late");
    }
}
