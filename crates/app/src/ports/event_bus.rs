//! Event bus port: publish scene events to interested subscribers.

use std::future::Future;

use zonelight_domain::error::ZonelightError;
use zonelight_domain::event::SceneEvent;

/// Publishes scene events to all current subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: SceneEvent) -> impl Future<Output = Result<(), ZonelightError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: SceneEvent) -> impl Future<Output = Result<(), ZonelightError>> + Send {
        (**self).publish(event)
    }
}
