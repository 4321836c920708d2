//! Event bus port — publish/subscribe for host events.

use std::future::Future;

use climate_group_domain::error::ClimateGroupError;
use climate_group_domain::event::Event;

/// Publishes events to interested subscribers.
pub trait EventPublisher {
    /// Publish an event to all current subscribers.
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), ClimateGroupError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for std::sync::Arc<T> {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), ClimateGroupError>> + Send {
        (**self).publish(event)
    }
}
