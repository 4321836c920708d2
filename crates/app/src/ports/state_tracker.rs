//! State tracker port — change notifications for a fixed set of entities.

use std::sync::Arc;

use climate_group_domain::error::ClimateGroupError;
use climate_group_domain::event::Event;
use climate_group_domain::id::{EntityId, SubscriptionId};

/// Callback invoked for every state change of a tracked entity.
///
/// Runs on the host's notification path: it must return quickly and must
/// not block.
pub type StateListener = Box<dyn Fn(&Event) + Send + Sync + 'static>;

type Cancel = Box<dyn FnOnce() + Send + Sync + 'static>;

/// Handle to an active tracking registration.
///
/// Cancels the registration on [`unsubscribe`](Self::unsubscribe) or when
/// dropped. Cancelling twice is a no-op.
pub struct Subscription {
    id: SubscriptionId,
    cancel: Option<Cancel>,
}

impl Subscription {
    /// Wrap the host's cancellation action.
    pub fn new(cancel: impl FnOnce() + Send + Sync + 'static) -> Self {
        Self {
            id: SubscriptionId::new(),
            cancel: Some(Box::new(cancel)),
        }
    }

    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.cancel.is_some()
    }

    /// Stop receiving notifications.
    ///
    /// Returns `true` if this call cancelled the registration, `false` if
    /// it was already cancelled.
    pub fn unsubscribe(&mut self) -> bool {
        match self.cancel.take() {
            Some(cancel) => {
                cancel();
                tracing::debug!(subscription = %self.id, "state tracking cancelled");
                true
            }
            None => false,
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.unsubscribe();
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Registers listeners for state changes of host entities.
pub trait StateTracker: Send + Sync {
    /// Invoke `listener` for every state change of any of `entity_ids`
    /// until the returned [`Subscription`] is cancelled.
    ///
    /// # Errors
    ///
    /// Returns an error when the host cannot register the listener.
    fn track_state_changes(
        &self,
        entity_ids: &[EntityId],
        listener: StateListener,
    ) -> Result<Subscription, ClimateGroupError>;
}

impl<T: StateTracker> StateTracker for Arc<T> {
    fn track_state_changes(
        &self,
        entity_ids: &[EntityId],
        listener: StateListener,
    ) -> Result<Subscription, ClimateGroupError> {
        (**self).track_state_changes(entity_ids, listener)
    }
}
