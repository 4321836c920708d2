//! Climate group — a virtual thermostat backed by a fixed set of members.
//!
//! The group reads every member on each change notification, reduces the
//! snapshots into one [`CompositeState`] and replaces its state wholesale.
//! Commands go the other way: one service call fanned out to all members.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use climate_group_domain::climate::{ClimateCommand, CompositeState, reduction};
use climate_group_domain::error::ClimateGroupError;
use climate_group_domain::event::Event;
use climate_group_domain::group::GroupDefinition;

use crate::collector;
use crate::dispatcher::{self, DispatchOutcome};
use crate::ports::{ServiceCaller, StateListener, StateReader, StateTracker, Subscription};

/// One running climate group.
///
/// `H` is the host: anything that can read, track and command members.
pub struct ClimateGroup<H> {
    definition: GroupDefinition,
    host: H,
    state: watch::Sender<CompositeState>,
    subscription: Mutex<Option<Subscription>>,
}

impl<H> ClimateGroup<H>
where
    H: StateReader + StateTracker + ServiceCaller + 'static,
{
    /// Create a stopped group whose state is the zeroed initial state.
    pub fn new(definition: GroupDefinition, host: H) -> Self {
        let initial = CompositeState::initial(
            definition.name.clone(),
            definition.temperature_unit,
            definition.entities.clone(),
            definition.exclude.clone(),
        );
        let (state, _) = watch::channel(initial);
        Self {
            definition,
            host,
            state,
            subscription: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn definition(&self) -> &GroupDefinition {
        &self.definition
    }

    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// The last computed composite state.
    #[must_use]
    pub fn current_state(&self) -> CompositeState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state replacement.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<CompositeState> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.state.borrow().available
    }

    #[must_use]
    pub fn extra_state_attributes(&self) -> serde_json::Value {
        self.state.borrow().extra_state_attributes()
    }

    /// Whether the group currently holds a member subscription.
    #[must_use]
    pub fn is_tracking(&self) -> bool {
        self.lock_subscription().is_some()
    }

    /// Read all members, reduce and publish the new composite state.
    pub fn refresh(&self) -> CompositeState {
        let sets = collector::collect(
            &self.host,
            &self.definition.entities,
            &self.definition.exclude,
        );
        let next = reduction::reduce(&self.definition, &sets);
        tracing::debug!(
            group = %self.definition.name,
            available = next.available,
            hvac_mode = ?next.hvac_mode,
            hvac_action = ?next.hvac_action,
            target_temperature = ?next.target_temperature,
            current_temperature = ?next.current_temperature,
            "climate group updated"
        );
        self.state.send_replace(next.clone());
        next
    }

    /// Subscribe to member changes, compute the first state and spawn the
    /// update loop.
    ///
    /// Calling `start` on a running group replaces its subscription.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateGroupError::Host`] when called outside a tokio
    /// runtime, or the host's error if it refuses the subscription.
    pub fn start(self: &Arc<Self>) -> Result<JoinHandle<()>, ClimateGroupError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|err| ClimateGroupError::Host(Box::new(err)))?;

        // Capacity 1: a queued notice already covers any later change.
        let (notify, changes) = mpsc::channel::<()>(1);
        let listener: StateListener = Box::new(move |event: &Event| {
            if notify.try_send(()).is_ok() {
                tracing::trace!(entity_id = ?event.entity_id, "member changed, refresh queued");
            }
        });
        let subscription = self
            .host
            .track_state_changes(&self.definition.entities, listener)?;
        if let Some(mut previous) = self.lock_subscription().replace(subscription) {
            previous.unsubscribe();
        }

        self.refresh();
        tracing::info!(
            group = %self.definition.name,
            members = self.definition.entities.len(),
            "climate group started"
        );
        Ok(runtime.spawn(run_update_loop(Arc::downgrade(self), changes)))
    }

    /// Cancel the member subscription.
    ///
    /// Returns `false` when the group was not tracking anything.
    pub fn stop(&self) -> bool {
        let taken = self.lock_subscription().take();
        match taken {
            Some(mut subscription) => {
                let cancelled = subscription.unsubscribe();
                tracing::info!(group = %self.definition.name, "climate group stopped");
                cancelled
            }
            None => false,
        }
    }

    /// Forward `command` to every member.
    ///
    /// # Errors
    ///
    /// Returns the host's delivery error unchanged.
    pub async fn apply_command(
        &self,
        command: &ClimateCommand,
    ) -> Result<DispatchOutcome, ClimateGroupError> {
        let outcome = dispatcher::dispatch(&self.host, &self.definition.entities, command).await?;
        if self.definition.refresh_after_command && matches!(outcome, DispatchOutcome::Sent(_)) {
            self.refresh();
        }
        Ok(outcome)
    }

    /// Validate a raw service call addressed to the group and forward it.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateGroupError::Validation`] for a malformed call and
    /// the host's error if delivery fails.
    pub async fn handle_service_call(
        &self,
        service: &str,
        data: &serde_json::Value,
    ) -> Result<DispatchOutcome, ClimateGroupError> {
        let command = ClimateCommand::parse(service, data)?;
        self.apply_command(&command).await
    }

    fn lock_subscription(&self) -> MutexGuard<'_, Option<Subscription>> {
        self.subscription
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

async fn run_update_loop<H>(group: Weak<ClimateGroup<H>>, mut changes: mpsc::Receiver<()>)
where
    H: StateReader + StateTracker + ServiceCaller + 'static,
{
    while changes.recv().await.is_some() {
        let Some(group) = group.upgrade() else {
            break;
        };
        group.refresh();
    }
    tracing::debug!("climate group update loop ended");
}
