//! # climate-group-adapter-virtual
//!
//! Virtual host that provides simulated thermostats for testing and
//! demonstration purposes.
//!
//! ## Implemented ports
//!
//! | Port | Behaviour |
//! |------|-----------|
//! | `StateReader` | Renders the thermostat as an entity, `None` for unknown ids |
//! | `StateTracker` | Spawned task filtering the host event bus by entity id |
//! | `ServiceCaller` | Applies climate calls to every known target thermostat |
//! | `EventPublisher` | Injects external events into the host bus |
//!
//! Every mutation publishes a `state_changed` event on the host bus.
//!
//! ## Dependency rule
//!
//! Depends on `climate-group-app` (port traits) and `climate-group-domain` only.

mod config;
mod error;
mod thermostat;

pub use config::ThermostatConfig;
pub use error::VirtualError;
pub use thermostat::VirtualThermostat;

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

use climate_group_app::event_bus::InProcessEventBus;
use climate_group_app::ports::{
    EventPublisher, ServiceCaller, StateListener, StateReader, StateTracker, Subscription,
};
use climate_group_domain::entity::Entity;
use climate_group_domain::error::{ClimateGroupError, ValidationError};
use climate_group_domain::event::{Event, EventType};
use climate_group_domain::id::EntityId;
use climate_group_domain::service::{CLIMATE_DOMAIN, ServiceCall};

/// Capacity of the host event bus.
const EVENT_BUS_CAPACITY: usize = 256;

/// In-memory host holding simulated thermostats.
pub struct VirtualHost {
    thermostats: Mutex<BTreeMap<EntityId, VirtualThermostat>>,
    bus: InProcessEventBus,
}

impl Default for VirtualHost {
    fn default() -> Self {
        Self {
            thermostats: Mutex::new(BTreeMap::new()),
            bus: InProcessEventBus::new(EVENT_BUS_CAPACITY),
        }
    }
}

impl VirtualHost {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a host with one thermostat per configuration entry.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration is invalid or two entries share
    /// an entity id.
    pub fn from_configs(configs: &[ThermostatConfig]) -> Result<Self, VirtualError> {
        let host = Self::new();
        for config in configs {
            host.add_thermostat(VirtualThermostat::from_config(config)?)?;
        }
        Ok(host)
    }

    /// Register a thermostat and announce it on the bus.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::DuplicateThermostat`] if the id is taken.
    pub fn add_thermostat(&self, thermostat: VirtualThermostat) -> Result<(), VirtualError> {
        let entity = thermostat.to_entity();
        {
            let mut thermostats = self.lock();
            if thermostats.contains_key(thermostat.entity_id()) {
                return Err(VirtualError::DuplicateThermostat(thermostat.entity_id().clone()));
            }
            thermostats.insert(thermostat.entity_id().clone(), thermostat);
        }
        tracing::debug!(entity_id = %entity.entity_id, "virtual thermostat added");
        self.bus.send(Event::state_changed(None, &entity));
        Ok(())
    }

    /// Ids of every registered thermostat, sorted.
    #[must_use]
    pub fn entity_ids(&self) -> Vec<EntityId> {
        self.lock().keys().cloned().collect()
    }

    /// A copy of the thermostat registered under `entity_id`.
    #[must_use]
    pub fn thermostat(&self, entity_id: &EntityId) -> Option<VirtualThermostat> {
        self.lock().get(entity_id).cloned()
    }

    /// Receiver for every event the host publishes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.bus.subscribe()
    }

    /// Bring a thermostat online or take it offline.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownThermostat`] for an unknown id.
    pub fn set_available(&self, entity_id: &EntityId, available: bool) -> Result<(), VirtualError> {
        self.update(entity_id, |thermostat| thermostat.set_available(available))
    }

    /// Mutate a thermostat in place, publishing a change event if its
    /// rendered entity differs afterwards.
    ///
    /// # Errors
    ///
    /// Returns [`VirtualError::UnknownThermostat`] for an unknown id.
    pub fn update(
        &self,
        entity_id: &EntityId,
        mutate: impl FnOnce(&mut VirtualThermostat),
    ) -> Result<(), VirtualError> {
        let event = {
            let mut thermostats = self.lock();
            let thermostat = thermostats
                .get_mut(entity_id)
                .ok_or_else(|| VirtualError::UnknownThermostat(entity_id.clone()))?;
            let before = thermostat.to_entity();
            mutate(thermostat);
            thermostat
                .touch(&before)
                .map(|after| Event::state_changed(Some(&before), &after))
        };
        if let Some(event) = event {
            self.bus.send(event);
        }
        Ok(())
    }

    /// Advance the simulation: every available thermostat drifts up to
    /// `degrees` toward its setpoint.
    pub fn step(&self, degrees: f64) {
        for entity_id in self.entity_ids() {
            let result = self.update(&entity_id, |thermostat| {
                if thermostat.is_available() {
                    thermostat.step(degrees);
                }
            });
            if let Err(err) = result {
                tracing::warn!(%entity_id, error = %err, "simulation step skipped");
            }
        }
    }

    fn apply_call(&self, call: &ServiceCall) -> Result<(), ClimateGroupError> {
        let service = call
            .climate_service()
            .filter(|_| call.domain == CLIMATE_DOMAIN)
            .ok_or_else(|| {
                ValidationError::UnknownService(format!("{}.{}", call.domain, call.service))
            })?;

        for entity_id in &call.entity_ids {
            let applied = self.update(entity_id, |thermostat| {
                if thermostat.is_available() {
                    thermostat.apply(service, &call.data);
                } else {
                    tracing::debug!(%entity_id, %service, "thermostat unavailable, skipping");
                }
            });
            if let Err(VirtualError::UnknownThermostat(_)) = applied {
                tracing::debug!(%entity_id, %service, "no such thermostat, skipping");
            }
        }

        self.bus.send(Event::new(
            EventType::ServiceCalled,
            None,
            serde_json::json!({
                "domain": call.domain,
                "service": call.service,
                "entity_ids": call.entity_ids,
                "data": call.data,
            }),
        ));
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<EntityId, VirtualThermostat>> {
        self.thermostats
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl StateReader for VirtualHost {
    fn get_state(&self, entity_id: &EntityId) -> Option<Entity> {
        self.lock().get(entity_id).map(VirtualThermostat::to_entity)
    }
}

impl StateTracker for VirtualHost {
    fn track_state_changes(
        &self,
        entity_ids: &[EntityId],
        listener: StateListener,
    ) -> Result<Subscription, ClimateGroupError> {
        let runtime = tokio::runtime::Handle::try_current().map_err(VirtualError::NoRuntime)?;
        let tracked: HashSet<EntityId> = entity_ids.iter().cloned().collect();

        let mut events =
            BroadcastStream::new(self.bus.subscribe()).filter_map(|result| match result {
                Ok(event) => Some(event),
                Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "state tracker lagged, some events were dropped");
                    // Changes were missed: notify once so the listener re-reads.
                    Some(Event::new(
                        EventType::StateChanged,
                        None,
                        serde_json::json!({ "lagged": skipped }),
                    ))
                }
            });

        let task = runtime.spawn(async move {
            while let Some(event) = events.next().await {
                if event.event_type != EventType::StateChanged {
                    continue;
                }
                let relevant = event
                    .entity_id
                    .as_ref()
                    .is_none_or(|entity_id| tracked.contains(entity_id));
                if relevant {
                    listener(&event);
                }
            }
        });

        Ok(Subscription::new(move || task.abort()))
    }
}

impl ServiceCaller for VirtualHost {
    fn call_service(
        &self,
        call: ServiceCall,
    ) -> impl Future<Output = Result<(), ClimateGroupError>> + Send {
        tracing::debug!(%call, "virtual host handling service call");
        let result = self.apply_call(&call);
        async move { result }
    }
}

impl EventPublisher for VirtualHost {
    fn publish(&self, event: Event) -> impl Future<Output = Result<(), ClimateGroupError>> + Send {
        self.bus.publish(event)
    }
}
