//! Event — an immutable record of something that happened on the host.
//!
//! Hosts publish a [`EventType::StateChanged`] event every time an
//! entity's state or attributes change. Climate groups subscribe to these
//! for their members and recompute on each one.

use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::id::{EntityId, EventId};
use crate::time::{Timestamp, now};

/// Kind of event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    StateChanged,
    ServiceCalled,
}

impl std::fmt::Display for EventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StateChanged => f.write_str("state_changed"),
            Self::ServiceCalled => f.write_str("service_called"),
        }
    }
}

/// A published event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub entity_id: Option<EntityId>,
    pub data: serde_json::Value,
    pub timestamp: Timestamp,
}

impl Event {
    /// Create an event stamped with the current time.
    #[must_use]
    pub fn new(
        event_type: EventType,
        entity_id: Option<EntityId>,
        data: serde_json::Value,
    ) -> Self {
        Self {
            id: EventId::new(),
            event_type,
            entity_id,
            data,
            timestamp: now(),
        }
    }

    /// Build a `state_changed` event from the previous and current entity.
    ///
    /// `old` is `None` when the entity just appeared.
    #[must_use]
    pub fn state_changed(old: Option<&Entity>, new: &Entity) -> Self {
        Self::new(
            EventType::StateChanged,
            Some(new.entity_id.clone()),
            serde_json::json!({
                "from": old.map(|entity| entity.state.to_string()),
                "to": new.state.to_string(),
            }),
        )
    }
}
