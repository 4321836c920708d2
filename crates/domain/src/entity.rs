//! Entity — the raw state record a host keeps for one device.
//!
//! An entity carries a state string (for climate devices, the hvac mode)
//! and a bag of loosely typed attributes. Nothing here is trusted: the
//! climate layer converts entities into typed snapshots at the boundary.

mod attribute_value;
mod state;

pub use attribute_value::AttributeValue;
pub use state::EntityState;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{ClimateGroupError, ValidationError};
use crate::id::EntityId;
use crate::time::{Timestamp, now};

/// A host entity as last reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: EntityId,
    pub friendly_name: String,
    pub state: EntityState,
    #[serde(default)]
    pub attributes: HashMap<String, AttributeValue>,
    pub last_changed: Timestamp,
    pub last_updated: Timestamp,
}

impl Entity {
    /// Create a builder for constructing an [`Entity`].
    #[must_use]
    pub fn builder() -> EntityBuilder {
        EntityBuilder::default()
    }

    #[must_use]
    pub fn get_attribute(&self, key: &str) -> Option<&AttributeValue> {
        self.attributes.get(key)
    }

    /// Replace the state, bumping `last_changed` only when it differs.
    pub fn update_state(&mut self, state: EntityState, ts: Timestamp) {
        if self.state != state {
            self.state = state;
            self.last_changed = ts;
        }
        self.last_updated = ts;
    }

    /// Insert or replace one attribute.
    pub fn set_attribute(&mut self, key: impl Into<String>, value: AttributeValue, ts: Timestamp) {
        self.attributes.insert(key.into(), value);
        self.last_updated = ts;
    }
}

/// Step-by-step builder for [`Entity`].
#[derive(Debug, Default)]
pub struct EntityBuilder {
    entity_id: Option<String>,
    friendly_name: Option<String>,
    state: EntityState,
    attributes: HashMap<String, AttributeValue>,
}

impl EntityBuilder {
    #[must_use]
    pub fn entity_id(mut self, entity_id: impl Into<String>) -> Self {
        self.entity_id = Some(entity_id.into());
        self
    }

    #[must_use]
    pub fn friendly_name(mut self, name: impl Into<String>) -> Self {
        self.friendly_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn state(mut self, state: impl Into<EntityState>) -> Self {
        self.state = state.into();
        self
    }

    #[must_use]
    pub fn attribute(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Add the attribute only when `value` is `Some`.
    #[must_use]
    pub fn maybe_attribute<V: Into<AttributeValue>>(
        self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.attribute(key, value),
            None => self,
        }
    }

    /// Consume the builder, validate, and return an [`Entity`].
    ///
    /// The friendly name falls back to the object id.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateGroupError::Validation`] if the entity id is missing
    /// or malformed.
    pub fn build(self) -> Result<Entity, ClimateGroupError> {
        let raw = self
            .entity_id
            .ok_or(ValidationError::InvalidEntityId(String::new()))?;
        let entity_id: EntityId = raw.parse()?;
        let ts = now();
        Ok(Entity {
            friendly_name: self
                .friendly_name
                .unwrap_or_else(|| entity_id.object_id().to_string()),
            entity_id,
            state: self.state,
            attributes: self.attributes,
            last_changed: ts,
            last_updated: ts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_build_entity_with_attributes() {
        let entity = Entity::builder()
            .entity_id("climate.kitchen")
            .friendly_name("Kitchen")
            .state("heat")
            .attribute("temperature", 21.5)
            .build()
            .unwrap();

        assert_eq!(entity.entity_id.as_str(), "climate.kitchen");
        assert_eq!(entity.state, EntityState::Reported("heat".to_string()));
        assert_eq!(
            entity.get_attribute("temperature"),
            Some(&AttributeValue::Float(21.5))
        );
    }

    #[test]
    fn should_default_friendly_name_to_object_id() {
        let entity = Entity::builder()
            .entity_id("climate.bedroom")
            .build()
            .unwrap();
        assert_eq!(entity.friendly_name, "bedroom");
        assert_eq!(entity.state, EntityState::Unknown);
    }

    #[test]
    fn should_reject_missing_entity_id() {
        let result = Entity::builder().build();
        assert!(matches!(
            result,
            Err(ClimateGroupError::Validation(
                ValidationError::InvalidEntityId(_)
            ))
        ));
    }

    #[test]
    fn should_skip_absent_optional_attribute() {
        let entity = Entity::builder()
            .entity_id("climate.bedroom")
            .maybe_attribute("fan_mode", None::<String>)
            .maybe_attribute("preset_mode", Some("eco"))
            .build()
            .unwrap();
        assert!(entity.get_attribute("fan_mode").is_none());
        assert!(entity.get_attribute("preset_mode").is_some());
    }

    #[test]
    fn should_bump_last_changed_only_when_state_differs() {
        let mut entity = Entity::builder()
            .entity_id("climate.office")
            .state("off")
            .build()
            .unwrap();
        let first_change = entity.last_changed;

        let later = first_change + chrono::Duration::seconds(5);
        entity.update_state(EntityState::from("off"), later);
        assert_eq!(entity.last_changed, first_change);
        assert_eq!(entity.last_updated, later);

        let even_later = later + chrono::Duration::seconds(5);
        entity.update_state(EntityState::from("heat"), even_later);
        assert_eq!(entity.last_changed, even_later);
    }
}
