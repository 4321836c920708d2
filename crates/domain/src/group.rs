//! Group definition — the configured identity of one climate group.

use serde::Serialize;

use crate::climate::TemperatureUnit;
use crate::error::{ClimateGroupError, ValidationError};
use crate::id::EntityId;
use crate::service::CLIMATE_DOMAIN;

/// Name used when the configuration does not give one.
pub const DEFAULT_NAME: &str = "Climate Group";

/// Validated configuration of a climate group.
///
/// The member list is fixed for the lifetime of the group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GroupDefinition {
    pub name: String,
    pub temperature_unit: TemperatureUnit,
    /// Member entities, in configuration order, without duplicates.
    pub entities: Vec<EntityId>,
    /// Presets whose members are left out of the working set.
    pub exclude: Vec<String>,
    /// Recompute right after a successful command instead of waiting for
    /// the members' change notifications.
    pub refresh_after_command: bool,
}

impl GroupDefinition {
    /// Create a builder for constructing a [`GroupDefinition`].
    #[must_use]
    pub fn builder() -> GroupDefinitionBuilder {
        GroupDefinitionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateGroupError::Validation`] when:
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - there are no members ([`ValidationError::NoMembers`])
    /// - a member is outside the climate domain ([`ValidationError::NotClimateEntity`])
    pub fn validate(&self) -> Result<(), ClimateGroupError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.entities.is_empty() {
            return Err(ValidationError::NoMembers.into());
        }
        if let Some(foreign) = self
            .entities
            .iter()
            .find(|id| id.domain() != CLIMATE_DOMAIN)
        {
            return Err(ValidationError::NotClimateEntity(foreign.to_string()).into());
        }
        Ok(())
    }
}

/// Step-by-step builder for [`GroupDefinition`].
#[derive(Debug, Default)]
pub struct GroupDefinitionBuilder {
    name: Option<String>,
    temperature_unit: Option<TemperatureUnit>,
    entities: Vec<String>,
    exclude: Vec<String>,
    refresh_after_command: bool,
}

impl GroupDefinitionBuilder {
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn temperature_unit(mut self, unit: TemperatureUnit) -> Self {
        self.temperature_unit = Some(unit);
        self
    }

    #[must_use]
    pub fn entity(mut self, entity_id: impl Into<String>) -> Self {
        self.entities.push(entity_id.into());
        self
    }

    #[must_use]
    pub fn entities<I, S>(mut self, entity_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities.extend(entity_ids.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn exclude(mut self, preset: impl Into<String>) -> Self {
        self.exclude.push(preset.into());
        self
    }

    #[must_use]
    pub fn refresh_after_command(mut self, enabled: bool) -> Self {
        self.refresh_after_command = enabled;
        self
    }

    /// Consume the builder, validate, and return a [`GroupDefinition`].
    ///
    /// # Errors
    ///
    /// Returns [`ClimateGroupError::Validation`] if a member id is malformed
    /// or the definition breaks an invariant (see [`GroupDefinition::validate`]).
    pub fn build(self) -> Result<GroupDefinition, ClimateGroupError> {
        let mut entities: Vec<EntityId> = Vec::with_capacity(self.entities.len());
        for raw in self.entities {
            let id: EntityId = raw.parse()?;
            if !entities.contains(&id) {
                entities.push(id);
            }
        }
        let definition = GroupDefinition {
            name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
            temperature_unit: self.temperature_unit.unwrap_or_default(),
            entities,
            exclude: self.exclude,
            refresh_after_command: self.refresh_after_command,
        };
        definition.validate()?;
        Ok(definition)
    }
}
