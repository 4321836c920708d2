//! Virtual thermostat — a simulated climate device.
//!
//! The thermostat owns its typed state and renders it as a host
//! [`Entity`] on demand. It validates commands against its own
//! capabilities: anything it does not support is ignored.

use std::collections::HashMap;

use serde_json::{Map, Value};

use climate_group_domain::climate::{ClimateFeatures, HvacAction, HvacMode, attr};
use climate_group_domain::entity::{AttributeValue, Entity, EntityState};
use climate_group_domain::error::{ClimateGroupError, ValidationError};
use climate_group_domain::id::EntityId;
use climate_group_domain::service::{CLIMATE_DOMAIN, ClimateService};
use climate_group_domain::time::{Timestamp, now};

use crate::config::ThermostatConfig;

/// A simulated thermostat.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualThermostat {
    entity_id: EntityId,
    name: String,
    available: bool,
    pub hvac_mode: HvacMode,
    pub hvac_modes: Vec<HvacMode>,
    pub current_temperature: f64,
    pub target_temperature: Option<f64>,
    pub target_temp_low: Option<f64>,
    pub target_temp_high: Option<f64>,
    pub min_temp: f64,
    pub max_temp: f64,
    pub fan_mode: Option<String>,
    pub fan_modes: Vec<String>,
    pub swing_mode: Option<String>,
    pub swing_modes: Vec<String>,
    pub preset_mode: Option<String>,
    pub preset_modes: Vec<String>,
    last_changed: Timestamp,
    last_updated: Timestamp,
}

impl VirtualThermostat {
    /// Build a thermostat from its configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateGroupError::Validation`] if the entity id is
    /// malformed or outside the `climate` domain.
    pub fn from_config(config: &ThermostatConfig) -> Result<Self, ClimateGroupError> {
        let entity_id: EntityId = config.entity_id.parse()?;
        if entity_id.domain() != CLIMATE_DOMAIN {
            return Err(ValidationError::NotClimateEntity(entity_id.to_string()).into());
        }
        let name = config
            .name
            .clone()
            .unwrap_or_else(|| entity_id.object_id().to_string());
        let ts = now();
        Ok(Self {
            entity_id,
            name,
            available: !config.unavailable,
            hvac_mode: config.hvac_mode,
            hvac_modes: config.hvac_modes.clone(),
            current_temperature: config.current_temperature,
            target_temperature: config.temperature,
            target_temp_low: config.target_temp_low,
            target_temp_high: config.target_temp_high,
            min_temp: config.min_temp,
            max_temp: config.max_temp,
            fan_mode: config.fan_mode.clone(),
            fan_modes: config.fan_modes.clone(),
            swing_mode: config.swing_mode.clone(),
            swing_modes: config.swing_modes.clone(),
            preset_mode: config.preset_mode.clone(),
            preset_modes: config.preset_modes.clone(),
            last_changed: ts,
            last_updated: ts,
        })
    }

    #[must_use]
    pub fn entity_id(&self) -> &EntityId {
        &self.entity_id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn set_available(&mut self, available: bool) {
        self.available = available;
    }

    /// Capabilities derived from what the device was configured with.
    #[must_use]
    pub fn supported_features(&self) -> ClimateFeatures {
        let mut features = ClimateFeatures::empty();
        if self.target_temperature.is_some() {
            features |= ClimateFeatures::TARGET_TEMPERATURE;
        }
        if self.target_temp_low.is_some() && self.target_temp_high.is_some() {
            features |= ClimateFeatures::TARGET_TEMPERATURE_RANGE;
        }
        if !self.fan_modes.is_empty() {
            features |= ClimateFeatures::FAN_MODE;
        }
        if !self.swing_modes.is_empty() {
            features |= ClimateFeatures::SWING_MODE;
        }
        if !self.preset_modes.is_empty() {
            features |= ClimateFeatures::PRESET_MODE;
        }
        if self.hvac_modes.contains(&HvacMode::Off) {
            features |= ClimateFeatures::TURN_OFF | ClimateFeatures::TURN_ON;
        }
        features
    }

    /// What the device is doing right now, derived from mode and
    /// temperatures.
    #[must_use]
    pub fn hvac_action(&self) -> HvacAction {
        match self.hvac_mode {
            HvacMode::Off => HvacAction::Off,
            HvacMode::Dry => HvacAction::Drying,
            HvacMode::FanOnly => HvacAction::Fan,
            HvacMode::Heat | HvacMode::Cool | HvacMode::HeatCool | HvacMode::Auto => {
                match self.setpoint() {
                    Some(setpoint) if setpoint > self.current_temperature => HvacAction::Heating,
                    Some(_) => HvacAction::Cooling,
                    None => HvacAction::Idle,
                }
            }
        }
    }

    /// Move the current temperature at most `degrees` toward the active
    /// setpoint. Does nothing while idle or off.
    pub fn step(&mut self, degrees: f64) {
        let Some(setpoint) = self.setpoint() else {
            return;
        };
        let delta = setpoint - self.current_temperature;
        self.current_temperature = if delta.abs() <= degrees {
            setpoint
        } else {
            round_tenth(self.current_temperature + degrees.copysign(delta))
        };
    }

    /// Temperature the device is driving toward, if it is driving at all.
    fn setpoint(&self) -> Option<f64> {
        let current = self.current_temperature;
        match self.hvac_mode {
            HvacMode::Heat => self.target_temperature.filter(|target| *target > current),
            HvacMode::Cool => self.target_temperature.filter(|target| *target < current),
            HvacMode::HeatCool | HvacMode::Auto => {
                match (self.target_temp_low, self.target_temp_high) {
                    (Some(low), _) if current < low => Some(low),
                    (_, Some(high)) if current > high => Some(high),
                    (Some(_), Some(_)) => None,
                    _ => self
                        .target_temperature
                        .filter(|target| (target - current).abs() > f64::EPSILON),
                }
            }
            HvacMode::Off | HvacMode::Dry | HvacMode::FanOnly => None,
        }
    }

    /// Apply one climate service call.
    ///
    /// Values outside the device's capabilities are ignored.
    pub fn apply(&mut self, service: ClimateService, data: &Map<String, Value>) {
        let features = self.supported_features();
        match service {
            ClimateService::SetHvacMode => {
                match text(data, attr::HVAC_MODE).map(str::parse::<HvacMode>) {
                    Some(Ok(mode)) if self.hvac_modes.contains(&mode) => self.hvac_mode = mode,
                    requested => tracing::debug!(
                        entity_id = %self.entity_id,
                        ?requested,
                        "hvac mode not supported, ignoring"
                    ),
                }
            }
            ClimateService::SetTemperature => {
                if features.contains(ClimateFeatures::TARGET_TEMPERATURE)
                    && let Some(target) = number(data, attr::TEMPERATURE)
                {
                    self.target_temperature = Some(self.clamp(target));
                }
                if features.contains(ClimateFeatures::TARGET_TEMPERATURE_RANGE) {
                    if let Some(low) = number(data, attr::TARGET_TEMP_LOW) {
                        self.target_temp_low = Some(self.clamp(low));
                    }
                    if let Some(high) = number(data, attr::TARGET_TEMP_HIGH) {
                        self.target_temp_high = Some(self.clamp(high));
                    }
                }
            }
            ClimateService::SetFanMode => {
                select_option(&mut self.fan_mode, &self.fan_modes, text(data, attr::FAN_MODE));
            }
            ClimateService::SetSwingMode => select_option(
                &mut self.swing_mode,
                &self.swing_modes,
                text(data, attr::SWING_MODE),
            ),
            ClimateService::SetPresetMode => select_option(
                &mut self.preset_mode,
                &self.preset_modes,
                text(data, attr::PRESET_MODE),
            ),
        }
    }

    fn clamp(&self, temperature: f64) -> f64 {
        temperature.clamp(self.min_temp, self.max_temp.max(self.min_temp))
    }

    /// Render as a host entity.
    #[must_use]
    pub fn to_entity(&self) -> Entity {
        let mut attributes: HashMap<String, AttributeValue> = HashMap::new();
        let state = if self.available {
            self.insert_attributes(&mut attributes);
            EntityState::from(self.hvac_mode.as_str())
        } else {
            EntityState::Unavailable
        };
        Entity {
            entity_id: self.entity_id.clone(),
            friendly_name: self.name.clone(),
            state,
            attributes,
            last_changed: self.last_changed,
            last_updated: self.last_updated,
        }
    }

    fn insert_attributes(&self, attributes: &mut HashMap<String, AttributeValue>) {
        let mut put = |key: &str, value: AttributeValue| {
            attributes.insert(key.to_string(), value);
        };
        put(
            attr::HVAC_MODES,
            self.hvac_modes
                .iter()
                .map(|mode| mode.as_str().to_string())
                .collect::<Vec<_>>()
                .into(),
        );
        put(attr::HVAC_ACTION, self.hvac_action().as_str().into());
        put(attr::CURRENT_TEMPERATURE, self.current_temperature.into());
        put(attr::MIN_TEMP, self.min_temp.into());
        put(attr::MAX_TEMP, self.max_temp.into());
        put(attr::SUPPORTED_FEATURES, self.supported_features().bits().into());
        let optional_numbers = [
            (attr::TEMPERATURE, self.target_temperature),
            (attr::TARGET_TEMP_LOW, self.target_temp_low),
            (attr::TARGET_TEMP_HIGH, self.target_temp_high),
        ];
        for (key, value) in optional_numbers {
            if let Some(value) = value {
                put(key, value.into());
            }
        }
        let option_sets = [
            (attr::FAN_MODE, attr::FAN_MODES, &self.fan_mode, &self.fan_modes),
            (attr::SWING_MODE, attr::SWING_MODES, &self.swing_mode, &self.swing_modes),
            (attr::PRESET_MODE, attr::PRESET_MODES, &self.preset_mode, &self.preset_modes),
        ];
        for (mode_key, modes_key, mode, modes) in option_sets {
            if modes.is_empty() {
                continue;
            }
            put(modes_key, modes.clone().into());
            if let Some(mode) = mode {
                put(mode_key, mode.as_str().into());
            }
        }
    }

    /// Record a mutation: bump timestamps if the rendered entity differs
    /// from `before` and return the new rendering.
    pub(crate) fn touch(&mut self, before: &Entity) -> Option<Entity> {
        let after = self.to_entity();
        if after.state == before.state && after.attributes == before.attributes {
            return None;
        }
        let ts = now();
        if after.state != before.state {
            self.last_changed = ts;
        }
        self.last_updated = ts;
        Some(self.to_entity())
    }
}

fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn number(data: &Map<String, Value>, key: &str) -> Option<f64> {
    data.get(key).and_then(Value::as_f64)
}

fn text<'a>(data: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    data.get(key).and_then(Value::as_str)
}

fn select_option(current: &mut Option<String>, options: &[String], requested: Option<&str>) {
    match requested {
        Some(value) if options.iter().any(|option| option == value) => {
            *current = Some(value.to_string());
        }
        _ => tracing::debug!(?requested, "option not supported, ignoring"),
    }
}
