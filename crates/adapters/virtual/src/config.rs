//! Virtual thermostat configuration.

use serde::Deserialize;

use climate_group_domain::climate::HvacMode;

/// Configuration of one simulated thermostat.
///
/// Optional capability lists left empty mean the device does not support
/// that capability.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ThermostatConfig {
    /// Host entity id, must be in the `climate` domain.
    pub entity_id: String,
    /// Friendly name; defaults to the object id.
    pub name: Option<String>,
    pub hvac_mode: HvacMode,
    pub hvac_modes: Vec<HvacMode>,
    pub current_temperature: f64,
    /// Single setpoint. `None` disables `set_temperature` with `temperature`.
    pub temperature: Option<f64>,
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
    /// Start in the `unavailable` state.
    pub unavailable: bool,
}

impl Default for ThermostatConfig {
    fn default() -> Self {
        Self {
            entity_id: "climate.virtual_thermostat".to_string(),
            name: None,
            hvac_mode: HvacMode::Off,
            hvac_modes: vec![HvacMode::Off, HvacMode::Heat, HvacMode::Cool, HvacMode::Auto],
            current_temperature: 20.0,
            temperature: Some(21.0),
            target_temp_low: None,
            target_temp_high: None,
            min_temp: 7.0,
            max_temp: 35.0,
            fan_mode: None,
            fan_modes: Vec::new(),
            swing_mode: None,
            swing_modes: Vec::new(),
            preset_mode: None,
            preset_modes: Vec::new(),
            unavailable: false,
        }
    }
}
