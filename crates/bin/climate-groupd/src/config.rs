//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `climate-group.toml` in the working directory, or the file
//! named by `CLIMATE_GROUP_CONFIG`. Every field has a default; without a
//! file the daemon runs a demo setup. Environment variables take
//! precedence over file values.

use std::time::Duration;

use serde::Deserialize;

use climate_group_adapter_virtual::ThermostatConfig;
use climate_group_domain::climate::{HvacMode, TemperatureUnit};
use climate_group_domain::error::ClimateGroupError;
use climate_group_domain::group::{DEFAULT_NAME, GroupDefinition};

const DEFAULT_PATH: &str = "climate-group.toml";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Simulated temperature drift.
    pub simulation: SimulationConfig,
    /// Thermostats registered on the virtual host.
    pub thermostats: Vec<ThermostatConfig>,
    /// Climate groups to run.
    pub groups: Vec<GroupConfig>,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

/// Simulation loop settings.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub enabled: bool,
    /// Seconds between two simulation steps.
    pub tick_secs: u64,
    /// Maximum drift per step, in degrees.
    pub step_degrees: f64,
}

/// One climate group, as written in the file.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GroupConfig {
    pub name: String,
    /// Free-form unit; anything containing a `c` means Celsius.
    pub temperature_unit: String,
    pub entities: Vec<String>,
    /// Presets whose members are left out of the aggregation.
    pub exclude: Vec<String>,
    pub refresh_after_command: bool,
}

impl Config {
    /// Load configuration from `climate-group.toml` (or
    /// `$CLIMATE_GROUP_CONFIG`) then apply environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but is malformed or the result
    /// fails validation.
    pub fn load() -> Result<Self, ConfigError> {
        let path =
            std::env::var("CLIMATE_GROUP_CONFIG").unwrap_or_else(|_| DEFAULT_PATH.to_string());
        let mut config = Self::from_file(&path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::demo()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("CLIMATE_GROUP_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("RUST_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = lookup("CLIMATE_GROUP_SIMULATION")
            && let Ok(enabled) = val.parse()
        {
            self.simulation.enabled = enabled;
        }
        if let Some(val) = lookup("CLIMATE_GROUP_TICK_SECS")
            && let Ok(secs) = val.parse()
        {
            self.simulation.tick_secs = secs;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.simulation.enabled {
            if self.simulation.tick_secs == 0 {
                return Err(ConfigError::Validation(
                    "simulation tick must be non-zero".to_string(),
                ));
            }
            if !self.simulation.step_degrees.is_finite() || self.simulation.step_degrees <= 0.0 {
                return Err(ConfigError::Validation(
                    "simulation step must be a positive number of degrees".to_string(),
                ));
            }
        }
        if self.groups.is_empty() {
            return Err(ConfigError::Validation(
                "at least one group must be configured".to_string(),
            ));
        }
        for group in &self.groups {
            group.to_definition().map_err(|err| {
                ConfigError::Validation(format!("group {:?}: {}", group.name, describe(&err)))
            })?;
        }
        Ok(())
    }

    /// Three thermostats downstairs and one group over them.
    #[must_use]
    pub fn demo() -> Self {
        let thermostat = |entity_id: &str, name: &str, mode: HvacMode, current: f64, target: f64| {
            ThermostatConfig {
                entity_id: entity_id.to_string(),
                name: Some(name.to_string()),
                hvac_mode: mode,
                current_temperature: current,
                temperature: Some(target),
                fan_modes: vec!["auto".to_string(), "low".to_string(), "high".to_string()],
                fan_mode: Some("auto".to_string()),
                preset_modes: vec!["home".to_string(), "away".to_string(), "eco".to_string()],
                preset_mode: Some("home".to_string()),
                ..ThermostatConfig::default()
            }
        };
        let mut guest_room =
            thermostat("climate.guest_room", "Guest Room", HvacMode::Off, 17.0, 16.0);
        guest_room.preset_mode = Some("away".to_string());

        Self {
            thermostats: vec![
                thermostat("climate.living_room", "Living Room", HvacMode::Heat, 18.5, 21.0),
                thermostat("climate.kitchen", "Kitchen", HvacMode::Heat, 19.0, 20.0),
                guest_room,
            ],
            groups: vec![GroupConfig {
                name: "Downstairs".to_string(),
                entities: vec![
                    "climate.living_room".to_string(),
                    "climate.kitchen".to_string(),
                    "climate.guest_room".to_string(),
                ],
                exclude: vec!["away".to_string()],
                ..GroupConfig::default()
            }],
            ..Self::default()
        }
    }

    /// Interval between two simulation steps.
    #[must_use]
    pub fn tick(&self) -> Duration {
        Duration::from_secs(self.simulation.tick_secs)
    }
}

impl GroupConfig {
    /// Validated group definition.
    ///
    /// # Errors
    ///
    /// Returns [`ClimateGroupError::Validation`] for a malformed member id,
    /// a member outside the climate domain, a blank name or no members.
    pub fn to_definition(&self) -> Result<GroupDefinition, ClimateGroupError> {
        let mut builder = GroupDefinition::builder()
            .name(self.name.clone())
            .temperature_unit(TemperatureUnit::from_config_value(&self.temperature_unit))
            .entities(self.entities.iter().cloned())
            .refresh_after_command(self.refresh_after_command);
        for preset in &self.exclude {
            builder = builder.exclude(preset.clone());
        }
        builder.build()
    }
}

fn describe(err: &ClimateGroupError) -> String {
    match err {
        ClimateGroupError::Validation(inner) => inner.to_string(),
        other => other.to_string(),
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "climate_groupd=info,climate_group_app=info,climate_group_adapter_virtual=info"
                .to_string(),
        }
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            tick_secs: 5,
            step_degrees: 0.5,
        }
    }
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_NAME.to_string(),
            temperature_unit: "C".to_string(),
            entities: Vec::new(),
            exclude: Vec::new(),
            refresh_after_command: false,
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert!(config.simulation.enabled);
        assert_eq!(config.simulation.tick_secs, 5);
        assert_eq!(config.tick(), Duration::from_secs(5));
        assert!(config.thermostats.is_empty());
        assert!(config.groups.is_empty());
    }

    #[test]
    fn should_return_demo_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.thermostats.len(), 3);
        assert_eq!(config.groups.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = r#"
            [logging]
            filter = "debug"

            [simulation]
            enabled = false
            tick_secs = 2
            step_degrees = 0.25

            [[thermostats]]
            entity_id = "climate.bedroom"
            hvac_mode = "heat"

            [[groups]]
            name = "Upstairs"
            temperature_unit = "°F"
            entities = ["climate.bedroom", "climate.office"]
            exclude = ["away"]
            refresh_after_command = true
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.logging.filter, "debug");
        assert!(!config.simulation.enabled);
        assert_eq!(config.simulation.step_degrees, 0.25);
        assert_eq!(config.thermostats[0].entity_id, "climate.bedroom");

        let definition = config.groups[0].to_definition().unwrap();
        assert_eq!(definition.name, "Upstairs");
        assert_eq!(definition.temperature_unit, TemperatureUnit::Fahrenheit);
        assert_eq!(definition.entities.len(), 2);
        assert_eq!(definition.exclude, vec!["away".to_string()]);
        assert!(definition.refresh_after_command);
    }

    #[test]
    fn should_default_group_name_and_unit() {
        let toml = r#"
            [[groups]]
            entities = ["climate.bedroom"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        let definition = config.groups[0].to_definition().unwrap();
        assert_eq!(definition.name, "Climate Group");
        assert_eq!(definition.temperature_unit, TemperatureUnit::Celsius);
        assert!(!definition.refresh_after_command);
    }

    #[test]
    fn should_reject_config_without_groups() {
        let config: Config = toml::from_str("").unwrap();
        assert!(matches!(config.validate(), Err(ConfigError::Validation(_))));
    }

    #[test]
    fn should_reject_group_with_foreign_member() {
        let mut config = Config::demo();
        config.groups[0].entities.push("light.kitchen".to_string());
        let err = config.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid configuration: group \"Downstairs\": entity light.kitchen is not in the climate domain"
        );
    }

    #[test]
    fn should_reject_zero_tick() {
        let mut config = Config::demo();
        config.simulation.tick_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_accept_zero_tick_when_simulation_disabled() {
        let mut config = Config::demo();
        config.simulation.enabled = false;
        config.simulation.tick_secs = 0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_let_rust_log_win_over_climate_group_log() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("CLIMATE_GROUP_LOG", "warn"),
            ("RUST_LOG", "trace"),
            ("CLIMATE_GROUP_TICK_SECS", "9"),
            ("CLIMATE_GROUP_SIMULATION", "false"),
        ]);
        let mut config = Config::demo();
        config.apply_overrides(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.logging.filter, "trace");
        assert_eq!(config.simulation.tick_secs, 9);
        assert!(!config.simulation.enabled);
    }

    #[test]
    fn should_ignore_unparsable_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([("CLIMATE_GROUP_TICK_SECS", "soon")]);
        let mut config = Config::demo();
        config.apply_overrides(|key| env.get(key).map(ToString::to_string));
        assert_eq!(config.simulation.tick_secs, 5);
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }
}
