//! Composite commands and their translation into outbound service calls.

use serde_json::{Map, Value};

use crate::error::ValidationError;
use crate::id::EntityId;
use crate::service::{ClimateService, ServiceCall};

use super::mode::HvacMode;
use super::snapshot::attr;

/// Parameters of a `set_temperature` command.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TemperatureTarget {
    pub temperature: Option<f64>,
    pub target_temp_low: Option<f64>,
    pub target_temp_high: Option<f64>,
    /// Mode change carried by the same call. Takes precedence over the
    /// temperature fields, which are then dropped.
    pub hvac_mode: Option<HvacMode>,
}

/// A command issued against the climate group.
#[derive(Debug, Clone, PartialEq)]
pub enum ClimateCommand {
    SetTemperature(TemperatureTarget),
    SetHvacMode(HvacMode),
    SetFanMode(String),
    SetSwingMode(String),
    SetPresetMode(String),
}

impl ClimateCommand {
    /// Validate an incoming service call addressed to the group.
    ///
    /// `data` must be a JSON object (or `null` for no parameters).
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] for an unknown service, a missing or
    /// mistyped field, or an unknown hvac mode.
    pub fn parse(service: &str, data: &Value) -> Result<Self, ValidationError> {
        let service: ClimateService = service.parse()?;
        let empty = Map::new();
        let fields = match data {
            Value::Object(fields) => fields,
            Value::Null => &empty,
            _ => return Err(ValidationError::InvalidField("data")),
        };

        match service {
            ClimateService::SetTemperature => Ok(Self::SetTemperature(TemperatureTarget {
                temperature: optional_number(fields, attr::TEMPERATURE)?,
                target_temp_low: optional_number(fields, attr::TARGET_TEMP_LOW)?,
                target_temp_high: optional_number(fields, attr::TARGET_TEMP_HIGH)?,
                hvac_mode: optional_text(fields, attr::HVAC_MODE)?
                    .map(str::parse)
                    .transpose()?,
            })),
            ClimateService::SetHvacMode => {
                Ok(Self::SetHvacMode(required_text(fields, attr::HVAC_MODE)?.parse()?))
            }
            ClimateService::SetFanMode => Ok(Self::SetFanMode(
                required_text(fields, attr::FAN_MODE)?.to_string(),
            )),
            ClimateService::SetSwingMode => Ok(Self::SetSwingMode(
                required_text(fields, attr::SWING_MODE)?.to_string(),
            )),
            ClimateService::SetPresetMode => Ok(Self::SetPresetMode(
                required_text(fields, attr::PRESET_MODE)?.to_string(),
            )),
        }
    }

    #[must_use]
    pub fn service(&self) -> ClimateService {
        match self {
            Self::SetTemperature(_) => ClimateService::SetTemperature,
            Self::SetHvacMode(_) => ClimateService::SetHvacMode,
            Self::SetFanMode(_) => ClimateService::SetFanMode,
            Self::SetSwingMode(_) => ClimateService::SetSwingMode,
            Self::SetPresetMode(_) => ClimateService::SetPresetMode,
        }
    }

    /// Translate into the single call broadcast to every member.
    ///
    /// `set_temperature` with a mode becomes `set_hvac_mode` alone;
    /// `temperature` wins over the low/high pair; a `set_temperature`
    /// with no field at all yields `None` (nothing to send).
    #[must_use]
    pub fn to_service_call(&self, members: &[EntityId]) -> Option<ServiceCall> {
        let mut data = Map::new();
        let service = match self {
            Self::SetTemperature(target) => {
                if let Some(mode) = target.hvac_mode {
                    return Self::SetHvacMode(mode).to_service_call(members);
                }
                if let Some(temperature) = target.temperature {
                    data.insert(attr::TEMPERATURE.to_string(), temperature.into());
                } else {
                    if let Some(low) = target.target_temp_low {
                        data.insert(attr::TARGET_TEMP_LOW.to_string(), low.into());
                    }
                    if let Some(high) = target.target_temp_high {
                        data.insert(attr::TARGET_TEMP_HIGH.to_string(), high.into());
                    }
                }
                if data.is_empty() {
                    return None;
                }
                ClimateService::SetTemperature
            }
            Self::SetHvacMode(mode) => {
                data.insert(attr::HVAC_MODE.to_string(), mode.as_str().into());
                ClimateService::SetHvacMode
            }
            Self::SetFanMode(fan_mode) => {
                data.insert(attr::FAN_MODE.to_string(), fan_mode.as_str().into());
                ClimateService::SetFanMode
            }
            Self::SetSwingMode(swing_mode) => {
                data.insert(attr::SWING_MODE.to_string(), swing_mode.as_str().into());
                ClimateService::SetSwingMode
            }
            Self::SetPresetMode(preset_mode) => {
                data.insert(attr::PRESET_MODE.to_string(), preset_mode.as_str().into());
                ClimateService::SetPresetMode
            }
        };
        Some(ServiceCall::climate(service, members.to_vec(), data))
    }
}

fn optional_number(
    fields: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<f64>, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_f64()
            .map(Some)
            .ok_or(ValidationError::InvalidField(key)),
    }
}

fn optional_text<'a>(
    fields: &'a Map<String, Value>,
    key: &'static str,
) -> Result<Option<&'a str>, ValidationError> {
    match fields.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => value
            .as_str()
            .map(Some)
            .ok_or(ValidationError::InvalidField(key)),
    }
}

fn required_text<'a>(
    fields: &'a Map<String, Value>,
    key: &'static str,
) -> Result<&'a str, ValidationError> {
    optional_text(fields, key)?.ok_or(ValidationError::MissingField(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn members() -> Vec<EntityId> {
        vec![
            "climate.a".parse().unwrap(),
            "climate.b".parse().unwrap(),
        ]
    }

    #[test]
    fn should_parse_set_temperature_with_all_fields() {
        let cmd = ClimateCommand::parse(
            "set_temperature",
            &json!({"temperature": 21, "target_temp_low": 18.5, "hvac_mode": "heat"}),
        )
        .unwrap();
        assert_eq!(
            cmd,
            ClimateCommand::SetTemperature(TemperatureTarget {
                temperature: Some(21.0),
                target_temp_low: Some(18.5),
                target_temp_high: None,
                hvac_mode: Some(HvacMode::Heat),
            })
        );
    }

    #[test]
    fn should_reject_unknown_service() {
        let result = ClimateCommand::parse("turn_on", &json!({}));
        assert_eq!(
            result,
            Err(ValidationError::UnknownService("turn_on".to_string()))
        );
    }

    #[test]
    fn should_reject_missing_fan_mode() {
        let result = ClimateCommand::parse("set_fan_mode", &Value::Null);
        assert_eq!(result, Err(ValidationError::MissingField("fan_mode")));
    }

    #[test]
    fn should_reject_mistyped_temperature() {
        let result = ClimateCommand::parse("set_temperature", &json!({"temperature": "warm"}));
        assert_eq!(result, Err(ValidationError::InvalidField("temperature")));
    }

    #[test]
    fn should_reject_unknown_hvac_mode() {
        let result = ClimateCommand::parse("set_hvac_mode", &json!({"hvac_mode": "turbo"}));
        assert_eq!(
            result,
            Err(ValidationError::InvalidHvacMode("turbo".to_string()))
        );
    }

    #[test]
    fn should_reject_non_object_payload() {
        let result = ClimateCommand::parse("set_fan_mode", &json!(["low"]));
        assert_eq!(result, Err(ValidationError::InvalidField("data")));
    }

    #[test]
    fn should_translate_temperature_with_mode_into_mode_call_only() {
        let cmd = ClimateCommand::SetTemperature(TemperatureTarget {
            temperature: Some(22.0),
            hvac_mode: Some(HvacMode::Cool),
            ..TemperatureTarget::default()
        });
        let call = cmd.to_service_call(&members()).unwrap();
        assert_eq!(call.climate_service(), Some(ClimateService::SetHvacMode));
        assert_eq!(Value::Object(call.data), json!({"hvac_mode": "cool"}));
    }

    #[test]
    fn should_prefer_temperature_over_range() {
        let cmd = ClimateCommand::SetTemperature(TemperatureTarget {
            temperature: Some(22.0),
            target_temp_low: Some(18.0),
            target_temp_high: Some(24.0),
            hvac_mode: None,
        });
        let call = cmd.to_service_call(&members()).unwrap();
        assert_eq!(Value::Object(call.data), json!({"temperature": 22.0}));
    }

    #[test]
    fn should_forward_partial_range() {
        let cmd = ClimateCommand::SetTemperature(TemperatureTarget {
            target_temp_high: Some(24.0),
            ..TemperatureTarget::default()
        });
        let call = cmd.to_service_call(&members()).unwrap();
        assert_eq!(Value::Object(call.data), json!({"target_temp_high": 24.0}));
    }

    #[test]
    fn should_send_nothing_for_empty_set_temperature() {
        let cmd = ClimateCommand::SetTemperature(TemperatureTarget::default());
        assert!(cmd.to_service_call(&members()).is_none());
    }

    #[test]
    fn should_address_every_member() {
        let cmd = ClimateCommand::SetPresetMode("eco".to_string());
        let call = cmd.to_service_call(&members()).unwrap();
        assert_eq!(call.entity_ids, members());
        assert_eq!(call.service, "set_preset_mode");
        assert_eq!(Value::Object(call.data), json!({"preset_mode": "eco"}));
    }
}
