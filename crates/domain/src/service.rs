//! Service — a command sent through the host to a set of entities.
//!
//! Examples: `climate.set_temperature`, `climate.set_hvac_mode`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::EntityId;

/// Domain name used for every climate service call.
pub const CLIMATE_DOMAIN: &str = "climate";

/// Services a climate group accepts and forwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClimateService {
    SetTemperature,
    SetHvacMode,
    SetFanMode,
    SetSwingMode,
    SetPresetMode,
}

impl ClimateService {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SetTemperature => "set_temperature",
            Self::SetHvacMode => "set_hvac_mode",
            Self::SetFanMode => "set_fan_mode",
            Self::SetSwingMode => "set_swing_mode",
            Self::SetPresetMode => "set_preset_mode",
        }
    }
}

impl fmt::Display for ClimateService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClimateService {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "set_temperature" => Ok(Self::SetTemperature),
            "set_hvac_mode" => Ok(Self::SetHvacMode),
            "set_fan_mode" => Ok(Self::SetFanMode),
            "set_swing_mode" => Ok(Self::SetSwingMode),
            "set_preset_mode" => Ok(Self::SetPresetMode),
            other => Err(ValidationError::UnknownService(other.to_string())),
        }
    }
}

/// One outbound command: a service addressed to a list of entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceCall {
    pub domain: String,
    pub service: String,
    pub entity_ids: Vec<EntityId>,
    /// Service parameters, without the target entity ids.
    pub data: serde_json::Map<String, serde_json::Value>,
    /// Whether the caller waits for the host to finish executing the call.
    pub blocking: bool,
}

impl ServiceCall {
    /// A blocking climate-domain call.
    #[must_use]
    pub fn climate(
        service: ClimateService,
        entity_ids: Vec<EntityId>,
        data: serde_json::Map<String, serde_json::Value>,
    ) -> Self {
        Self {
            domain: CLIMATE_DOMAIN.to_string(),
            service: service.as_str().to_string(),
            entity_ids,
            data,
            blocking: true,
        }
    }

    /// The climate service this call targets, if it is one.
    #[must_use]
    pub fn climate_service(&self) -> Option<ClimateService> {
        if self.domain != CLIMATE_DOMAIN {
            return None;
        }
        self.service.parse().ok()
    }
}

impl fmt::Display for ServiceCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{} ({} targets)",
            self.domain,
            self.service,
            self.entity_ids.len()
        )
    }
}
