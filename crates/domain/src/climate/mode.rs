//! HVAC modes and actions, plus the parse-at-boundary wrapper.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Operating mode of a climate device.
///
/// The derived ordering is the canonical listing order used when
/// advertising supported modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacMode {
    Off,
    Heat,
    Cool,
    HeatCool,
    Auto,
    Dry,
    FanOnly,
}

impl HvacMode {
    /// Modes in decreasing precedence when members disagree.
    pub const PRIORITY: [Self; 7] = [
        Self::Heat,
        Self::Cool,
        Self::Dry,
        Self::FanOnly,
        Self::HeatCool,
        Self::Auto,
        Self::Off,
    ];

    /// Advertised when no member declares a single usable mode.
    pub const FALLBACK: [Self; 3] = [Self::Off, Self::Heat, Self::Cool];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Heat => "heat",
            Self::Cool => "cool",
            Self::HeatCool => "heat_cool",
            Self::Auto => "auto",
            Self::Dry => "dry",
            Self::FanOnly => "fan_only",
        }
    }
}

impl fmt::Display for HvacMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "off" => Ok(Self::Off),
            "heat" => Ok(Self::Heat),
            "cool" => Ok(Self::Cool),
            "heat_cool" => Ok(Self::HeatCool),
            "auto" => Ok(Self::Auto),
            "dry" => Ok(Self::Dry),
            "fan_only" => Ok(Self::FanOnly),
            other => Err(ValidationError::InvalidHvacMode(other.to_string())),
        }
    }
}

/// What a climate device is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HvacAction {
    Heating,
    Cooling,
    Drying,
    Fan,
    Idle,
    Off,
}

impl HvacAction {
    /// Actions in decreasing precedence when members disagree.
    pub const PRIORITY: [Self; 6] = [
        Self::Heating,
        Self::Cooling,
        Self::Drying,
        Self::Fan,
        Self::Idle,
        Self::Off,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heating => "heating",
            Self::Cooling => "cooling",
            Self::Drying => "drying",
            Self::Fan => "fan",
            Self::Idle => "idle",
            Self::Off => "off",
        }
    }
}

impl fmt::Display for HvacAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HvacAction {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "heating" => Ok(Self::Heating),
            "cooling" => Ok(Self::Cooling),
            "drying" => Ok(Self::Drying),
            "fan" => Ok(Self::Fan),
            "idle" => Ok(Self::Idle),
            "off" => Ok(Self::Off),
            other => Err(ValidationError::InvalidHvacAction(other.to_string())),
        }
    }
}

/// Result of parsing a raw string reported by a member.
///
/// Unknown values are kept (for diagnostics) but never reach a reduction
/// as if they were valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Parsed<T> {
    Known(T),
    Unrecognized(String),
}

impl<T: FromStr> Parsed<T> {
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        raw.parse()
            .map_or_else(|_| Self::Unrecognized(raw.to_string()), Self::Known)
    }
}

impl<T: Copy> Parsed<T> {
    #[must_use]
    pub fn known(&self) -> Option<T> {
        match self {
            Self::Known(value) => Some(*value),
            Self::Unrecognized(_) => None,
        }
    }
}

impl<T> Parsed<T> {
    /// The raw value when it was not recognized.
    #[must_use]
    pub fn unrecognized(&self) -> Option<&str> {
        match self {
            Self::Known(_) => None,
            Self::Unrecognized(raw) => Some(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_roundtrip_every_mode_through_display_and_from_str() {
        for mode in HvacMode::PRIORITY {
            assert_eq!(mode.to_string().parse::<HvacMode>(), Ok(mode));
        }
    }

    #[test]
    fn should_serialize_modes_in_snake_case() {
        let json = serde_json::to_string(&HvacMode::FanOnly).unwrap();
        assert_eq!(json, "\"fan_only\"");
        let parsed: HvacMode = serde_json::from_str("\"heat_cool\"").unwrap();
        assert_eq!(parsed, HvacMode::HeatCool);
    }

    #[test]
    fn should_keep_unknown_mode_as_unrecognized() {
        let parsed = Parsed::<HvacMode>::parse("turbo");
        assert_eq!(parsed, Parsed::Unrecognized("turbo".to_string()));
        assert_eq!(parsed.known(), None);
        assert_eq!(parsed.unrecognized(), Some("turbo"));
    }

    #[test]
    fn should_parse_known_action() {
        let parsed = Parsed::<HvacAction>::parse("cooling");
        assert_eq!(parsed.known(), Some(HvacAction::Cooling));
        assert_eq!(parsed.unrecognized(), None);
    }

    #[test]
    fn should_treat_preheating_as_unrecognized_action() {
        assert!(Parsed::<HvacAction>::parse("preheating").known().is_none());
    }

    #[test]
    fn should_order_fallback_modes_canonically() {
        let mut modes = HvacMode::FALLBACK.to_vec();
        modes.sort();
        assert_eq!(modes, vec![HvacMode::Off, HvacMode::Heat, HvacMode::Cool]);
    }
}
