//! Composite state — what the climate group exposes as its own state.

use serde::{Deserialize, Serialize};

use crate::id::EntityId;

use super::feature::ClimateFeatures;
use super::mode::{HvacAction, HvacMode};
use super::unit::TemperatureUnit;

/// Aggregated view of a climate group.
///
/// Recomputed wholesale every update cycle; it never borrows from member
/// snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeState {
    pub name: String,
    pub temperature_unit: TemperatureUnit,
    pub member_ids: Vec<EntityId>,
    pub excluded_presets: Vec<String>,
    /// `true` iff at least one member could be read.
    pub available: bool,
    pub hvac_mode: Option<HvacMode>,
    pub hvac_action: Option<HvacAction>,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub target_temp_low: Option<f64>,
    pub target_temp_high: Option<f64>,
    pub min_temp: f64,
    pub max_temp: f64,
    pub fan_mode: Option<String>,
    pub swing_mode: Option<String>,
    pub preset_mode: Option<String>,
    pub fan_modes: Option<Vec<String>>,
    pub swing_modes: Option<Vec<String>>,
    pub preset_modes: Option<Vec<String>>,
    pub hvac_modes: Vec<HvacMode>,
    pub supported_features: ClimateFeatures,
}

impl CompositeState {
    /// The zeroed state a group starts with before its first update.
    #[must_use]
    pub fn initial(
        name: impl Into<String>,
        temperature_unit: TemperatureUnit,
        member_ids: Vec<EntityId>,
        excluded_presets: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            temperature_unit,
            member_ids,
            excluded_presets,
            available: false,
            hvac_mode: None,
            hvac_action: None,
            current_temperature: None,
            target_temperature: None,
            target_temp_low: None,
            target_temp_high: None,
            min_temp: 0.0,
            max_temp: 0.0,
            fan_mode: None,
            swing_mode: None,
            preset_mode: None,
            fan_modes: None,
            swing_modes: None,
            preset_modes: None,
            hvac_modes: HvacMode::FALLBACK.to_vec(),
            supported_features: ClimateFeatures::empty(),
        }
    }

    /// Extra attributes published next to the state: the member list.
    #[must_use]
    pub fn extra_state_attributes(&self) -> serde_json::Value {
        serde_json::json!({ "entity_id": self.member_ids })
    }
}

impl std::fmt::Display for CompositeState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mode = self.hvac_mode.map_or("unknown", HvacMode::as_str);
        let action = self.hvac_action.map_or("none", HvacAction::as_str);
        write!(f, "{} mode={mode} action={action}", self.name)?;
        if let Some(target) = self.target_temperature {
            write!(f, " target={target:.1}{}", self.temperature_unit)?;
        }
        if let Some(current) = self.current_temperature {
            write!(f, " current={current:.1}{}", self.temperature_unit)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn members() -> Vec<EntityId> {
        vec![
            "climate.a".parse().unwrap(),
            "climate.b".parse().unwrap(),
        ]
    }

    #[test]
    fn should_start_unavailable_with_zeroed_limits() {
        let state =
            CompositeState::initial("Group", TemperatureUnit::Celsius, members(), Vec::new());
        assert!(!state.available);
        assert_eq!(state.min_temp, 0.0);
        assert_eq!(state.max_temp, 0.0);
        assert_eq!(state.hvac_mode, None);
        assert_eq!(state.hvac_modes, HvacMode::FALLBACK.to_vec());
        assert!(state.supported_features.is_empty());
    }

    #[test]
    fn should_expose_member_ids_as_extra_attributes() {
        let state =
            CompositeState::initial("Group", TemperatureUnit::Celsius, members(), Vec::new());
        assert_eq!(
            state.extra_state_attributes(),
            serde_json::json!({ "entity_id": ["climate.a", "climate.b"] })
        );
    }

    #[test]
    fn should_display_mode_action_and_temperatures() {
        let mut state =
            CompositeState::initial("Upstairs", TemperatureUnit::Celsius, members(), Vec::new());
        state.hvac_mode = Some(HvacMode::Heat);
        state.hvac_action = Some(HvacAction::Heating);
        state.target_temperature = Some(21.0);
        state.current_temperature = Some(19.5);
        assert_eq!(
            state.to_string(),
            "Upstairs mode=heat action=heating target=21.0\u{b0}C current=19.5\u{b0}C"
        );
    }
}
