//! Member snapshots — one typed view of a member entity per update cycle.

use crate::entity::{AttributeValue, Entity};
use crate::id::EntityId;

use super::feature::ClimateFeatures;
use super::mode::{HvacAction, HvacMode, Parsed};

/// Attribute keys used by climate entities on the host.
pub mod attr {
    pub const HVAC_MODE: &str = "hvac_mode";
    pub const HVAC_MODES: &str = "hvac_modes";
    pub const HVAC_ACTION: &str = "hvac_action";
    pub const CURRENT_TEMPERATURE: &str = "current_temperature";
    pub const TEMPERATURE: &str = "temperature";
    pub const TARGET_TEMP_LOW: &str = "target_temp_low";
    pub const TARGET_TEMP_HIGH: &str = "target_temp_high";
    pub const MIN_TEMP: &str = "min_temp";
    pub const MAX_TEMP: &str = "max_temp";
    pub const FAN_MODE: &str = "fan_mode";
    pub const FAN_MODES: &str = "fan_modes";
    pub const SWING_MODE: &str = "swing_mode";
    pub const SWING_MODES: &str = "swing_modes";
    pub const PRESET_MODE: &str = "preset_mode";
    pub const PRESET_MODES: &str = "preset_modes";
    pub const SUPPORTED_FEATURES: &str = "supported_features";
    pub const ENTITY_ID: &str = "entity_id";
}

/// Observed state of one member, valid for a single update cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberSnapshot {
    pub entity_id: EntityId,
    pub mode: Parsed<HvacMode>,
    pub action: Option<Parsed<HvacAction>>,
    pub current_temperature: Option<f64>,
    pub target_temperature: Option<f64>,
    pub target_temp_low: Option<f64>,
    pub target_temp_high: Option<f64>,
    pub min_temp: Option<f64>,
    pub max_temp: Option<f64>,
    pub fan_mode: Option<String>,
    pub swing_mode: Option<String>,
    pub preset_mode: Option<String>,
    pub fan_modes: Option<Vec<String>>,
    pub swing_modes: Option<Vec<String>>,
    pub preset_modes: Option<Vec<String>>,
    pub hvac_modes: Option<Vec<Parsed<HvacMode>>>,
    pub supported_features: ClimateFeatures,
}

impl MemberSnapshot {
    /// A snapshot with only a mode and every optional attribute absent.
    #[must_use]
    pub fn new(entity_id: EntityId, mode: Parsed<HvacMode>) -> Self {
        Self {
            entity_id,
            mode,
            action: None,
            current_temperature: None,
            target_temperature: None,
            target_temp_low: None,
            target_temp_high: None,
            min_temp: None,
            max_temp: None,
            fan_mode: None,
            swing_mode: None,
            preset_mode: None,
            fan_modes: None,
            swing_modes: None,
            preset_modes: None,
            hvac_modes: None,
            supported_features: ClimateFeatures::empty(),
        }
    }

    /// Convert a raw host entity.
    ///
    /// Returns `None` for an unavailable entity. Attributes of the wrong
    /// type are treated as absent; unknown mode/action strings are kept as
    /// [`Parsed::Unrecognized`].
    #[must_use]
    pub fn from_entity(entity: &Entity) -> Option<Self> {
        if !entity.state.is_available() {
            return None;
        }
        let number = |key: &str| entity.get_attribute(key).and_then(AttributeValue::as_f64);
        let text = |key: &str| {
            entity
                .get_attribute(key)
                .and_then(AttributeValue::as_str)
                .map(str::to_string)
        };
        let list = |key: &str| entity.get_attribute(key).and_then(AttributeValue::as_string_list);

        Some(Self {
            entity_id: entity.entity_id.clone(),
            mode: Parsed::parse(entity.state.as_str()),
            action: entity
                .get_attribute(attr::HVAC_ACTION)
                .and_then(AttributeValue::as_str)
                .map(Parsed::parse),
            current_temperature: number(attr::CURRENT_TEMPERATURE),
            target_temperature: number(attr::TEMPERATURE),
            target_temp_low: number(attr::TARGET_TEMP_LOW),
            target_temp_high: number(attr::TARGET_TEMP_HIGH),
            min_temp: number(attr::MIN_TEMP),
            max_temp: number(attr::MAX_TEMP),
            fan_mode: text(attr::FAN_MODE),
            swing_mode: text(attr::SWING_MODE),
            preset_mode: text(attr::PRESET_MODE),
            fan_modes: list(attr::FAN_MODES),
            swing_modes: list(attr::SWING_MODES),
            preset_modes: list(attr::PRESET_MODES),
            hvac_modes: list(attr::HVAC_MODES)
                .map(|modes| modes.iter().map(|mode| Parsed::parse(mode)).collect()),
            supported_features: entity
                .get_attribute(attr::SUPPORTED_FEATURES)
                .and_then(AttributeValue::as_u32)
                .map(ClimateFeatures::from_bits_retain)
                .unwrap_or_default(),
        })
    }

    /// Raw values that did not map onto the typed vocabulary, keyed by
    /// attribute name.
    #[must_use]
    pub fn unrecognized_values(&self) -> Vec<(&'static str, &str)> {
        let mut out = Vec::new();
        if let Some(raw) = self.mode.unrecognized() {
            out.push(("state", raw));
        }
        if let Some(raw) = self.action.as_ref().and_then(Parsed::unrecognized) {
            out.push((attr::HVAC_ACTION, raw));
        }
        for mode in self.hvac_modes.iter().flatten() {
            if let Some(raw) = mode.unrecognized() {
                out.push((attr::HVAC_MODES, raw));
            }
        }
        out
    }

    /// Whether this member sits in one of the excluded presets.
    #[must_use]
    pub fn is_excluded_by(&self, excluded_presets: &[String]) -> bool {
        self.preset_mode
            .as_ref()
            .is_some_and(|preset| excluded_presets.contains(preset))
    }
}

/// The two member sets a reduction works on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemberSets {
    /// Members left after preset exclusion (or all of them, see [`partition`](Self::partition)).
    pub working: Vec<MemberSnapshot>,
    /// Every member that could be read.
    pub full: Vec<MemberSnapshot>,
}

impl MemberSets {
    /// Split `full` by preset exclusion.
    ///
    /// Exclusion is advisory: if it would remove every member, the working
    /// set is the full set.
    #[must_use]
    pub fn partition(full: Vec<MemberSnapshot>, excluded_presets: &[String]) -> Self {
        let working: Vec<MemberSnapshot> = full
            .iter()
            .filter(|snapshot| !snapshot.is_excluded_by(excluded_presets))
            .cloned()
            .collect();
        let working = if working.is_empty() {
            full.clone()
        } else {
            working
        };
        Self { working, full }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(raw: &str) -> EntityId {
        raw.parse().unwrap()
    }

    fn with_preset(raw_id: &str, preset: Option<&str>) -> MemberSnapshot {
        let mut snapshot = MemberSnapshot::new(id(raw_id), Parsed::Known(HvacMode::Heat));
        snapshot.preset_mode = preset.map(str::to_string);
        snapshot
    }

    #[test]
    fn should_convert_fully_populated_entity() {
        let entity = Entity::builder()
            .entity_id("climate.living_room")
            .state("heat")
            .attribute(attr::HVAC_ACTION, "heating")
            .attribute(attr::CURRENT_TEMPERATURE, 19.5)
            .attribute(attr::TEMPERATURE, 21_i64)
            .attribute(attr::MIN_TEMP, 7.0)
            .attribute(attr::MAX_TEMP, 35.0)
            .attribute(attr::FAN_MODE, "auto")
            .attribute(
                attr::HVAC_MODES,
                vec!["off".to_string(), "heat".to_string()],
            )
            .attribute(attr::SUPPORTED_FEATURES, 17_u32)
            .build()
            .unwrap();

        let snapshot = MemberSnapshot::from_entity(&entity).unwrap();
        assert_eq!(snapshot.mode, Parsed::Known(HvacMode::Heat));
        assert_eq!(snapshot.action, Some(Parsed::Known(HvacAction::Heating)));
        assert_eq!(snapshot.current_temperature, Some(19.5));
        assert_eq!(snapshot.target_temperature, Some(21.0));
        assert_eq!(snapshot.fan_mode.as_deref(), Some("auto"));
        assert_eq!(
            snapshot.hvac_modes,
            Some(vec![
                Parsed::Known(HvacMode::Off),
                Parsed::Known(HvacMode::Heat)
            ])
        );
        assert_eq!(snapshot.supported_features.bits(), 17);
        assert!(snapshot.unrecognized_values().is_empty());
    }

    #[test]
    fn should_drop_unavailable_entity() {
        let entity = Entity::builder()
            .entity_id("climate.attic")
            .state("unavailable")
            .build()
            .unwrap();
        assert!(MemberSnapshot::from_entity(&entity).is_none());
    }

    #[test]
    fn should_treat_wrongly_typed_attributes_as_absent() {
        let entity = Entity::builder()
            .entity_id("climate.attic")
            .state("cool")
            .attribute(attr::TEMPERATURE, "twenty")
            .attribute(attr::FAN_MODE, 3_i64)
            .attribute(attr::FAN_MODES, "low")
            .attribute(attr::SUPPORTED_FEATURES, -4_i64)
            .build()
            .unwrap();

        let snapshot = MemberSnapshot::from_entity(&entity).unwrap();
        assert_eq!(snapshot.target_temperature, None);
        assert_eq!(snapshot.fan_mode, None);
        assert_eq!(snapshot.fan_modes, None);
        assert!(snapshot.supported_features.is_empty());
    }

    #[test]
    fn should_report_unrecognized_values() {
        let entity = Entity::builder()
            .entity_id("climate.attic")
            .state("turbo")
            .attribute(attr::HVAC_ACTION, "defrosting")
            .attribute(
                attr::HVAC_MODES,
                vec!["heat".to_string(), "eco_plus".to_string()],
            )
            .build()
            .unwrap();

        let snapshot = MemberSnapshot::from_entity(&entity).unwrap();
        assert_eq!(
            snapshot.unrecognized_values(),
            vec![
                ("state", "turbo"),
                (attr::HVAC_ACTION, "defrosting"),
                (attr::HVAC_MODES, "eco_plus"),
            ]
        );
    }

    #[test]
    fn should_keep_members_without_excluded_preset() {
        let full = vec![
            with_preset("climate.a", Some("away")),
            with_preset("climate.b", Some("comfort")),
            with_preset("climate.c", None),
        ];
        let sets = MemberSets::partition(full, &["away".to_string()]);
        let working: Vec<&str> = sets.working.iter().map(|s| s.entity_id.as_str()).collect();
        assert_eq!(working, vec!["climate.b", "climate.c"]);
        assert_eq!(sets.full.len(), 3);
    }

    #[test]
    fn should_fall_back_to_full_set_when_every_member_is_excluded() {
        let full = vec![
            with_preset("climate.a", Some("away")),
            with_preset("climate.b", Some("away")),
            with_preset("climate.c", Some("away")),
        ];
        let sets = MemberSets::partition(full, &["away".to_string()]);
        assert_eq!(sets.working.len(), 3);
        assert_eq!(sets.working, sets.full);
    }

    #[test]
    fn should_produce_empty_sets_from_no_members() {
        let sets = MemberSets::partition(Vec::new(), &["away".to_string()]);
        assert!(sets.is_empty());
        assert!(sets.working.is_empty());
    }
}
