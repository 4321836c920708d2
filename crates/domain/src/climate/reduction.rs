//! Reduction engine — folds member snapshots into one composite state.
//!
//! Every field of [`CompositeState`] is produced by one of these strategies:
//!
//! | Strategy | Fields | Set |
//! |----------|--------|-----|
//! | priority pick | `hvac_mode`, `hvac_action` | working |
//! | majority vote | `fan_mode`, `swing_mode`, `preset_mode` | working |
//! | numeric (mean) | current/target temperatures | working |
//! | numeric (extrema) | `min_temp` (max), `max_temp` (min) | full |
//! | union | option lists, `hvac_modes`, `supported_features` | full |
//!
//! All reductions are total: zero inputs yield the field's default.

use crate::group::GroupDefinition;

use super::composite::CompositeState;
use super::feature::ClimateFeatures;
use super::mode::{HvacAction, HvacMode, Parsed};
use super::snapshot::{MemberSets, MemberSnapshot};

/// Compute the composite state of a group from one cycle's member sets.
///
/// Pure and deterministic: the same inputs always yield an identical state.
#[must_use]
pub fn reduce(definition: &GroupDefinition, sets: &MemberSets) -> CompositeState {
    let working = &sets.working;
    let full = &sets.full;

    let mut state = CompositeState::initial(
        definition.name.clone(),
        definition.temperature_unit,
        definition.entities.clone(),
        definition.exclude.clone(),
    );

    state.available = !full.is_empty();

    state.hvac_mode = priority_pick(
        &HvacMode::PRIORITY,
        working.iter().filter_map(|member| member.mode.known()),
    );
    state.hvac_action = priority_pick(
        &HvacAction::PRIORITY,
        working
            .iter()
            .filter_map(|member| member.action.as_ref().and_then(Parsed::known)),
    );

    state.fan_mode = majority_vote(working.iter().filter_map(|m| m.fan_mode.as_deref()));
    state.swing_mode = majority_vote(working.iter().filter_map(|m| m.swing_mode.as_deref()));
    state.preset_mode = majority_vote(working.iter().filter_map(|m| m.preset_mode.as_deref()));

    state.current_temperature = reduce_numeric(&numbers(working, |m| m.current_temperature), mean);
    state.target_temperature = reduce_numeric(&numbers(working, |m| m.target_temperature), mean);
    state.target_temp_low = reduce_numeric(&numbers(working, |m| m.target_temp_low), mean);
    state.target_temp_high = reduce_numeric(&numbers(working, |m| m.target_temp_high), mean);

    // Safe limits: the highest floor and the lowest ceiling.
    state.min_temp = reduce_numeric(&numbers(full, |m| m.min_temp), maximum).unwrap_or(0.0);
    state.max_temp = reduce_numeric(&numbers(full, |m| m.max_temp), minimum).unwrap_or(0.0);

    state.fan_modes = union_options(full.iter().filter_map(|m| m.fan_modes.as_deref()));
    state.swing_modes = union_options(full.iter().filter_map(|m| m.swing_modes.as_deref()));
    state.preset_modes = union_options(full.iter().filter_map(|m| m.preset_modes.as_deref()));
    state.hvac_modes = union_hvac_modes(
        full.iter()
            .flat_map(|m| m.hvac_modes.iter().flatten())
            .filter_map(Parsed::known),
    );
    state.supported_features =
        union_features(full.iter().map(|m| m.supported_features), ClimateFeatures::GROUP_SUPPORTED);

    state
}

fn numbers(
    members: &[MemberSnapshot],
    field: impl Fn(&MemberSnapshot) -> Option<f64>,
) -> Vec<f64> {
    members.iter().filter_map(field).collect()
}

/// First value of `priority` that appears in `present`.
///
/// Values absent from `priority` are ignored.
#[must_use]
pub fn priority_pick<T: PartialEq + Copy>(
    priority: &[T],
    present: impl IntoIterator<Item = T>,
) -> Option<T> {
    let present: Vec<T> = present.into_iter().collect();
    priority
        .iter()
        .copied()
        .find(|candidate| present.contains(candidate))
}

/// Most frequent value; ties go to the value encountered first.
#[must_use]
pub fn majority_vote<'a>(values: impl IntoIterator<Item = &'a str>) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(seen, _)| *seen == value) {
            Some((_, count)) => *count += 1,
            None => counts.push((value, 1)),
        }
    }
    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.is_none_or(|(_, best_count)| count > best_count) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// Reduce `values` with `reduce`.
///
/// `None` for no values; a single value is returned untouched.
#[must_use]
pub fn reduce_numeric(values: &[f64], reduce: impl Fn(&[f64]) -> f64) -> Option<f64> {
    match values {
        [] => None,
        [single] => Some(*single),
        many => Some(reduce(many)),
    }
}

/// Arithmetic mean of a non-empty slice.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}

/// Largest value of a non-empty slice.
#[must_use]
pub fn maximum(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
}

/// Smallest value of a non-empty slice.
#[must_use]
pub fn minimum(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

/// Union of option lists in first-encountered order, without duplicates.
///
/// `None` when no member declares a list at all.
#[must_use]
pub fn union_options<'a>(lists: impl IntoIterator<Item = &'a [String]>) -> Option<Vec<String>> {
    let mut declared = false;
    let mut out: Vec<String> = Vec::new();
    for list in lists {
        declared = true;
        for option in list {
            if !out.contains(option) {
                out.push(option.clone());
            }
        }
    }
    declared.then_some(out)
}

/// Union of recognized hvac modes in canonical order.
///
/// Falls back to [`HvacMode::FALLBACK`] when nothing usable is declared.
#[must_use]
pub fn union_hvac_modes(modes: impl IntoIterator<Item = HvacMode>) -> Vec<HvacMode> {
    let mut out: Vec<HvacMode> = modes.into_iter().collect();
    out.sort();
    out.dedup();
    if out.is_empty() {
        HvacMode::FALLBACK.to_vec()
    } else {
        out
    }
}

/// Bitwise OR of every member's capabilities, restricted to `mask`.
#[must_use]
pub fn union_features(
    features: impl IntoIterator<Item = ClimateFeatures>,
    mask: ClimateFeatures,
) -> ClimateFeatures {
    let mut out = ClimateFeatures::empty();
    for feature in features {
        out |= feature;
    }
    out & mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::climate::TemperatureUnit;

    fn definition(members: &[&str]) -> GroupDefinition {
        let mut builder = GroupDefinition::builder()
            .name("Test Group")
            .temperature_unit(TemperatureUnit::Celsius);
        for member in members {
            builder = builder.entity(*member);
        }
        builder.build().unwrap()
    }

    fn member(id: &str, mode: &str) -> MemberSnapshot {
        MemberSnapshot::new(id.parse().unwrap(), Parsed::parse(mode))
    }

    fn sets(full: Vec<MemberSnapshot>) -> MemberSets {
        MemberSets::partition(full, &[])
    }

    #[test]
    fn should_pick_highest_priority_mode_present() {
        let full = vec![
            member("climate.a", "off"),
            member("climate.b", "cool"),
            member("climate.c", "heat"),
        ];
        let state = reduce(&definition(&["climate.a"]), &sets(full));
        assert_eq!(state.hvac_mode, Some(HvacMode::Heat));
    }

    #[test]
    fn should_keep_shared_mode_when_members_agree() {
        for mode in HvacMode::PRIORITY {
            let full = vec![
                member("climate.a", mode.as_str()),
                member("climate.b", mode.as_str()),
            ];
            let state = reduce(&definition(&["climate.a"]), &sets(full));
            assert_eq!(state.hvac_mode, Some(mode));
        }
    }

    #[test]
    fn should_leave_mode_absent_when_only_unrecognized_modes() {
        let full = vec![member("climate.a", "turbo"), member("climate.b", "unknown")];
        let state = reduce(&definition(&["climate.a"]), &sets(full));
        assert_eq!(state.hvac_mode, None);
        assert!(state.available);
    }

    #[test]
    fn should_pick_action_by_priority_and_ignore_unknown_actions() {
        let mut a = member("climate.a", "heat");
        a.action = Some(Parsed::parse("idle"));
        let mut b = member("climate.b", "heat");
        b.action = Some(Parsed::parse("heating"));
        let mut c = member("climate.c", "heat");
        c.action = Some(Parsed::parse("defrosting"));

        let state = reduce(&definition(&["climate.a"]), &sets(vec![a, b, c.clone()]));
        assert_eq!(state.hvac_action, Some(HvacAction::Heating));

        let state = reduce(&definition(&["climate.a"]), &sets(vec![c]));
        assert_eq!(state.hvac_action, None);
    }

    #[test]
    fn should_vote_for_most_common_value() {
        assert_eq!(
            majority_vote(["auto", "auto", "eco"]),
            Some("auto".to_string())
        );
    }

    #[test]
    fn should_break_vote_ties_by_first_encountered() {
        assert_eq!(majority_vote(["a", "b"]), Some("a".to_string()));
        assert_eq!(majority_vote(["b", "a", "a", "b"]), Some("b".to_string()));
    }

    #[test]
    fn should_vote_nothing_from_no_values() {
        assert_eq!(majority_vote(std::iter::empty()), None);
    }

    #[test]
    fn should_ignore_absent_values_in_vote() {
        let mut a = member("climate.a", "heat");
        a.fan_mode = Some("low".to_string());
        let b = member("climate.b", "heat");
        let c = member("climate.c", "heat");
        let state = reduce(&definition(&["climate.a"]), &sets(vec![b, c, a]));
        assert_eq!(state.fan_mode.as_deref(), Some("low"));
        assert_eq!(state.swing_mode, None);
    }

    #[test]
    fn should_average_numeric_values() {
        assert_eq!(reduce_numeric(&[20.0, 22.0], mean), Some(21.0));
    }

    #[test]
    fn should_return_none_for_no_numeric_values() {
        assert_eq!(reduce_numeric(&[], mean), None);
    }

    #[test]
    fn should_return_single_numeric_value_untouched() {
        assert_eq!(reduce_numeric(&[5.0], mean), Some(5.0));
        assert_eq!(reduce_numeric(&[0.1], mean), Some(0.1));
    }

    #[test]
    fn should_use_highest_floor_and_lowest_ceiling() {
        let limits = [(10.0, 30.0), (7.0, 28.0), (15.0, 32.0)];
        let full = limits
            .iter()
            .enumerate()
            .map(|(i, (min, max))| {
                let mut snapshot = member(&format!("climate.m{i}"), "heat");
                snapshot.min_temp = Some(*min);
                snapshot.max_temp = Some(*max);
                snapshot
            })
            .collect();
        let state = reduce(&definition(&["climate.m0"]), &sets(full));
        assert_eq!(state.min_temp, 15.0);
        assert_eq!(state.max_temp, 28.0);
    }

    #[test]
    fn should_default_limits_to_zero() {
        let state = reduce(&definition(&["climate.a"]), &sets(vec![member("climate.a", "off")]));
        assert_eq!(state.min_temp, 0.0);
        assert_eq!(state.max_temp, 0.0);
    }

    #[test]
    fn should_mask_union_of_features() {
        let mut a = member("climate.a", "heat");
        a.supported_features = ClimateFeatures::TARGET_TEMPERATURE_RANGE;
        let mut b = member("climate.b", "heat");
        b.supported_features = ClimateFeatures::PRESET_MODE
            | ClimateFeatures::SWING_MODE
            | ClimateFeatures::AUX_HEAT;

        let state = reduce(&definition(&["climate.a"]), &sets(vec![a, b]));
        assert_eq!(
            state.supported_features,
            ClimateFeatures::TARGET_TEMPERATURE_RANGE
                | ClimateFeatures::PRESET_MODE
                | ClimateFeatures::SWING_MODE
        );
        assert!(!state.supported_features.contains(ClimateFeatures::AUX_HEAT));
    }

    #[test]
    fn should_drop_invalid_hvac_modes_from_union() {
        let mut a = member("climate.a", "heat");
        a.hvac_modes = Some(vec![Parsed::parse("heat"), Parsed::parse("warp_speed")]);
        let mut b = member("climate.b", "off");
        b.hvac_modes = Some(vec![Parsed::parse("off"), Parsed::parse("heat")]);

        let state = reduce(&definition(&["climate.a"]), &sets(vec![a, b]));
        assert_eq!(state.hvac_modes, vec![HvacMode::Off, HvacMode::Heat]);
    }

    #[test]
    fn should_fall_back_to_minimal_modes_without_valid_tokens() {
        let mut a = member("climate.a", "heat");
        a.hvac_modes = Some(vec![Parsed::parse("warp_speed")]);
        let state = reduce(&definition(&["climate.a"]), &sets(vec![a]));
        assert_eq!(
            state.hvac_modes,
            vec![HvacMode::Off, HvacMode::Heat, HvacMode::Cool]
        );
    }

    #[test]
    fn should_union_option_lists_in_first_seen_order() {
        let mut a = member("climate.a", "heat");
        a.fan_modes = Some(vec!["low".to_string(), "high".to_string()]);
        let mut b = member("climate.b", "heat");
        b.fan_modes = Some(vec!["high".to_string(), "auto".to_string()]);
        let c = member("climate.c", "heat");

        let state = reduce(&definition(&["climate.a"]), &sets(vec![a, b, c]));
        assert_eq!(
            state.fan_modes,
            Some(vec!["low".to_string(), "high".to_string(), "auto".to_string()])
        );
        assert_eq!(state.preset_modes, None);
    }

    #[test]
    fn should_report_empty_union_when_member_declares_empty_list() {
        let mut a = member("climate.a", "heat");
        a.swing_modes = Some(Vec::new());
        let state = reduce(&definition(&["climate.a"]), &sets(vec![a]));
        assert_eq!(state.swing_modes, Some(Vec::new()));
    }

    #[test]
    fn should_average_working_set_but_bound_limits_over_full_set() {
        let mut home = member("climate.a", "heat");
        home.target_temperature = Some(21.0);
        home.min_temp = Some(5.0);
        let mut away = member("climate.b", "heat");
        away.preset_mode = Some("away".to_string());
        away.target_temperature = Some(15.0);
        away.min_temp = Some(12.0);

        let sets = MemberSets::partition(vec![home, away], &["away".to_string()]);
        let state = reduce(&definition(&["climate.a", "climate.b"]), &sets);
        assert_eq!(state.target_temperature, Some(21.0));
        assert_eq!(state.min_temp, 12.0);
        assert_eq!(state.preset_mode, None);
    }

    #[test]
    fn should_produce_default_state_from_no_members() {
        let state = reduce(&definition(&["climate.a"]), &MemberSets::default());
        assert!(!state.available);
        assert_eq!(state.hvac_mode, None);
        assert_eq!(state.current_temperature, None);
        assert_eq!(state.hvac_modes, HvacMode::FALLBACK.to_vec());
        assert!(state.supported_features.is_empty());
    }

    #[test]
    fn should_copy_group_definition_into_state() {
        let def = definition(&["climate.a", "climate.b"]);
        let state = reduce(&def, &MemberSets::default());
        assert_eq!(state.name, "Test Group");
        assert_eq!(state.member_ids, def.entities);
    }

    #[test]
    fn should_be_idempotent() {
        let mut a = member("climate.a", "cool");
        a.current_temperature = Some(23.3);
        a.fan_modes = Some(vec!["auto".to_string()]);
        a.supported_features = ClimateFeatures::FAN_MODE;
        let mut b = member("climate.b", "heat");
        b.current_temperature = Some(19.9);
        b.hvac_modes = Some(vec![Parsed::parse("cool"), Parsed::parse("heat")]);

        let def = definition(&["climate.a", "climate.b"]);
        let sets = sets(vec![a, b]);
        assert_eq!(reduce(&def, &sets), reduce(&def, &sets));
    }
}
