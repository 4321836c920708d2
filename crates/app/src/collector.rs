//! Snapshot collection — reads every member once per update cycle.

use climate_group_domain::climate::{MemberSets, MemberSnapshot};
use climate_group_domain::id::EntityId;

use crate::ports::StateReader;

/// Read each member through `reader` and split the result into the
/// working and full sets.
///
/// Members without a state or in the `unavailable` state are skipped.
/// Values outside the known mode/action vocabulary are kept unrecognized
/// and logged at debug level.
pub fn collect<R: StateReader>(
    reader: &R,
    member_ids: &[EntityId],
    excluded_presets: &[String],
) -> MemberSets {
    let mut full = Vec::with_capacity(member_ids.len());
    for entity_id in member_ids {
        let Some(entity) = reader.get_state(entity_id) else {
            tracing::debug!(%entity_id, "member has no state, skipping");
            continue;
        };
        let Some(snapshot) = MemberSnapshot::from_entity(&entity) else {
            tracing::debug!(%entity_id, "member unavailable, skipping");
            continue;
        };
        for (attribute, value) in snapshot.unrecognized_values() {
            tracing::debug!(%entity_id, attribute, value, "ignoring unrecognized value");
        }
        full.push(snapshot);
    }

    let sets = MemberSets::partition(full, excluded_presets);
    tracing::trace!(
        working = sets.working.len(),
        full = sets.full.len(),
        "members collected"
    );
    sets
}
