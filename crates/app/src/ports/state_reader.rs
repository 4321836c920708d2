//! State reader port — synchronous lookup of a member's current entity.

use climate_group_domain::entity::Entity;
use climate_group_domain::id::EntityId;

/// Reads the last known state of host entities.
pub trait StateReader: Send + Sync {
    /// Current entity for `entity_id`, or `None` when the host has none.
    ///
    /// A missing entity is a normal condition (device not set up yet,
    /// removed, ...), not an error.
    fn get_state(&self, entity_id: &EntityId) -> Option<Entity>;
}

impl<T: StateReader> StateReader for std::sync::Arc<T> {
    fn get_state(&self, entity_id: &EntityId) -> Option<Entity> {
        (**self).get_state(entity_id)
    }
}
