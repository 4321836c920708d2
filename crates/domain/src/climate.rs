//! Climate vocabulary, member snapshots and the reduction engine.
//!
//! Raw [`Entity`](crate::entity::Entity) values enter through
//! [`MemberSnapshot::from_entity`], where every string is parsed once into
//! the typed vocabulary. From there on everything is typed: the reduction
//! engine never looks at attribute keys or raw strings.

mod command;
mod composite;
mod feature;
mod mode;
pub mod reduction;
mod snapshot;
mod unit;

pub use command::{ClimateCommand, TemperatureTarget};
pub use composite::CompositeState;
pub use feature::ClimateFeatures;
pub use mode::{HvacAction, HvacMode, Parsed};
pub use snapshot::{MemberSets, MemberSnapshot, attr};
pub use unit::TemperatureUnit;
