//! # climate-group-domain
//!
//! Pure domain model for climate groups: one virtual thermostat that
//! aggregates many real ones.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define the raw host **Entity** (state string + loosely typed attributes)
//! - Define the typed **climate vocabulary** (modes, actions, capability flags)
//! - Convert raw entities into **member snapshots** at the boundary
//! - Reduce member snapshots into one **composite state**
//! - Translate composite **commands** into outbound service calls
//! - Define validated **group definitions**
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod climate;
pub mod entity;
pub mod event;
pub mod group;
pub mod service;
