//! # climate-group-app
//!
//! Application layer — use-cases and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define **port traits** the host platform implements:
//!   - `StateReader` — read the current entity of a member
//!   - `StateTracker` — subscribe to member state changes
//!   - `ServiceCaller` — deliver a service call to entities
//!   - `EventPublisher` — publish events on a bus
//! - Collect member snapshots (`collector`) and forward commands (`dispatcher`)
//! - Run the `ClimateGroup` virtual device: one update loop per group that
//!   recomputes the composite state on every member change
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `climate-group-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod climate_group;
pub mod collector;
pub mod dispatcher;
pub mod event_bus;
pub mod ports;
