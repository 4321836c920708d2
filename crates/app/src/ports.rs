//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the host
//! platform. They are defined here (in `app`) so that both the use-case
//! layer and the adapter layer can depend on them without creating
//! circular dependencies.

pub mod event_bus;
pub mod service_caller;
pub mod state_reader;
pub mod state_tracker;

pub use event_bus::EventPublisher;
pub use service_caller::ServiceCaller;
pub use state_reader::StateReader;
pub use state_tracker::{StateListener, StateTracker, Subscription};
