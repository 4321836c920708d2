//! Virtual host error types.

use climate_group_domain::error::{ClimateGroupError, NotFoundError};
use climate_group_domain::id::EntityId;

/// Errors specific to the virtual host.
#[derive(Debug, thiserror::Error)]
pub enum VirtualError {
    /// No thermostat is registered under this id.
    #[error("unknown thermostat {0}")]
    UnknownThermostat(EntityId),

    /// A thermostat is already registered under this id.
    #[error("thermostat {0} already exists")]
    DuplicateThermostat(EntityId),

    /// State tracking needs a tokio runtime to run its listener task.
    #[error("state tracking requires a tokio runtime")]
    NoRuntime(#[source] tokio::runtime::TryCurrentError),

    /// A domain-level error (validation, not-found, etc.).
    #[error("domain error")]
    Domain(#[source] ClimateGroupError),
}

impl VirtualError {
    /// Convert into a [`ClimateGroupError`] for propagation across port
    /// boundaries.
    pub fn into_domain(self) -> ClimateGroupError {
        match self {
            Self::Domain(err) => err,
            Self::UnknownThermostat(id) => NotFoundError {
                entity: "Entity",
                id: id.to_string(),
            }
            .into(),
            other => ClimateGroupError::Host(Box::new(other)),
        }
    }
}

impl From<VirtualError> for ClimateGroupError {
    fn from(err: VirtualError) -> Self {
        err.into_domain()
    }
}

impl From<ClimateGroupError> for VirtualError {
    fn from(err: ClimateGroupError) -> Self {
        Self::Domain(err)
    }
}
