//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ClimateGroupError`] via `#[from]` so that only one error type crosses
//! the port boundaries.

/// Top-level error for every fallible operation of the workspace.
#[derive(Debug, thiserror::Error)]
pub enum ClimateGroupError {
    /// A value failed domain validation.
    #[error("validation error")]
    Validation(#[from] ValidationError),

    /// A referenced entity does not exist on the host.
    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// The host platform failed to carry out a request (e.g. command delivery).
    #[error("host error")]
    Host(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("a climate group needs at least one member entity")]
    NoMembers,

    #[error("invalid entity id {0:?}, expected <domain>.<object_id>")]
    InvalidEntityId(String),

    #[error("entity {0} is not in the climate domain")]
    NotClimateEntity(String),

    #[error("unknown climate service {0:?}")]
    UnknownService(String),

    #[error("missing field {0:?}")]
    MissingField(&'static str),

    #[error("field {0:?} has an unexpected type")]
    InvalidField(&'static str),

    #[error("unknown hvac mode {0:?}")]
    InvalidHvacMode(String),

    #[error("unknown hvac action {0:?}")]
    InvalidHvacAction(String),
}

/// A lookup for a named item returned nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
