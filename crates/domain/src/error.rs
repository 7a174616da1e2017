//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`ZonelightError`] via `From` at the port boundary.

/// Top-level error returned by fallible zonelight operations.
#[derive(Debug, thiserror::Error)]
pub enum ZonelightError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    /// A persistence adapter failed.
    #[error("storage error")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// A light-control adapter failed.
    #[error("light control error")]
    Light(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Domain invariant violations, mostly raised by configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    EmptyName,

    #[error("zone '{zone}' must control at least one light")]
    NoLights { zone: String },

    #[error("'{value}' is reserved and cannot be configured as a {kind}")]
    Reserved { kind: &'static str, value: String },

    #[error("scene '{scene}' is configured both as a simple and as an event scene")]
    OverlappingScene { scene: String },

    #[error("zone name '{name}' is used more than once")]
    DuplicateZoneName { name: String },

    #[error("'{scene}' is not a simple scene of this zone")]
    NotSimpleScene { scene: String },
}

/// A lookup by identifier found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} '{id}' not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}
