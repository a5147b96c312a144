//! # Engine Error Types
//!
//! Recoverable failures surfaced at startup: configuration, registration and
//! query construction. Misuse of live handles (stale entities, missing
//! components, double slot frees) is a contract violation and panics instead.

use thiserror::Error;

/// Errors that can occur while configuring the engine or building queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EcsError {
    /// A configuration value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Registering another component type would exceed the configured limit.
    #[error("too many component types: limit is {limit}")]
    TooManyComponents {
        /// The configured maximum number of component types.
        limit: usize,
    },

    /// A component type was used before being registered.
    #[error("component type not registered: {0}")]
    UnregisteredComponent(&'static str),

    /// A query named the same component type more than once.
    #[error("component type requested twice in one query: {0}")]
    DuplicateQueryComponent(&'static str),
}

/// Result type for engine setup operations.
pub type EcsResult<T> = Result<T, EcsError>;

impl From<toml::de::Error> for EcsError {
    fn from(err: toml::de::Error) -> Self {
        Self::ConfigParse(err.to_string())
    }
}
