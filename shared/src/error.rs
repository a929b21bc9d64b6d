//! Error taxonomy shared by every fleet crate

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FleetError {
    /// A seeded entity or appended insight is malformed.
    #[error("invalid {entity} '{id}': {reason}")]
    Validation {
        entity: &'static str,
        id: String,
        reason: String,
    },

    #[error("duplicate {entity} id '{id}'")]
    DuplicateId { entity: &'static str, id: String },

    #[error("{0} registry has already been seeded")]
    AlreadySeeded(&'static str),

    /// Mutation targeted an id that is not in the registry.
    #[error("no {entity} with id '{id}'")]
    LookupMiss { entity: &'static str, id: String },

    #[error("fleet roster has not been seeded")]
    NotSeeded,

    #[error("simulation is already running")]
    AlreadyRunning,

    #[error("simulation has been stopped and cannot be restarted")]
    AlreadyStopped,

    #[error("invalid configuration value for {key}: {reason}")]
    Config { key: &'static str, reason: String },
}

impl FleetError {
    pub fn validation(entity: &'static str, id: impl Into<String>, reason: impl Into<String>) -> Self {
        FleetError::Validation {
            entity,
            id: id.into(),
            reason: reason.into(),
        }
    }

    /// Errors that should abort startup rather than be logged and skipped.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, FleetError::LookupMiss { .. })
    }
}

pub type FleetResult<T> = Result<T, FleetError>;
