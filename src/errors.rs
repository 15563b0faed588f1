use serde::Serialize;
use thiserror::Error;

use crate::record::RecordError;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("No external record bound to the environment")]
    MissingBinding,

    #[error("Unknown field {0}")]
    UnknownField(String),

    #[error("{0} is derived and cannot be set directly")]
    NotAnInput(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Record error: {0}")]
    RecordError(#[from] RecordError),
}

/// Raised when a computation cannot run because one of its operands has no
/// usable value. The target field is invalidated with this error's message.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum ComputeError {
    #[error("{component}.{field} has no value")]
    MissingInput {
        component: &'static str,
        field: &'static str,
    },

    #[error("{component}.{field} is invalid: {reason}")]
    InvalidInput {
        component: &'static str,
        field: &'static str,
        reason: String,
    },
}
