//! Error kinds shared by the gateway, the interpreter and store implementations.

use thiserror::Error;

/// Login failures. Never stored in a session.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid login or password")]
    InvalidCredentials,
    #[error("credential lookup failed: {0}")]
    Storage(#[from] StorageError),
}

/// Failures reported by a `PersistenceStore`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
}

/// Per-field validation failures inside a guided flow.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("group '{0}' not found")]
    GroupNotFound(String),
    #[error("grade {0} is outside 1..=5")]
    GradeOutOfRange(i64),
    #[error("'{0}' is not a number")]
    GradeNotANumber(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("unrecognized command: '{0}'")]
    Unrecognized(String),
}
