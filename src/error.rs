//! Error types for breathwork.

use thiserror::Error;

use crate::session::{Operation, SessionPhase};

/// Main error type for breathwork operations.
#[derive(Error, Debug)]
pub enum BreathworkError {
    /// Session with the given ID was not found (or belongs to another owner).
    #[error("session not found: {0}")]
    SessionNotFound(String),

    /// Operation is not permitted from the session's current phase.
    #[error("cannot {operation} while session is {phase}")]
    InvalidPhaseTransition {
        operation: Operation,
        phase: SessionPhase,
    },

    /// A field required by the operation was not supplied.
    #[error("missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// A field was supplied with an unacceptable value.
    #[error("invalid value for {field}: {reason}")]
    InvalidField {
        field: &'static str,
        reason: String,
    },

    /// Username is already registered.
    #[error("username already taken: {0}")]
    UsernameTaken(String),

    /// Bearer token missing or unknown.
    #[error("unauthorized")]
    Unauthorized,

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal lock was poisoned.
    #[error("internal lock poisoned")]
    LockPoisoned,
}

impl BreathworkError {
    pub(crate) fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type for breathwork operations.
pub type Result<T> = std::result::Result<T, BreathworkError>;
