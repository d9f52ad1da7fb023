//! Domain error model.
//!
//! The error set is closed: every operation in the orchestration core fails
//! with exactly one of these variants. The presentation layer maps
//! [`ErrorKind`] values to transport responses; nothing in this workspace
//! matches on message content.

use thiserror::Error;

/// Result type used across the domain layer.
pub type CoreResult<T> = Result<T, CoreError>;

/// Classification of a [`CoreError`], independent of any transport status code.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Forbidden,
    InvalidArgument,
    InvalidState,
    InvalidTransition,
    Conflict,
    InvalidInvoiceInterval,
    Internal,
}

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (authorization,
/// state-machine rules, invariants). Unexpected store or transaction failures
/// are wrapped as `Internal` with their cause attached; raw backend errors
/// never cross this boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The referenced entity does not exist.
    #[error("not found")]
    NotFound,

    /// The caller does not hold the required relationship to the entity.
    #[error("forbidden")]
    Forbidden,

    /// An input value failed validation (e.g. non-positive rate).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The operation is not valid for the entity's current state, outside of
    /// the transition graph (e.g. applying to a filled job).
    #[error("invalid state: {0}")]
    InvalidState(String),

    /// A state-machine edge that does not exist was requested.
    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    /// A store-level uniqueness rule was violated.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Invoicing would exceed the job's contracted interval budget.
    #[error("invoice interval {requested} exceeds budget of {max}")]
    InvalidInvoiceInterval { requested: u32, max: u32 },

    /// Unexpected store/transaction failure, with operation context attached.
    #[error("internal error")]
    Internal(#[source] anyhow::Error),
}

impl CoreError {
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub fn invalid_state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    pub fn invalid_transition(from: impl ToString, to: impl ToString) -> Self {
        Self::InvalidTransition {
            from: from.to_string(),
            to: to.to_string(),
        }
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn internal(cause: impl Into<anyhow::Error>) -> Self {
        Self::Internal(cause.into())
    }

    /// Classification for the presentation layer.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound => ErrorKind::NotFound,
            CoreError::Forbidden => ErrorKind::Forbidden,
            CoreError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            CoreError::InvalidState(_) => ErrorKind::InvalidState,
            CoreError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            CoreError::Conflict(_) => ErrorKind::Conflict,
            CoreError::InvalidInvoiceInterval { .. } => ErrorKind::InvalidInvoiceInterval,
            CoreError::Internal(_) => ErrorKind::Internal,
        }
    }
}
