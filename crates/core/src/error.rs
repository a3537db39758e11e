//! Shared error model for the gate.

use thiserror::Error;

/// Result type used across the gate's pure layers.
pub type GateResult<T> = Result<T, GateError>;

/// Validation-level error.
///
/// Keep this focused on deterministic failures (malformed identifiers, paths or
/// credentials). Transport and storage concerns have their own error types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GateError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// An identifier was invalid (e.g. empty).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A page path could not be used for matching.
    #[error("invalid page path: {0}")]
    InvalidPath(String),
}

impl GateError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn invalid_path(msg: impl Into<String>) -> Self {
        Self::InvalidPath(msg.into())
    }
}
