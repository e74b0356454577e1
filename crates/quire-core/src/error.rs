//! Parse and validation errors for domain types.

use thiserror::Error;

/// Errors that can occur when building domain types from wire strings.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A role string was not one of `reader`, `writer`, `admin`.
    #[error("unknown role: '{0}'")]
    UnknownRole(String),

    /// An operation string is not in the operation table.
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),

    /// A principal string could not be interpreted.
    #[error("malformed principal '{value}': {reason}")]
    MalformedPrincipal {
        /// The raw principal value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A requester failed validation.
    #[error("invalid requester: {0}")]
    InvalidRequester(String),

    /// A resource path was not a valid absolute repository path.
    #[error("invalid resource path '{path}': {reason}")]
    InvalidPath {
        /// The raw path value.
        path: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Result type for core parsing operations.
pub type CoreResult<T> = Result<T, CoreError>;
