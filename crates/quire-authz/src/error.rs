//! Error types for storage access and policy evaluation.

use quire_core::ResourcePath;
use thiserror::Error;

/// Errors reported by the resource tree provider or the ACL store.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    /// The backend could not be reached or refused the read.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// The read did not complete in time.
    #[error("storage read timed out after {timeout_ms}ms")]
    Timeout {
        /// Time waited before giving up, in milliseconds.
        timeout_ms: u64,
    },

    /// A write named a resource that does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// A write would violate the shape of the tree.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A repository snapshot could not be read or parsed.
    #[error("invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Any other backend failure (lock poisoned, corrupt record, ...).
    #[error("storage error: {0}")]
    Internal(String),
}

/// Result type for storage reads.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that abort an authorization decision.
///
/// None of these mean "deny": a policy that grants nothing produces
/// [`quire_core::Decision::Deny`], never an error. The caller decides how to
/// answer the request when evaluation fails (fail closed is recommended).
#[derive(Debug, Error)]
pub enum AuthzError {
    /// A resource or ACL read failed.
    #[error("policy evaluation failed: {0}")]
    StorageUnavailable(#[from] StorageError),

    /// The tree provider returned an inconsistent tree.
    #[error("policy evaluation failed: broken tree at {path}: {reason}")]
    BrokenTree {
        /// Where the inconsistency was found.
        path: ResourcePath,
        /// What was wrong.
        reason: String,
    },

    /// The caller passed an operation outside the operation table.
    #[error("unknown operation: '{0}'")]
    UnknownOperation(String),
}

impl AuthzError {
    /// Returns `true` if the failure came from the storage layer.
    #[must_use]
    pub fn is_storage(&self) -> bool {
        matches!(self, Self::StorageUnavailable(_))
    }
}

/// Result type for authorization operations.
pub type AuthzResult<T> = Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_converts() {
        let err = AuthzError::from(StorageError::Timeout { timeout_ms: 250 });
        assert!(err.is_storage());
        assert!(err.to_string().contains("250ms"), "got: {err}");
    }

    #[test]
    fn test_broken_tree_is_not_storage() {
        let err = AuthzError::BrokenTree {
            path: ResourcePath::root(),
            reason: "root missing".to_string(),
        };
        assert!(!err.is_storage());
        assert!(err.to_string().contains("root missing"), "got: {err}");
    }
}
