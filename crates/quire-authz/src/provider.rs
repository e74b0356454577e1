//! Read-only views of the repository consumed by the engine.
//!
//! The engine never owns resource or ACL state. It reads both through the
//! two traits here, which the storage layer implements:
//!
//! ```text
//! ResourceTreeProvider   path -> Resource { path, kind, open }
//! AclStore               resource -> own ACL entries (or none)
//! ```
//!
//! Any read failure is reported as a [`StorageError`] and surfaces from the
//! engine as an evaluation error, never as a decision.

use async_trait::async_trait;
use quire_core::{Resource, ResourcePath, StoredAclEntry};
use std::sync::Arc;

use crate::error::StorageResult;

/// Resolves repository paths to resources.
#[async_trait]
pub trait ResourceTreeProvider: Send + Sync {
    /// Look up the resource at `path`.
    ///
    /// Returns `None` if nothing exists at that path.
    async fn get_resource(&self, path: &ResourcePath) -> StorageResult<Option<Resource>>;

    /// Look up the parent of `resource`.
    ///
    /// Returns `None` for the root. The default implementation resolves the
    /// lexical parent path.
    async fn get_parent(&self, resource: &Resource) -> StorageResult<Option<Resource>> {
        match resource.parent_path() {
            Some(parent) => self.get_resource(&parent).await,
            None => Ok(None),
        }
    }
}

/// Reads ACLs attached directly to a resource.
#[async_trait]
pub trait AclStore: Send + Sync {
    /// The ACL declared on `resource` itself, ignoring ancestors.
    ///
    /// `None` means no ACL is attached. `Some(vec![])` is an attached ACL
    /// that grants nothing.
    async fn get_own_acl(&self, resource: &Resource) -> StorageResult<Option<Vec<StoredAclEntry>>>;
}

/// Notified synchronously whenever an ACL or resource changes.
///
/// Implemented by caches that must never serve a decision based on an ACL
/// that has since been written or removed.
pub trait AclWriteListener: Send + Sync {
    /// Something at `path` changed: its ACL was set or removed, or the
    /// resource itself was removed.
    fn acl_changed(&self, path: &ResourcePath);
}

#[async_trait]
impl<T: ResourceTreeProvider + ?Sized> ResourceTreeProvider for Arc<T> {
    async fn get_resource(&self, path: &ResourcePath) -> StorageResult<Option<Resource>> {
        (**self).get_resource(path).await
    }

    async fn get_parent(&self, resource: &Resource) -> StorageResult<Option<Resource>> {
        (**self).get_parent(resource).await
    }
}

#[async_trait]
impl<T: AclStore + ?Sized> AclStore for Arc<T> {
    async fn get_own_acl(&self, resource: &Resource) -> StorageResult<Option<Vec<StoredAclEntry>>> {
        (**self).get_own_acl(resource).await
    }
}
