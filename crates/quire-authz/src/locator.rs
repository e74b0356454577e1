//! Governing-ACL location.
//!
//! Starting at the target resource, the locator checks for an own ACL and
//! otherwise moves to the parent, until an ACL is found or the root has
//! been checked. The first ACL found governs; ancestors above it are never
//! consulted, however permissive or restrictive they are. Objects and
//! datastreams are walked identically.

use quire_core::{Acl, PrincipalParser, Resource, ResourcePath, StoredAclEntry};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{AuthzError, AuthzResult};
use crate::provider::{AclStore, ResourceTreeProvider};

/// An ACL together with the resource it is declared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatedAcl {
    /// The parsed ACL. Malformed stored entries have been dropped.
    pub acl: Acl,
    /// The resource the ACL is attached to.
    pub defined_on: ResourcePath,
}

/// Result of a locator walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// The nearest ACL at or above the resource.
    Found(LocatedAcl),
    /// No ACL exists anywhere from the resource up to and including the root.
    NoAclDefined,
}

impl Location {
    /// The located ACL, if any.
    #[must_use]
    pub fn located(&self) -> Option<&LocatedAcl> {
        match self {
            Self::Found(located) => Some(located),
            Self::NoAclDefined => None,
        }
    }
}

/// Walks the resource tree toward the root to find the governing ACL.
pub struct AclLocator {
    tree: Arc<dyn ResourceTreeProvider>,
    acls: Arc<dyn AclStore>,
    parser: PrincipalParser,
}

impl AclLocator {
    /// Create a locator over the given tree and ACL store.
    #[must_use]
    pub fn new(
        tree: Arc<dyn ResourceTreeProvider>,
        acls: Arc<dyn AclStore>,
        parser: PrincipalParser,
    ) -> Self {
        Self {
            tree,
            acls,
            parser,
        }
    }

    /// The principal parser applied to stored entries.
    #[must_use]
    pub fn parser(&self) -> &PrincipalParser {
        &self.parser
    }

    /// Find the ACL governing `resource`.
    ///
    /// O(depth) reads: one ACL read per level visited and one resource read
    /// per parent.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::StorageUnavailable`] if any read fails, and
    /// [`AuthzError::BrokenTree`] if a resource's parent does not exist.
    pub async fn locate(&self, resource: &Resource) -> AuthzResult<Location> {
        let mut current = resource.clone();
        loop {
            if let Some(stored) = self.acls.get_own_acl(&current).await? {
                debug!(
                    target_path = %resource.path,
                    defined_on = %current.path,
                    entries = stored.len(),
                    "located governing ACL"
                );
                return Ok(Location::Found(LocatedAcl {
                    acl: self.parse_acl(&current.path, &stored),
                    defined_on: current.path,
                }));
            }

            let Some(parent_path) = current.parent_path() else {
                debug!(target_path = %resource.path, "no ACL defined up to the root");
                return Ok(Location::NoAclDefined);
            };

            current = self
                .tree
                .get_parent(&current)
                .await?
                .ok_or_else(|| AuthzError::BrokenTree {
                    path: current.path.clone(),
                    reason: format!("parent {parent_path} does not exist"),
                })?;

            if current.path != parent_path {
                return Err(AuthzError::BrokenTree {
                    path: parent_path,
                    reason: format!("provider returned {} as parent", current.path),
                });
            }
        }
    }

    /// Parse stored entries, skipping any that are malformed.
    ///
    /// A bad entry is treated as absent so that it cannot take down
    /// evaluation for the whole resource.
    fn parse_acl(&self, defined_on: &ResourcePath, stored: &[StoredAclEntry]) -> Acl {
        stored
            .iter()
            .filter_map(|entry| match entry.parse(&self.parser) {
                Ok(parsed) => Some(parsed),
                Err(e) => {
                    warn!(
                        resource = %defined_on,
                        principal = %entry.principal,
                        role = %entry.role,
                        error = %e,
                        "skipping malformed ACL entry"
                    );
                    None
                },
            })
            .collect()
    }
}

impl std::fmt::Debug for AclLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AclLocator")
            .field("parser", &self.parser)
            .finish_non_exhaustive()
    }
}
