//! Prelude module - commonly used types for convenient import.
//!
//! Use `use quire_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{CoreError, CoreResult};

// Policy vocabulary
pub use crate::{Operation, Principal, Requester, Role};

// Resources and ACLs
pub use crate::{Acl, AclEntry, Resource, ResourceKind, ResourcePath, StoredAclEntry};

// Outcome
pub use crate::Decision;
