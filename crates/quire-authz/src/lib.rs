//! Quire Authz - ACL resolution and role-based access decisions.
//!
//! This crate decides whether a requester may perform an operation on a
//! node of a hierarchical repository. It provides:
//! - Role comparison ([`required_role_satisfied_by`]) and principal matching ([`matches`])
//! - The operation table ([`required_role`])
//! - Governing-ACL location by walking toward the root ([`AclLocator`])
//! - The [`DecisionEngine`], which composes the above
//! - An optional invalidation-aware [`AclCache`]
//! - Decision audit sinks ([`DecisionSink`])
//! - A [`MemoryRepository`] implementing the storage traits
//!
//! # Policy
//!
//! - The nearest ACL at or above a resource governs it. ACLs never merge
//!   across levels.
//! - No ACL anywhere up to the root means DENY.
//! - A resource marked open may be READ by anyone. Every other operation
//!   ignores the flag.
//! - Storage failures are errors, not decisions.
//!
//! # Example
//!
//! ```
//! use quire_authz::{DecisionEngine, MemoryRepository, NullSink, Reason};
//! use quire_core::{Operation, Requester, ResourcePath, Role};
//! use std::sync::Arc;
//!
//! let repo = Arc::new(
//!     MemoryRepository::from_snapshot_toml(
//!         r#"
//!         [[resource]]
//!         path = "/maps"
//!         acl = [{ principal = "group:cartographers", role = "writer" }]
//!
//!         [[resource]]
//!         path = "/maps/scan"
//!         kind = "datastream"
//!         "#,
//!     )
//!     .unwrap(),
//! );
//! let engine = DecisionEngine::new(repo.clone(), repo).with_sink(Arc::new(NullSink));
//!
//! let ada = Requester::user("ada").with_group("cartographers");
//! let scan = ResourcePath::parse("/maps/scan").unwrap();
//!
//! let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
//! let eval = runtime
//!     .block_on(engine.evaluate(&ada, &scan, Operation::UpdateDatastream))
//!     .unwrap();
//! assert!(eval.is_allowed());
//! assert!(matches!(eval.reason, Reason::Granted { role: Role::Writer, .. }));
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod audit;
mod cache;
mod classifier;
mod engine;
mod error;
mod evaluation;
mod hierarchy;
mod locator;
mod matcher;
mod memory;
mod provider;

pub use audit::{
    AUDIT_TARGET, DecisionOutcome, DecisionRecord, DecisionSink, MemorySink, NullSink, TracingSink,
};
pub use cache::{AclCache, CacheStats, DEFAULT_MAX_ENTRIES};
pub use classifier::{classify_named, required_role};
pub use engine::DecisionEngine;
pub use error::{AuthzError, AuthzResult, StorageError, StorageResult};
pub use evaluation::{Evaluation, Reason};
pub use hierarchy::{highest_role, required_role_satisfied_by};
pub use locator::{AclLocator, LocatedAcl, Location};
pub use matcher::{effective_role, matches};
pub use memory::{MemoryRepository, Snapshot, SnapshotResource};
pub use provider::{AclStore, AclWriteListener, ResourceTreeProvider};
