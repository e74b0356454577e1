//! Quire Core - Domain types for repository authorization.
//!
//! This crate provides the vocabulary shared by every quire crate:
//! - [`Role`]: the totally ordered capability levels (reader < writer < admin)
//! - [`Principal`] and [`Requester`]: who an ACL entry names, and who is asking
//! - [`Operation`]: the repository operations that need a decision
//! - [`ResourcePath`], [`Resource`], [`ResourceKind`]: nodes of the repository tree
//! - [`Acl`], [`AclEntry`], [`StoredAclEntry`]: access-control lists as stored and as parsed
//! - [`Decision`]: the ALLOW/DENY outcome
//!
//! It has no knowledge of storage or of how a decision is computed; that
//! lives in `quire-authz`.
//!
//! # Example
//!
//! ```
//! use quire_core::{AclEntry, Principal, Requester, ResourcePath, Role};
//!
//! let path = ResourcePath::parse("/collections/maps/ds1").unwrap();
//! assert_eq!(path.parent().unwrap().as_str(), "/collections/maps");
//!
//! let entry = AclEntry::new(Principal::group("cartographers"), Role::Writer);
//! let alice = Requester::user("alice").with_group("cartographers");
//! assert!(alice.is_member_of("cartographers"));
//! assert!(entry.role >= Role::Reader);
//! ```

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod acl;
mod decision;
mod error;
mod operation;
mod principal;
mod resource;
mod role;

pub use acl::{Acl, AclEntry, StoredAclEntry};
pub use decision::Decision;
pub use error::{CoreError, CoreResult};
pub use operation::Operation;
pub use principal::{DEFAULT_EVERYONE_TOKEN, Principal, PrincipalParser, Requester};
pub use resource::{Resource, ResourceKind, ResourcePath};
pub use role::Role;
