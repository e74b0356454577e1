//! Role hierarchy.
//!
//! `Reader < Writer < Admin`. A role satisfies every requirement at or
//! below its own level.

use quire_core::Role;

/// Returns `true` iff `have >= need`.
///
/// # Example
///
/// ```
/// use quire_authz::required_role_satisfied_by;
/// use quire_core::Role;
///
/// assert!(required_role_satisfied_by(Role::Admin, Role::Reader));
/// assert!(required_role_satisfied_by(Role::Writer, Role::Writer));
/// assert!(!required_role_satisfied_by(Role::Reader, Role::Writer));
/// ```
#[must_use]
pub fn required_role_satisfied_by(have: Role, need: Role) -> bool {
    have >= need
}

/// The highest of `roles`, or `None` if there are none.
#[must_use]
pub fn highest_role<I>(roles: I) -> Option<Role>
where
    I: IntoIterator<Item = Role>,
{
    roles.into_iter().max()
}
