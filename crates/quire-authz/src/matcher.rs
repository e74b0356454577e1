//! Principal matching.

use quire_core::{Acl, Principal, Requester, Role};

use crate::hierarchy::highest_role;

/// Returns `true` if `entry_principal` applies to `requester`.
///
/// - `Everyone` matches any requester, including anonymous ones.
/// - `User(name)` matches the requester's identity.
/// - `Group(name)` matches one of the requester's groups.
/// - `Named(name)` matches either.
///
/// # Example
///
/// ```
/// use quire_authz::matches;
/// use quire_core::{Principal, Requester};
///
/// let anon = Requester::anonymous();
/// assert!(matches(&anon, &Principal::Everyone));
/// assert!(!matches(&anon, &Principal::named("everyone-else")));
///
/// let bob = Requester::user("bob").with_group("staff");
/// assert!(matches(&bob, &Principal::group("staff")));
/// assert!(!matches(&bob, &Principal::user("staff")));
/// ```
#[must_use]
pub fn matches(requester: &Requester, entry_principal: &Principal) -> bool {
    match entry_principal {
        Principal::Everyone => true,
        Principal::User(name) => requester.is_identity(name),
        Principal::Group(name) => requester.is_member_of(name),
        Principal::Named(name) => requester.is_identity(name) || requester.is_member_of(name),
    }
}

/// The highest role `acl` grants to `requester`, or `None` if no entry matches.
#[must_use]
pub fn effective_role(acl: &Acl, requester: &Requester) -> Option<Role> {
    highest_role(
        acl.entries()
            .iter()
            .filter(|entry| matches(requester, &entry.principal))
            .map(|entry| entry.role),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_everyone_matches_anonymous() {
        assert!(matches(&Requester::anonymous(), &Principal::Everyone));
        assert!(matches(&Requester::user("x"), &Principal::Everyone));
    }

    #[test]
    fn test_anonymous_matches_only_everyone() {
        let anon = Requester::anonymous();
        assert!(!matches(&anon, &Principal::user("")));
        assert!(!matches(&anon, &Principal::group("staff")));
        assert!(!matches(&anon, &Principal::named("anonymous")));
    }

    #[test]
    fn test_user_and_group_are_distinct() {
        let req = Requester::user("alice").with_group("editors");
        assert!(matches(&req, &Principal::user("alice")));
        assert!(!matches(&req, &Principal::group("alice")));
        assert!(matches(&req, &Principal::group("editors")));
        assert!(!matches(&req, &Principal::user("editors")));
    }

    #[test]
    fn test_named_matches_identity_or_group() {
        let req = Requester::user("alice").with_group("editors");
        assert!(matches(&req, &Principal::named("alice")));
        assert!(matches(&req, &Principal::named("editors")));
        assert!(!matches(&req, &Principal::named("bob")));
    }

    #[test]
    fn test_effective_role_takes_maximum() {
        let acl = Acl::default()
            .grant(Principal::Everyone, Role::Reader)
            .grant(Principal::group("editors"), Role::Writer)
            .grant(Principal::user("root"), Role::Admin);

        let editor = Requester::user("alice").with_group("editors");
        assert_eq!(effective_role(&acl, &editor), Some(Role::Writer));
        assert_eq!(effective_role(&acl, &Requester::anonymous()), Some(Role::Reader));
        assert_eq!(effective_role(&acl, &Requester::user("root")), Some(Role::Admin));
    }

    #[test]
    fn test_effective_role_none_when_nothing_matches() {
        let acl = Acl::default().grant(Principal::user("bob"), Role::Admin);
        assert_eq!(effective_role(&acl, &Requester::user("alice")), None);
        assert_eq!(effective_role(&Acl::default(), &Requester::user("alice")), None);
    }
}
