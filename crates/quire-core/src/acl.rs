//! Access-control lists.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CoreResult;
use crate::principal::{Principal, PrincipalParser};
use crate::role::Role;

/// An ACL entry exactly as the ACL store holds it.
///
/// Values are unvalidated strings; an entry may name an unknown role or an
/// unparseable principal. Use [`StoredAclEntry::parse`] to interpret it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredAclEntry {
    /// Raw principal string (`everyone`, `user:alice`, `group:staff`, `alice`).
    pub principal: String,
    /// Raw role string (`reader`, `writer`, `admin`).
    pub role: String,
}

impl StoredAclEntry {
    /// Create a stored entry.
    #[must_use]
    pub fn new(principal: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            principal: principal.into(),
            role: role.into(),
        }
    }

    /// Interpret this entry.
    ///
    /// # Errors
    ///
    /// Returns the first parse failure: an unknown role or a malformed principal.
    pub fn parse(&self, parser: &PrincipalParser) -> CoreResult<AclEntry> {
        let role = self.role.parse::<Role>()?;
        let principal = parser.parse(&self.principal)?;
        Ok(AclEntry { principal, role })
    }
}

/// A single grant: `principal` holds `role`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AclEntry {
    /// Who the grant applies to.
    pub principal: Principal,
    /// What the grant confers.
    pub role: Role,
}

impl AclEntry {
    /// Create an entry.
    #[must_use]
    pub fn new(principal: Principal, role: Role) -> Self {
        Self { principal, role }
    }
}

impl fmt::Display for AclEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.principal, self.role)
    }
}

/// An ordered list of grants declared on one resource.
///
/// An ACL that is present but empty still governs its resource: it grants
/// nothing to anyone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Acl {
    entries: Vec<AclEntry>,
}

impl Acl {
    /// Create an ACL from entries, keeping their order.
    #[must_use]
    pub fn new(entries: Vec<AclEntry>) -> Self {
        Self { entries }
    }

    /// Append a grant.
    #[must_use]
    pub fn grant(mut self, principal: Principal, role: Role) -> Self {
        self.entries.push(AclEntry::new(principal, role));
        self
    }

    /// The entries in declaration order.
    #[must_use]
    pub fn entries(&self) -> &[AclEntry] {
        &self.entries
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the ACL grants nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The entries in their stored form, written with `parser`'s everyone token.
    #[must_use]
    pub fn to_stored(&self, parser: &PrincipalParser) -> Vec<StoredAclEntry> {
        self.entries
            .iter()
            .map(|entry| StoredAclEntry::new(parser.render(&entry.principal), entry.role.as_str()))
            .collect()
    }
}

impl FromIterator<AclEntry> for Acl {
    fn from_iter<I: IntoIterator<Item = AclEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
