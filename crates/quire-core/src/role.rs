//! Role levels.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// A capability level granted by an ACL entry.
///
/// Roles form a strict total order: `Reader < Writer < Admin`. A higher role
/// implies every capability of the roles below it, so "does this role suffice"
/// is a single comparison.
///
/// # Example
///
/// ```
/// use quire_core::Role;
///
/// assert!(Role::Admin > Role::Writer);
/// assert!(Role::Writer > Role::Reader);
/// assert_eq!("WRITER".parse::<Role>().unwrap(), Role::Writer);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// May read resources.
    Reader,
    /// May create children and datastreams, and update datastreams.
    Writer,
    /// May delete resources and attach ACLs.
    Admin,
}

impl Role {
    /// Every role, lowest first.
    pub const ALL: [Self; 3] = [Self::Reader, Self::Writer, Self::Admin];

    /// Position in the total order. Lowest is 0.
    #[must_use]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Reader => 0,
            Self::Writer => 1,
            Self::Admin => 2,
        }
    }

    /// The wire name of this role.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Reader => "reader",
            Self::Writer => "writer",
            Self::Admin => "admin",
        }
    }
}

impl PartialOrd for Role {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Role {
    fn cmp(&self, other: &Self) -> Ordering {
        self.rank().cmp(&other.rank())
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        let trimmed = s.trim();
        Self::ALL
            .into_iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| CoreError::UnknownRole(s.to_string()))
    }
}
