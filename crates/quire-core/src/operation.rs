//! Repository operations that require an authorization decision.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, CoreResult};

/// An operation a requester wants to perform on a resource.
///
/// For [`Operation::CreateChild`] and [`Operation::CreateDatastream`] the
/// target resource is the container that will receive the new node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Operation {
    /// Read an object or datastream.
    Read,
    /// Add a child object to an object.
    CreateChild,
    /// Add a datastream to an object.
    CreateDatastream,
    /// Replace the content of a datastream.
    UpdateDatastream,
    /// Attach or replace the ACL of a resource.
    AddAcl,
    /// Delete an object or datastream.
    Delete,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Self; 6] = [
        Self::Read,
        Self::CreateChild,
        Self::CreateDatastream,
        Self::UpdateDatastream,
        Self::AddAcl,
        Self::Delete,
    ];

    /// The canonical wire name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Read => "READ",
            Self::CreateChild => "CREATE_CHILD",
            Self::CreateDatastream => "CREATE_DATASTREAM",
            Self::UpdateDatastream => "UPDATE_DATASTREAM",
            Self::AddAcl => "ADD_ACL",
            Self::Delete => "DELETE",
        }
    }

    /// Returns `true` for [`Operation::Read`].
    #[must_use]
    pub const fn is_read(self) -> bool {
        matches!(self, Self::Read)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Operation {
    type Err = CoreError;

    /// Parse a wire name. Case and `-`/`_` separators are not significant.
    fn from_str(s: &str) -> CoreResult<Self> {
        let normalized = s.trim().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|op| op.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| CoreError::UnknownOperation(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_wire_names() {
        for op in Operation::ALL {
            assert_eq!(op.as_str().parse::<Operation>().unwrap(), op);
        }
        assert_eq!("add-acl".parse::<Operation>().unwrap(), Operation::AddAcl);
        assert_eq!("create_child".parse::<Operation>().unwrap(), Operation::CreateChild);
    }

    #[test]
    fn test_unknown_operation_is_an_error() {
        let err = "PATCH".parse::<Operation>().unwrap_err();
        assert_eq!(err, CoreError::UnknownOperation("PATCH".to_string()));
        assert!("".parse::<Operation>().is_err());
    }

    #[test]
    fn test_only_read_is_read() {
        assert!(Operation::Read.is_read());
        assert_eq!(Operation::ALL.iter().filter(|op| op.is_read()).count(), 1);
    }
}
