//! Authorization outcome.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The answer to "may this requester perform this operation on this resource".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    /// The operation is permitted.
    Allow,
    /// The operation is not permitted.
    Deny,
}

impl Decision {
    /// Returns `true` for [`Decision::Allow`].
    #[must_use]
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allow)
    }

    /// `Allow` when `allowed`, otherwise `Deny`.
    #[must_use]
    pub fn from_bool(allowed: bool) -> Self {
        if allowed { Self::Allow } else { Self::Deny }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Allow => f.write_str("ALLOW"),
            Self::Deny => f.write_str("DENY"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_bool() {
        assert_eq!(Decision::from_bool(true), Decision::Allow);
        assert_eq!(Decision::from_bool(false), Decision::Deny);
        assert!(Decision::Allow.is_allowed());
        assert!(!Decision::Deny.is_allowed());
    }

    #[test]
    fn test_display() {
        assert_eq!(Decision::Allow.to_string(), "ALLOW");
        assert_eq!(Decision::Deny.to_string(), "DENY");
    }
}
