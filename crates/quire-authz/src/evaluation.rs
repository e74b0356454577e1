//! Decision explanations.

use quire_core::{Decision, ResourcePath, Role};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Why a decision came out the way it did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
    /// The resource is open and the operation is a read.
    OpenRead,
    /// The governing ACL grants the requester a sufficient role.
    Granted {
        /// Effective role of the requester.
        role: Role,
        /// Where the governing ACL is declared.
        acl_defined_on: ResourcePath,
    },
    /// No ACL exists from the resource up to the root.
    NoPolicyDefined,
    /// The governing ACL has no entry matching the requester.
    NoMatchingEntry {
        /// Where the governing ACL is declared.
        acl_defined_on: ResourcePath,
    },
    /// The requester's effective role is below the required one.
    InsufficientRole {
        /// Effective role of the requester.
        have: Role,
        /// Role the operation requires.
        need: Role,
        /// Where the governing ACL is declared.
        acl_defined_on: ResourcePath,
    },
}

impl Reason {
    /// The decision this reason implies.
    #[must_use]
    pub fn decision(&self) -> Decision {
        Decision::from_bool(matches!(self, Self::OpenRead | Self::Granted { .. }))
    }

    /// Where the governing ACL is declared, if one was consulted.
    #[must_use]
    pub fn acl_defined_on(&self) -> Option<&ResourcePath> {
        match self {
            Self::Granted { acl_defined_on, .. }
            | Self::NoMatchingEntry { acl_defined_on }
            | Self::InsufficientRole { acl_defined_on, .. } => Some(acl_defined_on),
            Self::OpenRead | Self::NoPolicyDefined => None,
        }
    }
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OpenRead => f.write_str("resource is open for reading"),
            Self::Granted {
                role,
                acl_defined_on,
            } => write!(f, "granted {role} by ACL on {acl_defined_on}"),
            Self::NoPolicyDefined => f.write_str("no ACL defined up to the root"),
            Self::NoMatchingEntry { acl_defined_on } => {
                write!(f, "no entry in ACL on {acl_defined_on} matches the requester")
            },
            Self::InsufficientRole {
                have,
                need,
                acl_defined_on,
            } => write!(
                f,
                "ACL on {acl_defined_on} grants {have}, operation requires {need}"
            ),
        }
    }
}

/// A decision together with its explanation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    /// ALLOW or DENY.
    pub decision: Decision,
    /// Why.
    pub reason: Reason,
}

impl Evaluation {
    /// Returns `true` for ALLOW.
    #[must_use]
    pub fn is_allowed(&self) -> bool {
        self.decision.is_allowed()
    }
}

impl From<Reason> for Evaluation {
    fn from(reason: Reason) -> Self {
        Self {
            decision: reason.decision(),
            reason,
        }
    }
}

impl fmt::Display for Evaluation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.decision, self.reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_implies_decision() {
        let on = ResourcePath::root();
        assert_eq!(Reason::OpenRead.decision(), Decision::Allow);
        assert_eq!(
            Reason::Granted {
                role: Role::Reader,
                acl_defined_on: on.clone()
            }
            .decision(),
            Decision::Allow
        );
        assert_eq!(Reason::NoPolicyDefined.decision(), Decision::Deny);
        assert_eq!(
            Reason::NoMatchingEntry {
                acl_defined_on: on.clone()
            }
            .decision(),
            Decision::Deny
        );
        assert_eq!(
            Reason::InsufficientRole {
                have: Role::Reader,
                need: Role::Admin,
                acl_defined_on: on
            }
            .decision(),
            Decision::Deny
        );
    }

    #[test]
    fn test_display() {
        let eval = Evaluation::from(Reason::InsufficientRole {
            have: Role::Writer,
            need: Role::Admin,
            acl_defined_on: ResourcePath::parse("/a").unwrap(),
        });
        assert!(!eval.is_allowed());
        assert_eq!(
            eval.to_string(),
            "DENY (ACL on /a grants writer, operation requires admin)"
        );
    }

    #[test]
    fn test_serde_tagged() {
        let json = serde_json::to_value(Reason::NoPolicyDefined).unwrap();
        assert_eq!(json["kind"], "no_policy_defined");

        let granted: Reason = serde_json::from_str(
            r#"{"kind":"granted","role":"writer","acl_defined_on":"/x"}"#,
        )
        .unwrap();
        assert_eq!(granted.acl_defined_on().unwrap().as_str(), "/x");
    }
}
