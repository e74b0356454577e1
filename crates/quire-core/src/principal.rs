//! Principals named by ACL entries, and the requester being authorized.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{CoreError, CoreResult};

/// Wire token for the everyone pseudo-principal unless configured otherwise.
pub const DEFAULT_EVERYONE_TOKEN: &str = "everyone";

const USER_PREFIX: &str = "user:";
const GROUP_PREFIX: &str = "group:";

/// The subject of an ACL entry.
///
/// `Everyone` is a distinguished variant rather than a magic string, so the
/// matcher can short-circuit on it without comparing names.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Principal {
    /// Matches any requester, authenticated or anonymous.
    Everyone,
    /// Matches a requester whose identity equals the name.
    User(String),
    /// Matches a requester who is a member of the named group.
    Group(String),
    /// A flat principal name: matches the requester's identity or any of its groups.
    Named(String),
}

impl Principal {
    /// Create a user principal.
    #[must_use]
    pub fn user(name: impl Into<String>) -> Self {
        Self::User(name.into())
    }

    /// Create a group principal.
    #[must_use]
    pub fn group(name: impl Into<String>) -> Self {
        Self::Group(name.into())
    }

    /// Create a flat principal name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// Returns `true` for the everyone pseudo-principal.
    #[must_use]
    pub fn is_everyone(&self) -> bool {
        matches!(self, Self::Everyone)
    }
}

/// Renders the everyone pseudo-principal as [`DEFAULT_EVERYONE_TOKEN`].
/// Use [`PrincipalParser::render`] to produce a stored form under a custom token.
impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Everyone => f.write_str(DEFAULT_EVERYONE_TOKEN),
            Self::User(name) => write!(f, "{USER_PREFIX}{name}"),
            Self::Group(name) => write!(f, "{GROUP_PREFIX}{name}"),
            Self::Named(name) => f.write_str(name),
        }
    }
}

/// Parses stored principal strings into [`Principal`] values.
///
/// Accepted forms:
/// - the everyone token (default `everyone`)
/// - `user:<name>`
/// - `group:<name>`
/// - a bare `<name>`
///
/// # Example
///
/// ```
/// use quire_core::{Principal, PrincipalParser};
///
/// let parser = PrincipalParser::default();
/// assert_eq!(parser.parse("everyone").unwrap(), Principal::Everyone);
/// assert_eq!(parser.parse("group:staff").unwrap(), Principal::group("staff"));
/// assert!(parser.parse("user:").is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrincipalParser {
    everyone_token: String,
}

impl PrincipalParser {
    /// Create a parser that recognises `everyone_token` as the everyone pseudo-principal.
    #[must_use]
    pub fn new(everyone_token: impl Into<String>) -> Self {
        Self {
            everyone_token: everyone_token.into(),
        }
    }

    /// The token recognised as everyone.
    #[must_use]
    pub fn everyone_token(&self) -> &str {
        &self.everyone_token
    }

    /// Parse a stored principal string.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedPrincipal`] for empty names or names
    /// containing whitespace.
    pub fn parse(&self, raw: &str) -> CoreResult<Principal> {
        let value = raw.trim();
        if value == self.everyone_token {
            return Ok(Principal::Everyone);
        }

        if let Some(name) = value.strip_prefix(USER_PREFIX) {
            return validate_name(raw, name).map(Principal::user);
        }
        if let Some(name) = value.strip_prefix(GROUP_PREFIX) {
            return validate_name(raw, name).map(Principal::group);
        }
        validate_name(raw, value).map(Principal::named)
    }

    /// The stored form of `principal`, using this parser's everyone token.
    ///
    /// [`PrincipalParser::parse`] maps the result back to `principal`.
    #[must_use]
    pub fn render(&self, principal: &Principal) -> String {
        match principal {
            Principal::Everyone => self.everyone_token.clone(),
            other => other.to_string(),
        }
    }
}

impl Default for PrincipalParser {
    fn default() -> Self {
        Self::new(DEFAULT_EVERYONE_TOKEN)
    }
}

fn validate_name<'a>(raw: &str, name: &'a str) -> CoreResult<&'a str> {
    if name.is_empty() {
        return Err(CoreError::MalformedPrincipal {
            value: raw.to_string(),
            reason: "empty principal name".to_string(),
        });
    }
    if name.chars().any(char::is_whitespace) {
        return Err(CoreError::MalformedPrincipal {
            value: raw.to_string(),
            reason: "principal name contains whitespace".to_string(),
        });
    }
    Ok(name)
}

/// The authenticated (or anonymous) party asking for a decision.
///
/// Supplied by the authentication collaborator before the engine runs.
/// An anonymous requester has no identity and no groups, and is only ever
/// matched by the everyone pseudo-principal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawRequester")]
pub struct Requester {
    identity: Option<String>,
    groups: BTreeSet<String>,
}

/// Wire shape of a [`Requester`], checked before conversion.
#[derive(Deserialize)]
struct RawRequester {
    identity: Option<String>,
    #[serde(default)]
    groups: BTreeSet<String>,
}

impl TryFrom<RawRequester> for Requester {
    type Error = CoreError;

    fn try_from(raw: RawRequester) -> CoreResult<Self> {
        if raw.identity.is_none() && !raw.groups.is_empty() {
            return Err(CoreError::InvalidRequester(
                "an anonymous requester cannot hold group memberships".to_string(),
            ));
        }
        Ok(Self {
            identity: raw.identity,
            groups: raw.groups,
        })
    }
}

impl Requester {
    /// An unauthenticated requester.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// An authenticated user with no group memberships yet.
    #[must_use]
    pub fn user(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
            groups: BTreeSet::new(),
        }
    }

    /// Add a group membership.
    ///
    /// Has no effect on an anonymous requester.
    #[must_use]
    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        if self.identity.is_some() {
            self.groups.insert(group.into());
        }
        self
    }

    /// Add several group memberships.
    #[must_use]
    pub fn with_groups<I, S>(self, groups: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        groups
            .into_iter()
            .fold(self, |requester, group| requester.with_group(group))
    }

    /// The authenticated identity, if any.
    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Group memberships.
    #[must_use]
    pub fn groups(&self) -> &BTreeSet<String> {
        &self.groups
    }

    /// Returns `true` if the requester is unauthenticated.
    #[must_use]
    pub fn is_anonymous(&self) -> bool {
        self.identity.is_none()
    }

    /// Returns `true` if the requester's identity equals `name`.
    #[must_use]
    pub fn is_identity(&self, name: &str) -> bool {
        self.identity.as_deref() == Some(name)
    }

    /// Returns `true` if the requester belongs to `group`.
    #[must_use]
    pub fn is_member_of(&self, group: &str) -> bool {
        self.groups.contains(group)
    }
}

impl fmt::Display for Requester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.identity {
            None => f.write_str("<anonymous>"),
            Some(id) if self.groups.is_empty() => f.write_str(id),
            Some(id) => {
                let groups: Vec<&str> = self.groups.iter().map(String::as_str).collect();
                write!(f, "{id} [{}]", groups.join(", "))
            },
        }
    }
}
