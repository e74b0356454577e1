//! Resource paths and repository nodes.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, CoreResult};

const SEPARATOR: char = '/';

/// A normalized, absolute path to a node in the repository tree.
///
/// Invariants: starts with `/`, has no trailing `/` (except the root itself),
/// and has no empty, `.` or `..` segments. Every path except the root has
/// exactly one lexical parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResourcePath(String);

impl ResourcePath {
    /// The repository root, `/`.
    #[must_use]
    pub fn root() -> Self {
        Self(SEPARATOR.to_string())
    }

    /// Parse and normalize a path.
    ///
    /// A missing leading `/` and a trailing `/` are tolerated; repeated
    /// separators are collapsed.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPath`] for `.` or `..` segments or
    /// segments containing control characters.
    ///
    /// # Example
    ///
    /// ```
    /// use quire_core::ResourcePath;
    ///
    /// assert_eq!(ResourcePath::parse("a//b/").unwrap().as_str(), "/a/b");
    /// assert!(ResourcePath::parse("/a/../b").is_err());
    /// ```
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let mut normalized = String::with_capacity(raw.len().saturating_add(1));
        for segment in raw.trim().split(SEPARATOR).filter(|s| !s.is_empty()) {
            if segment == "." || segment == ".." {
                return Err(CoreError::InvalidPath {
                    path: raw.to_string(),
                    reason: format!("relative segment '{segment}'"),
                });
            }
            if segment.chars().any(char::is_control) {
                return Err(CoreError::InvalidPath {
                    path: raw.to_string(),
                    reason: "control character in segment".to_string(),
                });
            }
            normalized.push(SEPARATOR);
            normalized.push_str(segment);
        }

        if normalized.is_empty() {
            return Ok(Self::root());
        }
        Ok(Self(normalized))
    }

    /// The path as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for `/`.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.len() == 1
    }

    /// The lexical parent, or `None` for the root.
    #[must_use]
    pub fn parent(&self) -> Option<Self> {
        if self.is_root() {
            return None;
        }
        match self.0.rfind(SEPARATOR) {
            Some(0) | None => Some(Self::root()),
            Some(idx) => Some(Self(self.0[..idx].to_string())),
        }
    }

    /// The last segment, or `None` for the root.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        if self.is_root() {
            return None;
        }
        self.0.rsplit(SEPARATOR).next()
    }

    /// Append a single segment.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidPath`] if `segment` is empty, relative or
    /// contains a separator.
    pub fn join(&self, segment: &str) -> CoreResult<Self> {
        if segment.is_empty() || segment.contains(SEPARATOR) {
            return Err(CoreError::InvalidPath {
                path: segment.to_string(),
                reason: "not a single path segment".to_string(),
            });
        }
        let base = if self.is_root() { "" } else { self.as_str() };
        Self::parse(&format!("{base}/{segment}"))
    }

    /// Returns `true` if `self` equals `ancestor` or lies beneath it.
    #[must_use]
    pub fn is_within(&self, ancestor: &Self) -> bool {
        if ancestor.is_root() || self == ancestor {
            return true;
        }
        self.0
            .strip_prefix(ancestor.as_str())
            .is_some_and(|rest| rest.starts_with(SEPARATOR))
    }

    /// This path followed by each ancestor up to and including the root.
    pub fn ancestors(&self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(self.clone()), Self::parent)
    }

    /// Number of segments below the root.
    #[must_use]
    pub fn depth(&self) -> usize {
        if self.is_root() {
            0
        } else {
            self.0.matches(SEPARATOR).count()
        }
    }
}

impl fmt::Display for ResourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ResourcePath {
    type Error = CoreError;

    fn try_from(value: String) -> CoreResult<Self> {
        Self::parse(&value)
    }
}

impl From<ResourcePath> for String {
    fn from(path: ResourcePath) -> Self {
        path.0
    }
}

impl std::str::FromStr for ResourcePath {
    type Err = CoreError;

    fn from_str(s: &str) -> CoreResult<Self> {
        Self::parse(s)
    }
}

/// Kind of repository node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// A container that may hold child objects and datastreams.
    Object,
    /// A leaf holding content, owned by exactly one object.
    Datastream,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Object => f.write_str("object"),
            Self::Datastream => f.write_str("datastream"),
        }
    }
}

/// A node of the repository tree as seen by the authorization engine.
///
/// Only the attributes a decision depends on are carried: where the node
/// sits, what kind it is, and whether it is open for reading by anyone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Location in the tree.
    pub path: ResourcePath,
    /// Object or datastream.
    pub kind: ResourceKind,
    /// Readable by any principal regardless of ACL outcome.
    #[serde(default)]
    pub open: bool,
}

impl Resource {
    /// Create a closed object.
    #[must_use]
    pub fn object(path: ResourcePath) -> Self {
        Self {
            path,
            kind: ResourceKind::Object,
            open: false,
        }
    }

    /// Create a closed datastream.
    #[must_use]
    pub fn datastream(path: ResourcePath) -> Self {
        Self {
            path,
            kind: ResourceKind::Datastream,
            open: false,
        }
    }

    /// Mark the resource open (or closed) for reading.
    #[must_use]
    pub fn with_open(mut self, open: bool) -> Self {
        self.open = open;
        self
    }

    /// Path of the containing node, or `None` for the root.
    #[must_use]
    pub fn parent_path(&self) -> Option<ResourcePath> {
        self.path.parent()
    }

    /// Returns `true` if this resource is open for reading.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(raw: &str) -> ResourcePath {
        ResourcePath::parse(raw).unwrap()
    }

    #[test]
    fn test_normalization() {
        assert_eq!(path("").as_str(), "/");
        assert_eq!(path("/").as_str(), "/");
        assert_eq!(path("a/b").as_str(), "/a/b");
        assert_eq!(path("//a///b//").as_str(), "/a/b");
    }

    #[test]
    fn test_rejects_relative_segments() {
        assert!(ResourcePath::parse("/a/./b").is_err());
        assert!(ResourcePath::parse("..").is_err());
        assert!(ResourcePath::parse("/a/\u{0}").is_err());
    }

    #[test]
    fn test_parent_chain() {
        let p = path("/a/b/c");
        assert_eq!(p.parent(), Some(path("/a/b")));
        assert_eq!(path("/a").parent(), Some(ResourcePath::root()));
        assert_eq!(ResourcePath::root().parent(), None);

        let chain: Vec<String> = p.ancestors().map(String::from).collect();
        assert_eq!(chain, vec!["/a/b/c", "/a/b", "/a", "/"]);
    }

    #[test]
    fn test_name_and_depth() {
        assert_eq!(path("/a/b").name(), Some("b"));
        assert_eq!(ResourcePath::root().name(), None);
        assert_eq!(ResourcePath::root().depth(), 0);
        assert_eq!(path("/a/b/c").depth(), 3);
    }

    #[test]
    fn test_join() {
        assert_eq!(ResourcePath::root().join("a").unwrap(), path("/a"));
        assert_eq!(path("/a").join("ds").unwrap(), path("/a/ds"));
        assert!(path("/a").join("b/c").is_err());
        assert!(path("/a").join("").is_err());
        assert!(path("/a").join("..").is_err());
    }

    #[test]
    fn test_is_within() {
        assert!(path("/a/b").is_within(&path("/a")));
        assert!(path("/a").is_within(&path("/a")));
        assert!(path("/a").is_within(&ResourcePath::root()));
        assert!(!path("/ab").is_within(&path("/a")));
        assert!(!path("/a").is_within(&path("/a/b")));
    }

    #[test]
    fn test_serde_validates() {
        let parsed: ResourcePath = serde_json::from_str("\"a/b/\"").unwrap();
        assert_eq!(parsed, path("/a/b"));
        assert!(serde_json::from_str::<ResourcePath>("\"/a/..\"").is_err());
    }

    #[test]
    fn test_resource_builders() {
        let ds = Resource::datastream(path("/a/ds")).with_open(true);
        assert_eq!(ds.kind, ResourceKind::Datastream);
        assert!(ds.is_open());
        assert_eq!(ds.parent_path(), Some(path("/a")));
        assert!(!Resource::object(ResourcePath::root()).is_open());
    }
}
