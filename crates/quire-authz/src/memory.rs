//! In-memory resource tree and ACL store.
//!
//! Backs the CLI and the test suites. Holds every node in a single map keyed
//! by path; the root always exists. Writes enforce the tree shape (a parent
//! must exist and must be an object) and notify subscribed
//! [`AclWriteListener`]s synchronously before returning.
//!
//! A repository can be loaded from a TOML snapshot:
//!
//! ```toml
//! [[resource]]
//! path = "/collections"
//! acl = [{ principal = "everyone", role = "reader" }]
//!
//! [[resource]]
//! path = "/collections/maps/thumb"
//! kind = "datastream"
//! open = true
//! ```

use async_trait::async_trait;
use quire_core::{Resource, ResourceKind, ResourcePath, StoredAclEntry};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::error::{StorageError, StorageResult};
use crate::provider::{AclStore, AclWriteListener, ResourceTreeProvider};

/// Largest snapshot file accepted by [`MemoryRepository::load_snapshot`] (16 MiB).
const MAX_SNAPSHOT_BYTES: u64 = 16_777_216;

#[derive(Debug, Clone)]
struct Node {
    kind: ResourceKind,
    open: bool,
    acl: Option<Vec<StoredAclEntry>>,
}

impl Node {
    fn to_resource(&self, path: &ResourcePath) -> Resource {
        Resource {
            path: path.clone(),
            kind: self.kind,
            open: self.open,
        }
    }
}

/// One `[[resource]]` table of a snapshot file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotResource {
    /// Location of the node. `/` configures the root.
    pub path: ResourcePath,
    /// Object (default) or datastream.
    #[serde(default = "default_kind")]
    pub kind: ResourceKind,
    /// Open for reading by anyone.
    #[serde(default)]
    pub open: bool,
    /// Own ACL. Omit for none; `acl = []` attaches an ACL that grants nothing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acl: Option<Vec<StoredAclEntry>>,
}

fn default_kind() -> ResourceKind {
    ResourceKind::Object
}

/// A whole repository as written in a snapshot file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Every node to create. Order does not matter.
    #[serde(default, rename = "resource")]
    pub resources: Vec<SnapshotResource>,
}

/// Resource tree and ACL store held in memory.
pub struct MemoryRepository {
    nodes: RwLock<HashMap<ResourcePath, Node>>,
    listeners: RwLock<Vec<Arc<dyn AclWriteListener>>>,
}

impl MemoryRepository {
    /// Create a repository containing only a closed root with no ACL.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            ResourcePath::root(),
            Node {
                kind: ResourceKind::Object,
                open: false,
                acl: None,
            },
        );
        Self {
            nodes: RwLock::new(nodes),
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Build a repository from a parsed snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if a node's parent is missing from the snapshot, a
    /// node sits under a datastream, or a path appears twice.
    pub fn from_snapshot(snapshot: Snapshot) -> StorageResult<Self> {
        let repo = Self::new();
        let mut resources = snapshot.resources;
        // Parents before children.
        resources.sort_by_key(|r| r.path.depth());

        for resource in resources {
            if !resource.path.is_root() {
                repo.insert(Resource {
                    path: resource.path.clone(),
                    kind: resource.kind,
                    open: resource.open,
                })?;
            } else if resource.kind == ResourceKind::Datastream {
                return Err(StorageError::Conflict(
                    "the root must be an object".to_string(),
                ));
            } else {
                repo.set_open(&resource.path, resource.open)?;
            }
            if let Some(acl) = resource.acl {
                repo.set_acl(&resource.path, acl)?;
            }
        }
        Ok(repo)
    }

    /// Parse a snapshot from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::InvalidSnapshot`] for unparseable TOML, plus
    /// anything [`MemoryRepository::from_snapshot`] rejects.
    pub fn from_snapshot_toml(content: &str) -> StorageResult<Self> {
        let snapshot: Snapshot =
            toml::from_str(content).map_err(|e| StorageError::InvalidSnapshot(e.to_string()))?;
        Self::from_snapshot(snapshot)
    }

    /// Read and parse a snapshot file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is too large, or is not
    /// a valid snapshot.
    pub fn load_snapshot(path: impl AsRef<Path>) -> StorageResult<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path).map_err(|e| {
            StorageError::Unavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        if metadata.len() > MAX_SNAPSHOT_BYTES {
            return Err(StorageError::InvalidSnapshot(format!(
                "{} is {} bytes, limit is {MAX_SNAPSHOT_BYTES}",
                path.display(),
                metadata.len()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            StorageError::Unavailable(format!("cannot read {}: {e}", path.display()))
        })?;
        let repo = Self::from_snapshot_toml(&content)?;
        tracing::debug!(path = %path.display(), resources = repo.len(), "loaded repository snapshot");
        Ok(repo)
    }

    /// Register a listener for ACL and tree changes.
    pub fn subscribe(&self, listener: Arc<dyn AclWriteListener>) {
        self.listeners
            .write()
            .unwrap_or_else(|e| {
                tracing::warn!("MemoryRepository listener lock poisoned, recovering");
                e.into_inner()
            })
            .push(listener);
    }

    /// Add a resource under an existing object.
    ///
    /// # Errors
    ///
    /// - [`StorageError::NotFound`] if the parent does not exist
    /// - [`StorageError::Conflict`] if the parent is a datastream or the
    ///   path is already taken
    pub fn insert(&self, resource: Resource) -> StorageResult<()> {
        let mut nodes = self.write_nodes()?;
        if nodes.contains_key(&resource.path) {
            return Err(StorageError::Conflict(format!(
                "{} already exists",
                resource.path
            )));
        }
        let parent_path = resource.parent_path().ok_or_else(|| {
            StorageError::Conflict(format!("{} already exists", resource.path))
        })?;
        match nodes.get(&parent_path) {
            None => {
                return Err(StorageError::NotFound(format!(
                    "parent {parent_path} of {}",
                    resource.path
                )));
            },
            Some(parent) if parent.kind == ResourceKind::Datastream => {
                return Err(StorageError::Conflict(format!(
                    "{parent_path} is a datastream and cannot have children"
                )));
            },
            Some(_) => {},
        }

        nodes.insert(
            resource.path,
            Node {
                kind: resource.kind,
                open: resource.open,
                acl: None,
            },
        );
        Ok(())
    }

    /// Add a closed object with no ACL.
    ///
    /// # Errors
    ///
    /// See [`MemoryRepository::insert`].
    pub fn insert_object(&self, path: ResourcePath) -> StorageResult<Resource> {
        let resource = Resource::object(path);
        self.insert(resource.clone())?;
        Ok(resource)
    }

    /// Add a closed datastream with no ACL.
    ///
    /// # Errors
    ///
    /// See [`MemoryRepository::insert`].
    pub fn insert_datastream(&self, path: ResourcePath) -> StorageResult<Resource> {
        let resource = Resource::datastream(path);
        self.insert(resource.clone())?;
        Ok(resource)
    }

    /// Mark a resource open or closed for reading.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if nothing exists at `path`.
    pub fn set_open(&self, path: &ResourcePath, open: bool) -> StorageResult<()> {
        let mut nodes = self.write_nodes()?;
        let node = nodes
            .get_mut(path)
            .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
        node.open = open;
        Ok(())
    }

    /// Attach (or replace) the own ACL of a resource.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if nothing exists at `path`.
    pub fn set_acl(&self, path: &ResourcePath, entries: Vec<StoredAclEntry>) -> StorageResult<()> {
        {
            let mut nodes = self.write_nodes()?;
            let node = nodes
                .get_mut(path)
                .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
            node.acl = Some(entries);
        }
        self.notify(path);
        Ok(())
    }

    /// Detach the own ACL of a resource.
    ///
    /// Returns `true` if an ACL was attached.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NotFound`] if nothing exists at `path`.
    pub fn remove_acl(&self, path: &ResourcePath) -> StorageResult<bool> {
        let removed = {
            let mut nodes = self.write_nodes()?;
            let node = nodes
                .get_mut(path)
                .ok_or_else(|| StorageError::NotFound(path.to_string()))?;
            node.acl.take().is_some()
        };
        if removed {
            self.notify(path);
        }
        Ok(removed)
    }

    /// Remove a resource and everything beneath it.
    ///
    /// Returns the number of nodes removed.
    ///
    /// # Errors
    ///
    /// - [`StorageError::Conflict`] for the root
    /// - [`StorageError::NotFound`] if nothing exists at `path`
    pub fn remove(&self, path: &ResourcePath) -> StorageResult<usize> {
        if path.is_root() {
            return Err(StorageError::Conflict("the root cannot be removed".to_string()));
        }
        let removed = {
            let mut nodes = self.write_nodes()?;
            if !nodes.contains_key(path) {
                return Err(StorageError::NotFound(path.to_string()));
            }
            let before = nodes.len();
            nodes.retain(|candidate, _| !candidate.is_within(path));
            before.saturating_sub(nodes.len())
        };
        self.notify(path);
        Ok(removed)
    }

    /// The resource at `path`, if it exists.
    #[must_use]
    pub fn resource(&self, path: &ResourcePath) -> Option<Resource> {
        self.read_nodes()
            .ok()?
            .get(path)
            .map(|node| node.to_resource(path))
    }

    /// The own ACL stored at `path`, if any.
    #[must_use]
    pub fn own_acl(&self, path: &ResourcePath) -> Option<Vec<StoredAclEntry>> {
        self.read_nodes().ok()?.get(path)?.acl.clone()
    }

    /// Every resource, sorted by path.
    #[must_use]
    pub fn resources(&self) -> Vec<Resource> {
        let Ok(nodes) = self.read_nodes() else {
            return Vec::new();
        };
        let mut all: Vec<Resource> = nodes
            .iter()
            .map(|(path, node)| node.to_resource(path))
            .collect();
        all.sort_by(|a, b| a.path.cmp(&b.path));
        all
    }

    /// Number of nodes, including the root.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read_nodes().map(|nodes| nodes.len()).unwrap_or_default()
    }

    /// Always `false`: the root is always present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read_nodes(
        &self,
    ) -> StorageResult<std::sync::RwLockReadGuard<'_, HashMap<ResourcePath, Node>>> {
        self.nodes
            .read()
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    fn write_nodes(
        &self,
    ) -> StorageResult<std::sync::RwLockWriteGuard<'_, HashMap<ResourcePath, Node>>> {
        self.nodes
            .write()
            .map_err(|e| StorageError::Internal(e.to_string()))
    }

    fn notify(&self, path: &ResourcePath) {
        let listeners = self.listeners.read().unwrap_or_else(|e| {
            tracing::warn!("MemoryRepository listener lock poisoned, recovering");
            e.into_inner()
        });
        for listener in listeners.iter() {
            listener.acl_changed(path);
        }
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MemoryRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryRepository")
            .field("resources", &self.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ResourceTreeProvider for MemoryRepository {
    async fn get_resource(&self, path: &ResourcePath) -> StorageResult<Option<Resource>> {
        Ok(self.read_nodes()?.get(path).map(|node| node.to_resource(path)))
    }
}

#[async_trait]
impl AclStore for MemoryRepository {
    async fn get_own_acl(&self, resource: &Resource) -> StorageResult<Option<Vec<StoredAclEntry>>> {
        Ok(self
            .read_nodes()?
            .get(&resource.path)
            .and_then(|node| node.acl.clone()))
    }
}
