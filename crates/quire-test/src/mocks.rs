//! Mock storage implementations for testing.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use quire_authz::{
    AclStore, AclWriteListener, ResourceTreeProvider, StorageError, StorageResult,
};
use quire_core::{Resource, ResourcePath, StoredAclEntry};

/// A resource tree whose every read fails with [`StorageError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct FailingTree {
    message: String,
}

impl FailingTree {
    /// Create a tree failing with `message`.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl ResourceTreeProvider for FailingTree {
    async fn get_resource(&self, path: &ResourcePath) -> StorageResult<Option<Resource>> {
        tracing::debug!(%path, "failing tree read");
        Err(StorageError::Unavailable(self.message.clone()))
    }
}

/// An ACL store whose every read fails with [`StorageError::Timeout`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FailingAcls {
    timeout_ms: u64,
}

impl FailingAcls {
    /// Create a store reporting a timeout of `timeout_ms`.
    #[must_use]
    pub fn new(timeout_ms: u64) -> Self {
        Self { timeout_ms }
    }
}

#[async_trait]
impl AclStore for FailingAcls {
    async fn get_own_acl(&self, resource: &Resource) -> StorageResult<Option<Vec<StoredAclEntry>>> {
        tracing::debug!(path = %resource.path, "failing ACL read");
        Err(StorageError::Timeout {
            timeout_ms: self.timeout_ms,
        })
    }
}

/// Wraps a store and counts the reads that reach it.
///
/// Used to check that cached lookups do not touch storage.
#[derive(Debug, Default)]
pub struct CountingStore<T> {
    inner: T,
    resource_reads: AtomicUsize,
    acl_reads: AtomicUsize,
}

impl<T> CountingStore<T> {
    /// Wrap `inner`.
    #[must_use]
    pub fn new(inner: T) -> Self {
        Self {
            inner,
            resource_reads: AtomicUsize::new(0),
            acl_reads: AtomicUsize::new(0),
        }
    }

    /// Number of `get_resource` calls so far.
    #[must_use]
    pub fn resource_reads(&self) -> usize {
        self.resource_reads.load(Ordering::Relaxed)
    }

    /// Number of `get_own_acl` calls so far.
    #[must_use]
    pub fn acl_reads(&self) -> usize {
        self.acl_reads.load(Ordering::Relaxed)
    }

    /// Reset both counters.
    pub fn reset(&self) {
        self.resource_reads.store(0, Ordering::Relaxed);
        self.acl_reads.store(0, Ordering::Relaxed);
    }

    /// The wrapped store.
    #[must_use]
    pub fn inner(&self) -> &T {
        &self.inner
    }
}

#[async_trait]
impl<T: ResourceTreeProvider> ResourceTreeProvider for CountingStore<T> {
    async fn get_resource(&self, path: &ResourcePath) -> StorageResult<Option<Resource>> {
        self.resource_reads.fetch_add(1, Ordering::Relaxed);
        self.inner.get_resource(path).await
    }
}

#[async_trait]
impl<T: AclStore> AclStore for CountingStore<T> {
    async fn get_own_acl(&self, resource: &Resource) -> StorageResult<Option<Vec<StoredAclEntry>>> {
        self.acl_reads.fetch_add(1, Ordering::Relaxed);
        self.inner.get_own_acl(resource).await
    }
}

/// Records every path it is notified about.
#[derive(Debug, Clone, Default)]
pub struct RecordingListener {
    changed: Arc<Mutex<Vec<ResourcePath>>>,
}

impl RecordingListener {
    /// Create an empty listener.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Paths notified so far, in order.
    #[must_use]
    pub fn changed(&self) -> Vec<ResourcePath> {
        self.changed.lock().map(|g| g.clone()).unwrap_or_default()
    }

    /// Forget recorded paths.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.changed.lock() {
            guard.clear();
        }
    }
}

impl AclWriteListener for RecordingListener {
    fn acl_changed(&self, path: &ResourcePath) {
        if let Ok(mut guard) = self.changed.lock() {
            guard.push(path.clone());
        }
    }
}

/// Install a test-writer `tracing` subscriber filtered by `RUST_LOG`.
///
/// Safe to call from many tests; only the first call installs anything.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{test_path, test_roles_repository};

    #[tokio::test]
    async fn test_failing_mocks_fail() {
        let root = Resource::object(ResourcePath::root());
        assert!(matches!(
            FailingTree::new("down").get_resource(&root.path).await,
            Err(StorageError::Unavailable(_))
        ));
        assert!(matches!(
            FailingAcls::new(250).get_own_acl(&root).await,
            Err(StorageError::Timeout { timeout_ms: 250 })
        ));
    }

    #[tokio::test]
    async fn test_counting_store_counts() {
        let store = CountingStore::new(test_roles_repository());
        let parent = store
            .get_resource(&test_path("/testparent1"))
            .await
            .unwrap()
            .unwrap();
        store.get_own_acl(&parent).await.unwrap();
        store.get_parent(&parent).await.unwrap();

        assert_eq!(store.resource_reads(), 2);
        assert_eq!(store.acl_reads(), 1);
        store.reset();
        assert_eq!(store.resource_reads(), 0);
    }

    #[test]
    fn test_recording_listener() {
        let repo = test_roles_repository();
        let listener = Arc::new(RecordingListener::new());
        repo.subscribe(listener.clone());

        repo.set_acl(&test_path("/testparent3/testchild3b"), Vec::new())
            .unwrap();
        repo.remove(&test_path("/testparent2")).unwrap();

        assert_eq!(
            listener.changed(),
            vec![test_path("/testparent3/testchild3b"), test_path("/testparent2")]
        );
        listener.clear();
        assert!(listener.changed().is_empty());
    }
}
