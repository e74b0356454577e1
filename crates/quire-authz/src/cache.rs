//! Nearest-ACL cache.
//!
//! Memoizes locator results per resource path. Entries are populated on the
//! first lookup of a path and evicted synchronously by
//! [`AclCache::invalidate`], which the ACL store calls (through
//! [`AclWriteListener`]) on every ACL write or removal. Invalidating a path
//! evicts it and every descendant, since all of their walks pass through it.
//!
//! Each invalidation bumps a generation counter. A lookup records the
//! generation before walking the tree and its result is only inserted if
//! no invalidation happened in between, so a walk that read an ACL which
//! was then revoked can never be cached.

use quire_core::ResourcePath;
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::locator::Location;
use crate::provider::AclWriteListener;

/// Default bound on cached paths.
pub const DEFAULT_MAX_ENTRIES: usize = 10_000;

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<ResourcePath, Location>,
    generation: u64,
}

/// Hit/miss counters for an [`AclCache`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to the locator.
    pub misses: u64,
    /// Invalidation calls received.
    pub invalidations: u64,
}

/// Bounded, invalidation-aware cache of governing ACLs.
///
/// # Example
///
/// ```
/// use quire_authz::{AclCache, Location};
/// use quire_core::ResourcePath;
///
/// let cache = AclCache::new(100);
/// let path = ResourcePath::parse("/a/b").unwrap();
///
/// let generation = cache.generation();
/// assert!(cache.insert(path.clone(), Location::NoAclDefined, generation));
/// assert_eq!(cache.get(&path), Some(Location::NoAclDefined));
///
/// cache.invalidate(&ResourcePath::parse("/a").unwrap());
/// assert_eq!(cache.get(&path), None);
/// ```
#[derive(Debug)]
pub struct AclCache {
    state: RwLock<CacheState>,
    max_entries: usize,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl AclCache {
    /// Create a cache holding at most `max_entries` paths (minimum 1).
    #[must_use]
    pub fn new(max_entries: usize) -> Self {
        Self {
            state: RwLock::new(CacheState::default()),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidations: AtomicU64::new(0),
        }
    }

    /// The configured bound.
    #[must_use]
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// The cached location for `path`, if present.
    #[must_use]
    pub fn get(&self, path: &ResourcePath) -> Option<Location> {
        let state = self.state.read().unwrap_or_else(|e| {
            tracing::warn!("AclCache read lock poisoned, recovering");
            e.into_inner()
        });
        let found = state.entries.get(path).cloned();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// The current invalidation generation.
    ///
    /// Read this before walking the tree and pass it to [`AclCache::insert`].
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.state
            .read()
            .unwrap_or_else(|e| {
                tracing::warn!("AclCache read lock poisoned, recovering");
                e.into_inner()
            })
            .generation
    }

    /// Cache `location` for `path` if nothing was invalidated since
    /// `observed_generation`.
    ///
    /// When the cache is full it is emptied before inserting. Returns `true`
    /// if the entry was stored.
    pub fn insert(&self, path: ResourcePath, location: Location, observed_generation: u64) -> bool {
        let mut state = self.state.write().unwrap_or_else(|e| {
            tracing::warn!("AclCache lock poisoned, recovering");
            e.into_inner()
        });
        if state.generation != observed_generation {
            tracing::debug!(%path, "discarding ACL lookup that raced with an invalidation");
            return false;
        }
        if state.entries.len() >= self.max_entries && !state.entries.contains_key(&path) {
            tracing::debug!(
                max_entries = self.max_entries,
                "ACL cache full, clearing"
            );
            state.entries.clear();
        }
        state.entries.insert(path, location);
        true
    }

    /// Evict `path` and every descendant.
    pub fn invalidate(&self, path: &ResourcePath) {
        let mut state = self.state.write().unwrap_or_else(|e| {
            tracing::warn!("AclCache lock poisoned, recovering");
            e.into_inner()
        });
        state.generation = state.generation.wrapping_add(1);
        let before = state.entries.len();
        state.entries.retain(|cached, _| !cached.is_within(path));
        self.invalidations.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(
            %path,
            evicted = before.saturating_sub(state.entries.len()),
            "invalidated ACL cache"
        );
    }

    /// Evict everything.
    pub fn clear(&self) {
        let mut state = self.state.write().unwrap_or_else(|e| {
            tracing::warn!("AclCache lock poisoned, recovering");
            e.into_inner()
        });
        state.generation = state.generation.wrapping_add(1);
        state.entries.clear();
    }

    /// Number of cached paths.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state
            .read()
            .unwrap_or_else(|e| {
                tracing::warn!("AclCache read lock poisoned, recovering");
                e.into_inner()
            })
            .entries
            .len()
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the hit/miss counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

impl Default for AclCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl AclWriteListener for AclCache {
    fn acl_changed(&self, path: &ResourcePath) {
        self.invalidate(path);
    }
}
