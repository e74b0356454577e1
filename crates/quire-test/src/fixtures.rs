//! Test fixtures for common types.
//!
//! The canonical repository ([`test_roles_repository`]) is parsed from
//! `fixtures/roles.toml`:
//!
//! ```text
//! /                                   no ACL
//! ├── testparent1                     open, reader/writer/admin
//! │   ├── tsp1_data                   open datastream
//! │   ├── testchild1NoACL             inherits
//! │   │   └── tsc1_data               open datastream
//! │   ├── testchild2WithACL           reader/writer/admin
//! │   │   ├── tsc1_data               inherits
//! │   │   └── tsc2_data               admin only
//! │   └── testchild4WithACL           writer/admin
//! │       ├── tsc1_data               inherits
//! │       └── tsc2_data               admin only
//! ├── testparent2                     open, reader/writer/admin
//! │   ├── tsp1_data                   open datastream
//! │   ├── tsp2_data                   reader/admin
//! │   └── testchild5WithACL           admin only
//! │       ├── tsc1_data               inherits
//! │       └── tsc2_data               open datastream
//! └── testparent3                     open, reader/writer/admin
//!     ├── tsp1_data                   open datastream
//!     ├── tsp2_data                   reader/admin
//!     ├── testchild3a                 reader/admin
//!     └── testchild3b                 inherits
//! ```

use std::sync::Arc;

use quire_authz::{AclCache, DecisionEngine, MemoryRepository, MemorySink, NullSink};
use quire_core::{Requester, ResourcePath};

/// TOML text of the canonical role-matrix repository.
pub const ROLES_SNAPSHOT: &str = include_str!("../fixtures/roles.toml");

/// Identity holding the reader role on the top-level objects.
pub const READER: &str = "examplereader";
/// Identity holding the writer role on the top-level objects.
pub const WRITER: &str = "examplewriter";
/// Identity holding the admin role on the top-level objects.
pub const ADMIN: &str = "exampleadmin";

/// Parse a path, panicking on invalid input.
#[must_use]
pub fn test_path(raw: &str) -> ResourcePath {
    ResourcePath::parse(raw).unwrap_or_else(|e| panic!("invalid test path '{raw}': {e}"))
}

/// Build the canonical role-matrix repository.
#[must_use]
pub fn test_roles_repository() -> Arc<MemoryRepository> {
    let repo = MemoryRepository::from_snapshot_toml(ROLES_SNAPSHOT)
        .unwrap_or_else(|e| panic!("roles fixture does not load: {e}"));
    Arc::new(repo)
}

/// The reader identity, with no groups.
#[must_use]
pub fn test_reader() -> Requester {
    Requester::user(READER)
}

/// The writer identity, with no groups.
#[must_use]
pub fn test_writer() -> Requester {
    Requester::user(WRITER)
}

/// The admin identity, with no groups.
#[must_use]
pub fn test_admin() -> Requester {
    Requester::user(ADMIN)
}

/// A requester with no identity and no groups.
#[must_use]
pub fn test_anonymous() -> Requester {
    Requester::anonymous()
}

/// An uncached engine over `repo` that discards audit records.
#[must_use]
pub fn test_engine(repo: &Arc<MemoryRepository>) -> DecisionEngine {
    DecisionEngine::new(repo.clone(), repo.clone()).with_sink(Arc::new(NullSink))
}

/// An uncached engine over `repo` plus the sink collecting its audit records.
#[must_use]
pub fn test_audited_engine(repo: &Arc<MemoryRepository>) -> (DecisionEngine, Arc<MemorySink>) {
    let sink = Arc::new(MemorySink::new());
    let engine = DecisionEngine::new(repo.clone(), repo.clone()).with_sink(sink.clone());
    (engine, sink)
}

/// An engine over `repo` with a cache subscribed to the repository's
/// write notifications.
#[must_use]
pub fn test_cached_engine(repo: &Arc<MemoryRepository>) -> DecisionEngine {
    let cache = Arc::new(AclCache::default());
    repo.subscribe(cache.clone());
    test_engine(repo).with_cache(cache)
}
