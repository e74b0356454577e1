//! Prelude module - commonly used test helpers for convenient import.
//!
//! ```rust,ignore
//! use quire_test::prelude::*;
//! ```

pub use crate::fixtures::{
    ROLES_SNAPSHOT, test_admin, test_anonymous, test_audited_engine, test_cached_engine,
    test_engine, test_path, test_reader, test_roles_repository, test_writer,
};
pub use crate::mocks::{
    CountingStore, FailingAcls, FailingTree, RecordingListener, init_test_tracing,
};
