//! Prelude module - commonly used types for convenient import.
//!
//! Use `use quire_authz::prelude::*;` to import all essential types.

// Errors
pub use crate::{AuthzError, AuthzResult, StorageError, StorageResult};

// Engine
pub use crate::{DecisionEngine, Evaluation, Reason};

// Storage seams
pub use crate::{AclStore, AclWriteListener, MemoryRepository, ResourceTreeProvider};

// Caching and audit
pub use crate::{AclCache, DecisionRecord, DecisionSink, MemorySink, NullSink, TracingSink};
