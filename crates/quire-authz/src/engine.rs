//! The decision engine.
//!
//! For each `(requester, path, operation)` request:
//!
//! ```text
//! 1. resolve path -> Resource           (nearest existing ancestor if missing, never open)
//! 2. READ on an open resource           -> ALLOW (OpenRead)
//! 3. locate governing ACL               -> none up to root: DENY (NoPolicyDefined)
//! 4. effective role = max over matching entries
//!                                       -> no match: DENY (NoMatchingEntry)
//! 5. required role = table(operation)
//! 6. effective >= required              -> ALLOW (Granted) else DENY (InsufficientRole)
//! ```
//!
//! Storage failures abort the request with [`AuthzError`] and are never
//! turned into a decision. Every request, decided or failed, is handed to
//! the configured [`DecisionSink`].

use quire_core::{Decision, Operation, PrincipalParser, Requester, Resource, ResourcePath};
use std::sync::Arc;
use tracing::{debug, error};

use crate::audit::{DecisionOutcome, DecisionRecord, DecisionSink, TracingSink};
use crate::cache::AclCache;
use crate::classifier::{classify_named, required_role};
use crate::error::{AuthzError, AuthzResult};
use crate::evaluation::{Evaluation, Reason};
use crate::hierarchy::required_role_satisfied_by;
use crate::locator::{AclLocator, Location};
use crate::matcher::effective_role;
use crate::provider::{AclStore, ResourceTreeProvider};

/// Computes ALLOW/DENY for repository requests.
///
/// Holds no mutable state of its own besides the optional cache, so one
/// engine can serve any number of concurrent requests.
///
/// # Example
///
/// ```
/// use quire_authz::{DecisionEngine, MemoryRepository, NullSink};
/// use quire_core::{Decision, Operation, Requester, ResourcePath, StoredAclEntry};
/// use std::sync::Arc;
///
/// # tokio_test_block(async {
/// let repo = Arc::new(MemoryRepository::new());
/// let docs = ResourcePath::parse("/docs").unwrap();
/// repo.insert_object(docs.clone()).unwrap();
/// repo.set_acl(&docs, vec![StoredAclEntry::new("everyone", "reader")]).unwrap();
///
/// let engine = DecisionEngine::new(repo.clone(), repo).with_sink(Arc::new(NullSink));
/// let anyone = Requester::anonymous();
/// assert_eq!(engine.decide(&anyone, &docs, Operation::Read).await.unwrap(), Decision::Allow);
/// assert_eq!(engine.decide(&anyone, &docs, Operation::Delete).await.unwrap(), Decision::Deny);
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct DecisionEngine {
    tree: Arc<dyn ResourceTreeProvider>,
    acls: Arc<dyn AclStore>,
    locator: AclLocator,
    cache: Option<Arc<AclCache>>,
    sink: Arc<dyn DecisionSink>,
}

impl DecisionEngine {
    /// Create an engine with the default everyone token, no cache, and
    /// audit records sent to [`TracingSink`].
    #[must_use]
    pub fn new(tree: Arc<dyn ResourceTreeProvider>, acls: Arc<dyn AclStore>) -> Self {
        let locator = AclLocator::new(tree.clone(), acls.clone(), PrincipalParser::default());
        Self {
            tree,
            acls,
            locator,
            cache: None,
            sink: Arc::new(TracingSink),
        }
    }

    /// Use `parser` to interpret stored principals.
    #[must_use]
    pub fn with_parser(mut self, parser: PrincipalParser) -> Self {
        self.locator = AclLocator::new(self.tree.clone(), self.acls.clone(), parser);
        self
    }

    /// Memoize governing-ACL lookups in `cache`.
    ///
    /// The cache must be subscribed to the ACL store's write notifications,
    /// otherwise it will serve revoked grants.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<AclCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Send audit records to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DecisionSink>) -> Self {
        self.sink = sink;
        self
    }

    /// The cache, if one is configured.
    #[must_use]
    pub fn cache(&self) -> Option<&Arc<AclCache>> {
        self.cache.as_ref()
    }

    /// The principal parser applied to stored ACL entries.
    #[must_use]
    pub fn parser(&self) -> &PrincipalParser {
        self.locator.parser()
    }

    /// Decide and explain a request against a path.
    ///
    /// If nothing exists at `path`, the request is evaluated against the
    /// nearest existing ancestor, which is treated as not open.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::StorageUnavailable`] if a resource or ACL read
    /// fails, and [`AuthzError::BrokenTree`] if the tree is inconsistent.
    pub async fn evaluate(
        &self,
        requester: &Requester,
        path: &ResourcePath,
        operation: Operation,
    ) -> AuthzResult<Evaluation> {
        let result = match self.resolve(path).await {
            Ok(resource) => self.evaluate_inner(requester, &resource, operation).await,
            Err(e) => Err(e),
        };
        self.audit(requester, path, operation, &result);
        result
    }

    /// Decide and explain a request against a resource the caller already holds.
    ///
    /// # Errors
    ///
    /// See [`DecisionEngine::evaluate`].
    pub async fn evaluate_resource(
        &self,
        requester: &Requester,
        resource: &Resource,
        operation: Operation,
    ) -> AuthzResult<Evaluation> {
        let result = self.evaluate_inner(requester, resource, operation).await;
        self.audit(requester, &resource.path, operation, &result);
        result
    }

    /// Decide a request against a path.
    ///
    /// # Errors
    ///
    /// See [`DecisionEngine::evaluate`].
    pub async fn decide(
        &self,
        requester: &Requester,
        path: &ResourcePath,
        operation: Operation,
    ) -> AuthzResult<Decision> {
        Ok(self.evaluate(requester, path, operation).await?.decision)
    }

    /// Decide a request whose operation arrives as a wire name.
    ///
    /// # Errors
    ///
    /// Returns [`AuthzError::UnknownOperation`] if `operation` is not one of
    /// the known operations, otherwise see [`DecisionEngine::evaluate`].
    pub async fn decide_named(
        &self,
        requester: &Requester,
        path: &ResourcePath,
        operation: &str,
    ) -> AuthzResult<Decision> {
        let (operation, _) = classify_named(operation).inspect_err(|e| {
            error!(%requester, %path, error = %e, "rejecting request with unknown operation");
        })?;
        self.decide(requester, path, operation).await
    }

    async fn evaluate_inner(
        &self,
        requester: &Requester,
        resource: &Resource,
        operation: Operation,
    ) -> AuthzResult<Evaluation> {
        if operation.is_read() && resource.is_open() {
            return Ok(Reason::OpenRead.into());
        }

        let location = self.locate(resource).await?;
        let Some(located) = location.located() else {
            return Ok(Reason::NoPolicyDefined.into());
        };

        let need = required_role(operation);
        let acl_defined_on = located.defined_on.clone();
        let reason = match effective_role(&located.acl, requester) {
            None => Reason::NoMatchingEntry { acl_defined_on },
            Some(have) if required_role_satisfied_by(have, need) => Reason::Granted {
                role: have,
                acl_defined_on,
            },
            Some(have) => Reason::InsufficientRole {
                have,
                need,
                acl_defined_on,
            },
        };
        Ok(reason.into())
    }

    /// The resource at `path`, or its nearest existing ancestor (closed).
    async fn resolve(&self, path: &ResourcePath) -> AuthzResult<Resource> {
        if let Some(resource) = self.tree.get_resource(path).await? {
            return Ok(resource);
        }
        for ancestor in path.ancestors().skip(1) {
            if let Some(resource) = self.tree.get_resource(&ancestor).await? {
                debug!(
                    requested = %path,
                    evaluated_on = %resource.path,
                    "target does not exist, evaluating against nearest ancestor"
                );
                return Ok(resource.with_open(false));
            }
        }
        Err(AuthzError::BrokenTree {
            path: ResourcePath::root(),
            reason: "root resource does not exist".to_string(),
        })
    }

    async fn locate(&self, resource: &Resource) -> AuthzResult<Location> {
        let Some(cache) = &self.cache else {
            return self.locator.locate(resource).await;
        };
        if let Some(location) = cache.get(&resource.path) {
            return Ok(location);
        }
        let generation = cache.generation();
        let location = self.locator.locate(resource).await?;
        cache.insert(resource.path.clone(), location.clone(), generation);
        Ok(location)
    }

    fn audit(
        &self,
        requester: &Requester,
        path: &ResourcePath,
        operation: Operation,
        result: &AuthzResult<Evaluation>,
    ) {
        let outcome = match result {
            Ok(evaluation) => {
                debug!(%requester, %path, %operation, %evaluation, "decided");
                DecisionOutcome::from(evaluation)
            },
            Err(e) => {
                error!(%requester, %path, %operation, error = %e, "policy evaluation failed");
                DecisionOutcome::Failed {
                    error: e.to_string(),
                }
            },
        };
        self.sink.record(&DecisionRecord::new(
            requester.clone(),
            path.clone(),
            operation,
            outcome,
        ));
    }
}

impl std::fmt::Debug for DecisionEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionEngine")
            .field("locator", &self.locator)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
