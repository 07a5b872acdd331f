//! Per-user cache invalidation by key enumeration.
//!
//! The store has no pattern delete, so a user's cached pages are removed by
//! rebuilding every key the gate could have produced for them within a
//! bounded grid of `(resource, page, limit)` and deleting each one.
//!
//! The bound is a policy knob, not a correctness guarantee. Pages beyond
//! `max_page`, limits outside `page_sizes`, and requests carrying other
//! query parameters are not touched and keep serving stale data until their
//! TTL runs out. Unparameterized requests (e.g. `/user/me/favorites` with no
//! query) are only covered when `include_unparameterized` is set.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::CacheError;
use crate::keys::CacheKey;
use crate::metrics::CacheMetrics;
use crate::store::CacheStore;

/// A per-user listing whose cached pages must be dropped on change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserResource {
    /// Nombre logico (favorites, history, profile).
    pub name: String,
    /// Prefix the gate uses for the route's resource.
    pub key_prefix: String,
    /// Request path as the client sends it.
    pub path: String,
}

impl UserResource {
    pub fn new(name: impl Into<String>, key_prefix: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key_prefix: key_prefix.into(),
            path: path.into(),
        }
    }
}

/// Which keys a user invalidation sweep enumerates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidationPolicy {
    pub page_sizes: Vec<u32>,
    pub max_page: u32,
    pub resources: Vec<UserResource>,
    /// Also delete the key of each resource requested without a query.
    pub include_unparameterized: bool,
}

impl Default for InvalidationPolicy {
    fn default() -> Self {
        Self {
            page_sizes: vec![10, 20, 50],
            max_page: 10,
            resources: vec![
                UserResource::new("favorites", "user", "/user/me/favorites"),
                UserResource::new("history", "user", "/user/me/history"),
                UserResource::new("profile", "user", "/user/me"),
            ],
            include_unparameterized: false,
        }
    }
}

/// One page of one resource that may be cached for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSlot {
    /// Index into the policy's resources.
    pub resource: usize,
    pub page: u32,
    pub limit: u32,
}

/// The bounded set of pages considered for one user.
#[derive(Debug, Clone)]
pub struct InvalidationTarget<'a> {
    policy: &'a InvalidationPolicy,
    user_id: String,
    slots: Vec<PageSlot>,
}

impl<'a> InvalidationTarget<'a> {
    /// Enumerates every `(resource, page, limit)` triple of the policy.
    pub fn plan(policy: &'a InvalidationPolicy, user_id: impl Into<String>) -> Self {
        let mut slots = Vec::with_capacity(
            policy.resources.len() * policy.max_page as usize * policy.page_sizes.len(),
        );
        for resource in 0..policy.resources.len() {
            for page in 1..=policy.max_page {
                for &limit in &policy.page_sizes {
                    slots.push(PageSlot {
                        resource,
                        page,
                        limit,
                    });
                }
            }
        }

        Self {
            policy,
            user_id: user_id.into(),
            slots,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn slots(&self) -> &[PageSlot] {
        &self.slots
    }

    /// Rebuilds the keys exactly as the gate derives them for the user.
    pub fn keys(&self) -> Vec<CacheKey> {
        let caller = Some(self.user_id.as_str());
        let mut keys: Vec<CacheKey> = self
            .slots
            .iter()
            .map(|slot| {
                let resource = &self.policy.resources[slot.resource];
                let limit = slot.limit.to_string();
                let page = slot.page.to_string();
                CacheKey::build(
                    &resource.key_prefix,
                    &resource.path,
                    &[("limit", limit.as_str()), ("page", page.as_str())],
                    caller,
                )
            })
            .collect();

        if self.policy.include_unparameterized {
            let no_query: &[(&str, &str)] = &[];
            keys.extend(self.policy.resources.iter().map(|resource| {
                CacheKey::build(&resource.key_prefix, &resource.path, no_query, caller)
            }));
        }

        keys
    }
}

/// Resultado de un barrido de invalidacion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvalidationReport {
    pub user_id: String,
    /// Numero de deletes emitidos.
    pub attempted: usize,
    /// Keys cuyo delete fallo.
    pub failed_keys: Vec<String>,
}

impl InvalidationReport {
    pub fn deleted(&self) -> usize {
        self.attempted - self.failed_keys.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed_keys.is_empty()
    }

    /// The partial failure as an error value, for logging.
    pub fn partial_failure(&self) -> Option<CacheError> {
        (!self.is_complete()).then(|| CacheError::InvalidationPartialFailure {
            user_id: self.user_id.clone(),
            failed: self.failed_keys.len(),
            attempted: self.attempted,
        })
    }
}

/// Drops a user's cached pages after their data changed.
///
/// Call only after the mutation is durable. The sweep never fails: each
/// delete error is logged with its key and the remaining keys are still
/// deleted.
#[derive(Clone)]
pub struct InvalidationPlanner {
    store: Arc<dyn CacheStore>,
    policy: Arc<InvalidationPolicy>,
    metrics: CacheMetrics,
}

impl InvalidationPlanner {
    pub fn new(store: Arc<dyn CacheStore>, policy: InvalidationPolicy) -> Self {
        Self {
            store,
            policy: Arc::new(policy),
            metrics: CacheMetrics::new(),
        }
    }

    pub fn policy(&self) -> &InvalidationPolicy {
        &self.policy
    }

    /// Deletes every enumerated key for `user_id`.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use std::sync::Arc;
    /// # use flora_cache::{InvalidationPlanner, InvalidationPolicy, MemoryStore};
    /// # #[tokio::main]
    /// # async fn main() {
    /// let planner = InvalidationPlanner::new(
    ///     Arc::new(MemoryStore::default()),
    ///     InvalidationPolicy::default(),
    /// );
    /// let report = planner.invalidate_user("u1").await;
    /// assert_eq!(report.attempted, 90);
    /// # }
    /// ```
    pub async fn invalidate_user(&self, user_id: &str) -> InvalidationReport {
        let target = InvalidationTarget::plan(&self.policy, user_id);
        let mut report = InvalidationReport {
            user_id: user_id.to_string(),
            ..InvalidationReport::default()
        };

        for key in target.keys() {
            report.attempted += 1;
            if let Err(error) = self.store.delete(key.as_str()).await {
                warn!(
                    key = %key,
                    store = self.store.name(),
                    error = %error,
                    "Failed to delete cache key"
                );
                report.failed_keys.push(key.into_string());
            }
        }

        self.metrics
            .record_invalidation(report.deleted(), report.failed_keys.len());

        match report.partial_failure() {
            Some(error) => warn!(user_id = %user_id, error = %error, "User cache partially invalidated"),
            None => debug!(user_id = %user_id, count = report.attempted, "User cache invalidated"),
        }

        report
    }
}
