//! Flora Server - HTTP server for the Flora dictionary API.
//!
//! Wires the `flora-cache` gate and invalidation planner into an axum
//! router: bearer-token auth, a per-resource response cache layer, the
//! dictionary and user endpoints, Prometheus metrics and request logging.

pub mod auth;
pub mod dictionary;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod server;
pub mod settings;
pub mod state;

// Re-exports
pub use auth::{Caller, Claims, JwtVerifier};
pub use dictionary::{Dictionary, DictionaryError, InMemoryDictionary};
pub use error::AppError;
pub use handlers::health::HealthResponse;
pub use server::{ENTRIES_RESOURCE, USER_RESOURCE, create_router, run_server};
pub use settings::{CacheBackend, Settings, SettingsError};
pub use state::AppState;

use flora_cache::{CacheRegistry, CacheableConfig};

/// Registers the cacheable resources served by this API.
pub fn cache_registry(ttl_seconds: u64) -> flora_cache::Result<CacheRegistry> {
    let mut registry = CacheRegistry::new();
    registry.register(
        ENTRIES_RESOURCE,
        CacheableConfig::new(ENTRIES_RESOURCE).with_ttl_seconds(ttl_seconds),
    )?;
    registry.register(
        USER_RESOURCE,
        CacheableConfig::new(USER_RESOURCE).with_ttl_seconds(ttl_seconds),
    )?;
    Ok(registry)
}

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_defined() {
        assert!(!version().is_empty());
    }

    #[test]
    fn registry_covers_both_resources() {
        let registry = cache_registry(60).unwrap();

        assert_eq!(registry.len(), 2);
        let user = registry.lookup(USER_RESOURCE).unwrap();
        assert_eq!(user.key_prefix(), "user");
        assert_eq!(user.ttl(), std::time::Duration::from_secs(60));
    }

    #[test]
    fn registry_rejects_zero_ttl() {
        assert!(cache_registry(0).is_err());
    }
}
