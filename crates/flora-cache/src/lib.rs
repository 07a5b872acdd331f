//! Flora Cache - response cache layer for the Flora dictionary API.
//!
//! This crate provides the cache-aside machinery that sits in front of the
//! API's read endpoints:
//!
//! - [`CacheKey`]: deterministic key derivation from route, query and caller
//! - [`CacheRegistry`]: per-resource [`CacheableConfig`] declarations
//! - [`CacheStore`]: the exact-key get/set/delete protocol, with
//!   [`MemoryStore`] and [`RedisStore`] backends
//! - [`ConditionalCacheGate`]: the cache-aside decision for each request
//! - [`InvalidationPlanner`]: per-user invalidation by bounded key enumeration
//!
//! The layer is fail-open: store failures degrade to uncached behavior and
//! are never surfaced as request errors.

pub mod error;
pub mod gate;
pub mod invalidation;
pub mod keys;
pub mod metrics;
pub mod registry;
pub mod store;

// Re-exports
pub use error::{CacheError, Result};
pub use gate::{
    CACHE_KEY_HEADER, CACHE_STATUS_HEADER, CacheAnnotations, CachePayload, CacheStatus,
    ConditionalCacheGate, GateResponse, RESPONSE_TIME_HEADER, RequestDescriptor,
};
pub use invalidation::{
    InvalidationPlanner, InvalidationPolicy, InvalidationReport, InvalidationTarget, PageSlot,
    UserResource,
};
pub use keys::CacheKey;
pub use metrics::{CacheMetrics, register_cache_metrics};
pub use registry::{CacheRegistry, CacheableConfig};
pub use store::CacheStore;
pub use store::memory::{MemoryStore, MemoryStoreConfig};
pub use store::redis::{RedisStore, RedisStoreConfig};
