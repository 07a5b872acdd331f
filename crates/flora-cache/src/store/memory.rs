//! In-process store using Moka.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use moka::Expiry;
use moka::future::Cache;
use moka::notification::RemovalCause;

use super::CacheStore;
use crate::error::Result;
use crate::metrics::CacheMetrics;

/// Configuracion del store en memoria.
#[derive(Debug, Clone)]
pub struct MemoryStoreConfig {
    /// Maximo numero de entries (default: 10000)
    pub max_capacity: u64,
}

impl Default for MemoryStoreConfig {
    fn default() -> Self {
        Self {
            max_capacity: 10_000,
        }
    }
}

#[derive(Clone)]
struct Entry {
    payload: Arc<[u8]>,
    ttl: Duration,
}

/// Each entry expires after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, Entry> for PerEntryTtl {
    fn expire_after_create(&self, _key: &String, value: &Entry, _created_at: Instant) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &Entry,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Store en memoria usando Moka.
/// Thread-safe y async-friendly; nunca falla.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use flora_cache::{CacheStore, MemoryStore, MemoryStoreConfig};
///
/// # #[tokio::main]
/// # async fn main() -> flora_cache::Result<()> {
/// let store = MemoryStore::new(MemoryStoreConfig::default());
/// store.set("entries:/entries/en", b"[]", Duration::from_secs(300)).await?;
///
/// if let Some(payload) = store.get("entries:/entries/en").await? {
///     println!("Found {} bytes", payload.len());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct MemoryStore {
    inner: Cache<String, Entry>,
}

impl MemoryStore {
    /// Crea un nuevo store con la configuracion dada.
    pub fn new(config: MemoryStoreConfig) -> Self {
        let metrics = CacheMetrics::new();

        let inner = Cache::builder()
            .max_capacity(config.max_capacity)
            .expire_after(PerEntryTtl)
            .eviction_listener(move |_key, _value, cause| {
                let reason = match cause {
                    RemovalCause::Expired => "ttl",
                    RemovalCause::Size => "capacity",
                    RemovalCause::Explicit => "manual",
                    RemovalCause::Replaced => "replaced",
                };
                metrics.record_eviction(reason);
            })
            .build();

        Self { inner }
    }

    /// Retorna el numero aproximado de entries en cache.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(MemoryStoreConfig::default())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.get(key).await.map(|entry| entry.payload.to_vec()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let entry = Entry {
            payload: Arc::from(value),
            ttl,
        };
        self.inner.insert(key.to_string(), entry).await;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.inner.invalidate(key).await;
        Ok(())
    }

    fn name(&self) -> &str {
        "memory"
    }
}
