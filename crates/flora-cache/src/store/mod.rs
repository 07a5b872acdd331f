//! Key-value store protocol consumed by the cache layer.

pub mod memory;
pub mod redis;

use std::time::Duration;

use async_trait::async_trait;

use crate::error::Result;

/// A shared key-value backend with TTL expiry.
///
/// The cache layer only needs exact-key `get`/`set`/`delete`; there is no
/// pattern deletion. Implementations must be safe for concurrent use since
/// one handle is shared by every request.
///
/// # Implementors
///
/// - `MemoryStore` - in-process Moka cache
/// - `RedisStore` - network Redis backend
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Returns the stored payload, or `None` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores `value` under `key`; the backend expires it after `ttl`.
    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()>;

    /// Removes `key`. Deleting a key that does not exist is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Returns the name of this backend, used for logging.
    fn name(&self) -> &str;
}
