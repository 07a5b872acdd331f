//! Network store backed by Redis.

use std::time::Duration;

use async_trait::async_trait;
use ::redis::AsyncCommands;
use ::redis::aio::ConnectionManager;
use tracing::info;

use super::CacheStore;
use crate::error::{CacheError, Result};

const BACKEND: &str = "redis";

/// Connection settings for [`RedisStore`].
#[derive(Debug, Clone)]
pub struct RedisStoreConfig {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
}

impl Default for RedisStoreConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            password: None,
            db: 0,
        }
    }
}

impl RedisStoreConfig {
    /// Builds the `redis://` URL, percent-encoding the password.
    pub fn url(&self) -> String {
        match self.password.as_deref().filter(|p| !p.is_empty()) {
            Some(password) => format!(
                "redis://:{}@{}:{}/{}",
                urlencoding::encode(password),
                self.host,
                self.port,
                self.db
            ),
            None => format!("redis://{}:{}/{}", self.host, self.port, self.db),
        }
    }
}

/// Store que delega en un servidor Redis.
///
/// The connection manager reconnects on its own, so a Redis outage surfaces
/// as `StoreUnavailable` errors on individual calls rather than as a dead
/// handle.
#[derive(Clone)]
pub struct RedisStore {
    connection: ConnectionManager,
}

impl RedisStore {
    /// Opens the connection manager.
    ///
    /// # Errors
    ///
    /// `StoreUnavailable` if the URL is invalid or the first connection fails.
    pub async fn connect(config: &RedisStoreConfig) -> Result<Self> {
        let client = ::redis::Client::open(config.url())
            .map_err(|e| CacheError::store_unavailable_with(BACKEND, e))?;
        let connection = client
            .get_connection_manager()
            .await
            .map_err(|e| CacheError::store_unavailable_with(BACKEND, e))?;

        info!(host = %config.host, port = config.port, db = config.db, "Connected to Redis");

        Ok(Self { connection })
    }
}

#[async_trait]
impl CacheStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut connection = self.connection.clone();
        connection
            .get::<_, Option<Vec<u8>>>(key)
            .await
            .map_err(|e| CacheError::store_unavailable_with(BACKEND, e))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        let mut connection = self.connection.clone();
        // SETEX rejects a zero expiry
        let seconds = ttl.as_secs().max(1);
        connection
            .set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|e| CacheError::store_unavailable_with(BACKEND, e))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut connection = self.connection.clone();
        connection
            .del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::store_unavailable_with(BACKEND, e))
    }

    fn name(&self) -> &str {
        BACKEND
    }
}
