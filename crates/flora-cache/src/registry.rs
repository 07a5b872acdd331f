//! Per-resource cache declarations.
//!
//! Resources (groups of routes) are registered once while the application is
//! wired. The registry is then frozen behind an `Arc` and only read, so
//! lookups on the request path take no locks.

use std::collections::HashMap;
use std::time::Duration;

use crate::error::{CacheError, Result};

/// Configuracion de cache para un recurso.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheableConfig {
    enabled: bool,
    ttl: Duration,
    key_prefix: String,
}

impl CacheableConfig {
    /// TTL usado cuando el recurso no declara uno (5 minutos).
    pub const DEFAULT_TTL_SECONDS: u64 = 300;

    /// Crea una configuracion habilitada con el TTL por defecto.
    pub fn new(key_prefix: impl Into<String>) -> Self {
        Self {
            enabled: true,
            ttl: Duration::from_secs(Self::DEFAULT_TTL_SECONDS),
            key_prefix: key_prefix.into(),
        }
    }

    /// Sets the time-to-live handed to the store on every write.
    pub fn with_ttl_seconds(mut self, seconds: u64) -> Self {
        self.ttl = Duration::from_secs(seconds);
        self
    }

    /// Keeps the declaration but turns caching off for the resource.
    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn key_prefix(&self) -> &str {
        &self.key_prefix
    }
}

/// Registro de recursos cacheables.
#[derive(Debug, Clone, Default)]
pub struct CacheRegistry {
    resources: HashMap<String, CacheableConfig>,
}

impl CacheRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the cache declaration for a resource.
    ///
    /// # Errors
    ///
    /// - `InvalidKeyPrefix` if the prefix is empty or contains `:`
    /// - `InvalidTtl` if the TTL is zero
    /// - `DuplicateResource` if the resource was already registered
    ///
    /// # Examples
    ///
    /// ```
    /// use flora_cache::{CacheRegistry, CacheableConfig};
    ///
    /// let mut registry = CacheRegistry::new();
    /// registry
    ///     .register("entries", CacheableConfig::new("entries").with_ttl_seconds(300))
    ///     .unwrap();
    ///
    /// assert!(registry.lookup("entries").is_some());
    /// assert!(registry.lookup("auth").is_none());
    /// ```
    pub fn register(&mut self, resource: impl Into<String>, config: CacheableConfig) -> Result<()> {
        let resource = resource.into();

        if config.key_prefix.is_empty() {
            return Err(CacheError::InvalidKeyPrefix {
                prefix: config.key_prefix,
                reason: "prefix cannot be empty".to_string(),
            });
        }
        if config.key_prefix.contains(':') {
            return Err(CacheError::InvalidKeyPrefix {
                prefix: config.key_prefix,
                reason: "prefix cannot contain ':'".to_string(),
            });
        }
        if config.ttl.is_zero() {
            return Err(CacheError::InvalidTtl { resource });
        }
        if self.resources.contains_key(&resource) {
            return Err(CacheError::DuplicateResource { resource });
        }

        self.resources.insert(resource, config);
        Ok(())
    }

    /// Retorna la configuracion del recurso, si fue registrado.
    pub fn lookup(&self, resource: &str) -> Option<&CacheableConfig> {
        self.resources.get(resource)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
