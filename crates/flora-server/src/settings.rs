//! Server settings: optional `flora.toml`, then `FLORA_*` environment
//! variables (`__` separates nested keys, e.g. `FLORA_CACHE__REDIS__HOST`).

use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File};
use flora_cache::{InvalidationPolicy, MemoryStoreConfig, RedisStoreConfig};
use serde::Deserialize;
use thiserror::Error;

const LOCAL_CONFIG_BASENAME: &str = "flora";
const ENV_PREFIX: &str = "FLORA";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl SettingsError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub invalidation: InvalidationSettings,
    #[serde(default)]
    pub auth: AuthSettings,
    #[serde(default)]
    pub dictionary: DictionarySettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Backend que implementa el CacheStore.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Memory,
    Redis,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub backend: CacheBackend,
    pub default_ttl_seconds: u64,
    /// Solo aplica al backend en memoria.
    pub max_capacity: u64,
    pub redis: RedisSettings,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: CacheBackend::default(),
            default_ttl_seconds: 300,
            max_capacity: MemoryStoreConfig::default().max_capacity,
            redis: RedisSettings::default(),
        }
    }
}

impl CacheSettings {
    pub fn memory_store(&self) -> MemoryStoreConfig {
        MemoryStoreConfig {
            max_capacity: self.max_capacity,
        }
    }
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct RedisSettings {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub db: i64,
}

impl Default for RedisSettings {
    fn default() -> Self {
        let defaults = RedisStoreConfig::default();
        Self {
            host: defaults.host,
            port: defaults.port,
            password: None,
            db: defaults.db,
        }
    }
}

impl fmt::Debug for RedisSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedisSettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("password", &self.password.as_ref().map(|_| "***"))
            .field("db", &self.db)
            .finish()
    }
}

impl From<&RedisSettings> for RedisStoreConfig {
    fn from(settings: &RedisSettings) -> Self {
        Self {
            host: settings.host.clone(),
            port: settings.port,
            password: settings.password.clone(),
            db: settings.db,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InvalidationSettings {
    pub page_sizes: Vec<u32>,
    pub max_page: u32,
    pub include_unparameterized: bool,
}

/// Same grid as [`InvalidationPolicy::default`], plus the no-query keys:
/// `GET /user/me` never carries a query, and clients usually fetch the first
/// favorites/history page without one.
impl Default for InvalidationSettings {
    fn default() -> Self {
        let policy = InvalidationPolicy::default();
        Self {
            page_sizes: policy.page_sizes,
            max_page: policy.max_page,
            include_unparameterized: true,
        }
    }
}

impl InvalidationSettings {
    /// Policy over the default per-user resources with these bounds.
    pub fn policy(&self) -> InvalidationPolicy {
        InvalidationPolicy {
            page_sizes: self.page_sizes.clone(),
            max_page: self.max_page,
            include_unparameterized: self.include_unparameterized,
            ..InvalidationPolicy::default()
        }
    }
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthSettings {
    pub jwt_secret: String,
}

impl fmt::Debug for AuthSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthSettings")
            .field("jwt_secret", &"***")
            .finish()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DictionarySettings {
    /// JSON object whose keys are the words (`words_dictionary.json`).
    pub words_file: Option<PathBuf>,
}

impl Settings {
    /// Loads settings from `flora.toml` (optional) and the environment.
    pub fn load() -> Result<Self, SettingsError> {
        let builder = Config::builder()
            .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("invalidation.page_sizes"),
            );

        Self::from_builder(builder)
    }

    /// Builds and validates settings from an arbitrary source stack.
    pub fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, SettingsError> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn addr(&self) -> Result<SocketAddr, SettingsError> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| SettingsError::invalid("server.host", format!("{e}")))
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.server.port == 0 {
            return Err(SettingsError::invalid("server.port", "must be greater than zero"));
        }
        self.addr()?;

        if self.cache.default_ttl_seconds == 0 {
            return Err(SettingsError::invalid(
                "cache.default_ttl_seconds",
                "must be greater than zero",
            ));
        }
        if self.cache.backend == CacheBackend::Memory && self.cache.max_capacity == 0 {
            return Err(SettingsError::invalid(
                "cache.max_capacity",
                "must be greater than zero",
            ));
        }
        if self.cache.backend == CacheBackend::Redis && self.cache.redis.host.trim().is_empty() {
            return Err(SettingsError::invalid("cache.redis.host", "must not be empty"));
        }

        if self.invalidation.page_sizes.is_empty() {
            return Err(SettingsError::invalid(
                "invalidation.page_sizes",
                "must list at least one page size",
            ));
        }
        if self.invalidation.page_sizes.contains(&0) {
            return Err(SettingsError::invalid(
                "invalidation.page_sizes",
                "page sizes must be greater than zero",
            ));
        }
        if self.invalidation.max_page == 0 {
            return Err(SettingsError::invalid(
                "invalidation.max_page",
                "must be at least 1",
            ));
        }

        if self.auth.jwt_secret.trim().is_empty() {
            return Err(SettingsError::invalid("auth.jwt_secret", "must not be empty"));
        }

        Ok(())
    }
}
