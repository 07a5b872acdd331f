//! Flora API server binary.

use std::sync::Arc;

use anyhow::Context;
use flora_cache::{
    CacheStore, ConditionalCacheGate, InvalidationPlanner, MemoryStore, RedisStore,
    RedisStoreConfig,
};
use flora_server::{
    AppState, CacheBackend, Dictionary, InMemoryDictionary, JwtVerifier, Settings, cache_registry,
    metrics::init_metrics, run_server,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::load().context("Failed to load settings")?;
    let addr = settings.addr()?;

    tracing::info!("Starting Flora API server v{}", env!("CARGO_PKG_VERSION"));

    let prometheus_handle = init_metrics().context("Failed to install metrics recorder")?;

    let store: Arc<dyn CacheStore> = match settings.cache.backend {
        CacheBackend::Memory => {
            tracing::info!(max_capacity = settings.cache.max_capacity, "Using in-memory cache store");
            Arc::new(MemoryStore::new(settings.cache.memory_store()))
        },
        CacheBackend::Redis => {
            let config = RedisStoreConfig::from(&settings.cache.redis);
            tracing::info!(host = %config.host, port = config.port, db = config.db, "Using Redis cache store");
            Arc::new(
                RedisStore::connect(&config)
                    .await
                    .context("Failed to connect to Redis")?,
            )
        },
    };

    let registry = cache_registry(settings.cache.default_ttl_seconds)?;
    let gate = ConditionalCacheGate::new(Arc::new(registry), Arc::clone(&store));
    let planner = InvalidationPlanner::new(store, settings.invalidation.policy());

    let dictionary: Arc<dyn Dictionary> = match &settings.dictionary.words_file {
        Some(path) => Arc::new(
            InMemoryDictionary::from_file(path)
                .with_context(|| format!("Failed to load word list from {}", path.display()))?,
        ),
        None => {
            tracing::warn!("No dictionary.words_file configured, starting with an empty word list");
            Arc::new(InMemoryDictionary::default())
        },
    };

    let auth = JwtVerifier::new(&settings.auth.jwt_secret);
    let state = AppState::new(dictionary, gate, planner, auth);

    run_server(addr, state, prometheus_handle).await?;

    Ok(())
}
