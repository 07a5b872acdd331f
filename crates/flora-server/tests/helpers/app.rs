//! Aplicacion completa en memoria para tests.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use flora_cache::{CacheError, CacheStore, ConditionalCacheGate, InvalidationPlanner, MemoryStore};
use flora_server::settings::InvalidationSettings;
use flora_server::{AppState, Claims, InMemoryDictionary, JwtVerifier, cache_registry, create_router};
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::json;

use super::client::TestClient;

pub const SECRET: &str = "test-secret";

/// Router plus the pieces tests need to poke at.
pub struct TestApp {
    pub client: TestClient,
    pub store: Arc<dyn CacheStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::default()))
    }

    pub fn with_store(store: Arc<dyn CacheStore>) -> Self {
        let registry = cache_registry(300).expect("Failed to build registry");
        let gate = ConditionalCacheGate::new(Arc::new(registry), Arc::clone(&store));
        let planner = InvalidationPlanner::new(Arc::clone(&store), InvalidationSettings::default().policy());
        let state = AppState::new(
            Arc::new(dictionary()),
            gate,
            planner,
            JwtVerifier::new(SECRET),
        );

        let router = create_router(state, flora_server::metrics::detached_handle());

        Self {
            client: TestClient::new(router),
            store,
        }
    }

    /// Token valido para `user_id`.
    pub fn token(&self, user_id: &str) -> String {
        sign_token(SECRET, user_id, chrono::Duration::hours(1))
    }
}

/// Firma un token HS256 como lo haria el servicio de cuentas.
pub fn sign_token(secret: &str, user_id: &str, ttl: chrono::Duration) -> String {
    let now = chrono::Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))
        .expect("Failed to sign token")
}

/// Palabras de prueba; solo `fire` y `water` tienen definiciones.
pub fn dictionary() -> InMemoryDictionary {
    InMemoryDictionary::new([
        "air", "campfire", "earth", "fire", "firefly", "fireplace", "water", "wind",
    ])
    .with_definition(
        "fire",
        json!([{ "word": "fire", "meanings": [{ "partOfSpeech": "noun" }] }]),
    )
    .with_definition(
        "water",
        json!([{ "word": "water", "meanings": [{ "partOfSpeech": "noun" }] }]),
    )
}

/// Store que rechaza toda operacion.
pub struct DownStore;

#[async_trait]
impl CacheStore for DownStore {
    async fn get(&self, _key: &str) -> flora_cache::Result<Option<Vec<u8>>> {
        Err(CacheError::store_unavailable("down", "connection refused"))
    }

    async fn set(&self, _key: &str, _value: &[u8], _ttl: Duration) -> flora_cache::Result<()> {
        Err(CacheError::store_unavailable("down", "connection refused"))
    }

    async fn delete(&self, _key: &str) -> flora_cache::Result<()> {
        Err(CacheError::store_unavailable("down", "connection refused"))
    }

    fn name(&self) -> &str {
        "down"
    }
}
