//! Cache-aside gate placed in front of read handlers.
//!
//! For every request the gate consults the [`CacheRegistry`], derives the
//! [`CacheKey`], and either answers from the store or runs the downstream
//! handler and writes its result back. Store failures never fail the
//! request: the gate falls back to calling the handler and reports
//! `x-cache: ERROR`.
//!
//! Concurrent misses on the same key are not coalesced. Each one runs the
//! handler and writes the store; the last write wins.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::keys::CacheKey;
use crate::metrics::CacheMetrics;
use crate::registry::{CacheRegistry, CacheableConfig};
use crate::store::CacheStore;

/// Header carrying `HIT`, `MISS` or `ERROR`.
pub const CACHE_STATUS_HEADER: &str = "x-cache";
/// Header carrying the derived cache key.
pub const CACHE_KEY_HEADER: &str = "x-cache-key";
/// Header carrying the gate's wall-clock time, e.g. `3ms`.
pub const RESPONSE_TIME_HEADER: &str = "x-response-time";

/// Values the gate can write to the store and rebuild from it.
pub trait CachePayload: Sized {
    /// Serialized form, or `None` when this value must not be stored.
    fn to_cache_bytes(&self) -> Option<Vec<u8>>;

    /// Rebuilds a value from stored bytes, or `None` if they are unusable.
    fn from_cache_bytes(bytes: Vec<u8>) -> Option<Self>;
}

impl CachePayload for Vec<u8> {
    fn to_cache_bytes(&self) -> Option<Vec<u8>> {
        Some(self.clone())
    }

    fn from_cache_bytes(bytes: Vec<u8>) -> Option<Self> {
        Some(bytes)
    }
}

/// Resultado de la consulta al cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheStatus {
    Hit,
    Miss,
    Error,
}

impl CacheStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hit => "HIT",
            Self::Miss => "MISS",
            Self::Error => "ERROR",
        }
    }
}

/// What the gate needs to know about an inbound request.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: String,
    resource: String,
    path: String,
    query: Vec<(String, String)>,
    caller: Option<String>,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, resource: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            resource: resource.into(),
            path: path.into(),
            query: Vec::new(),
            caller: None,
        }
    }

    /// Sets the decoded query parameters, in transport order.
    pub fn with_query<I, K, V>(mut self, query: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.query = query.into_iter().map(|(k, v)| (k.into(), v.into())).collect();
        self
    }

    /// Sets the authenticated caller identity.
    pub fn with_caller(mut self, caller: impl Into<String>) -> Self {
        self.caller = Some(caller.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn caller(&self) -> Option<&str> {
        self.caller.as_deref()
    }

    fn is_read(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }
}

/// Diagnostic data attached to a response that went through the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheAnnotations {
    pub status: CacheStatus,
    pub key: Option<String>,
    pub elapsed: Duration,
}

impl CacheAnnotations {
    /// Header name/value pairs to set on the response.
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        let mut headers = vec![(CACHE_STATUS_HEADER, self.status.as_str().to_string())];
        if let Some(key) = &self.key {
            headers.push((CACHE_KEY_HEADER, key.clone()));
        }
        headers.push((
            RESPONSE_TIME_HEADER,
            format!("{}ms", self.elapsed.as_millis()),
        ));
        headers
    }
}

/// A handler result, plus annotations when the cache was consulted.
#[derive(Debug)]
pub struct GateResponse<T> {
    pub value: T,
    pub annotations: Option<CacheAnnotations>,
}

impl<T> GateResponse<T> {
    fn bypassed(value: T) -> Self {
        Self {
            value,
            annotations: None,
        }
    }

    fn annotated(value: T, status: CacheStatus, key: Option<&CacheKey>, start: Instant) -> Self {
        Self {
            value,
            annotations: Some(CacheAnnotations {
                status,
                key: key.map(|k| k.to_string()),
                elapsed: start.elapsed(),
            }),
        }
    }
}

/// Gate cache-aside para handlers de lectura.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use flora_cache::{
///     CacheRegistry, CacheableConfig, ConditionalCacheGate, MemoryStore, RequestDescriptor,
/// };
///
/// # #[tokio::main]
/// # async fn main() {
/// let mut registry = CacheRegistry::new();
/// registry.register("entries", CacheableConfig::new("entries")).unwrap();
///
/// let gate = ConditionalCacheGate::new(Arc::new(registry), Arc::new(MemoryStore::default()));
/// let request = RequestDescriptor::new("GET", "entries", "/entries/en")
///     .with_query([("search", "fire")]);
///
/// let response = gate
///     .handle(&request, || async { Ok::<_, std::convert::Infallible>(b"[]".to_vec()) })
///     .await
///     .unwrap();
/// assert_eq!(response.value, b"[]".to_vec());
/// # }
/// ```
#[derive(Clone)]
pub struct ConditionalCacheGate {
    registry: Arc<CacheRegistry>,
    store: Arc<dyn CacheStore>,
    metrics: CacheMetrics,
}

impl ConditionalCacheGate {
    pub fn new(registry: Arc<CacheRegistry>, store: Arc<dyn CacheStore>) -> Self {
        Self {
            registry,
            store,
            metrics: CacheMetrics::new(),
        }
    }

    /// Runs `handler` behind the cache.
    ///
    /// Handler errors propagate unchanged and are never stored.
    pub async fn handle<T, E, F, Fut>(&self, request: &RequestDescriptor, handler: F) -> Result<GateResponse<T>, E>
    where
        T: CachePayload,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let start = Instant::now();
        let Some(config) = self.cacheable_config(request) else {
            return handler().await.map(GateResponse::bypassed);
        };

        let key = CacheKey::build(
            config.key_prefix(),
            request.path(),
            request.query(),
            request.caller(),
        );

        let lookup_start = Instant::now();
        let lookup = self.store.get(key.as_str()).await;
        self.metrics
            .record_operation_duration("get", lookup_start.elapsed());

        match lookup {
            Ok(Some(bytes)) => match T::from_cache_bytes(bytes) {
                Some(value) => {
                    self.metrics.record_hit();
                    debug!(key = %key, "Cache hit");
                    return Ok(GateResponse::annotated(value, CacheStatus::Hit, Some(&key), start));
                },
                None => {
                    warn!(key = %key, "Cached payload could not be decoded, treating as miss");
                },
            },
            Ok(None) => {},
            Err(error) => {
                self.metrics.record_error("get");
                warn!(
                    key = %key,
                    store = self.store.name(),
                    error = %error,
                    "Cache lookup failed, bypassing cache"
                );
                let value = handler().await?;
                return Ok(GateResponse::annotated(value, CacheStatus::Error, None, start));
            },
        }

        self.metrics.record_miss();
        debug!(key = %key, "Cache miss");

        let value = handler().await?;
        let status = self.write_back(&key, &value, config.ttl()).await;

        let key = (status == CacheStatus::Miss).then_some(&key);
        Ok(GateResponse::annotated(value, status, key, start))
    }

    /// Returns the config when the request should go through the cache.
    fn cacheable_config(&self, request: &RequestDescriptor) -> Option<&CacheableConfig> {
        if !request.is_read() {
            return None;
        }
        self.registry
            .lookup(request.resource())
            .filter(|config| config.enabled())
    }

    /// Stores the handler result; a failed write only downgrades the status.
    async fn write_back<T: CachePayload>(&self, key: &CacheKey, value: &T, ttl: Duration) -> CacheStatus {
        let Some(bytes) = value.to_cache_bytes() else {
            debug!(key = %key, "Handler result is not cacheable");
            return CacheStatus::Miss;
        };

        let write_start = Instant::now();
        let result = self.store.set(key.as_str(), &bytes, ttl).await;
        self.metrics
            .record_operation_duration("set", write_start.elapsed());

        match result {
            Ok(()) => CacheStatus::Miss,
            Err(error) => {
                self.metrics.record_error("set");
                warn!(
                    key = %key,
                    store = self.store.name(),
                    error = %error,
                    "Cache write failed"
                );
                CacheStatus::Error
            },
        }
    }

    /// Retorna las metricas para acceso externo.
    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings() {
        assert_eq!(CacheStatus::Hit.as_str(), "HIT");
        assert_eq!(CacheStatus::Miss.as_str(), "MISS");
        assert_eq!(CacheStatus::Error.as_str(), "ERROR");
    }

    #[test]
    fn test_annotation_headers_with_key() {
        let annotations = CacheAnnotations {
            status: CacheStatus::Hit,
            key: Some("entries:/entries/en".to_string()),
            elapsed: Duration::from_millis(7),
        };

        assert_eq!(
            annotations.headers(),
            vec![
                ("x-cache", "HIT".to_string()),
                ("x-cache-key", "entries:/entries/en".to_string()),
                ("x-response-time", "7ms".to_string()),
            ]
        );
    }

    #[test]
    fn test_annotation_headers_without_key() {
        let annotations = CacheAnnotations {
            status: CacheStatus::Error,
            key: None,
            elapsed: Duration::from_micros(300),
        };

        assert_eq!(
            annotations.headers(),
            vec![
                ("x-cache", "ERROR".to_string()),
                ("x-response-time", "0ms".to_string()),
            ]
        );
    }

    #[test]
    fn test_only_get_is_a_read() {
        assert!(RequestDescriptor::new("GET", "r", "/").is_read());
        assert!(RequestDescriptor::new("get", "r", "/").is_read());
        assert!(!RequestDescriptor::new("POST", "r", "/").is_read());
        assert!(!RequestDescriptor::new("HEAD", "r", "/").is_read());
    }
}
