//! Cache metrics recording.

use metrics::{counter, histogram};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Registra las metricas de cache.
/// Llamar una vez al inicio, despues de instalar el recorder.
pub fn register_cache_metrics() {
    metrics::describe_counter!("flora_cache_hits_total", "Total number of cache hits");
    metrics::describe_counter!("flora_cache_misses_total", "Total number of cache misses");
    metrics::describe_counter!(
        "flora_cache_errors_total",
        "Total number of store failures absorbed by the cache layer"
    );
    metrics::describe_counter!(
        "flora_cache_evictions_total",
        "Total number of cache evictions"
    );
    metrics::describe_counter!(
        "flora_cache_invalidated_keys_total",
        "Total number of keys deleted by user invalidation sweeps"
    );
    metrics::describe_counter!(
        "flora_cache_invalidation_failures_total",
        "Total number of deletes that failed during user invalidation sweeps"
    );
    metrics::describe_histogram!(
        "flora_cache_operation_seconds",
        "Time spent on cache store operations"
    );
}

/// Recorder de metricas de cache.
/// Usa atomic counters internos para poder consultar hit rate sin recorder.
#[derive(Debug, Clone, Default)]
pub struct CacheMetrics {
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
    errors: Arc<AtomicU64>,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra un cache hit
    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!("flora_cache_hits_total").increment(1);
    }

    /// Registra un cache miss
    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!("flora_cache_misses_total").increment(1);
    }

    /// Registra un fallo del store (fail-open)
    pub fn record_error(&self, operation: &'static str) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        counter!("flora_cache_errors_total", "operation" => operation).increment(1);
    }

    /// Registra una eviction
    pub fn record_eviction(&self, reason: &'static str) {
        counter!("flora_cache_evictions_total", "reason" => reason).increment(1);
    }

    /// Registra el resultado de un barrido de invalidacion
    pub fn record_invalidation(&self, deleted: usize, failed: usize) {
        counter!("flora_cache_invalidated_keys_total").increment(deleted as u64);
        if failed > 0 {
            counter!("flora_cache_invalidation_failures_total").increment(failed as u64);
        }
    }

    /// Registra la duracion de una operacion
    pub fn record_operation_duration(&self, operation: &'static str, duration: Duration) {
        histogram!("flora_cache_operation_seconds", "operation" => operation)
            .record(duration.as_secs_f64());
    }

    /// Calcula hit rate (para logging/debugging)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits.load(Ordering::Relaxed) as f64;
        let misses = self.misses.load(Ordering::Relaxed) as f64;
        let total = hits + misses;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    pub fn errors(&self) -> u64 {
        self.errors.load(Ordering::Relaxed)
    }
}
