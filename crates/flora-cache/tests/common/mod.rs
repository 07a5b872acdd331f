#![allow(dead_code)]
//! Store doubles for cache layer tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use flora_cache::{CacheError, CacheStore, CacheRegistry, CacheableConfig, Result};

/// A store call, as observed by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(String),
    Set(String, Duration),
    Delete(String),
}

/// In-memory store with a manual clock, call log and injectable failures.
#[derive(Default)]
pub struct RecordingStore {
    now_secs: AtomicU64,
    entries: Mutex<HashMap<String, (Vec<u8>, u64)>>,
    calls: Mutex<Vec<Call>>,
    fail_get: AtomicBool,
    fail_set: AtomicBool,
    fail_delete: Mutex<HashSet<String>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the simulated clock; entries past their TTL become misses.
    pub fn advance(&self, by: Duration) {
        self.now_secs.fetch_add(by.as_secs(), Ordering::SeqCst);
    }

    pub fn fail_gets(&self) {
        self.fail_get.store(true, Ordering::SeqCst);
    }

    pub fn fail_sets(&self) {
        self.fail_set.store(true, Ordering::SeqCst);
    }

    pub fn fail_delete_of(&self, key: &str) {
        self.fail_delete.lock().unwrap().insert(key.to_string());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn gets(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Get(_))).count()
    }

    pub fn sets(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Set(..))).count()
    }

    pub fn deleted_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Delete(key) => Some(key),
                _ => None,
            })
            .collect()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.lock().unwrap().contains_key(key)
    }

    /// Writes an entry directly, bypassing the call log.
    pub fn seed(&self, key: &str, value: &[u8], ttl: Duration) {
        let expires_at = self.now_secs.load(Ordering::SeqCst) + ttl.as_secs();
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), (value.to_vec(), expires_at));
    }
}

#[async_trait]
impl CacheStore for RecordingStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.calls.lock().unwrap().push(Call::Get(key.to_string()));
        if self.fail_get.load(Ordering::SeqCst) {
            return Err(CacheError::store_unavailable("recording", "get refused"));
        }

        let now = self.now_secs.load(Ordering::SeqCst);
        let entries = self.entries.lock().unwrap();
        Ok(entries
            .get(key)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(value, _)| value.clone()))
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Set(key.to_string(), ttl));
        if self.fail_set.load(Ordering::SeqCst) {
            return Err(CacheError::store_unavailable("recording", "set refused"));
        }

        self.seed(key, value, ttl);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.calls
            .lock()
            .unwrap()
            .push(Call::Delete(key.to_string()));
        if self.fail_delete.lock().unwrap().contains(key) {
            return Err(CacheError::store_unavailable("recording", "delete refused"));
        }

        self.entries.lock().unwrap().remove(key);
        Ok(())
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Registry with `entries` and `user` cacheable for 300 seconds.
pub fn registry() -> CacheRegistry {
    let mut registry = CacheRegistry::new();
    registry
        .register("entries", CacheableConfig::new("entries").with_ttl_seconds(300))
        .expect("Failed to register entries");
    registry
        .register("user", CacheableConfig::new("user").with_ttl_seconds(300))
        .expect("Failed to register user");
    registry
}
