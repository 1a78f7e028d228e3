//! Response cache in front of the entity store.
//!
//! Handlers cache the JSON shape of read responses under deterministic keys
//! and delete the affected keys after every write. The backend is an
//! in-process [`DashMap`] with per-entry expiry; the [`CacheBackend`] trait
//! keeps the seam fallible so a remote store fits behind the same interface,
//! and [`ApiCache`] guarantees that a failing backend degrades to a miss
//! instead of failing the request.

use dashmap::DashMap;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("cache backend unavailable: {0}")]
    Backend(String),
}

/// Key-value store with per-key expiry.
pub trait CacheBackend: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError>;
    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError>;
    fn delete(&self, key: &str) -> Result<bool, CacheError>;
    fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError>;
}

struct CacheEntry {
    value: Value,
    expires_at: Instant,
}

/// In-process backend. Entries past their TTL read as absent and are
/// removed lazily on the next lookup.
#[derive(Default)]
pub struct MemoryBackend {
    entries: DashMap<String, CacheEntry>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }
}

impl CacheBackend for MemoryBackend {
    fn get(&self, key: &str) -> Result<Option<Value>, CacheError> {
        let expired = match self.entries.get(key) {
            Some(entry) => {
                if entry.expires_at > Instant::now() {
                    return Ok(Some(entry.value.clone()));
                }
                true
            }
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        Ok(None)
    }

    fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), CacheError> {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool, CacheError> {
        Ok(self.entries.remove(key).is_some())
    }

    fn delete_prefix(&self, prefix: &str) -> Result<u64, CacheError> {
        let matching: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().starts_with(prefix))
            .map(|entry| entry.key().clone())
            .collect();

        let mut removed = 0;
        for key in matching {
            if self.entries.remove(&key).is_some() {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

/// Shared handle handed to route handlers.
///
/// Backend failures are logged and swallowed here: a read error is a miss
/// and a write/delete error leaves the cache stale-or-empty, never the
/// response path broken.
#[derive(Clone)]
pub struct ApiCache {
    backend: Arc<dyn CacheBackend>,
}

impl ApiCache {
    pub fn in_memory() -> Self {
        Self::with_backend(Arc::new(MemoryBackend::new()))
    }

    pub fn with_backend(backend: Arc<dyn CacheBackend>) -> Self {
        Self { backend }
    }

    pub fn lookup<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.backend.get(key) {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(decoded) => {
                    log::debug!("cache hit :: {}", key);
                    Some(decoded)
                }
                Err(err) => {
                    log::warn!("cache entry for '{}' failed to decode: {}", key, err);
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                log::warn!("cache read for '{}' failed: {}", key, err);
                None
            }
        }
    }

    pub fn store<T: Serialize>(&self, key: &str, value: &T, ttl: Duration) {
        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                log::warn!("cache encode for '{}' failed: {}", key, err);
                return;
            }
        };
        match self.backend.set(key, encoded, ttl) {
            Ok(()) => log::debug!("cache fill :: {} (ttl {}s)", key, ttl.as_secs()),
            Err(err) => log::warn!("cache write for '{}' failed: {}", key, err),
        }
    }

    pub fn invalidate(&self, keys: &[&str]) {
        for key in keys {
            match self.backend.delete(key) {
                Ok(true) => log::debug!("cache invalidate :: {}", key),
                Ok(false) => {}
                Err(err) => log::warn!("cache delete for '{}' failed: {}", key, err),
            }
        }
    }

    pub fn invalidate_prefix(&self, prefix: &str) {
        match self.backend.delete_prefix(prefix) {
            Ok(removed) if removed > 0 => {
                log::debug!("cache invalidate :: {} keys under '{}'", removed, prefix)
            }
            Ok(_) => {}
            Err(err) => log::warn!("cache prefix delete for '{}' failed: {}", prefix, err),
        }
    }
}

/// Deterministic cache keys derived from route and normalized query options.
///
/// Collection keys embed their query parameters in a fixed order so a write
/// path can clear every variant by deleting the collection prefix.
pub mod keys {
    pub const CANDIDATES: &str = "candidates";
    pub const VOLUNTEERS: &str = "volunteers";
    pub const ROLES: &str = "roles";
    pub const EVENTS: &str = "events";
    pub const ATTENDANCES: &str = "attendances";
    pub const CAMPAIGNS: &str = "campaigns";

    /// Prefixes covering every single-item key of a resource, for writes
    /// that can stale an unknown set of cached items (e.g. a cascade
    /// delete removing link rows embedded in other resources' responses).
    pub const VOLUNTEER_ITEMS: &str = "volunteer-";
    pub const EVENT_ITEMS: &str = "event-";

    pub fn candidate(id: i32) -> String {
        format!("candidate-{id}")
    }

    pub fn volunteer(id: i32) -> String {
        format!("volunteer-{id}")
    }

    pub fn role(id: i32) -> String {
        format!("role-{id}")
    }

    pub fn event(id: i32) -> String {
        format!("event-{id}")
    }

    pub fn attendance(id: i32) -> String {
        format!("attendance-{id}")
    }

    pub fn candidates(office: Option<&str>, district: Option<&str>, order: &str) -> String {
        let mut parts = Vec::new();
        if let Some(district) = district {
            parts.push(format!("district={district}"));
        }
        if let Some(office) = office {
            parts.push(format!("office={office}"));
        }
        parts.push(format!("order={order}"));
        format!("{CANDIDATES}-{}", parts.join("&"))
    }

    pub fn volunteers(name: Option<&str>, order: &str) -> String {
        let mut parts = Vec::new();
        if let Some(name) = name {
            parts.push(format!("name={name}"));
        }
        parts.push(format!("order={order}"));
        format!("{VOLUNTEERS}-{}", parts.join("&"))
    }

    pub fn report(kind: &str, order: &str) -> String {
        format!("{CAMPAIGNS}-{kind}-{order}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    #[test]
    fn lookup_returns_stored_value_until_expiry() {
        let cache = ApiCache::in_memory();
        cache.store("roles", &vec!["a", "b"], Duration::from_millis(40));

        let hit: Option<Vec<String>> = cache.lookup("roles");
        assert_eq!(hit, Some(vec!["a".to_string(), "b".to_string()]));

        sleep(Duration::from_millis(60));
        let miss: Option<Vec<String>> = cache.lookup("roles");
        assert!(miss.is_none());
    }

    #[test]
    fn invalidate_removes_exact_key_only() {
        let cache = ApiCache::in_memory();
        cache.store("role-1", &1, Duration::from_secs(60));
        cache.store("roles", &vec![1], Duration::from_secs(60));

        cache.invalidate(&["role-1"]);
        assert!(cache.lookup::<i32>("role-1").is_none());
        assert_eq!(cache.lookup::<Vec<i32>>("roles"), Some(vec![1]));
    }

    #[test]
    fn prefix_invalidation_spares_item_keys() {
        let cache = ApiCache::in_memory();
        cache.store("candidate-7", &7, Duration::from_secs(60));
        cache.store("candidates-order=asc", &vec![7], Duration::from_secs(60));
        cache.store("candidates-office=Senator&order=desc", &vec![7], Duration::from_secs(60));

        cache.invalidate_prefix(keys::CANDIDATES);

        assert_eq!(cache.lookup::<i32>("candidate-7"), Some(7));
        assert!(cache.lookup::<Vec<i32>>("candidates-order=asc").is_none());
        assert!(
            cache
                .lookup::<Vec<i32>>("candidates-office=Senator&order=desc")
                .is_none()
        );
    }

    #[test]
    fn collection_keys_are_deterministic() {
        assert_eq!(
            keys::candidates(Some("Senator"), Some("Naboo"), "asc"),
            "candidates-district=Naboo&office=Senator&order=asc"
        );
        assert_eq!(keys::candidates(None, None, "desc"), "candidates-order=desc");
        assert_eq!(keys::volunteers(None, "asc"), "volunteers-order=asc");
        assert_eq!(
            keys::report("money-raised", "desc"),
            "campaigns-money-raised-desc"
        );
    }

    struct BrokenBackend;

    impl CacheBackend for BrokenBackend {
        fn get(&self, _: &str) -> Result<Option<Value>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        fn set(&self, _: &str, _: Value, _: Duration) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        fn delete(&self, _: &str) -> Result<bool, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
        fn delete_prefix(&self, _: &str) -> Result<u64, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    #[test]
    fn broken_backend_reads_as_miss_and_swallows_writes() {
        let cache = ApiCache::with_backend(Arc::new(BrokenBackend));
        cache.store("events", &vec![1], Duration::from_secs(60));
        assert!(cache.lookup::<Vec<i32>>("events").is_none());
        cache.invalidate(&["events"]);
        cache.invalidate_prefix("events");
    }
}
