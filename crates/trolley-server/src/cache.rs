//! In-memory TTL cache for search responses, with single-flight guards.
//!
//! The cache is shared mutable state across concurrent API calls. Reads are
//! at most stale by the TTL: an expired entry is evicted on access, never
//! served. Per-key flight locks serialize concurrent misses for the same
//! key so identical queries do not race duplicate upstream fetches.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use sha2::{Digest, Sha256};
use tokio::sync::{Mutex, OwnedMutexGuard};

struct CacheEntry<T> {
    value: T,
    expires_at: Instant,
}

pub struct ResponseCache<T> {
    ttl: Duration,
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    flights: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<T: Clone> ResponseCache<T> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            flights: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached value for `key` if present and unexpired.
    /// Expired entries are evicted here, before they could be served.
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                tracing::debug!(key, "cache hit");
                Some(entry.value.clone())
            }
            Some(_) => {
                tracing::debug!(key, "cache entry expired; evicting");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    pub async fn insert(&self, key: String, value: T) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.lock().await.insert(key, entry);
    }

    /// Acquires the single-flight lock for `key`. Callers hold the returned
    /// guard across the re-check/fetch/insert sequence; a second caller for
    /// the same key parks here until the first has populated the cache.
    pub async fn begin_flight(&self, key: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut flights = self.flights.lock().await;
            // Idle locks (only the map holds them) are swept opportunistically
            // so the flight map does not grow with every distinct query.
            flights.retain(|k, v| k == key || Arc::strong_count(v) > 1);
            Arc::clone(
                flights
                    .entry(key.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(()))),
            )
        };
        lock.lock_owned().await
    }

    /// Removes every entry, returning how many were evicted.
    pub async fn clear(&self) -> usize {
        let mut entries = self.entries.lock().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

/// Deterministic cache key: SHA-256 hex over the lowercased query, the
/// result cap, and the store filter (empty when absent).
#[must_use]
pub fn cache_key(query: &str, max_results: usize, store_filter: Option<&str>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(query.to_lowercase().as_bytes());
    hasher.update(b"_");
    hasher.update(max_results.to_string().as_bytes());
    hasher.update(b"_");
    hasher.update(store_filter.unwrap_or_default().to_lowercase().as_bytes());
    format!("{:x}", hasher.finalize())
}
