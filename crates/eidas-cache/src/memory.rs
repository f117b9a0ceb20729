//! In-process cache.
//!
//! Suitable for single-instance deployments and tests. A multi-instance
//! Node needs a distributed provider so that replay detection holds across
//! instances.

use std::time::Duration;

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use serde::{Serialize, de::DeserializeOwned};
use tokio::time::Instant;

use crate::error::CacheResult;
use crate::provider::{AtomicCacheProvider, CacheProvider};

#[derive(Debug, Clone)]
struct CacheEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: String, ttl: Option<Duration>) -> Self {
        Self {
            value,
            expires_at: ttl.map(|ttl| Instant::now() + ttl),
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

/// Minimum time between two sweeps triggered by writes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Concurrent in-memory cache with per-entry expiry.
///
/// Values are stored as JSON. Expired entries are invisible to readers.
/// Writes sweep expired entries at most once per sweep interval, so a
/// stream of fresh keys does not grow the map without bound.
#[derive(Debug)]
pub struct InMemoryCache {
    entries: DashMap<String, CacheEntry>,
    sweep_interval: Duration,
    last_sweep: Mutex<Instant>,
}

impl Default for InMemoryCache {
    fn default() -> Self {
        Self::with_sweep_interval(DEFAULT_SWEEP_INTERVAL)
    }
}

impl InMemoryCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty cache that sweeps at most once per `interval`.
    #[must_use]
    pub fn with_sweep_interval(interval: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            sweep_interval: interval,
            last_sweep: Mutex::new(Instant::now()),
        }
    }

    /// Returns the number of live entries.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.iter().filter(|e| !e.is_expired(now)).count()
    }

    /// Returns `true` if the cache holds no live entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            tracing::debug!(removed, "purged expired cache entries");
        }
        removed
    }

    /// Purges expired entries if the last sweep is older than the interval.
    ///
    /// Must not be called while holding a guard into `entries`.
    fn sweep_if_due(&self) {
        let now = Instant::now();
        {
            let mut last = self.last_sweep.lock();
            if now.duration_since(*last) < self.sweep_interval {
                return;
            }
            *last = now;
        }
        self.purge_expired();
    }
}

#[async_trait]
impl CacheProvider for InMemoryCache {
    async fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let now = Instant::now();
        let raw = match self.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => entry.value.clone(),
            _ => return Ok(None),
        };
        Ok(Some(serde_json::from_str(&raw)?))
    }

    async fn put<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()>
    where
        T: Serialize + Sync,
    {
        let serialized = serde_json::to_string(value)?;
        self.sweep_if_due();
        self.entries
            .insert(key.to_string(), CacheEntry::new(serialized, ttl));
        Ok(())
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        self.entries.remove(key);
        Ok(())
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let now = Instant::now();
        Ok(self
            .entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now)))
    }
}

#[async_trait]
impl AtomicCacheProvider for InMemoryCache {
    async fn put_if_absent<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<bool>
    where
        T: Serialize + Sync,
    {
        let serialized = serde_json::to_string(value)?;
        self.sweep_if_due();
        let now = Instant::now();

        // The entry guard holds the shard lock across the check and the insert.
        match self.entries.entry(key.to_string()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now) {
                    occupied.insert(CacheEntry::new(serialized, ttl));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(serialized, ttl));
                Ok(true)
            }
        }
    }

    async fn get_and_remove<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let now = Instant::now();
        match self.entries.remove(key) {
            Some((_, entry)) if !entry.is_expired(now) => {
                Ok(Some(serde_json::from_str(&entry.value)?))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get() {
        let cache = InMemoryCache::new();
        cache.put("k", &"value".to_string(), None).await.unwrap();

        let got: Option<String> = cache.get("k").await.unwrap();
        assert_eq!(got.as_deref(), Some("value"));
        assert!(cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn get_missing_is_none() {
        let cache = InMemoryCache::new();
        let got: Option<String> = cache.get("missing").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let cache = InMemoryCache::new();
        cache.put("k", &1_u32, None).await.unwrap();
        cache.delete("k").await.unwrap();
        cache.delete("k").await.unwrap();
        assert!(!cache.exists("k").await.unwrap());
    }

    #[tokio::test]
    async fn put_if_absent_only_first_wins() {
        let cache = InMemoryCache::new();
        assert!(cache.put_if_absent("k", &1_u32, None).await.unwrap());
        assert!(!cache.put_if_absent("k", &2_u32, None).await.unwrap());

        let got: Option<u32> = cache.get("k").await.unwrap();
        assert_eq!(got, Some(1));
    }

    #[tokio::test]
    async fn get_and_remove_consumes_once() {
        let cache = InMemoryCache::new();
        cache.put("k", &"once".to_string(), None).await.unwrap();

        let first: Option<String> = cache.get_and_remove("k").await.unwrap();
        let second: Option<String> = cache.get_and_remove("k").await.unwrap();
        assert_eq!(first.as_deref(), Some("once"));
        assert!(second.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let cache = InMemoryCache::new();
        cache
            .put("k", &"v".to_string(), Some(Duration::from_secs(5)))
            .await
            .unwrap();

        tokio::time::advance(Duration::from_secs(4)).await;
        assert!(cache.exists("k").await.unwrap());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(!cache.exists("k").await.unwrap());
        let got: Option<String> = cache.get_and_remove("k").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn put_if_absent_reclaims_expired_slot() {
        let cache = InMemoryCache::new();
        let ttl = Some(Duration::from_secs(1));
        assert!(cache.put_if_absent("k", &1_u32, ttl).await.unwrap());

        tokio::time::advance(Duration::from_secs(2)).await;
        assert!(cache.put_if_absent("k", &2_u32, ttl).await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn purge_expired_drops_only_dead_entries() {
        let cache = InMemoryCache::new();
        cache
            .put("short", &1_u32, Some(Duration::from_secs(1)))
            .await
            .unwrap();
        cache.put("forever", &2_u32, None).await.unwrap();

        tokio::time::advance(Duration::from_secs(2)).await;
        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);
        assert!(!cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn writes_sweep_expired_keys() {
        let cache = InMemoryCache::new();
        let ttl = Some(Duration::from_secs(1));
        for i in 0..1_000 {
            assert!(cache.put_if_absent(&format!("id-{i}"), &(), ttl).await.unwrap());
        }
        assert_eq!(cache.entries.len(), 1_000);

        tokio::time::advance(DEFAULT_SWEEP_INTERVAL + Duration::from_secs(1)).await;
        assert!(cache.put_if_absent("fresh", &(), ttl).await.unwrap());
        assert_eq!(cache.entries.len(), 1);

        cache.put("other", &1_u32, ttl).await.unwrap();
        assert_eq!(cache.entries.len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sweep_is_throttled() {
        let cache = InMemoryCache::with_sweep_interval(Duration::from_secs(10));
        cache.put("a", &1_u32, Some(Duration::from_secs(1))).await.unwrap();

        tokio::time::advance(Duration::from_secs(5)).await;
        cache.put("b", &2_u32, None).await.unwrap();
        assert_eq!(cache.entries.len(), 2);

        tokio::time::advance(Duration::from_secs(6)).await;
        cache.put("c", &3_u32, None).await.unwrap();
        assert_eq!(cache.entries.len(), 2);
        assert_eq!(cache.len(), 2);
    }
}
