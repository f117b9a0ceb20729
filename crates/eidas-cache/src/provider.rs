//! Cache provider traits.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::CacheResult;

/// Cache provider trait for key-value caching.
///
/// Implementations must be thread-safe and support concurrent access.
/// All operations are async to support both local and distributed caches.
///
/// Values are any type that implements `Serialize` + `DeserializeOwned`;
/// the implementation owns the encoding.
#[async_trait]
pub trait CacheProvider: Send + Sync {
    /// Gets a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist or has expired.
    async fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send;

    /// Stores a value with an optional TTL, replacing any previous value.
    ///
    /// If `ttl` is `None`, the value will not expire automatically.
    async fn put<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()>
    where
        T: Serialize + Sync;

    /// Deletes a value from the cache.
    ///
    /// Returns `Ok(())` even if the key doesn't exist.
    async fn delete(&self, key: &str) -> CacheResult<()>;

    /// Checks if a key exists in the cache.
    async fn exists(&self, key: &str) -> CacheResult<bool>;
}

/// Atomic operations needed for single-use values.
#[async_trait]
pub trait AtomicCacheProvider: CacheProvider {
    /// Stores a value only if the key doesn't exist.
    ///
    /// Returns `true` if the value was stored, `false` if the key already
    /// existed. The check and the insert are one atomic step.
    async fn put_if_absent<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<bool>
    where
        T: Serialize + Sync;

    /// Gets and removes a value atomically.
    ///
    /// Of several concurrent callers for the same key, at most one sees the
    /// value.
    async fn get_and_remove<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send;
}
