//! Redis cache provider implementation.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use eidas_cache::{AtomicCacheProvider, CacheError, CacheProvider, CacheResult};
use fred::prelude::*;
use serde::{Serialize, de::DeserializeOwned};

use crate::config::RedisConfig;
use crate::error::{from_elapsed, from_redis_error};

/// Redis-based cache provider.
pub struct RedisCacheProvider {
    client: Client,
    config: RedisConfig,
}

impl RedisCacheProvider {
    /// Creates a new Redis cache provider.
    ///
    /// ## Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn new(config: RedisConfig) -> CacheResult<Self> {
        let redis_config = Config::from_url(&config.connection_url())
            .map_err(|e| CacheError::Configuration(e.to_string()))?;

        let client = Client::new(
            redis_config,
            None,
            None,
            Some(ReconnectPolicy::new_exponential(0, 1000, 30_000, 2)),
        );

        client.init().await.map_err(from_redis_error)?;
        tracing::info!(host = %config.host, port = config.port, "connected to redis cache");

        Ok(Self { client, config })
    }

    /// Returns the underlying Redis client.
    #[must_use]
    pub const fn client(&self) -> &Client {
        &self.client
    }

    fn key(&self, key: &str) -> String {
        self.config.prefixed_key(key)
    }

    /// Runs one command under the configured deadline.
    async fn run<T, F>(&self, command: F) -> CacheResult<T>
    where
        F: Future<Output = Result<T, fred::error::Error>> + Send,
    {
        tokio::time::timeout(self.config.command_timeout(), command)
            .await
            .map_err(from_elapsed)?
            .map_err(from_redis_error)
    }
}

/// Converts a TTL to whole seconds for `EX`, clamped to `1..=i64::MAX`.
fn expiry_seconds(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs().max(1)).unwrap_or(i64::MAX)
}

fn decode<T: DeserializeOwned>(value: Option<String>) -> CacheResult<Option<T>> {
    value
        .map(|v| serde_json::from_str(&v))
        .transpose()
        .map_err(CacheError::from)
}

#[async_trait]
impl CacheProvider for RedisCacheProvider {
    async fn get<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let key = self.key(key);
        let value: Option<String> = self.run(self.client.get(&key)).await?;
        decode(value)
    }

    async fn put<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<()>
    where
        T: Serialize + Sync,
    {
        let key = self.key(key);
        let serialized = serde_json::to_string(value)?;
        let expiration = ttl.map(|d| Expiration::EX(expiry_seconds(d)));

        self.run(
            self.client
                .set::<(), _, _>(&key, serialized, expiration, None, false),
        )
        .await
    }

    async fn delete(&self, key: &str) -> CacheResult<()> {
        let key = self.key(key);
        self.run(self.client.del::<(), _>(&key)).await
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let key = self.key(key);
        let count: i64 = self.run(self.client.exists(&key)).await?;
        Ok(count > 0)
    }
}

#[async_trait]
impl AtomicCacheProvider for RedisCacheProvider {
    async fn put_if_absent<T>(&self, key: &str, value: &T, ttl: Option<Duration>) -> CacheResult<bool>
    where
        T: Serialize + Sync,
    {
        let key = self.key(key);
        let serialized = serde_json::to_string(value)?;
        let expiration = ttl.map(|d| Expiration::EX(expiry_seconds(d)));

        // SET NX replies OK when stored and nil when the key already existed.
        let result: Option<String> = self
            .run(
                self.client
                    .set(&key, serialized, expiration, Some(SetOptions::NX), false),
            )
            .await?;

        Ok(result.is_some())
    }

    async fn get_and_remove<T>(&self, key: &str) -> CacheResult<Option<T>>
    where
        T: DeserializeOwned + Send,
    {
        let key = self.key(key);
        let value: Option<String> = self.run(self.client.getdel(&key)).await?;
        decode(value)
    }
}
