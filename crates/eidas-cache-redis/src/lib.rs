//! # eidas-cache-redis
//!
//! Redis cache provider for the eIDAS Node, built on `fred`.
//!
//! A Node deployed as several instances must share its anti-replay and
//! light-message caches, otherwise a token redeemed on one instance could be
//! replayed on another. [`RedisCacheProvider`] implements the `eidas-cache`
//! traits with `SET NX EX` for set-if-absent and `GETDEL` for single-use
//! reads, both atomic on the server.
//!
//! ## Example
//!
//! ```ignore
//! use eidas_cache::AntiReplayGate;
//! use eidas_cache_redis::{RedisCacheProvider, RedisConfig};
//! use std::{sync::Arc, time::Duration};
//!
//! let config = RedisConfig::default().host("redis.node.local");
//! let cache = Arc::new(RedisCacheProvider::new(config).await?);
//! let gate = AntiReplayGate::new(cache, Duration::from_secs(300));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod provider;

pub use config::RedisConfig;
pub use provider::RedisCacheProvider;
