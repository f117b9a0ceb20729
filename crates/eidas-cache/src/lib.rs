//! # eidas-cache
//!
//! Cache abstractions for the eIDAS Node.
//!
//! Light requests and responses are parked in a cache keyed by light token
//! id, and message ids are remembered for the replay window. Both uses go
//! through the traits in [`provider`], so the in-process [`InMemoryCache`]
//! and the distributed Redis provider (see `eidas-cache-redis`) are
//! interchangeable.
//!
//! ## Providers
//!
//! - [`CacheProvider`] - Basic key-value cache operations
//! - [`AtomicCacheProvider`] - Set-if-absent and get-and-remove
//!
//! ## Anti-replay
//!
//! [`AntiReplayGate`] performs a single atomic check-and-insert per message
//! id and fails closed when the backing cache is unavailable. Callers run it
//! on every unmarshalled request, keyed by the request id and the citizen
//! country code.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod memory;
pub mod provider;
pub mod replay;

pub use error::{CacheError, CacheResult};
pub use memory::InMemoryCache;
pub use provider::{AtomicCacheProvider, CacheProvider};
pub use replay::AntiReplayGate;
