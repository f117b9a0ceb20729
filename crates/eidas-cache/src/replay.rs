//! Anti-replay gate.
//!
//! Every inbound message id is remembered for the replay window. The first
//! sighting of an id is accepted; every later sighting inside the window is
//! a replay.

use std::sync::Arc;
use std::time::Duration;

use eidas_core::event::{Event, EventType};

use crate::provider::AtomicCacheProvider;

/// Default replay window.
pub const DEFAULT_REPLAY_TTL: Duration = Duration::from_secs(300);

/// Atomic check-and-insert guard over message ids.
///
/// Ids are namespaced by a discriminator (the citizen country code, or the
/// issuer) so that two trust domains cannot collide on the same id.
pub struct AntiReplayGate<C> {
    cache: Arc<C>,
    ttl: Duration,
}

impl<C> Clone for AntiReplayGate<C> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            ttl: self.ttl,
        }
    }
}

impl<C: AtomicCacheProvider> AntiReplayGate<C> {
    /// Creates a gate over `cache` with the given replay window.
    #[must_use]
    pub const fn new(cache: Arc<C>, ttl: Duration) -> Self {
        Self { cache, ttl }
    }

    /// Returns the replay window.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Builds the cache key for an id.
    #[must_use]
    pub fn cache_key(token_id: &str, discriminator: &str) -> String {
        format!("{discriminator}/{token_id}")
    }

    /// Records `token_id` and reports whether it was unseen.
    ///
    /// Returns `true` exactly once per id within the replay window. A cache
    /// failure is treated as a replay: the gate never lets a message through
    /// when it cannot prove the id is fresh.
    pub async fn check_not_present_in_cache(&self, token_id: &str, discriminator: &str) -> bool {
        let key = Self::cache_key(token_id, discriminator);

        match self.cache.put_if_absent(&key, &true, Some(self.ttl)).await {
            Ok(true) => {
                tracing::debug!(token_id, discriminator, "message id recorded");
                true
            }
            Ok(false) => {
                Event::builder(EventType::ReplayDetected)
                    .failure("message id already seen")
                    .subject(token_id)
                    .detail("discriminator", discriminator)
                    .emit();
                false
            }
            Err(e) => {
                tracing::warn!(
                    token_id,
                    discriminator,
                    error = %e,
                    "anti-replay cache unavailable, rejecting message"
                );
                Event::builder(EventType::ReplayDetected)
                    .failure("anti-replay cache unavailable")
                    .subject(token_id)
                    .detail("discriminator", discriminator)
                    .emit();
                false
            }
        }
    }
}
