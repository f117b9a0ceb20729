//! Common test fixtures.

use std::sync::Arc;

use eidas_cache::InMemoryCache;
use eidas_core::{ConfigSnapshot, NodeSide, ReloadableConfiguration};
use eidas_light::SpecificCommunicationService;

/// Service type used by the exchange tests.
pub type Service = SpecificCommunicationService<InMemoryCache, Arc<ReloadableConfiguration>>;

/// Installs a test subscriber once.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter("eidas=debug")
        .with_test_writer()
        .try_init();
}

/// Channel configuration for both Node sides, keyed on `secret_suffix`.
pub fn snapshot(secret_suffix: &str) -> ConfigSnapshot {
    let mut pairs = Vec::new();
    for side in ["connector", "proxyservice"] {
        for direction in ["request", "response"] {
            pairs.push((
                format!("lightToken.{side}.{direction}.secret"),
                format!("{side}-{direction}-{secret_suffix}"),
            ));
            pairs.push((
                format!("lightToken.{side}.{direction}.algorithm"),
                "SHA-256".to_string(),
            ));
        }
    }
    pairs.push(("lightRequest.cache.ttl.seconds".to_string(), "60".to_string()));
    ConfigSnapshot::from_pairs(pairs)
}

/// A Node and a Specific module of one side sharing a cache and a
/// configuration.
pub struct Deployment {
    pub cache: Arc<InMemoryCache>,
    pub config: Arc<ReloadableConfiguration>,
    pub node: Service,
    pub specific: Service,
}

impl Deployment {
    pub fn new(side: NodeSide) -> Self {
        init_tracing();
        let cache = Arc::new(InMemoryCache::new());
        let config = Arc::new(ReloadableConfiguration::new(snapshot("v1")));
        Self {
            node: SpecificCommunicationService::new(Arc::clone(&cache), Arc::clone(&config), side),
            specific: SpecificCommunicationService::new(Arc::clone(&cache), Arc::clone(&config), side),
            cache,
            config,
        }
    }
}
