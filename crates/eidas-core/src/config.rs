//! Configuration management for the eIDAS Node.
//!
//! Configuration arrives as a flat key-value map (the Node's properties
//! files). Recognised keys form the closed [`ConfigurationKey`] set; the
//! string form of each key is resolved through a table built once on first
//! use.
//!
//! Readers never hold on to a map directly. They go through a
//! [`ConfigurationAccessor`], which hands out the current immutable
//! [`ConfigSnapshot`]. [`ReloadableConfiguration`] swaps the snapshot
//! atomically so a reload is visible to the next call without restarting.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Recognised configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfigurationKey {
    /// Issuer name put in light tokens for connector requests.
    ConnectorRequestIssuer,
    /// Shared secret for connector request tokens.
    ConnectorRequestSecret,
    /// Digest algorithm for connector request tokens.
    ConnectorRequestAlgorithm,
    /// Issuer name put in light tokens for connector responses.
    ConnectorResponseIssuer,
    /// Shared secret for connector response tokens.
    ConnectorResponseSecret,
    /// Digest algorithm for connector response tokens.
    ConnectorResponseAlgorithm,
    /// Issuer name put in light tokens for proxy-service requests.
    ProxyServiceRequestIssuer,
    /// Shared secret for proxy-service request tokens.
    ProxyServiceRequestSecret,
    /// Digest algorithm for proxy-service request tokens.
    ProxyServiceRequestAlgorithm,
    /// Issuer name put in light tokens for proxy-service responses.
    ProxyServiceResponseIssuer,
    /// Shared secret for proxy-service response tokens.
    ProxyServiceResponseSecret,
    /// Digest algorithm for proxy-service response tokens.
    ProxyServiceResponseAlgorithm,
    /// Lifetime of anti-replay entries, in seconds.
    AntiReplayTtlSeconds,
    /// Lifetime of stored light requests, in seconds.
    LightRequestTtlSeconds,
    /// Lifetime of stored light responses, in seconds.
    LightResponseTtlSeconds,
}

impl ConfigurationKey {
    /// Every recognised key.
    pub const ALL: [Self; 15] = [
        Self::ConnectorRequestIssuer,
        Self::ConnectorRequestSecret,
        Self::ConnectorRequestAlgorithm,
        Self::ConnectorResponseIssuer,
        Self::ConnectorResponseSecret,
        Self::ConnectorResponseAlgorithm,
        Self::ProxyServiceRequestIssuer,
        Self::ProxyServiceRequestSecret,
        Self::ProxyServiceRequestAlgorithm,
        Self::ProxyServiceResponseIssuer,
        Self::ProxyServiceResponseSecret,
        Self::ProxyServiceResponseAlgorithm,
        Self::AntiReplayTtlSeconds,
        Self::LightRequestTtlSeconds,
        Self::LightResponseTtlSeconds,
    ];

    /// Returns the property name of this key.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::ConnectorRequestIssuer => "lightToken.connector.request.issuer.name",
            Self::ConnectorRequestSecret => "lightToken.connector.request.secret",
            Self::ConnectorRequestAlgorithm => "lightToken.connector.request.algorithm",
            Self::ConnectorResponseIssuer => "lightToken.connector.response.issuer.name",
            Self::ConnectorResponseSecret => "lightToken.connector.response.secret",
            Self::ConnectorResponseAlgorithm => "lightToken.connector.response.algorithm",
            Self::ProxyServiceRequestIssuer => "lightToken.proxyservice.request.issuer.name",
            Self::ProxyServiceRequestSecret => "lightToken.proxyservice.request.secret",
            Self::ProxyServiceRequestAlgorithm => "lightToken.proxyservice.request.algorithm",
            Self::ProxyServiceResponseIssuer => "lightToken.proxyservice.response.issuer.name",
            Self::ProxyServiceResponseSecret => "lightToken.proxyservice.response.secret",
            Self::ProxyServiceResponseAlgorithm => "lightToken.proxyservice.response.algorithm",
            Self::AntiReplayTtlSeconds => "antiReplay.cache.ttl.seconds",
            Self::LightRequestTtlSeconds => "lightRequest.cache.ttl.seconds",
            Self::LightResponseTtlSeconds => "lightResponse.cache.ttl.seconds",
        }
    }

    /// Resolves a property name to its key.
    ///
    /// Surrounding whitespace is ignored; the match itself is exact.
    #[must_use]
    pub fn from_key(name: &str) -> Option<Self> {
        static LOOKUP: LazyLock<HashMap<&'static str, ConfigurationKey>> = LazyLock::new(|| {
            ConfigurationKey::ALL
                .iter()
                .map(|key| (key.key(), *key))
                .collect()
        });

        LOOKUP.get(name.trim()).copied()
    }

    /// Returns the issuer, secret and algorithm keys of a token channel.
    #[must_use]
    pub const fn channel_keys(side: NodeSide, direction: Direction) -> (Self, Self, Self) {
        match (side, direction) {
            (NodeSide::Connector, Direction::Request) => (
                Self::ConnectorRequestIssuer,
                Self::ConnectorRequestSecret,
                Self::ConnectorRequestAlgorithm,
            ),
            (NodeSide::Connector, Direction::Response) => (
                Self::ConnectorResponseIssuer,
                Self::ConnectorResponseSecret,
                Self::ConnectorResponseAlgorithm,
            ),
            (NodeSide::ProxyService, Direction::Request) => (
                Self::ProxyServiceRequestIssuer,
                Self::ProxyServiceRequestSecret,
                Self::ProxyServiceRequestAlgorithm,
            ),
            (NodeSide::ProxyService, Direction::Response) => (
                Self::ProxyServiceResponseIssuer,
                Self::ProxyServiceResponseSecret,
                Self::ProxyServiceResponseAlgorithm,
            ),
        }
    }
}

impl fmt::Display for ConfigurationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// The Node component a token channel belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeSide {
    /// Service-provider side.
    Connector,
    /// Identity-provider side.
    ProxyService,
}

/// Whether a channel carries requests or responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Light requests.
    Request,
    /// Light responses.
    Response,
}

/// Immutable view of the configuration map.
#[derive(Debug, Clone, Default)]
pub struct ConfigSnapshot {
    values: HashMap<String, String>,
}

impl ConfigSnapshot {
    /// Creates a snapshot from key-value pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.into().trim().to_string(), v.into()))
                .collect(),
        }
    }

    /// Returns the trimmed value of a key, treating blank values as absent.
    #[must_use]
    pub fn get(&self, key: ConfigurationKey) -> Option<&str> {
        self.values
            .get(key.key())
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Returns the value of a key or an error naming it.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::MissingConfiguration`] if the key has no value.
    pub fn require(&self, key: ConfigurationKey) -> Result<&str> {
        self.get(key).ok_or(Error::MissingConfiguration(key))
    }

    /// Returns a key parsed as an unsigned integer.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the value is not a number.
    pub fn get_u64(&self, key: ConfigurationKey) -> Result<Option<u64>> {
        self.get(key)
            .map(|v| {
                v.parse::<u64>().map_err(|e| Error::InvalidConfiguration {
                    key,
                    reason: e.to_string(),
                })
            })
            .transpose()
    }

    /// Returns the property names that are not recognised keys, sorted.
    #[must_use]
    pub fn unknown_keys(&self) -> Vec<&str> {
        let mut unknown: Vec<&str> = self
            .values
            .keys()
            .map(String::as_str)
            .filter(|k| ConfigurationKey::from_key(k).is_none())
            .collect();
        unknown.sort_unstable();
        unknown
    }

    /// Returns the number of entries, recognised or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Source of the current configuration.
pub trait ConfigurationAccessor: Send + Sync {
    /// Returns the snapshot in effect right now.
    fn snapshot(&self) -> Arc<ConfigSnapshot>;

    /// Returns a counter that changes whenever the snapshot is replaced.
    fn version(&self) -> u64 {
        0
    }
}

impl<T: ConfigurationAccessor + ?Sized> ConfigurationAccessor for Arc<T> {
    fn snapshot(&self) -> Arc<ConfigSnapshot> {
        (**self).snapshot()
    }

    fn version(&self) -> u64 {
        (**self).version()
    }
}

/// Configuration fixed at construction.
#[derive(Debug, Clone)]
pub struct StaticConfiguration {
    snapshot: Arc<ConfigSnapshot>,
}

impl StaticConfiguration {
    /// Wraps a snapshot.
    #[must_use]
    pub fn new(snapshot: ConfigSnapshot) -> Self {
        Self {
            snapshot: Arc::new(snapshot),
        }
    }
}

impl ConfigurationAccessor for StaticConfiguration {
    fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.snapshot)
    }
}

/// Configuration that can be replaced at runtime.
///
/// Readers clone the current `Arc`; a reload swaps the pointer and bumps the
/// version. Callers already holding a snapshot keep a consistent view.
#[derive(Debug)]
pub struct ReloadableConfiguration {
    current: RwLock<Arc<ConfigSnapshot>>,
    version: AtomicU64,
}

impl ReloadableConfiguration {
    /// Creates a reloadable configuration with an initial snapshot.
    #[must_use]
    pub fn new(initial: ConfigSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(initial)),
            version: AtomicU64::new(1),
        }
    }

    /// Replaces the snapshot and returns the new version.
    pub fn reload(&self, snapshot: ConfigSnapshot) -> u64 {
        let unknown = snapshot.unknown_keys().len();
        let mut current = self.current.write();
        *current = Arc::new(snapshot);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        drop(current);

        tracing::info!(version, unknown_keys = unknown, "configuration reloaded");
        version
    }
}

impl ConfigurationAccessor for ReloadableConfiguration {
    fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.current.read().clone()
    }

    fn version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }
}

/// Trust domain of one light token channel.
#[derive(Clone, PartialEq, Eq)]
pub struct LightTokenChannel {
    /// Issuer name written into minted tokens.
    pub issuer: String,
    /// Shared secret mixed into the digest.
    pub secret: String,
    /// Digest algorithm name, e.g. `SHA-256`.
    pub algorithm: String,
}

impl fmt::Debug for LightTokenChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LightTokenChannel")
            .field("issuer", &self.issuer)
            .field("secret", &"[REDACTED]")
            .field("algorithm", &self.algorithm)
            .finish()
    }
}

impl LightTokenChannel {
    /// Creates a channel from explicit values.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        secret: impl Into<String>,
        algorithm: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            secret: secret.into(),
            algorithm: algorithm.into(),
        }
    }

    /// Resolves a channel from a snapshot.
    ///
    /// The issuer falls back to the Node's conventional name for the channel;
    /// secret and algorithm are mandatory.
    ///
    /// ## Errors
    ///
    /// Returns [`Error::MissingConfiguration`] if the secret or algorithm is absent.
    pub fn from_snapshot(
        snapshot: &ConfigSnapshot,
        side: NodeSide,
        direction: Direction,
    ) -> Result<Self> {
        let (issuer_key, secret_key, algorithm_key) =
            ConfigurationKey::channel_keys(side, direction);

        let issuer = snapshot
            .get(issuer_key)
            .map_or_else(|| default_issuer(side, direction).to_string(), str::to_string);

        Ok(Self {
            issuer,
            secret: snapshot.require(secret_key)?.to_string(),
            algorithm: snapshot.require(algorithm_key)?.to_string(),
        })
    }
}

const fn default_issuer(side: NodeSide, direction: Direction) -> &'static str {
    match (side, direction) {
        (NodeSide::Connector, Direction::Request) => {
            "specificCommunicationDefinitionConnectorRequest"
        }
        (NodeSide::Connector, Direction::Response) => {
            "specificCommunicationDefinitionConnectorResponse"
        }
        (NodeSide::ProxyService, Direction::Request) => {
            "specificCommunicationDefinitionProxyserviceRequest"
        }
        (NodeSide::ProxyService, Direction::Response) => {
            "specificCommunicationDefinitionProxyserviceResponse"
        }
    }
}
