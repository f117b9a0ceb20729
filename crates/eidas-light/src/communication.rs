//! Node/Specific exchange of light messages.
//!
//! The sender parks a [`LightRequest`] or [`LightResponse`] in the shared
//! cache under a fresh light token id and hands the receiver the token. The
//! receiver authenticates the token and takes the message out of the cache,
//! so each token is redeemed at most once.

use std::sync::Arc;
use std::time::Duration;

use eidas_cache::AtomicCacheProvider;
use eidas_core::event::{Event, EventType};
use eidas_core::{
    ConfigSnapshot, ConfigurationAccessor, ConfigurationKey, Direction, LightTokenChannel, NodeSide,
};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::binary::BinaryLightToken;
use crate::encoder;
use crate::error::{CommunicationError, CommunicationResult, LightMessageError};
use crate::helper::{create_binary_light_token, encode_binary_light_token_base64};
use crate::request::LightRequest;
use crate::response::LightResponse;

/// Lifetime of a parked light message when none is configured.
pub const DEFAULT_LIGHT_MESSAGE_TTL: Duration = Duration::from_secs(120);

const REQUEST_NAMESPACE: &str = "lightRequest";
const RESPONSE_NAMESPACE: &str = "lightResponse";

/// A message type that can be parked in the cache.
trait LightMessage: Serialize + DeserializeOwned + Send + Sync {
    const NAMESPACE: &'static str;
    const DIRECTION: Direction;
    const TTL_KEY: ConfigurationKey;

    fn id(&self) -> &str;
    fn validate(&self) -> Result<(), LightMessageError>;
}

impl LightMessage for LightRequest {
    const NAMESPACE: &'static str = REQUEST_NAMESPACE;
    const DIRECTION: Direction = Direction::Request;
    const TTL_KEY: ConfigurationKey = ConfigurationKey::LightRequestTtlSeconds;

    fn id(&self) -> &str {
        Self::id(self)
    }

    fn validate(&self) -> Result<(), LightMessageError> {
        Self::validate(self)
    }
}

impl LightMessage for LightResponse {
    const NAMESPACE: &'static str = RESPONSE_NAMESPACE;
    const DIRECTION: Direction = Direction::Response;
    const TTL_KEY: ConfigurationKey = ConfigurationKey::LightResponseTtlSeconds;

    fn id(&self) -> &str {
        Self::id(self)
    }

    fn validate(&self) -> Result<(), LightMessageError> {
        Self::validate(self)
    }
}

/// Parks and redeems light messages for one side of the Node.
///
/// Channel secrets, algorithms and the message lifetime are read from the
/// configuration on every call, so a reload takes effect immediately.
pub struct SpecificCommunicationService<C, A> {
    cache: Arc<C>,
    config: A,
    side: NodeSide,
}

impl<C, A> SpecificCommunicationService<C, A>
where
    C: AtomicCacheProvider,
    A: ConfigurationAccessor,
{
    /// Creates a service for `side`.
    pub const fn new(cache: Arc<C>, config: A, side: NodeSide) -> Self {
        Self { cache, config, side }
    }

    /// Node side this service serves.
    #[must_use]
    pub const fn side(&self) -> NodeSide {
        self.side
    }

    /// Parks a light request and returns the token referencing it.
    ///
    /// # Errors
    ///
    /// Fails if the request is invalid, the channel is not configured, or
    /// the cache rejects the write.
    pub async fn put_request(&self, request: &LightRequest) -> CommunicationResult<BinaryLightToken> {
        self.put(request).await
    }

    /// Redeems a base64 light token for the light request it references.
    ///
    /// # Errors
    ///
    /// Fails if the token is invalid or issued for another channel, or if
    /// no request is parked under it.
    pub async fn get_and_remove_request(&self, token_base64: &str) -> CommunicationResult<LightRequest> {
        self.get_and_remove(token_base64).await
    }

    /// Parks a light response and returns the token referencing it.
    ///
    /// # Errors
    ///
    /// Fails if the response is invalid, the channel is not configured, or
    /// the cache rejects the write.
    pub async fn put_response(&self, response: &LightResponse) -> CommunicationResult<BinaryLightToken> {
        self.put(response).await
    }

    /// Redeems a base64 light token for the light response it references.
    ///
    /// # Errors
    ///
    /// Fails if the token is invalid or issued for another channel, or if
    /// no response is parked under it.
    pub async fn get_and_remove_response(&self, token_base64: &str) -> CommunicationResult<LightResponse> {
        self.get_and_remove(token_base64).await
    }

    /// Base64 form of a token, as sent to the other party.
    #[must_use]
    pub fn encode_token(token: &BinaryLightToken) -> String {
        encode_binary_light_token_base64(token)
    }

    fn channel(&self, snapshot: &ConfigSnapshot, direction: Direction) -> CommunicationResult<LightTokenChannel> {
        Ok(LightTokenChannel::from_snapshot(snapshot, self.side, direction)?)
    }

    fn ttl(snapshot: &ConfigSnapshot, key: ConfigurationKey) -> CommunicationResult<Duration> {
        Ok(snapshot
            .get_u64(key)?
            .map_or(DEFAULT_LIGHT_MESSAGE_TTL, Duration::from_secs))
    }

    async fn put<M: LightMessage>(&self, message: &M) -> CommunicationResult<BinaryLightToken> {
        message.validate()?;

        let snapshot = self.config.snapshot();
        let channel = self.channel(&snapshot, M::DIRECTION)?;
        let ttl = Self::ttl(&snapshot, M::TTL_KEY)?;

        let token = create_binary_light_token(&channel.issuer, &channel.secret, &channel.algorithm)?;
        let key = cache_key(M::NAMESPACE, token.token().id());
        self.cache.put(&key, message, Some(ttl)).await?;

        tracing::debug!(
            namespace = M::NAMESPACE,
            token_id = %token.token().id(),
            message_id = %message.id(),
            "light message stored"
        );
        Event::builder(EventType::LightTokenIssued)
            .success()
            .issuer(&channel.issuer)
            .subject(token.token().id())
            .detail("message_id", message.id())
            .emit();

        Ok(token)
    }

    async fn get_and_remove<M: LightMessage>(&self, token_base64: &str) -> CommunicationResult<M> {
        let snapshot = self.config.snapshot();
        let channel = self.channel(&snapshot, M::DIRECTION)?;

        let result = self.redeem::<M>(&channel, token_base64).await;
        match &result {
            Ok((token_id, message)) => {
                Event::builder(EventType::LightTokenConsumed)
                    .success()
                    .issuer(&channel.issuer)
                    .subject(token_id)
                    .detail("message_id", message.id())
                    .emit();
            }
            Err(e) => {
                tracing::warn!(namespace = M::NAMESPACE, error = %e, "light token rejected");
                Event::builder(EventType::LightTokenRejected)
                    .failure(e.to_string())
                    .issuer(&channel.issuer)
                    .emit();
            }
        }
        result.map(|(_, message)| message)
    }

    async fn redeem<M: LightMessage>(
        &self,
        channel: &LightTokenChannel,
        token_base64: &str,
    ) -> CommunicationResult<(String, M)> {
        let binary = encoder::decode_base64(token_base64.as_bytes(), &channel.secret, &channel.algorithm)?;
        let token = binary.token();
        if token.issuer() != channel.issuer {
            return Err(CommunicationError::IssuerMismatch {
                expected: channel.issuer.clone(),
                found: token.issuer().to_string(),
            });
        }

        let key = cache_key(M::NAMESPACE, token.id());
        let message: M = self
            .cache
            .get_and_remove(&key)
            .await?
            .ok_or_else(|| CommunicationError::NotFound(token.id().to_string()))?;
        message.validate()?;
        Ok((token.id().to_string(), message))
    }
}

fn cache_key(namespace: &str, token_id: &str) -> String {
    format!("{namespace}/{token_id}")
}
