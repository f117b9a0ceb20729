//! Light token and light message errors.
//!
//! Token messages are stable: callers and tests match on them. None of them
//! carry the secret or the expected digest.

use eidas_cache::CacheError;
use thiserror::Error;

/// Failures raised while minting or redeeming light tokens.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LightTokenError {
    /// Encoded token is larger than the wire limit.
    #[error("Error parsing LightToken, size exceeds {max}")]
    Oversized {
        /// Observed size in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        max: usize,
    },

    /// Token does not have the `issuer|id|createdOn|digest` structure.
    #[error("LightToken parse error")]
    Malformed(String),

    /// Recomputed digest does not match the transported one.
    #[error("LightToken digest failure")]
    DigestMismatch,

    /// Digest algorithm is not available.
    #[error("{0} MessageDigest not available")]
    UnsupportedAlgorithm(String),

    /// A constructor argument violates its precondition.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl LightTokenError {
    /// Returns `true` for failures that indicate a forged or tampered token.
    #[must_use]
    pub const fn is_security_failure(&self) -> bool {
        matches!(
            self,
            Self::Oversized { .. } | Self::Malformed(_) | Self::DigestMismatch
        )
    }
}

/// Result alias for light token operations.
pub type LightTokenResult<T> = Result<T, LightTokenError>;

/// A light request or response that breaks a structural rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LightMessageError {
    /// A mandatory field is blank or absent.
    #[error("{0} is missing")]
    MissingField(&'static str),

    /// A level of assurance is not a valid LoA URI.
    #[error("invalid level of assurance: {0}")]
    InvalidLevelOfAssurance(String),

    /// A request carries no level of assurance.
    #[error("at least one level of assurance is required")]
    NoLevelOfAssurance,

    /// A request carries more than one notified level of assurance.
    #[error("at most one notified level of assurance is allowed")]
    MultipleNotifiedLevels,
}

/// Failures of the Node/Specific exchange.
#[derive(Debug, Error)]
pub enum CommunicationError {
    /// The token could not be minted or authenticated.
    #[error(transparent)]
    Token(#[from] LightTokenError),

    /// The message is structurally invalid.
    #[error("invalid light message: {0}")]
    Message(#[from] LightMessageError),

    /// The cache failed.
    #[error("cache failure: {0}")]
    Cache(#[from] CacheError),

    /// The channel configuration is incomplete.
    #[error("configuration error: {0}")]
    Configuration(#[from] eidas_core::Error),

    /// The token was issued for another channel.
    #[error("light token issuer mismatch: expected {expected}, found {found}")]
    IssuerMismatch {
        /// Issuer configured for the channel.
        expected: String,
        /// Issuer carried by the token.
        found: String,
    },

    /// Nothing is stored under the token id: expired or already redeemed.
    #[error("no light message stored for token {0}")]
    NotFound(String),
}

/// Result alias for Node/Specific exchange operations.
pub type CommunicationResult<T> = Result<T, CommunicationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_stable() {
        assert_eq!(
            LightTokenError::Malformed("missing digest".into()).to_string(),
            "LightToken parse error"
        );
        assert_eq!(
            LightTokenError::DigestMismatch.to_string(),
            "LightToken digest failure"
        );
        assert_eq!(
            LightTokenError::Oversized { size: 2000, max: 1024 }.to_string(),
            "Error parsing LightToken, size exceeds 1024"
        );
        assert_eq!(
            LightTokenError::UnsupportedAlgorithm("invalidAlgorithm".into()).to_string(),
            "invalidAlgorithm MessageDigest not available"
        );
    }

    #[test]
    fn communication_errors_keep_token_messages() {
        let err: CommunicationError = LightTokenError::DigestMismatch.into();
        assert_eq!(err.to_string(), "LightToken digest failure");

        let err: CommunicationError = LightMessageError::MissingField("issuer").into();
        assert_eq!(err.to_string(), "invalid light message: issuer is missing");
    }

    #[test]
    fn security_failures() {
        assert!(LightTokenError::DigestMismatch.is_security_failure());
        assert!(!LightTokenError::InvalidArgument("x".into()).is_security_failure());
        assert!(!LightTokenError::UnsupportedAlgorithm("x".into()).is_security_failure());
    }
}
