//! Error handling for the eIDAS Node.
//!
//! Error messages are meant for logs and tests. Anything shown to a remote
//! party goes through the protocol layer's generic status codes instead.

use thiserror::Error;

use crate::config::ConfigurationKey;

/// Result type alias using the core error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for core operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A required configuration key has no value.
    #[error("missing configuration value: {0}")]
    MissingConfiguration(ConfigurationKey),

    /// A configuration value could not be interpreted.
    #[error("invalid configuration value for {key}: {reason}")]
    InvalidConfiguration {
        /// The offending key.
        key: ConfigurationKey,
        /// Why the value was rejected.
        reason: String,
    },

    /// Unknown configuration key.
    #[error("unknown configuration key: {0}")]
    UnknownKey(String),

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Returns whether this error stems from deployment configuration.
    #[must_use]
    pub const fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Self::MissingConfiguration(_) | Self::InvalidConfiguration { .. } | Self::UnknownKey(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_names_the_key() {
        let error = Error::MissingConfiguration(ConfigurationKey::ConnectorRequestSecret);
        assert_eq!(
            error.to_string(),
            "missing configuration value: lightToken.connector.request.secret"
        );
        assert!(error.is_configuration_error());
    }

    #[test]
    fn internal_error_is_generic() {
        let error = Error::Internal;
        assert_eq!(error.to_string(), "internal error");
        assert!(!error.is_configuration_error());
    }
}
