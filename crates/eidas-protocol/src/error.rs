//! Protocol error types.
//!
//! [`ValidationError`] carries the fixed rule messages used in logs and
//! tests. [`ProtocolError`] is what the processing boundary returns; it maps
//! to a generic SAML status code and a generic public message so that
//! internal details never reach the remote party.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Rule violations of a `RequestedAuthnContext`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// No requested authentication context.
    #[error("{}", Self::NO_CONTEXT)]
    NoContext,

    /// The same LoA URI appears more than once.
    #[error("{}", Self::DUPLICATES)]
    Duplicates,

    /// Comparison requires at least one LoA but none was given.
    #[error("{}", Self::NO_LOA_FOUND)]
    NoLoaFound,

    /// Comparison `minimum` with more than one notified LoA.
    #[error("{}", Self::MINIMUM_MORE_THAN_ONE)]
    MinimumMoreThanOne,

    /// Comparison `minimum` with a non-notified LoA.
    #[error("{}", Self::MINIMUM_CONTAINS_NON_NOTIFIED)]
    MinimumContainsNonNotified,

    /// Comparison `exact` with notified LoA only.
    #[error("{}", Self::EXACT_CONTAINS_ONLY_NOTIFIED)]
    ExactContainsOnlyNotified,

    /// Comparison `exact` with a notified LoA but without every stronger one.
    #[error("{}", Self::EXACT_NOTIFIED_MISSING_HIGHER_LEVELS)]
    ExactNotifiedMissingHigherLevels,

    /// Comparison `better`, `maximum` or an unknown value.
    #[error("{}", Self::COMPARISON_NOT_SUPPORTED)]
    ComparisonNotSupported,

    /// A value that is not a usable LoA URI.
    #[error("{msg}: {0}", msg = Self::INVALID_LEVEL_OF_ASSURANCE)]
    InvalidLevelOfAssurance(String),
}

impl ValidationError {
    /// Message for [`ValidationError::NoContext`].
    pub const NO_CONTEXT: &'static str = "RequestedAuthnContext is missing";
    /// Message for [`ValidationError::Duplicates`].
    pub const DUPLICATES: &'static str = "RequestedAuthnContext contains duplicate LoA values";
    /// Message for [`ValidationError::NoLoaFound`].
    pub const NO_LOA_FOUND: &'static str = "RequestedAuthnContext contains no LoA value";
    /// Message for [`ValidationError::MinimumMoreThanOne`].
    pub const MINIMUM_MORE_THAN_ONE: &'static str =
        "comparison minimum allows a single notified LoA only";
    /// Message for [`ValidationError::MinimumContainsNonNotified`].
    pub const MINIMUM_CONTAINS_NON_NOTIFIED: &'static str =
        "comparison minimum does not allow non-notified LoA";
    /// Message for [`ValidationError::ExactContainsOnlyNotified`].
    pub const EXACT_CONTAINS_ONLY_NOTIFIED: &'static str =
        "comparison exact with notified LoA only is not allowed, use minimum";
    /// Message for [`ValidationError::ExactNotifiedMissingHigherLevels`].
    pub const EXACT_NOTIFIED_MISSING_HIGHER_LEVELS: &'static str =
        "comparison exact with a notified LoA must also list every higher notified LoA";
    /// Message for [`ValidationError::ComparisonNotSupported`].
    pub const COMPARISON_NOT_SUPPORTED: &'static str = "comparison type is not supported";
    /// Message for [`ValidationError::InvalidLevelOfAssurance`].
    pub const INVALID_LEVEL_OF_ASSURANCE: &'static str = "invalid LoA value";

    /// Returns the fixed message of this rule, without any offending value.
    #[must_use]
    pub const fn message(&self) -> &'static str {
        match self {
            Self::NoContext => Self::NO_CONTEXT,
            Self::Duplicates => Self::DUPLICATES,
            Self::NoLoaFound => Self::NO_LOA_FOUND,
            Self::MinimumMoreThanOne => Self::MINIMUM_MORE_THAN_ONE,
            Self::MinimumContainsNonNotified => Self::MINIMUM_CONTAINS_NON_NOTIFIED,
            Self::ExactContainsOnlyNotified => Self::EXACT_CONTAINS_ONLY_NOTIFIED,
            Self::ExactNotifiedMissingHigherLevels => Self::EXACT_NOTIFIED_MISSING_HIGHER_LEVELS,
            Self::ComparisonNotSupported => Self::COMPARISON_NOT_SUPPORTED,
            Self::InvalidLevelOfAssurance(_) => Self::INVALID_LEVEL_OF_ASSURANCE,
        }
    }
}

/// SAML top-level status codes used in error responses.
pub mod status_codes {
    /// Request succeeded.
    pub const SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";
    /// Error on the requester side.
    pub const REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";
    /// Error on the responder side.
    pub const RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";
    /// Second-level: request not supported.
    pub const REQUEST_UNSUPPORTED: &str = "urn:oasis:names:tc:SAML:2.0:status:RequestUnsupported";
    /// Second-level: authentication failed.
    pub const AUTHN_FAILED: &str = "urn:oasis:names:tc:SAML:2.0:status:AuthnFailed";
}

/// Failures at the protocol processing boundary.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Requested authentication context broke a rule.
    #[error("invalid requested authentication context: {0}")]
    Validation(#[from] ValidationError),

    /// Required element or attribute absent.
    #[error("missing required element: {0}")]
    MissingElement(String),

    /// Message structure is invalid.
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    /// XML could not be read.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Message exceeds the accepted size.
    #[error("message of {size} bytes exceeds the limit of {max} bytes")]
    MessageTooLarge {
        /// Observed size in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        max: usize,
    },

    /// Attribute definition or value is invalid.
    #[error("invalid attribute: {0}")]
    InvalidAttribute(String),

    /// Representative attributes may not be requested.
    #[error("representative attributes must not be requested")]
    RepresentativeAttributesRequested,

    /// Attribute set misses part of a minimum data set.
    #[error("incomplete minimum data set: {0}")]
    IncompleteMinimumDataSet(String),

    /// Representation rules broken in a response.
    #[error("inconsistent representation attributes")]
    InconsistentRepresentation,

    /// Issue instant outside the accepted window.
    #[error("message issue instant outside accepted window: {0}")]
    InvalidIssueInstant(String),

    /// Response does not answer the expected request.
    #[error("response is not related to request {0}")]
    UnrelatedResponse(String),

    /// Signature could not be produced or verified.
    #[error("signature error: {0}")]
    Signature(String),

    /// Internal failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ProtocolError {
    /// Returns the SAML top-level status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> &'static str {
        match self {
            Self::Signature(_) | Self::Internal(_) => status_codes::RESPONDER,
            _ => status_codes::REQUESTER,
        }
    }

    /// Returns the second-level SAML status code, if any.
    #[must_use]
    pub const fn sub_status_code(&self) -> Option<&'static str> {
        match self {
            Self::Validation(ValidationError::ComparisonNotSupported)
            | Self::RepresentativeAttributesRequested => Some(status_codes::REQUEST_UNSUPPORTED),
            Self::IncompleteMinimumDataSet(_) | Self::InconsistentRepresentation => {
                Some(status_codes::AUTHN_FAILED)
            }
            _ => None,
        }
    }

    /// Returns the message that may be sent to the remote party.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Signature(_) | Self::Internal(_) => "The request could not be processed",
            _ => "Invalid request",
        }
    }
}

impl From<quick_xml::Error> for ProtocolError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for ProtocolError {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Self::XmlParse(err.to_string())
    }
}
