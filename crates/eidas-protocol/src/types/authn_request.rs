//! Authentication request types.
//!
//! [`AuthnRequest`] is the wire-level view read from or written to SAML.
//! [`EidasAuthenticationRequest`] is the validated domain object handed to
//! the rest of the Node.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::attribute_map::ImmutableAttributeMap;
use crate::types::authn_context::{AuthnContextComparison, RequestedAuthnContext};
use crate::types::loa::LevelOfAssurance;

/// Service provider sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpType {
    /// Public sector service provider.
    Public,
    /// Private sector service provider.
    Private,
}

impl SpType {
    /// Parses the `SPType` extension value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "public" => Some(Self::Public),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    /// Returns the extension value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Private => "private",
        }
    }
}

/// A `RequestedAttribute` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestedAttribute {
    /// Attribute name URI.
    pub name: String,

    /// `isRequired` flag.
    #[serde(default)]
    pub is_required: bool,

    /// Requested values, usually empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,
}

/// Wire-level eIDAS AuthnRequest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthnRequest {
    /// `ID` attribute.
    pub id: String,

    /// `Issuer` element.
    pub issuer: String,

    /// `IssueInstant` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_instant: Option<DateTime<Utc>>,

    /// `Destination` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,

    /// `ProviderName` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider_name: Option<String>,

    /// `AssertionConsumerServiceURL` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assertion_consumer_service_url: Option<String>,

    /// Raw `SPType` extension value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sp_type: Option<String>,

    /// `NameIDPolicy` `Format` attribute.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_id_format: Option<String>,

    /// `RequestedAuthnContext` element.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requested_authn_context: Option<RequestedAuthnContext>,

    /// `RequestedAttributes` extension.
    #[serde(default)]
    pub requested_attributes: Vec<RequestedAttribute>,
}

/// Validated eIDAS authentication request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EidasAuthenticationRequest {
    /// Request id.
    pub id: String,
    /// Service provider entity id.
    pub issuer: String,
    /// Issue instant.
    pub issue_instant: DateTime<Utc>,
    /// Endpoint the request was sent to.
    pub destination: Option<String>,
    /// Display name of the service provider.
    pub provider_name: Option<String>,
    /// Return URL.
    pub assertion_consumer_service_url: Option<String>,
    /// Country of the citizen being authenticated.
    pub citizen_country_code: String,
    /// Sector of the service provider.
    pub sp_type: Option<SpType>,
    /// Requested name identifier format.
    pub name_id_format: Option<String>,
    /// LoA comparison.
    pub comparison: Option<AuthnContextComparison>,
    /// Requested levels of assurance, in request order.
    pub levels_of_assurance: Vec<LevelOfAssurance>,
    /// Requested attributes.
    pub requested_attributes: ImmutableAttributeMap,
}

impl EidasAuthenticationRequest {
    /// The requested authentication context in wire form.
    #[must_use]
    pub fn requested_authn_context(&self) -> RequestedAuthnContext {
        RequestedAuthnContext::new(
            self.comparison.clone(),
            self.levels_of_assurance.iter().map(LevelOfAssurance::as_str),
        )
    }
}
