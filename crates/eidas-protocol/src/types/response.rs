//! Authentication response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::status_codes;
use crate::types::attribute_map::ImmutableAttributeMap;

/// Status of a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseStatus {
    /// Top-level status code URI.
    pub status_code: String,

    /// Second-level status code URI.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_status_code: Option<String>,

    /// Status message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_message: Option<String>,
}

impl ResponseStatus {
    /// Success status.
    #[must_use]
    pub fn success() -> Self {
        Self {
            status_code: status_codes::SUCCESS.to_string(),
            sub_status_code: None,
            status_message: None,
        }
    }

    /// Failure status with a generic message.
    #[must_use]
    pub fn failure(
        status_code: &str,
        sub_status_code: Option<&str>,
        status_message: impl Into<String>,
    ) -> Self {
        Self {
            status_code: status_code.to_string(),
            sub_status_code: sub_status_code.map(str::to_string),
            status_message: Some(status_message.into()),
        }
    }

    /// Returns `true` unless the status code is `Success`.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.status_code != status_codes::SUCCESS
    }
}

/// One attribute of a wire-level response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseAttribute {
    /// Attribute name URI.
    pub name: String,
    /// Values in wire form.
    #[serde(default)]
    pub values: Vec<String>,
}

/// Wire-level eIDAS Response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthnResponse {
    /// `ID` attribute.
    pub id: String,
    /// `InResponseTo` attribute.
    pub in_response_to: String,
    /// `Issuer` element.
    pub issuer: String,
    /// `IssueInstant` attribute.
    pub issue_instant: DateTime<Utc>,
    /// `Status` element.
    pub status: ResponseStatus,
    /// Subject `NameID` value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
    /// Subject `NameID` format.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_name_id_format: Option<String>,
    /// `AuthnContextClassRef` of the assertion.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level_of_assurance: Option<String>,
    /// Assertion attributes.
    #[serde(default)]
    pub attributes: Vec<ResponseAttribute>,
}

/// Validated eIDAS authentication response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EidasAuthenticationResponse {
    /// Response id.
    pub id: String,
    /// Id of the request being answered.
    pub in_response_to: String,
    /// Issuing node.
    pub issuer: String,
    /// Issue instant; set by the processor when marshalling.
    pub issue_instant: Option<DateTime<Utc>>,
    /// Status.
    pub status: ResponseStatus,
    /// Subject identifier.
    pub subject: Option<String>,
    /// Subject identifier format.
    pub subject_name_id_format: Option<String>,
    /// Achieved level of assurance.
    pub level_of_assurance: Option<String>,
    /// Returned attributes.
    pub attributes: ImmutableAttributeMap,
}
