//! Light response returned by a Specific module to the Node.

use std::collections::BTreeMap;

use eidas_protocol::ResponseStatus;
use serde::{Deserialize, Serialize};

use crate::error::LightMessageError;
use crate::request::require;

/// Authentication response exchanged between a Specific module and the
/// Node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightResponse {
    id: String,
    issuer: String,
    in_response_to_id: String,
    status: ResponseStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    subject_name_id_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    level_of_assurance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relay_state: Option<String>,
    #[serde(default)]
    attributes: BTreeMap<String, Vec<String>>,
}

impl LightResponse {
    /// Successful response for `subject`.
    ///
    /// # Errors
    ///
    /// Fails when any argument is blank.
    pub fn success(
        id: impl Into<String>,
        issuer: impl Into<String>,
        in_response_to_id: impl Into<String>,
        subject: impl Into<String>,
        subject_name_id_format: impl Into<String>,
    ) -> Result<Self, LightMessageError> {
        let response = Self {
            subject: Some(subject.into()),
            subject_name_id_format: Some(subject_name_id_format.into()),
            ..Self::bare(id, issuer, in_response_to_id, ResponseStatus::success())
        };
        response.validate()?;
        Ok(response)
    }

    /// Failed response carrying `status`.
    ///
    /// # Errors
    ///
    /// Fails when `id`, `issuer` or `in_response_to_id` is blank.
    pub fn failure(
        id: impl Into<String>,
        issuer: impl Into<String>,
        in_response_to_id: impl Into<String>,
        status: ResponseStatus,
    ) -> Result<Self, LightMessageError> {
        let response = Self::bare(id, issuer, in_response_to_id, status);
        response.validate()?;
        Ok(response)
    }

    fn bare(
        id: impl Into<String>,
        issuer: impl Into<String>,
        in_response_to_id: impl Into<String>,
        status: ResponseStatus,
    ) -> Self {
        Self {
            id: id.into(),
            issuer: issuer.into(),
            in_response_to_id: in_response_to_id.into(),
            status,
            subject: None,
            subject_name_id_format: None,
            level_of_assurance: None,
            ip_address: None,
            relay_state: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Re-checks the structural rules, e.g. after deserialization.
    ///
    /// # Errors
    ///
    /// Fails when `id`, `issuer` or `in_response_to_id` is blank, or, for a
    /// successful response, when the subject or its format is blank.
    pub fn validate(&self) -> Result<(), LightMessageError> {
        require("id", &self.id)?;
        require("issuer", &self.issuer)?;
        require("inResponseToId", &self.in_response_to_id)?;
        require("status", &self.status.status_code)?;

        if !self.status.is_failure() {
            require("subject", self.subject.as_deref().unwrap_or_default())?;
            require(
                "subjectNameIdFormat",
                self.subject_name_id_format.as_deref().unwrap_or_default(),
            )?;
        }
        Ok(())
    }

    /// Sets the achieved level of assurance.
    #[must_use]
    pub fn with_level_of_assurance(mut self, level: impl Into<String>) -> Self {
        self.level_of_assurance = Some(level.into());
        self
    }

    /// Sets the citizen's IP address.
    #[must_use]
    pub fn with_ip_address(mut self, address: impl Into<String>) -> Self {
        self.ip_address = Some(address.into());
        self
    }

    /// Sets the relay state.
    #[must_use]
    pub fn with_relay_state(mut self, relay_state: impl Into<String>) -> Self {
        self.relay_state = Some(relay_state.into());
        self
    }

    /// Adds an attribute by name URI.
    #[must_use]
    pub fn with_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Response id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Issuer of the response.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Id of the light request being answered.
    #[must_use]
    pub fn in_response_to_id(&self) -> &str {
        &self.in_response_to_id
    }

    /// Status.
    #[must_use]
    pub const fn status(&self) -> &ResponseStatus {
        &self.status
    }

    /// Subject identifier.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.subject.as_deref()
    }

    /// Subject identifier format.
    #[must_use]
    pub fn subject_name_id_format(&self) -> Option<&str> {
        self.subject_name_id_format.as_deref()
    }

    /// Achieved level of assurance.
    #[must_use]
    pub fn level_of_assurance(&self) -> Option<&str> {
        self.level_of_assurance.as_deref()
    }

    /// Citizen's IP address.
    #[must_use]
    pub fn ip_address(&self) -> Option<&str> {
        self.ip_address.as_deref()
    }

    /// Relay state.
    #[must_use]
    pub fn relay_state(&self) -> Option<&str> {
        self.relay_state.as_deref()
    }

    /// Attributes by name URI.
    #[must_use]
    pub const fn attributes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eidas_protocol::error::status_codes;

    const PERSISTENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent";

    #[test]
    fn success_requires_subject() {
        let response = LightResponse::success("_r1", "specificProxyService", "_q1", "CA/CA/12345", PERSISTENT)
            .unwrap()
            .with_level_of_assurance("http://eidas.europa.eu/LoA/high")
            .with_attribute(
                "http://eidas.europa.eu/attributes/naturalperson/CurrentFamilyName",
                ["Garcia"],
            );
        assert!(!response.status().is_failure());
        assert_eq!(response.attributes().len(), 1);

        assert_eq!(
            LightResponse::success("_r1", "specificProxyService", "_q1", "", PERSISTENT),
            Err(LightMessageError::MissingField("subject"))
        );
        assert_eq!(
            LightResponse::success("_r1", "specificProxyService", "_q1", "CA/CA/12345", " "),
            Err(LightMessageError::MissingField("subjectNameIdFormat"))
        );
    }

    #[test]
    fn failure_needs_no_subject() {
        let status = ResponseStatus::failure(
            status_codes::RESPONDER,
            Some(status_codes::AUTHN_FAILED),
            "Authentication failed",
        );
        let response = LightResponse::failure("_r1", "specificProxyService", "_q1", status).unwrap();
        assert!(response.status().is_failure());
        assert_eq!(response.subject(), None);
    }

    #[test]
    fn rejects_missing_correlation() {
        assert_eq!(
            LightResponse::failure("_r1", "issuer", "", ResponseStatus::success()),
            Err(LightMessageError::MissingField("inResponseToId"))
        );
    }

    #[test]
    fn deserialized_response_is_revalidated() {
        let json = serde_json::json!({
            "id": "_r1",
            "issuer": "specificProxyService",
            "inResponseToId": "_q1",
            "status": { "status_code": status_codes::SUCCESS },
        });
        let response: LightResponse = serde_json::from_value(json).unwrap();
        assert_eq!(response.validate(), Err(LightMessageError::MissingField("subject")));
    }
}
