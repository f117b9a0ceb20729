//! Light request: the Node's simplified view of an authentication request,
//! handed to the Specific module through the cache.

use std::collections::BTreeMap;

use eidas_protocol::{LevelOfAssurance, LevelOfAssuranceType};
use serde::{Deserialize, Serialize};

use crate::error::LightMessageError;

/// Authentication request exchanged between the Node and a Specific module.
///
/// Built through [`LightRequest::new`], which enforces the structural rules;
/// optional fields are set with the `with_*` methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightRequest {
    id: String,
    issuer: String,
    citizen_country_code: String,
    levels_of_assurance: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name_id_format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    provider_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sp_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sp_country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    requester_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    relay_state: Option<String>,
    #[serde(default)]
    requested_attributes: BTreeMap<String, Vec<String>>,
}

impl LightRequest {
    /// Creates a request.
    ///
    /// # Errors
    ///
    /// Fails when `id`, `issuer` or `citizen_country_code` is blank, when no
    /// level of assurance is given, when a level is not a LoA URI, or when
    /// more than one notified level is given.
    pub fn new<I, S>(
        id: impl Into<String>,
        issuer: impl Into<String>,
        citizen_country_code: impl Into<String>,
        levels_of_assurance: I,
    ) -> Result<Self, LightMessageError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let request = Self {
            id: id.into(),
            issuer: issuer.into(),
            citizen_country_code: citizen_country_code.into(),
            levels_of_assurance: levels_of_assurance.into_iter().map(Into::into).collect(),
            name_id_format: None,
            provider_name: None,
            sp_type: None,
            sp_country_code: None,
            requester_id: None,
            relay_state: None,
            requested_attributes: BTreeMap::new(),
        };
        request.validate()?;
        Ok(request)
    }

    /// Re-checks the structural rules, e.g. after deserialization.
    ///
    /// # Errors
    ///
    /// See [`LightRequest::new`].
    pub fn validate(&self) -> Result<(), LightMessageError> {
        require("id", &self.id)?;
        require("issuer", &self.issuer)?;
        require("citizenCountryCode", &self.citizen_country_code)?;

        if self.levels_of_assurance.is_empty() {
            return Err(LightMessageError::NoLevelOfAssurance);
        }
        let notified = self
            .levels()?
            .iter()
            .filter(|level| level.loa_type() == LevelOfAssuranceType::Notified)
            .count();
        if notified > 1 {
            return Err(LightMessageError::MultipleNotifiedLevels);
        }
        Ok(())
    }

    /// Sets the requested name identifier format.
    #[must_use]
    pub fn with_name_id_format(mut self, format: impl Into<String>) -> Self {
        self.name_id_format = Some(format.into());
        self
    }

    /// Sets the display name of the service provider.
    #[must_use]
    pub fn with_provider_name(mut self, name: impl Into<String>) -> Self {
        self.provider_name = Some(name.into());
        self
    }

    /// Sets the service provider sector.
    #[must_use]
    pub fn with_sp_type(mut self, sp_type: impl Into<String>) -> Self {
        self.sp_type = Some(sp_type.into());
        self
    }

    /// Sets the country of the service provider.
    #[must_use]
    pub fn with_sp_country_code(mut self, code: impl Into<String>) -> Self {
        self.sp_country_code = Some(code.into());
        self
    }

    /// Sets the id of the requesting service provider.
    #[must_use]
    pub fn with_requester_id(mut self, id: impl Into<String>) -> Self {
        self.requester_id = Some(id.into());
        self
    }

    /// Sets the relay state.
    #[must_use]
    pub fn with_relay_state(mut self, relay_state: impl Into<String>) -> Self {
        self.relay_state = Some(relay_state.into());
        self
    }

    /// Adds a requested attribute by name URI.
    #[must_use]
    pub fn with_requested_attribute<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.requested_attributes
            .insert(name.into(), values.into_iter().map(Into::into).collect());
        self
    }

    /// Request id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Issuer of the request.
    #[must_use]
    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Country of the citizen.
    #[must_use]
    pub fn citizen_country_code(&self) -> &str {
        &self.citizen_country_code
    }

    /// Level of assurance URIs, in request order.
    #[must_use]
    pub fn levels_of_assurance(&self) -> &[String] {
        &self.levels_of_assurance
    }

    /// Classified levels of assurance.
    ///
    /// # Errors
    ///
    /// Returns [`LightMessageError::InvalidLevelOfAssurance`] for a value
    /// that is not a LoA URI.
    pub fn levels(&self) -> Result<Vec<LevelOfAssurance>, LightMessageError> {
        self.levels_of_assurance
            .iter()
            .map(|uri| {
                LevelOfAssurance::parse(uri)
                    .map_err(|_| LightMessageError::InvalidLevelOfAssurance(uri.clone()))
            })
            .collect()
    }

    /// Requested name identifier format.
    #[must_use]
    pub fn name_id_format(&self) -> Option<&str> {
        self.name_id_format.as_deref()
    }

    /// Display name of the service provider.
    #[must_use]
    pub fn provider_name(&self) -> Option<&str> {
        self.provider_name.as_deref()
    }

    /// Service provider sector.
    #[must_use]
    pub fn sp_type(&self) -> Option<&str> {
        self.sp_type.as_deref()
    }

    /// Country of the service provider.
    #[must_use]
    pub fn sp_country_code(&self) -> Option<&str> {
        self.sp_country_code.as_deref()
    }

    /// Id of the requesting service provider.
    #[must_use]
    pub fn requester_id(&self) -> Option<&str> {
        self.requester_id.as_deref()
    }

    /// Relay state.
    #[must_use]
    pub fn relay_state(&self) -> Option<&str> {
        self.relay_state.as_deref()
    }

    /// Requested attributes by name URI.
    #[must_use]
    pub const fn requested_attributes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.requested_attributes
    }
}

pub(crate) fn require(field: &'static str, value: &str) -> Result<(), LightMessageError> {
    if value.trim().is_empty() {
        return Err(LightMessageError::MissingField(field));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUBSTANTIAL: &str = "http://eidas.europa.eu/LoA/substantial";
    const HIGH: &str = "http://eidas.europa.eu/LoA/high";
    const NON_NOTIFIED: &str = "http://service.memberstate.ms/NotNotified/LoA/low";

    #[test]
    fn builds_with_optional_fields() {
        let request = LightRequest::new("f5e7e0f5", "specificConnector", "CA", [SUBSTANTIAL, NON_NOTIFIED])
            .unwrap()
            .with_sp_type("public")
            .with_relay_state("MyRelayState")
            .with_requested_attribute(
                "http://eidas.europa.eu/attributes/naturalperson/CurrentFamilyName",
                Vec::<String>::new(),
            );

        assert_eq!(request.citizen_country_code(), "CA");
        assert_eq!(request.sp_type(), Some("public"));
        assert_eq!(request.relay_state(), Some("MyRelayState"));
        assert_eq!(request.requested_attributes().len(), 1);
        assert_eq!(request.levels().unwrap().len(), 2);
    }

    #[test]
    fn rejects_blank_mandatory_fields() {
        assert_eq!(
            LightRequest::new(" ", "issuer", "CA", [HIGH]),
            Err(LightMessageError::MissingField("id"))
        );
        assert_eq!(
            LightRequest::new("id", "", "CA", [HIGH]),
            Err(LightMessageError::MissingField("issuer"))
        );
        assert_eq!(
            LightRequest::new("id", "issuer", "", [HIGH]),
            Err(LightMessageError::MissingField("citizenCountryCode"))
        );
    }

    #[test]
    fn enforces_level_of_assurance_rules() {
        assert_eq!(
            LightRequest::new("id", "issuer", "CA", Vec::<String>::new()),
            Err(LightMessageError::NoLevelOfAssurance)
        );
        assert_eq!(
            LightRequest::new("id", "issuer", "CA", [SUBSTANTIAL, HIGH]),
            Err(LightMessageError::MultipleNotifiedLevels)
        );
        assert_eq!(
            LightRequest::new("id", "issuer", "CA", ["http://eidas.europa.eu/LoA/medium"]),
            Err(LightMessageError::InvalidLevelOfAssurance(
                "http://eidas.europa.eu/LoA/medium".to_string()
            ))
        );
    }

    #[test]
    fn json_form_is_camel_case() {
        let request = LightRequest::new("id", "issuer", "CA", [HIGH]).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["citizenCountryCode"], "CA");
        assert_eq!(json["levelsOfAssurance"][0], HIGH);
        assert!(json.get("relayState").is_none());

        let back: LightRequest = serde_json::from_value(json).unwrap();
        assert_eq!(back, request);
    }
}
