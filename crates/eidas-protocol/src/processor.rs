//! Protocol processing boundary.
//!
//! [`ProtocolProcessor`] turns validated domain objects into wire bytes and
//! back. Every direction runs the validators of [`crate::validation`]; the
//! XML mechanics and signatures are delegated to a [`MessageMarshaller`] and
//! a [`ProtocolSigner`] supplied by the caller.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, TimeDelta, Utc};
use eidas_core::event::{Event, EventType};

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::{
    AttributeRegistry, AttributeValue, AuthnRequest, AuthnResponse, EidasAuthenticationRequest,
    EidasAuthenticationResponse, ImmutableAttributeMap, LevelOfAssurance, RequestedAttribute,
    ResponseAttribute, ResponseStatus, SpType,
};
use crate::validation::{
    check_mandatory_attributes, check_minimum_data_set, check_representation_response,
    check_representative_attributes, check_request_sanity, missing_mandatory_attributes,
    validate_requested_authn_context,
};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Signs outgoing messages and verifies incoming ones.
pub trait ProtocolSigner: Send + Sync {
    /// Signs a marshalled message.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Signature`] if the message cannot be signed.
    fn sign(&self, message: &[u8]) -> ProtocolResult<Vec<u8>>;

    /// Verifies a signed message and returns the verified content.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::Signature`] if verification fails.
    fn verify(&self, message: &[u8]) -> ProtocolResult<Vec<u8>>;
}

/// Converts wire-level messages to and from bytes.
pub trait MessageMarshaller: Send + Sync {
    /// Writes a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be written.
    fn request_to_wire(&self, request: &AuthnRequest) -> ProtocolResult<Vec<u8>>;

    /// Reads a request.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a request.
    fn request_from_wire(&self, bytes: &[u8]) -> ProtocolResult<AuthnRequest>;

    /// Writes a response.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be written.
    fn response_to_wire(&self, response: &AuthnResponse) -> ProtocolResult<Vec<u8>>;

    /// Reads a response.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a response.
    fn response_from_wire(&self, bytes: &[u8]) -> ProtocolResult<AuthnResponse>;
}

/// Validating conversion between domain objects and wire bytes.
pub trait ProtocolProcessor: Send + Sync {
    /// Validates a request and produces signed wire bytes.
    ///
    /// # Errors
    ///
    /// Returns the first validation, marshalling or signing failure.
    fn marshall_request(&self, request: &EidasAuthenticationRequest) -> ProtocolResult<Vec<u8>>;

    /// Verifies and reads a request addressed to `citizen_country_code`.
    ///
    /// Replay detection is left to the caller: pass the returned request id
    /// and `citizen_country_code` to `eidas_cache::AntiReplayGate` before
    /// acting on the request.
    ///
    /// # Errors
    ///
    /// Returns the first verification, reading or validation failure.
    fn unmarshall_request(
        &self,
        bytes: &[u8],
        citizen_country_code: &str,
    ) -> ProtocolResult<EidasAuthenticationRequest>;

    /// Validates a response to `request` and produces signed wire bytes.
    ///
    /// # Errors
    ///
    /// Returns the first validation, marshalling or signing failure.
    fn marshall_response(
        &self,
        response: &EidasAuthenticationResponse,
        request: &EidasAuthenticationRequest,
    ) -> ProtocolResult<Vec<u8>>;

    /// Verifies and reads a response.
    ///
    /// # Errors
    ///
    /// Returns the first verification, reading or validation failure.
    fn unmarshall_response(&self, bytes: &[u8]) -> ProtocolResult<EidasAuthenticationResponse>;
}

/// Processor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessorSettings {
    /// Entity id written as issuer of failure responses.
    pub issuer: String,
    /// Tolerated clock difference with the remote party.
    pub clock_skew: TimeDelta,
    /// Maximum age of an incoming message.
    pub max_message_age: TimeDelta,
}

impl ProcessorSettings {
    /// Settings with a one minute skew and a five minute message age.
    #[must_use]
    pub fn new(issuer: impl Into<String>) -> Self {
        Self {
            issuer: issuer.into(),
            clock_skew: TimeDelta::minutes(1),
            max_message_age: TimeDelta::minutes(5),
        }
    }
}

/// eIDAS implementation of [`ProtocolProcessor`].
pub struct EidasProtocolProcessor<M, S, C = SystemClock> {
    marshaller: M,
    signer: S,
    clock: C,
    registry: Arc<AttributeRegistry>,
    settings: ProcessorSettings,
}

impl<M, S, C> EidasProtocolProcessor<M, S, C>
where
    M: MessageMarshaller,
    S: ProtocolSigner,
    C: Clock,
{
    /// Creates a processor from its collaborators.
    pub const fn new(
        marshaller: M,
        signer: S,
        clock: C,
        registry: Arc<AttributeRegistry>,
        settings: ProcessorSettings,
    ) -> Self {
        Self {
            marshaller,
            signer,
            clock,
            registry,
            settings,
        }
    }

    /// Attribute registry used to resolve incoming attributes.
    #[must_use]
    pub fn registry(&self) -> &AttributeRegistry {
        &self.registry
    }

    /// Builds the failure response sent back for `error`.
    ///
    /// Only the generic status codes and public message of the error are
    /// used, so no internal detail reaches the remote party.
    #[must_use]
    pub fn failure_response(
        &self,
        response_id: impl Into<String>,
        request: &EidasAuthenticationRequest,
        error: &ProtocolError,
    ) -> EidasAuthenticationResponse {
        EidasAuthenticationResponse {
            id: response_id.into(),
            in_response_to: request.id.clone(),
            issuer: self.settings.issuer.clone(),
            issue_instant: Some(self.clock.now()),
            status: ResponseStatus::failure(
                error.status_code(),
                error.sub_status_code(),
                error.public_message(),
            ),
            subject: None,
            subject_name_id_format: None,
            level_of_assurance: None,
            attributes: ImmutableAttributeMap::empty(),
        }
    }

    fn check_issue_instant(&self, instant: DateTime<Utc>) -> ProtocolResult<()> {
        let now = self.clock.now();
        if instant > now + self.settings.clock_skew {
            return Err(ProtocolError::InvalidIssueInstant(format!(
                "{instant} is in the future"
            )));
        }
        if instant < now - self.settings.max_message_age - self.settings.clock_skew {
            return Err(ProtocolError::InvalidIssueInstant(format!("{instant} has expired")));
        }
        Ok(())
    }

    fn check_request_attributes(&self, attributes: &ImmutableAttributeMap) -> ProtocolResult<()> {
        if !check_representative_attributes(attributes) {
            return Err(ProtocolError::RepresentativeAttributesRequested);
        }
        if !check_minimum_data_set(attributes, &self.registry) {
            return Err(ProtocolError::IncompleteMinimumDataSet(
                missing_mandatory_attributes(attributes, &self.registry),
            ));
        }
        Ok(())
    }

    fn check_response_attributes(&self, response: &EidasAuthenticationResponse) -> ProtocolResult<()> {
        if response.status.is_failure() {
            return Ok(());
        }
        if !check_mandatory_attributes(&response.attributes) {
            let empty = response
                .attributes
                .iter()
                .filter(|(d, values)| d.is_required() && values.iter().all(AttributeValue::is_empty))
                .map(|(d, _)| d.friendly_name())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ProtocolError::IncompleteMinimumDataSet(empty));
        }
        if !check_representation_response(&response.attributes, &self.registry) {
            return Err(ProtocolError::InconsistentRepresentation);
        }
        Ok(())
    }

    /// Resolves wire attributes through the registry. Unknown names are
    /// dropped.
    fn resolve_attributes<'a, I>(&self, attributes: I) -> ProtocolResult<ImmutableAttributeMap>
    where
        I: IntoIterator<Item = (&'a str, &'a [String])>,
    {
        let mut entries = Vec::new();
        for (name, raw_values) in attributes {
            let Some(definition) = self.registry.get(name) else {
                tracing::info!(attribute = %name, "ignoring unknown attribute");
                continue;
            };
            let values = raw_values
                .iter()
                .map(|raw| definition.marshaller().unmarshal(raw))
                .collect::<ProtocolResult<Vec<_>>>()?;
            entries.push((definition.clone(), values));
        }
        ImmutableAttributeMap::from_entries(entries)
    }

    fn read_request(&self, bytes: &[u8], citizen_country_code: &str) -> ProtocolResult<EidasAuthenticationRequest> {
        let verified = self.signer.verify(bytes)?;
        let wire = self.marshaller.request_from_wire(&verified)?;

        check_request_sanity(&wire)?;
        let issue_instant = wire
            .issue_instant
            .ok_or_else(|| ProtocolError::MissingElement("IssueInstant".to_string()))?;
        self.check_issue_instant(issue_instant)?;

        validate_requested_authn_context(wire.requested_authn_context.as_ref())?;
        let (comparison, levels_of_assurance) = match wire.requested_authn_context {
            Some(context) => (
                context.comparison,
                context
                    .authn_context_class_refs
                    .iter()
                    .map(|uri| LevelOfAssurance::parse(uri))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => (None, Vec::new()),
        };

        let sp_type = match wire.sp_type.as_deref() {
            Some(raw) => Some(
                SpType::parse(raw)
                    .ok_or_else(|| ProtocolError::InvalidMessage(format!("unknown SPType: {raw}")))?,
            ),
            None => None,
        };

        let requested_attributes = self.resolve_attributes(
            wire.requested_attributes
                .iter()
                .map(|a| (a.name.as_str(), a.values.as_slice())),
        )?;
        self.check_request_attributes(&requested_attributes)?;

        Ok(EidasAuthenticationRequest {
            id: wire.id,
            issuer: wire.issuer,
            issue_instant,
            destination: wire.destination,
            provider_name: wire.provider_name,
            assertion_consumer_service_url: wire.assertion_consumer_service_url,
            citizen_country_code: citizen_country_code.to_string(),
            sp_type,
            name_id_format: wire.name_id_format,
            comparison,
            levels_of_assurance,
            requested_attributes,
        })
    }

    fn read_response(&self, bytes: &[u8]) -> ProtocolResult<EidasAuthenticationResponse> {
        let verified = self.signer.verify(bytes)?;
        let wire = self.marshaller.response_from_wire(&verified)?;

        if wire.id.trim().is_empty() {
            return Err(ProtocolError::MissingElement("ID".to_string()));
        }
        if wire.in_response_to.trim().is_empty() {
            return Err(ProtocolError::MissingElement("InResponseTo".to_string()));
        }
        self.check_issue_instant(wire.issue_instant)?;

        let attributes = self.resolve_attributes(
            wire.attributes
                .iter()
                .map(|a| (a.name.as_str(), a.values.as_slice())),
        )?;

        let response = EidasAuthenticationResponse {
            id: wire.id,
            in_response_to: wire.in_response_to,
            issuer: wire.issuer,
            issue_instant: Some(wire.issue_instant),
            status: wire.status,
            subject: wire.subject,
            subject_name_id_format: wire.subject_name_id_format,
            level_of_assurance: wire.level_of_assurance,
            attributes,
        };
        self.check_response_attributes(&response)?;
        Ok(response)
    }
}

fn marshal_attributes(map: &ImmutableAttributeMap) -> ProtocolResult<BTreeMap<String, Vec<String>>> {
    map.iter()
        .map(|(definition, values)| {
            let raw = values
                .iter()
                .map(|v| definition.marshaller().marshal(v))
                .collect::<ProtocolResult<Vec<_>>>()?;
            Ok((definition.name_uri().to_string(), raw))
        })
        .collect()
}

impl<M, S, C> ProtocolProcessor for EidasProtocolProcessor<M, S, C>
where
    M: MessageMarshaller,
    S: ProtocolSigner,
    C: Clock,
{
    fn marshall_request(&self, request: &EidasAuthenticationRequest) -> ProtocolResult<Vec<u8>> {
        validate_requested_authn_context(Some(&request.requested_authn_context()))?;
        self.check_request_attributes(&request.requested_attributes)?;

        let requested_attributes = marshal_attributes(&request.requested_attributes)?
            .into_iter()
            .map(|(name, values)| {
                let is_required = self.registry.get(&name).is_some_and(|d| d.is_required());
                RequestedAttribute {
                    name,
                    is_required,
                    values,
                }
            })
            .collect();

        let wire = AuthnRequest {
            id: request.id.clone(),
            issuer: request.issuer.clone(),
            issue_instant: Some(request.issue_instant),
            destination: request.destination.clone(),
            provider_name: request.provider_name.clone(),
            assertion_consumer_service_url: request.assertion_consumer_service_url.clone(),
            sp_type: request.sp_type.map(|t| t.as_str().to_string()),
            name_id_format: request.name_id_format.clone(),
            requested_authn_context: Some(request.requested_authn_context()),
            requested_attributes,
        };

        let bytes = self.marshaller.request_to_wire(&wire)?;
        self.signer.sign(&bytes)
    }

    fn unmarshall_request(
        &self,
        bytes: &[u8],
        citizen_country_code: &str,
    ) -> ProtocolResult<EidasAuthenticationRequest> {
        match self.read_request(bytes, citizen_country_code) {
            Ok(request) => {
                Event::builder(EventType::RequestAccepted)
                    .success()
                    .issuer(&request.issuer)
                    .subject(&request.id)
                    .detail("country", citizen_country_code)
                    .emit();
                Ok(request)
            }
            Err(e) => {
                Event::builder(EventType::RequestRejected)
                    .failure(e.to_string())
                    .detail("country", citizen_country_code)
                    .detail("status", e.status_code())
                    .emit();
                Err(e)
            }
        }
    }

    fn marshall_response(
        &self,
        response: &EidasAuthenticationResponse,
        request: &EidasAuthenticationRequest,
    ) -> ProtocolResult<Vec<u8>> {
        if response.in_response_to != request.id {
            return Err(ProtocolError::UnrelatedResponse(request.id.clone()));
        }
        self.check_response_attributes(response)?;

        let attributes = marshal_attributes(&response.attributes)?
            .into_iter()
            .map(|(name, values)| ResponseAttribute { name, values })
            .collect();

        let wire = AuthnResponse {
            id: response.id.clone(),
            in_response_to: response.in_response_to.clone(),
            issuer: response.issuer.clone(),
            issue_instant: response.issue_instant.unwrap_or_else(|| self.clock.now()),
            status: response.status.clone(),
            subject: response.subject.clone(),
            subject_name_id_format: response.subject_name_id_format.clone(),
            level_of_assurance: response.level_of_assurance.clone(),
            attributes,
        };

        let bytes = self.marshaller.response_to_wire(&wire)?;
        self.signer.sign(&bytes)
    }

    fn unmarshall_response(&self, bytes: &[u8]) -> ProtocolResult<EidasAuthenticationResponse> {
        self.read_response(bytes).inspect_err(|e| {
            Event::builder(EventType::ResponseRejected)
                .failure(e.to_string())
                .detail("status", e.status_code())
                .emit();
        })
    }
}
