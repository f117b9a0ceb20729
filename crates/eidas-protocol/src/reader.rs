//! Minimal eIDAS `AuthnRequest` reader.
//!
//! Extracts the fields the validators need from SAML XML. Signatures,
//! encryption and schema validation are left to the XML layer in front of
//! this reader.

use chrono::{DateTime, Utc};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::{AuthnContextComparison, AuthnRequest, RequestedAttribute, RequestedAuthnContext};

/// Default size cap for an incoming request (128 KiB).
pub const DEFAULT_MAX_REQUEST_SIZE: usize = 128 * 1024;

/// Element whose text content is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextTarget {
    None,
    Issuer,
    SpType,
    ClassRef,
    AttributeValue,
}

/// Reads [`AuthnRequest`] values from XML bytes.
#[derive(Debug, Clone, Copy)]
pub struct AuthnRequestReader {
    max_size: usize,
}

impl Default for AuthnRequestReader {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_REQUEST_SIZE)
    }
}

impl AuthnRequestReader {
    /// Creates a reader accepting documents of at most `max_size` bytes.
    #[must_use]
    pub const fn new(max_size: usize) -> Self {
        Self { max_size }
    }

    /// Size cap in bytes.
    #[must_use]
    pub const fn max_size(&self) -> usize {
        self.max_size
    }

    /// Parses an `AuthnRequest` document.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::MessageTooLarge`] if the input exceeds the cap
    /// - [`ProtocolError::XmlParse`] if the input is not well-formed XML
    /// - [`ProtocolError::MissingElement`] if there is no `AuthnRequest` root
    ///   or it has no `ID`
    /// - [`ProtocolError::InvalidMessage`] if `IssueInstant` is not a
    ///   timestamp
    pub fn read(&self, bytes: &[u8]) -> ProtocolResult<AuthnRequest> {
        if bytes.len() > self.max_size {
            return Err(ProtocolError::MessageTooLarge {
                size: bytes.len(),
                max: self.max_size,
            });
        }
        let xml = std::str::from_utf8(bytes)
            .map_err(|e| ProtocolError::XmlParse(format!("request is not UTF-8: {e}")))?;

        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut request = AuthnRequest::default();
        let mut found_root = false;
        let mut target = TextTarget::None;
        let mut current_attribute: Option<RequestedAttribute> = None;

        loop {
            match reader.read_event()? {
                Event::Start(e) => {
                    target = read_start(&e, &mut request, &mut found_root, &mut current_attribute)?;
                }
                Event::Empty(e) => {
                    read_start(&e, &mut request, &mut found_root, &mut current_attribute)?;
                    if e.local_name().as_ref() == b"RequestedAttribute" {
                        request.requested_attributes.extend(current_attribute.take());
                    }
                }
                Event::Text(e) => {
                    let text = e.unescape()?.trim().to_string();
                    match target {
                        TextTarget::Issuer => request.issuer = text,
                        TextTarget::SpType => request.sp_type = Some(text),
                        TextTarget::ClassRef => {
                            request
                                .requested_authn_context
                                .get_or_insert_with(RequestedAuthnContext::default)
                                .authn_context_class_refs
                                .push(text);
                        }
                        TextTarget::AttributeValue => {
                            if let Some(attribute) = current_attribute.as_mut() {
                                attribute.values.push(text);
                            }
                        }
                        TextTarget::None => {}
                    }
                }
                Event::End(e) => {
                    if e.local_name().as_ref() == b"RequestedAttribute" {
                        request.requested_attributes.extend(current_attribute.take());
                    }
                    target = TextTarget::None;
                }
                Event::Eof => break,
                _ => {}
            }
        }

        if !found_root {
            return Err(ProtocolError::MissingElement("AuthnRequest".to_string()));
        }
        if request.id.is_empty() {
            return Err(ProtocolError::MissingElement("ID".to_string()));
        }

        tracing::debug!(
            id = %request.id,
            issuer = %request.issuer,
            attributes = request.requested_attributes.len(),
            "read AuthnRequest"
        );
        Ok(request)
    }
}

fn read_start(
    e: &BytesStart<'_>,
    request: &mut AuthnRequest,
    found_root: &mut bool,
    current_attribute: &mut Option<RequestedAttribute>,
) -> ProtocolResult<TextTarget> {
    let target = match e.local_name().as_ref() {
        b"AuthnRequest" => {
            *found_root = true;
            for attr in e.attributes() {
                let attr = attr?;
                let value = attr.unescape_value()?.to_string();
                match attr.key.local_name().as_ref() {
                    b"ID" => request.id = value,
                    b"IssueInstant" => request.issue_instant = Some(parse_instant(&value)?),
                    b"Destination" => request.destination = Some(value),
                    b"ProviderName" => request.provider_name = Some(value),
                    b"AssertionConsumerServiceURL" => {
                        request.assertion_consumer_service_url = Some(value);
                    }
                    _ => {}
                }
            }
            TextTarget::None
        }
        b"Issuer" => TextTarget::Issuer,
        b"SPType" => TextTarget::SpType,
        b"NameIDPolicy" => {
            request.name_id_format = attribute_value(e, b"Format")?;
            TextTarget::None
        }
        b"RequestedAuthnContext" => {
            let comparison = attribute_value(e, b"Comparison")?
                .map(|value| AuthnContextComparison::parse(&value));
            request
                .requested_authn_context
                .get_or_insert_with(RequestedAuthnContext::default)
                .comparison = comparison;
            TextTarget::None
        }
        b"AuthnContextClassRef" => TextTarget::ClassRef,
        b"RequestedAttribute" => {
            let name = attribute_value(e, b"Name")?.unwrap_or_default();
            let is_required = attribute_value(e, b"isRequired")?.is_some_and(|v| v == "true");
            *current_attribute = Some(RequestedAttribute {
                name,
                is_required,
                values: Vec::new(),
            });
            TextTarget::None
        }
        b"AttributeValue" => TextTarget::AttributeValue,
        _ => TextTarget::None,
    };
    Ok(target)
}

fn attribute_value(e: &BytesStart<'_>, key: &[u8]) -> ProtocolResult<Option<String>> {
    for attr in e.attributes() {
        let attr = attr?;
        if attr.key.local_name().as_ref() == key {
            return Ok(Some(attr.unescape_value()?.to_string()));
        }
    }
    Ok(None)
}

fn parse_instant(value: &str) -> ProtocolResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|instant| instant.with_timezone(&Utc))
        .map_err(|e| ProtocolError::InvalidMessage(format!("invalid IssueInstant '{value}': {e}")))
}
