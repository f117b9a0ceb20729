//! Structural checks on an incoming request, run before any rule that needs
//! the registry or the clock.

use url::Url;

use crate::error::{ProtocolError, ProtocolResult};
use crate::types::AuthnRequest;

/// Checks that the request id and issuer are present and well formed.
///
/// The id must be an `xsd:ID`: it may not start with a digit, `-` or `.`,
/// and may not contain whitespace or `:`. The issuer must be an absolute
/// URI.
///
/// # Errors
///
/// Returns [`ProtocolError::MissingElement`] for a blank id or issuer and
/// [`ProtocolError::InvalidMessage`] for a malformed one.
pub fn check_request_sanity(request: &AuthnRequest) -> ProtocolResult<()> {
    if request.id.trim().is_empty() {
        return Err(ProtocolError::MissingElement("ID".to_string()));
    }
    if !is_xsd_id(&request.id) {
        return Err(ProtocolError::InvalidMessage(format!(
            "request ID is not a valid xsd:ID: {}",
            request.id
        )));
    }

    if request.issuer.trim().is_empty() {
        return Err(ProtocolError::MissingElement("Issuer".to_string()));
    }
    if Url::parse(&request.issuer).is_err() {
        return Err(ProtocolError::InvalidMessage(format!(
            "request Issuer is not an absolute URI: {}",
            request.issuer
        )));
    }

    Ok(())
}

fn is_xsd_id(value: &str) -> bool {
    let mut chars = value.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}
