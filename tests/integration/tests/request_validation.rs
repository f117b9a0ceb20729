//! AuthnRequest validation from raw XML bytes.

use eidas_protocol::reader::AuthnRequestReader;
use eidas_protocol::validation::{
    check_minimum_data_set, check_representative_attributes, check_request_sanity,
    missing_mandatory_attributes, validate_requested_authn_context,
};
use eidas_protocol::{AttributeRegistry, ImmutableAttributeMap, ValidationError};

fn request_xml(comparison: &str, class_refs: &[&str], attributes: &[&str]) -> String {
    let refs: String = class_refs
        .iter()
        .map(|r| format!("<saml2:AuthnContextClassRef>{r}</saml2:AuthnContextClassRef>"))
        .collect();
    let attrs: String = attributes
        .iter()
        .map(|a| {
            format!(
                r#"<eidas:RequestedAttribute Name="http://eidas.europa.eu/attributes/{a}" isRequired="true"/>"#
            )
        })
        .collect();
    format!(
        r#"<saml2p:AuthnRequest xmlns:saml2p="urn:oasis:names:tc:SAML:2.0:protocol"
            xmlns:saml2="urn:oasis:names:tc:SAML:2.0:assertion"
            xmlns:eidas="http://eidas.europa.eu/saml-extensions"
            ID="_0d1e2f" IssueInstant="2024-03-01T10:15:30Z">
          <saml2:Issuer>https://connector.example.eu/metadata</saml2:Issuer>
          <saml2p:Extensions>
            <eidas:SPType>public</eidas:SPType>
            <eidas:RequestedAttributes>{attrs}</eidas:RequestedAttributes>
          </saml2p:Extensions>
          <saml2p:RequestedAuthnContext Comparison="{comparison}">{refs}</saml2p:RequestedAuthnContext>
        </saml2p:AuthnRequest>"#
    )
}

const NATURAL_MDS: [&str; 4] = [
    "naturalperson/PersonIdentifier",
    "naturalperson/CurrentFamilyName",
    "naturalperson/CurrentGivenName",
    "naturalperson/DateOfBirth",
];

fn requested_map(
    registry: &AttributeRegistry,
    request: &eidas_protocol::AuthnRequest,
) -> anyhow::Result<ImmutableAttributeMap> {
    let entries = request
        .requested_attributes
        .iter()
        .filter_map(|a| registry.get(&a.name))
        .map(|d| (d.clone(), Vec::new()));
    Ok(ImmutableAttributeMap::from_entries(entries)?)
}

#[test]
fn test_valid_request_passes_every_rule() -> anyhow::Result<()> {
    let xml = request_xml(
        "exact",
        &[
            "http://eidas.europa.eu/LoA/substantial",
            "http://eidas.europa.eu/LoA/high",
            "http://service.memberstate.ms/NotNotified/LoA/low",
        ],
        &NATURAL_MDS,
    );
    let request = AuthnRequestReader::default().read(xml.as_bytes())?;
    check_request_sanity(&request)?;
    validate_requested_authn_context(request.requested_authn_context.as_ref())?;

    let registry = AttributeRegistry::eidas()?;
    let map = requested_map(&registry, &request)?;
    assert!(check_representative_attributes(&map));
    assert!(check_minimum_data_set(&map, &registry));
    Ok(())
}

#[test]
fn test_exact_with_only_notified_is_rejected() -> anyhow::Result<()> {
    let xml = request_xml("exact", &["http://eidas.europa.eu/LoA/high"], &NATURAL_MDS);
    let request = AuthnRequestReader::default().read(xml.as_bytes())?;
    assert_eq!(
        validate_requested_authn_context(request.requested_authn_context.as_ref()),
        Err(ValidationError::ExactContainsOnlyNotified)
    );
    Ok(())
}

#[test]
fn test_better_comparison_is_rejected() -> anyhow::Result<()> {
    let xml = request_xml("better", &["http://eidas.europa.eu/LoA/low"], &NATURAL_MDS);
    let request = AuthnRequestReader::default().read(xml.as_bytes())?;
    assert_eq!(
        validate_requested_authn_context(request.requested_authn_context.as_ref()),
        Err(ValidationError::ComparisonNotSupported)
    );
    Ok(())
}

#[test]
fn test_incomplete_minimum_data_set_is_reported() -> anyhow::Result<()> {
    let xml = request_xml(
        "minimum",
        &["http://eidas.europa.eu/LoA/low"],
        &["legalperson/LegalName", "legalperson/LEI"],
    );
    let request = AuthnRequestReader::default().read(xml.as_bytes())?;
    validate_requested_authn_context(request.requested_authn_context.as_ref())?;

    let registry = AttributeRegistry::eidas()?;
    let map = requested_map(&registry, &request)?;
    assert!(!check_minimum_data_set(&map, &registry));
    assert_eq!(missing_mandatory_attributes(&map, &registry), "LegalPersonIdentifier");
    Ok(())
}

#[test]
fn test_representative_request_is_rejected() -> anyhow::Result<()> {
    let mut attributes = NATURAL_MDS.to_vec();
    attributes.push("legalperson/representative/LegalName");
    let xml = request_xml("minimum", &["http://eidas.europa.eu/LoA/low"], &attributes);
    let request = AuthnRequestReader::default().read(xml.as_bytes())?;

    let registry = AttributeRegistry::eidas()?;
    let map = requested_map(&registry, &request)?;
    assert!(!check_representative_attributes(&map));
    Ok(())
}
