//! Node/Specific light message exchange.

use eidas_core::NodeSide;
use eidas_light::helper::{encode_binary_light_token_base64, get_binary_light_token_id};
use eidas_light::{CommunicationError, LightRequest, LightResponse, LightTokenError};

use crate::common::{Deployment, snapshot};

const HIGH: &str = "http://eidas.europa.eu/LoA/high";
const PERSISTENT: &str = "urn:oasis:names:tc:SAML:2.0:nameid-format:persistent";

fn light_request() -> anyhow::Result<LightRequest> {
    Ok(LightRequest::new("_c7f4b2", "specificConnector", "ES", [HIGH])?
        .with_sp_type("public")
        .with_relay_state("relay-42")
        .with_requested_attribute(
            "http://eidas.europa.eu/attributes/naturalperson/PersonIdentifier",
            Vec::<String>::new(),
        ))
}

#[tokio::test]
async fn test_connector_round_trip() -> anyhow::Result<()> {
    let deployment = Deployment::new(NodeSide::Connector);
    let request = light_request()?;

    let token = deployment.specific.put_request(&request).await?;
    let transported = encode_binary_light_token_base64(&token);
    assert_eq!(deployment.cache.len(), 1);

    let received = deployment.node.get_and_remove_request(&transported).await?;
    assert_eq!(received, request);
    assert!(deployment.cache.is_empty());

    let response = LightResponse::success("_r91", "connectorNode", received.id(), "ES/BE/99", PERSISTENT)?
        .with_level_of_assurance(HIGH)
        .with_relay_state("relay-42");
    let token = deployment.node.put_response(&response).await?;
    let transported = encode_binary_light_token_base64(&token);

    let delivered = deployment.specific.get_and_remove_response(&transported).await?;
    assert_eq!(delivered.in_response_to_id(), "_c7f4b2");
    assert_eq!(delivered.relay_state(), Some("relay-42"));
    Ok(())
}

#[tokio::test]
async fn test_token_is_single_use() -> anyhow::Result<()> {
    let deployment = Deployment::new(NodeSide::ProxyService);
    let token = deployment.node.put_request(&light_request()?).await?;
    let transported = encode_binary_light_token_base64(&token);

    deployment.specific.get_and_remove_request(&transported).await?;
    let second = deployment.specific.get_and_remove_request(&transported).await;
    assert!(matches!(second, Err(CommunicationError::NotFound(_))));
    Ok(())
}

#[tokio::test]
async fn test_token_id_is_readable_by_channel_holder() -> anyhow::Result<()> {
    let deployment = Deployment::new(NodeSide::Connector);
    let token = deployment.specific.put_request(&light_request()?).await?;
    let transported = encode_binary_light_token_base64(&token);

    let id = get_binary_light_token_id(&transported, "connector-request-v1", "SHA-256")?;
    assert_eq!(id, token.token().id());

    assert_eq!(
        get_binary_light_token_id(&transported, "guessed-secret", "SHA-256"),
        Err(LightTokenError::DigestMismatch)
    );
    Ok(())
}

#[tokio::test]
async fn test_reload_rotates_channel_secret() -> anyhow::Result<()> {
    let deployment = Deployment::new(NodeSide::Connector);
    let token = deployment.specific.put_request(&light_request()?).await?;
    let transported = encode_binary_light_token_base64(&token);

    let version = deployment.config.reload(snapshot("v2"));
    assert_eq!(version, 2);

    let result = deployment.node.get_and_remove_request(&transported).await;
    assert!(matches!(
        result,
        Err(CommunicationError::Token(LightTokenError::DigestMismatch))
    ));

    let token = deployment.specific.put_request(&light_request()?).await?;
    let transported = encode_binary_light_token_base64(&token);
    deployment.node.get_and_remove_request(&transported).await?;
    Ok(())
}

#[tokio::test]
async fn test_tampered_token_is_rejected() -> anyhow::Result<()> {
    let deployment = Deployment::new(NodeSide::Connector);
    let token = deployment.specific.put_request(&light_request()?).await?;

    let mut bytes = token.token_bytes();
    let digest_start = bytes
        .iter()
        .rposition(|b| *b == b'|')
        .map(|i| i + 1)
        .ok_or_else(|| anyhow::anyhow!("no digest segment"))?;
    bytes[digest_start] = if bytes[digest_start] == b'A' { b'B' } else { b'A' };
    let tampered = eidas_light::encoder::decode(&bytes, "connector-request-v1", "SHA-256");
    assert_eq!(tampered, Err(LightTokenError::DigestMismatch));
    Ok(())
}
