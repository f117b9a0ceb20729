//! Replay rejection across concurrent callers.

use std::sync::Arc;
use std::time::Duration;

use eidas_cache::{AntiReplayGate, InMemoryCache};
use eidas_protocol::reader::AuthnRequestReader;
use tokio::task::JoinSet;

use crate::common::init_tracing;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_replay_admits_one() -> anyhow::Result<()> {
    init_tracing();
    let gate = AntiReplayGate::new(Arc::new(InMemoryCache::new()), Duration::from_secs(300));

    let mut tasks = JoinSet::new();
    for _ in 0..32 {
        let gate = gate.clone();
        tasks.spawn(async move { gate.check_not_present_in_cache("_a1b2c3", "BE").await });
    }

    let mut admitted = 0;
    while let Some(result) = tasks.join_next().await {
        if result? {
            admitted += 1;
        }
    }
    assert_eq!(admitted, 1);
    Ok(())
}

#[tokio::test]
async fn test_same_id_from_other_country_is_distinct() -> anyhow::Result<()> {
    init_tracing();
    let gate = AntiReplayGate::new(Arc::new(InMemoryCache::new()), Duration::from_secs(300));

    assert!(gate.check_not_present_in_cache("_a1b2c3", "BE").await);
    assert!(gate.check_not_present_in_cache("_a1b2c3", "ES").await);
    assert!(!gate.check_not_present_in_cache("_a1b2c3", "BE").await);
    Ok(())
}

#[tokio::test]
async fn test_replayed_request_bytes_are_rejected() -> anyhow::Result<()> {
    init_tracing();
    let gate = AntiReplayGate::new(Arc::new(InMemoryCache::new()), Duration::from_secs(300));
    let xml = r#"<saml2p:AuthnRequest xmlns:saml2p="urn:oasis:names:tc:SAML:2.0:protocol"
        xmlns:saml2="urn:oasis:names:tc:SAML:2.0:assertion" ID="_9f8e7d">
      <saml2:Issuer>https://connector.example.eu/metadata</saml2:Issuer>
    </saml2p:AuthnRequest>"#;

    let reader = AuthnRequestReader::default();
    let first = reader.read(xml.as_bytes())?;
    assert!(gate.check_not_present_in_cache(&first.id, "BE").await);

    let replayed = reader.read(xml.as_bytes())?;
    assert_eq!(replayed.id, "_9f8e7d");
    assert!(!gate.check_not_present_in_cache(&replayed.id, "BE").await);
    Ok(())
}
