//! HttpKeyFetcher against a mock JWKS endpoint.
use std::time::Duration;

use serde_json::json;
use url::Url;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use super::test_helpers::*;
use crate::services::auth::{HttpKeyFetcher, error::KeyCacheError, jwks::KeyFetcher};

const JWKS_PATH: &str = "/auth/v1/.well-known/jwks.json";

async fn fetcher_for(server: &MockServer, timeout: Duration) -> HttpKeyFetcher {
    let url = Url::parse(&format!("{}{}", server.uri(), JWKS_PATH)).unwrap();
    HttpKeyFetcher::new(url, timeout).unwrap()
}

#[tokio::test]
async fn parses_published_key_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [
                {
                    "kid": KID_A,
                    "kty": "EC",
                    "alg": "ES256",
                    "use": "sig",
                    "crv": "P-256",
                    "x": jwk_a().x,
                    "y": jwk_a().y,
                    "key_ops": ["verify"],
                    "ext": true
                },
                {
                    "kid": KID_ED,
                    "kty": "OKP",
                    "crv": "Ed25519",
                    "x": jwk_ed().x
                }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = fetcher_for(&server, Duration::from_secs(5)).await;
    let set = fetcher.fetch().await.unwrap();

    assert_eq!(set.keys.len(), 2);
    assert_eq!(set.keys[0], jwk_a());
    assert_eq!(set.keys[1].kty, "OKP");
    assert_eq!(set.keys[1].alg, None);
    assert!(fetcher.url().as_str().ends_with(JWKS_PATH));
}

#[tokio::test]
async fn non_success_status_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = fetcher_for(&server, Duration::from_secs(5))
        .await
        .fetch()
        .await
        .unwrap_err();

    assert!(matches!(err, KeyCacheError::FetchFailed(ref m) if m.contains("500")));
}

#[tokio::test]
async fn invalid_document_is_a_fetch_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let err = fetcher_for(&server, Duration::from_secs(5))
        .await
        .fetch()
        .await
        .unwrap_err();

    assert!(matches!(err, KeyCacheError::FetchFailed(_)));
}

#[tokio::test]
async fn slow_endpoint_hits_client_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(JWKS_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"keys": []}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = fetcher_for(&server, Duration::from_millis(100))
        .await
        .fetch()
        .await
        .unwrap_err();

    assert!(matches!(err, KeyCacheError::FetchFailed(_)));
}
