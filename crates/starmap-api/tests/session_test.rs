#![allow(clippy::unwrap_used)]
// Integration tests for `StarmapSession` using wiremock.

use std::time::Duration;

use serde_json::{Value, json};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use starmap_api::{ApiVersion, Error, StarmapSession, Transport, TransportConfig};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_retries(retries: u32) -> TransportConfig {
    TransportConfig {
        retries,
        backoff_factor: 0.0,
        timeout: Duration::from_secs(5),
        ..TransportConfig::default()
    }
}

async fn setup(version: ApiVersion, retries: u32) -> (MockServer, StarmapSession) {
    let server = MockServer::start().await;
    let session = StarmapSession::new(&server.uri(), version, &fast_retries(retries)).unwrap();
    (server, session)
}

// ── Request shape ───────────────────────────────────────────────────

#[tokio::test]
async fn test_get_sends_accept_header_and_params() {
    let (server, session) = setup(ApiVersion::V1, 0).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .and(header("accept", "application/json"))
        .and(query_param("image", "product-test-1.0-1.raw.xz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "product-test"})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = session
        .get("/query", &[("image", "product-test-1.0-1.raw.xz".to_owned())])
        .await
        .unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.json::<Value>().unwrap(),
        json!({"name": "product-test"})
    );
}

#[tokio::test]
async fn test_v2_prefix_and_post_body() {
    let (server, session) = setup(ApiVersion::V2, 0).await;

    Mock::given(method("POST"))
        .and(path("/api/v2/policy"))
        .and(body_json(json!({"name": "foo"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": "1"})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = session.post("policy/", &json!({"name": "foo"})).await.unwrap();
    assert_eq!(resp.status(), 201);
}

#[tokio::test]
async fn test_put_request() {
    let (server, session) = setup(ApiVersion::V1, 0).await;

    Mock::given(method("PUT"))
        .and(path("/api/v1/mapping"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let resp = session.put("/mapping", &json!({"id": "x"})).await.unwrap();
    assert!(resp.is_success());
}

// ── Status handling ─────────────────────────────────────────────────

#[tokio::test]
async fn test_not_found_is_returned_not_raised() {
    let (server, session) = setup(ApiVersion::V1, 0).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/policy/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({})))
        .mount(&server)
        .await;

    let resp = session.get("/policy/missing", &[]).await.unwrap();
    assert!(resp.is_not_found());

    let err = resp.raise_for_status().unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_client_error_is_not_retried() {
    let (server, session) = setup(ApiVersion::V1, 3).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad request"))
        .expect(1)
        .mount(&server)
        .await;

    let resp = session.get("/query", &[]).await.unwrap();
    let result = resp.raise_for_status();
    assert!(
        matches!(result, Err(Error::Http { status: 400, .. })),
        "expected Http 400 error, got: {result:?}"
    );
}

// ── Retries ─────────────────────────────────────────────────────────

#[tokio::test]
async fn test_server_errors_are_retried_until_success() {
    let (server, session) = setup(ApiVersion::V1, 3).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let resp = session.get("/query", &[]).await.unwrap();
    assert_eq!(resp.status(), 200);
}

#[tokio::test]
async fn test_retries_exhausted_returns_last_response() {
    let (server, session) = setup(ApiVersion::V1, 2).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .respond_with(ResponseTemplate::new(502))
        .expect(3)
        .mount(&server)
        .await;

    let resp = session.get("/query", &[]).await.unwrap();
    assert_eq!(resp.status(), 502);
    assert!(resp.raise_for_status().unwrap_err().is_transient());
}

// ── Decoding ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalid_json_body() {
    let (server, session) = setup(ApiVersion::V1, 0).await;

    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let resp = session.get("/query", &[]).await.unwrap();
    let result = resp.json::<Value>();
    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
