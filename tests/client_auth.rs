//! Integration tests for the authenticated request path: bearer attachment,
//! transparent refresh-on-401, the one-retry bound, and the unauthenticated
//! signal.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use macrolog::api::{ApiClient, ApiRequest};
use macrolog::auth::{MemoryTokenStore, TokenKind, TokenStore};

/// Store wrapper that counts writes, for asserting the client leaves the
/// store untouched on non-401 paths.
struct CountingStore {
    inner: MemoryTokenStore,
    writes: AtomicUsize,
}

impl CountingStore {
    fn new(access: Option<&str>, refresh: Option<&str>) -> Self {
        Self {
            inner: MemoryTokenStore::with_tokens(access, refresh),
            writes: AtomicUsize::new(0),
        }
    }

    fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl TokenStore for CountingStore {
    fn get(&self, kind: TokenKind) -> anyhow::Result<Option<String>> {
        self.inner.get(kind)
    }

    fn set(&self, kind: TokenKind, value: &str) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.set(kind, value)
    }

    fn delete(&self, kind: TokenKind) -> anyhow::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(kind)
    }
}

/// Client over the given store whose unauthenticated callback increments a
/// counter.
fn client_with_counter(
    base_url: &str,
    store: Arc<dyn TokenStore>,
) -> (ApiClient, Arc<AtomicUsize>) {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let client = ApiClient::new(base_url, store, move || {
        counter.fetch_add(1, Ordering::SeqCst);
    })
    .unwrap();
    (client, calls)
}

#[tokio::test]
async fn non_401_response_passes_through_with_no_store_writes() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .and(header("authorization", "Bearer tok-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(CountingStore::new(Some("tok-1"), Some("ref-1")));
    let (client, callbacks) = client_with_counter(&server.uri(), store.clone());

    let response = client
        .send(ApiRequest::get("/api/entries/today/"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(store.write_count(), 0);
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn non_auth_errors_pass_through_untouched() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("tok"), Some("ref")));
    let (client, callbacks) = client_with_counter(&server.uri(), store);

    let response = client
        .send(ApiRequest::get("/api/entries/today/"))
        .await
        .unwrap();

    // 500 is the caller's problem; no refresh, no callback
    assert_eq!(response.status(), 500);
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn refresh_and_retry_scenario() {
    let server = MockServer::start().await;

    // Stale token gets 401
    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .and(header("authorization", "Bearer old"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // Refresh exchanges r1 for a new access token
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .and(body_json(json!({ "refresh": "r1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(1)
        .mount(&server)
        .await;

    // Retried request with the rotated token succeeds
    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .and(header("authorization", "Bearer new"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": 1 })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("old"), Some("r1")));
    let (client, callbacks) = client_with_counter(&server.uri(), store.clone());

    let response = client
        .send(ApiRequest::get("/api/entries/today/"))
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["id"], 1);

    // Only the access token rotated
    assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("new"));
    assert_eq!(store.get(TokenKind::Refresh).unwrap().as_deref(), Some("r1"));
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_refresh_token_fires_callback_and_returns_original_401() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    // No refresh call may be made
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "x" })))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("tok"), None));
    let (client, callbacks) = client_with_counter(&server.uri(), store);

    let response = client
        .send(ApiRequest::get("/api/entries/today/"))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    assert_eq!(callbacks.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn failed_refresh_fires_callback_and_leaves_store_unchanged() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "detail": "Token is invalid or expired"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("old"), Some("dead")));
    let (client, callbacks) = client_with_counter(&server.uri(), store.clone());

    let response = client
        .send(ApiRequest::get("/api/entries/today/"))
        .await
        .unwrap();

    // The ORIGINAL 401 comes back, not the refresh endpoint's response
    assert_eq!(response.status(), 401);
    assert_eq!(callbacks.load(Ordering::SeqCst), 1);
    assert_eq!(store.get(TokenKind::Access).unwrap().as_deref(), Some("old"));
}

#[tokio::test]
async fn second_401_after_refresh_is_surfaced_without_another_refresh() {
    let server = MockServer::start().await;

    // 401 no matter which token is presented
    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .respond_with(ResponseTemplate::new(401))
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access": "new" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("old"), Some("r1")));
    let (client, callbacks) = client_with_counter(&server.uri(), store);

    let response = client
        .send(ApiRequest::get("/api/entries/today/"))
        .await
        .unwrap();

    // Retry bound is one: the post-refresh 401 is the caller's to handle
    assert_eq!(response.status(), 401);
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn concurrent_401s_share_one_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    // Slow refresh so every caller observes the 401 before the first
    // refresh completes
    Mock::given(method("POST"))
        .and(path("/api/token/refresh/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "access": "fresh" }))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("stale"), Some("r1")));
    let (client, callbacks) = client_with_counter(&server.uri(), store);

    let tasks: Vec<_> = (0..5)
        .map(|_| {
            let client = client.clone();
            tokio::spawn(async move { client.send(ApiRequest::get("/api/entries/today/")).await })
        })
        .collect();

    for task in tasks {
        let response = task.await.unwrap().unwrap();
        assert_eq!(response.status(), 200);
    }

    let refresh_calls = server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .filter(|r| r.url.path() == "/api/token/refresh/")
        .count();
    assert_eq!(refresh_calls, 1);
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn transport_failure_propagates_without_callback() {
    // Bind to port 0 to find a free port, then drop the listener so
    // nothing answers there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let dead_uri = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("tok"), Some("ref")));
    let (client, callbacks) = client_with_counter(&dead_uri, store);

    let result = client.send(ApiRequest::get("/api/entries/today/")).await;

    assert!(result.is_err());
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_access_token_does_not_short_circuit() {
    let server = MockServer::start().await;

    // Public endpoint answers without authorization
    Mock::given(method("GET"))
        .and(path("/api/health/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::new());
    let (client, callbacks) = client_with_counter(&server.uri(), store);

    let response = client.send(ApiRequest::get("/api/health/")).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(callbacks.load(Ordering::SeqCst), 0);

    // And no authorization header went out
    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn caller_headers_survive_and_content_type_defaults_to_json() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/entries/today/"))
        .and(header("content-type", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/entries/"))
        .and(header("content-type", "text/csv"))
        .and(header("x-client-tag", "export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryTokenStore::with_tokens(Some("tok"), None));
    let (client, _) = client_with_counter(&server.uri(), store);

    // Default content-type
    let response = client
        .send(ApiRequest::get("/api/entries/today/"))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    // Caller overrides win and extra headers survive
    let request = ApiRequest::get("/api/entries/")
        .header(
            reqwest::header::CONTENT_TYPE,
            reqwest::header::HeaderValue::from_static("text/csv"),
        )
        .header(
            reqwest::header::HeaderName::from_static("x-client-tag"),
            reqwest::header::HeaderValue::from_static("export"),
        );
    let response = client.send(request).await.unwrap();
    assert_eq!(response.status(), 200);
}
