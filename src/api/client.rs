//! API client for the remote nutrition-tracking service.
//!
//! This module provides the `ApiClient` struct. Every protected call goes
//! through `send`, which attaches the bearer token from the credential
//! store, transparently refreshes it on a 401, and retries the original
//! request exactly once.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::auth::{TokenKind, TokenStore};
use crate::models::{
    DailySummary, DaySummary, FoodEntry, FoodSearchResult, LogFoodResponse, LoggedFood, NewEntry,
    SearchResponse,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default base URL when no override is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// HTTP request timeout in seconds.
/// 30s allows for slow food-database lookups while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Token-obtain (login) endpoint path.
const TOKEN_OBTAIN_PATH: &str = "/api/token/";

/// Token-refresh endpoint path.
const TOKEN_REFRESH_PATH: &str = "/api/token/refresh/";

#[derive(Debug, Deserialize)]
struct TokenPairResponse {
    access: String,
    refresh: String,
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access: String,
}

// ============================================================================
// Request descriptor
// ============================================================================

/// Descriptor for one outbound request.
///
/// Built per call by the typed endpoint methods (or by callers needing a
/// raw response). The client merges in authentication and a JSON
/// content-type default without dropping anything set here.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    method: Method,
    path: String,
    query: Vec<(String, String)>,
    headers: HeaderMap,
    body: Option<serde_json::Value>,
}

impl ApiRequest {
    fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }
}

// ============================================================================
// Client
// ============================================================================

/// API client for the nutrition service.
/// Clone is cheap - the HTTP client, token store, and callback are Arc-backed.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    store: Arc<dyn TokenStore>,
    on_unauthenticated: Arc<dyn Fn() + Send + Sync>,
    refresh_gate: Arc<Mutex<()>>,
}

impl ApiClient {
    /// Create a new API client.
    ///
    /// `on_unauthenticated` fires when a 401 cannot be recovered by a token
    /// refresh; the caller decides what "back to login" means. The client
    /// itself holds no reference to any view code.
    pub fn new(
        base_url: impl Into<String>,
        store: Arc<dyn TokenStore>,
        on_unauthenticated: impl Fn() + Send + Sync + 'static,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            store,
            on_unauthenticated: Arc::new(on_unauthenticated),
            refresh_gate: Arc::new(Mutex::new(())),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Whether an access token is currently stored.
    pub fn has_session(&self) -> bool {
        self.read_token(TokenKind::Access).is_some()
    }

    // =========================================================================
    // Core request path
    // =========================================================================

    /// Send a request with transparent token refresh.
    ///
    /// The access token is re-read from the store on every call - never
    /// cached on the client - so a rotation by a concurrent caller is picked
    /// up immediately. A missing token does not short-circuit; the request
    /// is sent without authorization and the server decides.
    ///
    /// On a 401, the refresh token is exchanged for a new access token
    /// (persisted to the store) and the original request retried exactly
    /// once; the retried response is returned whatever its status. When no
    /// refresh token exists or the refresh fails, the unauthenticated
    /// callback fires once and the ORIGINAL 401 response is returned, so
    /// callers in that branch always see one response shape. Transport
    /// errors on the primary request propagate unmodified.
    pub async fn send(&self, request: ApiRequest) -> Result<Response> {
        let access = self.read_token(TokenKind::Access);

        let response = self.execute(&request, access.as_deref()).await?;

        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %request.path, "Request returned 401, attempting token refresh");

        let retry_token = match self.refresh_access_token(access.as_deref()).await {
            Some(token) => token,
            None => {
                (self.on_unauthenticated)();
                return Ok(response);
            }
        };

        // A second 401 here is surfaced as-is: the retry bound is one
        self.execute(&request, Some(&retry_token)).await
    }

    /// Build and issue a single attempt of the request with the given token.
    async fn execute(&self, request: &ApiRequest, access: Option<&str>) -> Result<Response> {
        let url = format!("{}{}", self.base_url, request.path);

        let mut builder = self
            .client
            .request(request.method.clone(), &url)
            .headers(Self::request_headers(&request.headers, access)?);

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        builder
            .send()
            .await
            .with_context(|| format!("Failed to send {} request to {}", request.method, url))
    }

    /// Merge caller headers with authorization and the JSON content-type
    /// default. Caller-supplied headers always win.
    fn request_headers(caller: &HeaderMap, access: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        if let Some(token) = access {
            headers.insert(
                header::AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {}", token))?,
            );
        }
        for (name, value) in caller.iter() {
            headers.insert(name, value.clone());
        }
        Ok(headers)
    }

    /// Exchange the refresh token for a new access token, single-flight.
    ///
    /// Concurrent 401s all funnel through one refresh: the first caller
    /// through the gate performs the exchange and persists the new access
    /// token; waiters see the rotated token when they re-read the store
    /// after acquiring, and skip straight to their retry. Returns the token
    /// to retry with, or None when refresh is unavailable or failed (the
    /// caller then surfaces its original 401).
    async fn refresh_access_token(&self, stale_access: Option<&str>) -> Option<String> {
        let _guard = self.refresh_gate.lock().await;

        // Another caller may have refreshed while we waited on the gate
        if let Some(current) = self.read_token(TokenKind::Access) {
            if Some(current.as_str()) != stale_access {
                debug!("Access token already rotated by a concurrent refresh");
                return Some(current);
            }
        }

        let refresh = self.read_token(TokenKind::Refresh)?;

        let url = format!("{}{}", self.base_url, TOKEN_REFRESH_PATH);
        let response = match self
            .client
            .post(&url)
            .json(&json!({ "refresh": refresh }))
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                return None;
            }
        };

        if !response.status().is_success() {
            warn!(status = %response.status(), "Token refresh rejected");
            return None;
        }

        let refreshed: RefreshResponse = match response.json().await {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Failed to parse token refresh response");
                return None;
            }
        };

        // Only the access token rotates; the refresh token stays put
        if let Err(e) = self.store.set(TokenKind::Access, &refreshed.access) {
            warn!(error = %e, "Failed to persist refreshed access token");
        }

        Some(refreshed.access)
    }

    /// Read a token from the store, treating store errors as absent.
    fn read_token(&self, kind: TokenKind) -> Option<String> {
        match self.store.get(kind) {
            Ok(token) => token,
            Err(e) => {
                warn!(error = %e, kind = kind.key(), "Failed to read token from store");
                None
            }
        }
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: Response) -> Result<Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request and parse the JSON body of a successful response.
    async fn fetch_json<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T> {
        let path = request.path.clone();
        let response = self.send(request).await?;
        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", path))
    }

    // =========================================================================
    // Authentication
    // =========================================================================

    /// Log in with username and password, storing both tokens on success.
    /// Goes straight to the token endpoint - this is the one request that
    /// cannot be recovered by a refresh.
    pub async fn login(&self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}{}", self.base_url, TOKEN_OBTAIN_PATH);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Failed to send login request")?;

        let response = Self::check_response(response).await?;

        let tokens: TokenPairResponse = response
            .json()
            .await
            .context("Failed to parse login response")?;

        self.store.set(TokenKind::Access, &tokens.access)?;
        self.store.set(TokenKind::Refresh, &tokens.refresh)?;
        Ok(())
    }

    /// Register a new account. Returns without tokens; callers log in after.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let url = format!("{}/api/register_user/", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "username": username, "password": password }))
            .send()
            .await
            .context("Failed to send registration request")?;

        Self::check_response(response).await?;
        Ok(())
    }

    /// Log out by deleting both stored credentials.
    pub fn logout(&self) -> Result<()> {
        self.store.delete(TokenKind::Access)?;
        self.store.delete(TokenKind::Refresh)?;
        Ok(())
    }

    // =========================================================================
    // Data methods
    // =========================================================================

    /// Fetch today's food entries.
    pub async fn today_entries(&self) -> Result<Vec<FoodEntry>> {
        self.fetch_json(ApiRequest::get("/api/entries/today/")).await
    }

    /// Fetch entries for a specific date.
    pub async fn entries_for(&self, date: NaiveDate) -> Result<Vec<FoodEntry>> {
        let request =
            ApiRequest::get("/api/entries/by-date/").query("date", date.format("%Y-%m-%d"));
        self.fetch_json(request).await
    }

    /// Fetch every entry the user has logged, newest first.
    pub async fn all_entries(&self) -> Result<Vec<FoodEntry>> {
        self.fetch_json(ApiRequest::get("/api/entries/")).await
    }

    /// Create an entry; the server resolves the food by name and computes
    /// the macro snapshot for the amount.
    pub async fn create_entry(&self, entry: &NewEntry) -> Result<FoodEntry> {
        let request = ApiRequest::post("/api/entries/").json(serde_json::to_value(entry)?);
        self.fetch_json(request).await
    }

    /// Delete an entry by id.
    pub async fn delete_entry(&self, id: i64) -> Result<()> {
        let response = self
            .send(ApiRequest::delete(format!("/api/entries/{}/", id)))
            .await?;
        Self::check_response(response).await?;
        Ok(())
    }

    /// Log foods from a natural-language description ("2 eggs and toast").
    /// The server parses the text, logs one entry per recognized food for
    /// today, and returns what it recorded.
    pub async fn log_food(&self, query: &str) -> Result<Vec<LoggedFood>> {
        let request = ApiRequest::post("/api/log-food/").json(json!({ "query": query }));
        let response: LogFoodResponse = self.fetch_json(request).await?;
        Ok(response.entries)
    }

    /// Fetch aggregated macros for a day (today when `date` is None).
    pub async fn day_summary(&self, date: Option<NaiveDate>) -> Result<DaySummary> {
        let mut request = ApiRequest::get("/api/entries/today-summary/");
        if let Some(date) = date {
            request = request.query("date", date.format("%Y-%m-%d"));
        }
        self.fetch_json(request).await
    }

    /// Fetch per-day totals across the whole logging history, newest first.
    pub async fn daily_summaries(&self) -> Result<Vec<DailySummary>> {
        self.fetch_json(ApiRequest::get("/api/entries/daily-summaries/"))
            .await
    }

    /// Search the food database by free-text query.
    pub async fn search_foods(&self, query: &str) -> Result<Vec<FoodSearchResult>> {
        let request = ApiRequest::get("/api/food-items/search/").query("q", query);
        let response: SearchResponse = self.fetch_json(request).await?;
        Ok(response.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_headers_defaults_to_json() {
        let headers = ApiClient::request_headers(&HeaderMap::new(), None).unwrap();
        assert_eq!(
            headers.get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
        assert!(headers.get(header::AUTHORIZATION).is_none());
    }

    #[test]
    fn test_request_headers_attaches_bearer() {
        let headers = ApiClient::request_headers(&HeaderMap::new(), Some("tok-123")).unwrap();
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok-123");
    }

    #[test]
    fn test_request_headers_preserves_caller_headers() {
        let mut caller = HeaderMap::new();
        caller.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/csv"),
        );
        caller.insert(
            HeaderName::from_static("x-client-tag"),
            HeaderValue::from_static("export"),
        );

        let headers = ApiClient::request_headers(&caller, Some("tok")).unwrap();
        // Caller's content-type overrides the JSON default
        assert_eq!(headers.get(header::CONTENT_TYPE).unwrap(), "text/csv");
        assert_eq!(headers.get("x-client-tag").unwrap(), "export");
        assert_eq!(headers.get(header::AUTHORIZATION).unwrap(), "Bearer tok");
    }

    #[test]
    fn test_request_builder() {
        let request = ApiRequest::get("/api/entries/by-date/")
            .query("date", "2025-03-14")
            .header(
                HeaderName::from_static("x-client-tag"),
                HeaderValue::from_static("test"),
            );

        assert_eq!(request.method, Method::GET);
        assert_eq!(request.path, "/api/entries/by-date/");
        assert_eq!(request.query, vec![("date".to_string(), "2025-03-14".to_string())]);
        assert!(request.body.is_none());

        let request = ApiRequest::post("/api/log-food/").json(json!({ "query": "an apple" }));
        assert_eq!(request.method, Method::POST);
        assert_eq!(request.body.unwrap()["query"], "an apple");
    }

    #[test]
    fn test_parse_token_pair() {
        let json = r#"{"access": "acc.jwt.token", "refresh": "ref.jwt.token"}"#;
        let tokens: TokenPairResponse =
            serde_json::from_str(json).expect("Failed to parse token pair JSON");
        assert_eq!(tokens.access, "acc.jwt.token");
        assert_eq!(tokens.refresh, "ref.jwt.token");
    }
}
