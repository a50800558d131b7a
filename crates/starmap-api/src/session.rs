// HTTP session for the StArMap service
//
// Wraps `reqwest::Client` with StArMap URL construction
// (`{url}/api/{version}/{path}`), the JSON `Accept` header and retry with
// exponential backoff on transient failures. Responses are returned raw:
// status handling (404 as "absent", everything else non-2xx as an error)
// belongs to the caller.

use std::future::Future;
use std::sync::Mutex;

use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::Error;
use crate::transport::{ApiVersion, TransportConfig};

/// Status codes that trigger a retry.
const RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

// ── Response ─────────────────────────────────────────────────────────

/// A fully-read HTTP response: status code plus body text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StarmapResponse {
    path: String,
    status: u16,
    body: String,
}

impl StarmapResponse {
    pub fn new(path: impl Into<String>, status: u16, body: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            status,
            body: body.into(),
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_not_found(&self) -> bool {
        self.status == 404
    }

    /// The raw response body.
    pub fn text(&self) -> &str {
        &self.body
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        serde_json::from_str(&self.body).map_err(|e| {
            let preview: String = self.body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: self.body.clone(),
            }
        })
    }

    /// Turn any non-2xx status into an `Error::Http`.
    pub fn raise_for_status(self) -> Result<Self, Error> {
        if self.is_success() {
            return Ok(self);
        }
        let reason = reqwest::StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
            .unwrap_or("Unknown status");
        let message = if self.body.is_empty() {
            reason.to_owned()
        } else {
            format!("{reason}: {}", self.body.chars().take(200).collect::<String>())
        };
        Err(Error::Http {
            status: self.status,
            path: self.path,
            message,
        })
    }
}

// ── Transport contract ───────────────────────────────────────────────

/// The request surface the client facade consumes.
///
/// Implemented by [`StarmapSession`] for real traffic and by
/// [`MockSession`] for offline use.
pub trait Transport: Send + Sync {
    /// API generation this transport talks to.
    fn api_version(&self) -> ApiVersion;

    fn get(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> impl Future<Output = Result<StarmapResponse, Error>> + Send;

    fn post(
        &self,
        path: &str,
        body: &Value,
    ) -> impl Future<Output = Result<StarmapResponse, Error>> + Send;

    fn put(
        &self,
        path: &str,
        body: &Value,
    ) -> impl Future<Output = Result<StarmapResponse, Error>> + Send;
}

// ── Session ──────────────────────────────────────────────────────────

/// HTTP(S) session with a StArMap server.
pub struct StarmapSession {
    http: reqwest::Client,
    url: String,
    api_version: ApiVersion,
    config: TransportConfig,
}

impl StarmapSession {
    /// Create a session from a base URL, API version and transport config.
    pub fn new(
        url: &str,
        api_version: ApiVersion,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Url::parse(url)?;
        let http = transport.build_client()?;
        Ok(Self {
            http,
            url: url.to_owned(),
            api_version,
            config: transport.clone(),
        })
    }

    /// Create a session around a pre-built `reqwest::Client`.
    pub fn with_client(
        http: reqwest::Client,
        url: &str,
        api_version: ApiVersion,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        Url::parse(url)?;
        Ok(Self {
            http,
            url: url.to_owned(),
            api_version,
            config: transport.clone(),
        })
    }

    /// The server base URL.
    pub fn base_url(&self) -> &str {
        &self.url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Join `{url}/api/{version}/{path}`, trimming slashes from every part.
    pub fn url(&self, path: &str) -> Result<Url, Error> {
        let api = format!("/api/{}", self.api_version);
        let full = [self.url.as_str(), api.as_str(), path]
            .iter()
            .map(|part| part.trim_matches('/'))
            .collect::<Vec<_>>()
            .join("/");
        Ok(Url::parse(&full)?)
    }

    // ── Request helper ───────────────────────────────────────────────

    async fn request(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, String)],
        body: Option<&Value>,
    ) -> Result<StarmapResponse, Error> {
        let url = self.url(path)?;
        info!("Sending a {method} request to {path}");

        let mut attempt: u32 = 0;
        loop {
            let mut req = self
                .http
                .request(method.clone(), url.clone())
                .header(ACCEPT, HeaderValue::from_static("application/json"));
            if !params.is_empty() {
                req = req.query(params);
            }
            if let Some(json) = body {
                req = req.json(json);
            }
            debug!("{method} {url} params={params:?}");

            match req.send().await {
                Ok(resp) => {
                    let status = resp.status().as_u16();
                    if RETRY_STATUSES.contains(&status) && attempt < self.config.retries {
                        attempt += 1;
                        warn!(status, attempt, "retrying {method} {path}");
                        tokio::time::sleep(self.config.backoff_delay(attempt)).await;
                        continue;
                    }
                    let text = resp.text().await?;
                    return Ok(StarmapResponse::new(path, status, text));
                }
                Err(e) if (e.is_connect() || e.is_timeout()) && attempt < self.config.retries => {
                    attempt += 1;
                    warn!(error = %e, attempt, "retrying {method} {path}");
                    tokio::time::sleep(self.config.backoff_delay(attempt)).await;
                }
                Err(e) => return Err(Error::Transport(e)),
            }
        }
    }
}

impl Transport for StarmapSession {
    fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<StarmapResponse, Error> {
        self.request(Method::GET, path, params, None).await
    }

    async fn post(&self, path: &str, body: &Value) -> Result<StarmapResponse, Error> {
        self.request(Method::POST, path, &[], Some(body)).await
    }

    async fn put(&self, path: &str, body: &Value) -> Result<StarmapResponse, Error> {
        self.request(Method::PUT, path, &[], Some(body)).await
    }
}

// ── Mock session ─────────────────────────────────────────────────────

/// A request observed by [`MockSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub params: Vec<(String, String)>,
}

/// Offline transport that answers every request with a canned response.
///
/// Defaults to `404` with an empty JSON object, so a client backed by it
/// behaves like a server that knows nothing. Routes can override the
/// answer for specific paths.
pub struct MockSession {
    url: String,
    api_version: ApiVersion,
    status: u16,
    json: Value,
    routes: Vec<(String, u16, Value)>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockSession {
    pub fn new(url: &str, api_version: ApiVersion) -> Self {
        Self {
            url: url.to_owned(),
            api_version,
            status: 404,
            json: Value::Object(serde_json::Map::new()),
            routes: Vec::new(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Replace the default response.
    pub fn with_response(mut self, status: u16, json: Value) -> Self {
        self.status = status;
        self.json = json;
        self
    }

    /// Answer requests to `path` (slashes ignored) with the given response.
    pub fn with_route(mut self, path: &str, status: u16, json: Value) -> Self {
        self.routes
            .push((path.trim_matches('/').to_owned(), status, json));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.url
    }

    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn json_data(&self) -> &Value {
        &self.json
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn respond(
        &self,
        method: &'static str,
        path: &str,
        params: &[(&str, String)],
    ) -> StarmapResponse {
        if let Ok(mut log) = self.requests.lock() {
            log.push(RecordedRequest {
                method,
                path: path.to_owned(),
                params: params
                    .iter()
                    .map(|(k, v)| ((*k).to_owned(), v.clone()))
                    .collect(),
            });
        }

        let key = path.trim_matches('/');
        let (status, json) = self
            .routes
            .iter()
            .find(|(route, _, _)| route == key)
            .map_or((self.status, &self.json), |(_, status, json)| {
                (*status, json)
            });
        debug!("mock {method} {path} -> {status}");
        StarmapResponse::new(path, status, json.to_string())
    }
}

impl Transport for MockSession {
    fn api_version(&self) -> ApiVersion {
        self.api_version
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<StarmapResponse, Error> {
        Ok(self.respond("GET", path, params))
    }

    async fn post(&self, path: &str, _body: &Value) -> Result<StarmapResponse, Error> {
        Ok(self.respond("POST", path, &[]))
    }

    async fn put(&self, path: &str, _body: &Value) -> Result<StarmapResponse, Error> {
        Ok(self.respond("PUT", path, &[]))
    }
}
