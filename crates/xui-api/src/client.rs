// Panel HTTP client
//
// Wraps `reqwest::Client` with x-ui URL construction, session cookie
// attachment, and response normalization. Endpoint groups (inbounds, sync)
// are implemented as inherent methods in separate files to keep this module
// focused on transport mechanics.

use std::sync::Arc;

use reqwest::header::COOKIE;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use crate::auth::SESSION_COOKIE_NAME;
use crate::cache::{MemoryCache, SessionCache};
use crate::config::PanelConfig;
use crate::error::Error;

/// HTTP method accepted by [`XuiClient::perform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// Why a dispatched request did not produce a panel payload.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFailure {
    /// No session token could be obtained; the target request was not sent.
    LoginFailed,
    /// The panel answered with a non-2xx status.
    RequestFailed { status: u16, details: Value },
}

/// Normalized outcome of a dispatched request.
///
/// Success carries the decoded panel body verbatim (usually
/// `{ success, msg, obj }`); no schema is enforced at this layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResponse {
    Success(Value),
    Failure(ApiFailure),
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// `"Login failed"` / `"Request failed"` for failures, `None` otherwise.
    pub fn error_message(&self) -> Option<&'static str> {
        match self {
            Self::Success(_) => None,
            Self::Failure(ApiFailure::LoginFailed) => Some("Login failed"),
            Self::Failure(ApiFailure::RequestFailed { .. }) => Some("Request failed"),
        }
    }

    /// HTTP status of a failed request, if one was sent.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Failure(ApiFailure::RequestFailed { status, .. }) => Some(*status),
            _ => None,
        }
    }

    /// The successful body, if any.
    pub fn body(&self) -> Option<&Value> {
        match self {
            Self::Success(body) => Some(body),
            Self::Failure(_) => None,
        }
    }

    /// Decode the panel's `obj` field from a successful body.
    ///
    /// Returns `Ok(None)` for failures and for bodies without `obj`.
    pub fn obj<T: DeserializeOwned>(&self) -> Result<Option<T>, Error> {
        let Some(obj) = self.body().and_then(|b| b.get("obj")) else {
            return Ok(None);
        };
        if obj.is_null() {
            return Ok(None);
        }
        serde_json::from_value(obj.clone())
            .map(Some)
            .map_err(|e| Error::Deserialization {
                message: e.to_string(),
                body: obj.to_string(),
            })
    }

    /// Render the wire-level result shape:
    /// the body itself, `{"error":"Login failed"}`, or
    /// `{"error":"Request failed","status":N,"details":…}`.
    pub fn to_value(&self) -> Value {
        match self {
            Self::Success(body) => body.clone(),
            Self::Failure(ApiFailure::LoginFailed) => json!({ "error": "Login failed" }),
            Self::Failure(ApiFailure::RequestFailed { status, details }) => json!({
                "error": "Request failed",
                "status": status,
                "details": details,
            }),
        }
    }

    /// Convert failures into [`Error`] for callers that want `?`.
    pub fn into_result(self) -> Result<Value, Error> {
        match self {
            Self::Success(body) => Ok(body),
            Self::Failure(ApiFailure::LoginFailed) => Err(Error::LoginFailed),
            Self::Failure(ApiFailure::RequestFailed { status, details }) => {
                Err(Error::RequestFailed { status, details })
            }
        }
    }
}

/// Session-authenticated client for a single x-ui panel.
///
/// Cheap to share behind a reference; all methods take `&self`. The session
/// token lives in the injected [`SessionCache`], so several clients (or
/// processes, with a shared store) can reuse one login.
pub struct XuiClient {
    http: reqwest::Client,
    base_url: Url,
    config: PanelConfig,
    cache: Arc<dyn SessionCache>,
}

impl XuiClient {
    /// Create a client with a private in-memory session cache.
    pub fn new(config: PanelConfig) -> Result<Self, Error> {
        Self::with_cache(config, Arc::new(MemoryCache::new()))
    }

    /// Create a client that stores its session in `cache`.
    pub fn with_cache(config: PanelConfig, cache: Arc<dyn SessionCache>) -> Result<Self, Error> {
        let http = config.transport().build_client()?;
        Self::with_http(http, config, cache)
    }

    /// Create a client around a pre-built `reqwest::Client`.
    pub fn with_http(
        http: reqwest::Client,
        config: PanelConfig,
        cache: Arc<dyn SessionCache>,
    ) -> Result<Self, Error> {
        let base_url = config.base_url()?;
        Ok(Self {
            http,
            base_url,
            config,
            cache,
        })
    }

    /// The underlying HTTP client (for auth flows that need direct access).
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// The panel API base, always ending in `/`.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    pub(crate) fn cache(&self) -> &dyn SessionCache {
        self.cache.as_ref()
    }

    /// Resolve an endpoint relative to the API base.
    pub(crate) fn url(&self, endpoint: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(endpoint.trim_start_matches('/'))?)
    }

    /// Effective inbound: the caller's value, else the configured default.
    pub(crate) fn resolve_inbound<'a>(&'a self, inbound: Option<&'a str>) -> &'a str {
        inbound.unwrap_or(&self.config.inbound_id)
    }

    // ── Dispatch ─────────────────────────────────────────────────────

    /// Send an authenticated request and normalize the response.
    ///
    /// Obtains a session first; without one the target request is skipped
    /// and [`ApiFailure::LoginFailed`] returned. Non-2xx answers become
    /// [`ApiFailure::RequestFailed`] with a best-effort JSON decode of the
    /// body. `payload` is JSON-encoded for POST and ignored for GET.
    pub async fn perform(
        &self,
        method: Method,
        endpoint: &str,
        payload: Option<&Value>,
    ) -> Result<ApiResponse, Error> {
        let url = self.url(endpoint)?;

        let Some(token) = self.session_token().await? else {
            return Ok(ApiResponse::Failure(ApiFailure::LoginFailed));
        };
        let cookie = format!("{SESSION_COOKIE_NAME}={token}");

        let request = match method {
            Method::Get => {
                debug!("GET {}", url);
                self.http.get(url)
            }
            Method::Post => {
                debug!("POST {}", url);
                let request = self.http.post(url);
                match payload {
                    Some(body) => request.json(body),
                    None => request,
                }
            }
        };

        let resp = request
            .header(COOKIE, cookie)
            .send()
            .await
            .map_err(Error::Transport)?;

        let status = resp.status();
        let body = decode_body(resp).await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), endpoint, "panel request failed");
            return Ok(ApiResponse::Failure(ApiFailure::RequestFailed {
                status: status.as_u16(),
                details: body,
            }));
        }

        Ok(ApiResponse::Success(body))
    }
}

/// Read a response body as JSON, falling back to `null` when it isn't.
pub(crate) async fn decode_body(resp: reqwest::Response) -> Result<Value, Error> {
    let text = resp.text().await.map_err(Error::Transport)?;
    Ok(serde_json::from_str(&text).unwrap_or(Value::Null))
}
